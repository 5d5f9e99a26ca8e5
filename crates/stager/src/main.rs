//! Stager command line
//!
//! Run with: cargo run --bin stager -- scene.gltf object.gltf output/

use stager::{CliArgs, PipelineInputs, SynthConfig, SynthesisPipeline};
use stager_camera::StopReason;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("stager v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> stager::Result<()> {
    let cli = CliArgs::parse(std::env::args().skip(1))?;

    let mut config = SynthConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.print_summary();

    let inputs = PipelineInputs {
        scene: cli.scene,
        object: cli.object,
        output_dir: cli.output_dir,
    };
    let report = SynthesisPipeline::new(config).run(&inputs)?;

    log::info!(
        "Done: {} substitutions, {} poses in {} tries",
        report.assignments.len(),
        report.poses.len(),
        report.tries
    );
    if report.stop_reason == StopReason::BudgetExhausted {
        log::warn!("Search budget exhausted before reaching the target pose count");
    }
    Ok(())
}
