//! # stager_camera - Camera Viewpoint Search
//!
//! Finds camera poses inside a scene that keep clear of nearby obstacles and
//! see enough of the interesting objects.
//!
//! # Architecture
//!
//! ```text
//!  ┌───────────────────┐   ┌───────────────────┐
//!  │ PointInRoomSampler│   │ OrientationRanges │
//!  │ HeightRange       │   │                   │
//!  └─────────┬─────────┘   └─────────┬─────────┘
//!            └───────────┬───────────┘
//!                        ▼ candidate pose
//!              ┌──────────────────┐
//!              │  PoseValidator   │──▶ obstacle_in_view (GeometryIndex)
//!              │                  │──▶ CoverageEstimator
//!              └────────┬─────────┘
//!                       ▼ accept / reject
//!              ┌──────────────────┐
//!              │ ViewpointSearch  │──▶ AcceptedPoseSet
//!              └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stager_camera::prelude::*;
//!
//! let index = GeometryIndex::build(&scene);
//! let rooms = FloorPointSampler::new(&scene, &PropertyFilter::equals("type", "Floor"))?;
//! let coverage = RayCoverageEstimator::new(&scene, &index, CameraIntrinsics::default());
//!
//! let search = ViewpointSearch::new(SearchConfig::default(), CameraIntrinsics::default(), &rooms, &index, &coverage)?;
//! let outcome = search.run(&mut rng);
//! ```

pub mod error;
pub mod intrinsics;
pub mod pose;
pub mod room;
pub mod search;
pub mod validation;

pub mod prelude {
    pub use crate::error::{CameraError, Result};
    pub use crate::intrinsics::CameraIntrinsics;
    pub use crate::pose::{build_transformation_matrix, HeightRange, OrientationRanges};
    pub use crate::room::{FloorPointSampler, PointInRoomSampler, RoomPoint};
    pub use crate::search::{
        AcceptedPoseSet, SearchConfig, SearchOutcome, SearchState, StopReason, ViewpointSearch,
    };
    pub use crate::validation::{
        obstacle_in_view, CoverageEstimator, DistanceRange, PoseValidator, ProximityChecks,
        RayCoverageEstimator, Verdict,
    };
}

pub use prelude::*;
