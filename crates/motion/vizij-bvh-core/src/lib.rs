//! Vizij BVH Core
//!
//! Loads BVH motion-capture clips into an arena skeleton and per-frame channel
//! buffer, evaluates forward kinematics, writes edited joint transforms back
//! into channels, serializes clips, and drives playback from an injected clock.

pub mod clip;
pub mod config;
pub mod error;
pub mod euler;
pub mod motion;
pub mod parser;
pub mod pose;
pub mod skeleton;
pub mod transport;
pub mod writer;

pub use clip::{Bvh, ClipSummary, JointRef};
pub use config::BvhConfig;
pub use error::{BvhError, Result};
pub use euler::{euler_from_matrix, Axis};
pub use motion::MotionBuffer;
pub use parser::{parse_bvh, read_bvh};
pub use pose::{ExtractionReport, JointPose, Pose, StaleJoint};
pub use skeleton::{JointId, JointKind, JointSpec, RotationOrder, SkeletonBuilder, SkeletonTree};
pub use transport::{Clock, ManualClock, PlaybackState, SystemClock, Transport};
pub use writer::{to_bvh_string, write_bvh};
