pub mod lanes;
pub mod projection;

pub use lanes::{LaneAssignment, assign_lanes, assign_lanes_with, pack_intervals};
pub use projection::{PixelSpan, lane_top, project_days, project_hours};
