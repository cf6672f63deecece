pub mod clock;
pub mod item;
pub mod range;
pub mod time_grid;
pub mod viewport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use item::{ScheduleItem, Status, WorkWindow};
pub use range::{DayRange, ItemSpan, TimeRange};
pub use viewport::{Extension, ViewportState};
