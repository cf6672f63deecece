pub mod bars;
pub mod day_gantt;
pub mod header;
pub mod hourly_gantt;
pub mod now_indicator;
pub mod positioned;

pub use bars::{OwnerNames, PaneSize};
pub use header::{render_day_header, render_hour_header};
pub use now_indicator::{NowIndicator, compute_now_offset_px};
pub use positioned::{OwnerRow, PositionedItem, TimelineLayout};
