//! Layout engine for the workforce timeline: time grid, lane packing,
//! projection to render commands, scroll sync and the live now line.

pub mod adapter;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod placement;
pub mod scroll;
pub mod session;
pub mod svg;
pub mod views;

pub use config::LayoutConfig;
pub use error::{Result, TimelineError};
pub use session::{RefreshTicket, TimelineSession, ViewMode};
