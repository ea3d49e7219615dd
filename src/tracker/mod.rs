mod api;
mod config;
pub mod error;
mod history;
pub(crate) mod queue;

pub use api::{initialize_tracker, PiwikTracker, TrackerHandle};
pub use config::{SiteId, TrackerConfig, WarningHandler};
pub use history::{History, Location, LocationCallback, Unlisten};
pub use queue::{Command, CommandQueue};
