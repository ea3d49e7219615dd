#![doc = include_str!("RUSTDOC.md")]

pub mod logger;
pub mod platform;
pub mod tracker;

#[cfg(test)]
pub mod test_support;

pub use platform::page::{
    ErrorEvent, ErrorHandler, ErrorSinkKind, PageCapabilities, PageContext, PageProtocol,
};
pub use tracker::{
    initialize_tracker, Command, CommandQueue, History, Location, LocationCallback, PiwikTracker,
    SiteId, TrackerConfig, TrackerHandle, Unlisten, WarningHandler,
};
