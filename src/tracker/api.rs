use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

use serde_json::Value;

use crate::logger::Logger;
use crate::platform::environment;
use crate::platform::page::{ErrorEvent, ErrorHandler, PageContext};
use crate::tracker::config::{ResolvedConfig, TrackerConfig, WarningHandler};
use crate::tracker::history::{History, Location, Unlisten};
use crate::tracker::queue::Command;

static LOGGER: LazyLock<Logger> = LazyLock::new(|| Logger::new("piwik/tracker"));

/// What the factory hands back: a live tracker or an inert shim. Both
/// variants answer the full interface, so callers never branch on which
/// one they hold.
pub enum TrackerHandle {
    /// No-op stand-in returned when configuration is invalid.
    Shim,
    Active(PiwikTracker),
}

impl TrackerHandle {
    pub fn is_shim(&self) -> bool {
        matches!(self, TrackerHandle::Shim)
    }

    pub fn track(&self, location: &Location) {
        if let TrackerHandle::Active(tracker) = self {
            tracker.track(location);
        }
    }

    pub fn track_error(&self, event: &ErrorEvent) {
        if let TrackerHandle::Active(tracker) = self {
            tracker.track_error(event);
        }
    }

    /// Appends a raw command to the queue, bypassing the typed helpers.
    pub fn push(&self, command: Command) {
        if let TrackerHandle::Active(tracker) = self {
            tracker.push(command);
        }
    }

    pub fn connect_to_history(&self, history: &dyn History) {
        if let TrackerHandle::Active(tracker) = self {
            tracker.connect_to_history(history);
        }
    }

    pub fn disconnect_from_history(&self) -> bool {
        match self {
            TrackerHandle::Shim => false,
            TrackerHandle::Active(tracker) => tracker.disconnect_from_history(),
        }
    }
}

impl fmt::Debug for TrackerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerHandle::Shim => f.write_str("TrackerHandle::Shim"),
            TrackerHandle::Active(tracker) => {
                f.debug_tuple("TrackerHandle::Active").field(tracker).finish()
            }
        }
    }
}

/// Live tracker bound to one page context. Cheap to clone; clones share the
/// navigation state and the history subscription.
#[derive(Clone)]
pub struct PiwikTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    page: Arc<PageContext>,
    config: ResolvedConfig,
    last_tracked_url: Mutex<Option<String>>,
    unlisten: Mutex<Option<Unlisten>>,
}

impl fmt::Debug for PiwikTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PiwikTracker")
            .field("endpoint", &self.inner.config.endpoint)
            .field("site_id", &self.inner.config.site_id)
            .finish()
    }
}

impl PiwikTracker {
    /// Records a navigation. Repeating the previously tracked URL is a
    /// complete no-op: nothing is appended and no state changes.
    pub fn track(&self, location: &Location) {
        let url = location.custom_url(!self.inner.config.ignore_hash_change);
        let mut last = self.inner.last_tracked_url.lock().unwrap();
        if last.as_deref() == Some(url.as_str()) {
            return;
        }

        let queue = self.inner.page.queue();
        if self.inner.config.update_document_title {
            queue.push(Command::new(
                "setDocumentTitle",
                [Value::from(self.inner.page.document_title())],
            ));
        }
        queue.push(Command::new("setCustomUrl", [Value::from(url.clone())]));
        queue.push(Command::bare("trackPageView"));
        *last = Some(url);
    }

    /// Forwards an uncaught error as a `JavaScript Error` tracking event.
    pub fn track_error(&self, event: &ErrorEvent) {
        self.inner.page.queue().push(Command::new(
            "trackEvent",
            [
                Value::from("JavaScript Error"),
                Value::from(event.message.clone()),
                Value::from(format!("{}: {}", event.filename, event.lineno)),
            ],
        ));
    }

    pub fn push(&self, command: Command) {
        self.inner.page.queue().push(command);
    }

    /// Subscribes `track` to the history's location changes. An existing
    /// subscription is unlistened first, so at most one is ever live.
    pub fn connect_to_history(&self, history: &dyn History) {
        if self.disconnect_from_history() {
            log::debug!("replaced existing history subscription");
        }
        let handle = self.clone();
        let unlisten = history.listen(Arc::new(move |location| handle.track(location)));
        *self.inner.unlisten.lock().unwrap() = Some(unlisten);
    }

    /// Cancels the history subscription, if any. Returns whether an
    /// unlisten function was invoked.
    pub fn disconnect_from_history(&self) -> bool {
        let unlisten = self.inner.unlisten.lock().unwrap().take();
        match unlisten {
            Some(unlisten) => {
                unlisten();
                true
            }
            None => false,
        }
    }
}

/// Builds a tracker from the given options against the given page.
///
/// Invalid configuration never panics or errors: one warning goes through
/// the configured channel (suppressed in test environments) and the caller
/// receives the shim. On success the initialization commands are queued in
/// order: site id, user id when present, tracker URL, link tracking unless
/// disabled.
pub fn initialize_tracker(config: TrackerConfig, page: Arc<PageContext>) -> TrackerHandle {
    let resolved = match config.validate(&page) {
        Ok(resolved) => resolved,
        Err(err) => {
            emit_warning(config.warning.as_ref(), err.message());
            return TrackerHandle::Shim;
        }
    };

    let queue = page.queue();
    queue.push(Command::new("setSiteId", [resolved.site_id.to_value()]));
    if let Some(user_id) = &resolved.user_id {
        queue.push(Command::new("setUserId", [Value::from(user_id.clone())]));
    }
    queue.push(Command::new(
        "setTrackerUrl",
        [Value::from(resolved.endpoint.clone())],
    ));
    if resolved.enable_link_tracking {
        queue.push(Command::bare("enableLinkTracking"));
    }

    let track_errors = resolved.track_errors;
    let tracker = PiwikTracker {
        inner: Arc::new(TrackerInner {
            page: Arc::clone(&page),
            config: resolved,
            last_tracked_url: Mutex::new(None),
            unlisten: Mutex::new(None),
        }),
    };

    if track_errors {
        let handle = tracker.clone();
        let handler: ErrorHandler = Arc::new(move |event| handle.track_error(event));
        page.install_error_handler(handler);
    }

    TrackerHandle::Active(tracker)
}

fn emit_warning(warning: Option<&WarningHandler>, message: &str) {
    if environment::is_test_environment() {
        return;
    }
    match warning {
        Some(warning) => warning(message),
        None => LOGGER.warn(message),
    }
}
