//! Injected stand-in for the host page's globals.
//!
//! Everything the browser original reached for ambiently lives here: the
//! page protocol (`document.location.protocol`), the document title, the
//! `_paq` command queue, and the global error-registration mechanisms
//! (`addEventListener` / `attachEvent` / the `onerror` property).

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::tracker::queue::{Command, CommandQueue};

/// Protocol the current page was served over. Used to complete tracker URLs
/// given without an explicit scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageProtocol {
    Http,
    #[default]
    Https,
}

impl PageProtocol {
    pub fn scheme(self) -> &'static str {
        match self {
            PageProtocol::Http => "http",
            PageProtocol::Https => "https",
        }
    }
}

/// The global error-registration mechanisms a page may offer, in the
/// priority order the tracker probes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorSinkKind {
    /// `window.addEventListener('error', handler, false)`
    EventListener,
    /// `window.attachEvent('onerror', handler)` (legacy IE)
    AttachEvent,
    /// direct `window.onerror = handler` assignment
    OnErrorProperty,
}

impl ErrorSinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorSinkKind::EventListener => "addEventListener",
            ErrorSinkKind::AttachEvent => "attachEvent",
            ErrorSinkKind::OnErrorProperty => "onerror",
        }
    }
}

/// Which registration mechanisms the host page supports. The `onerror`
/// property is always assignable and needs no flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCapabilities {
    pub event_listener: bool,
    pub attach_event: bool,
}

impl Default for PageCapabilities {
    fn default() -> Self {
        Self {
            event_listener: true,
            attach_event: true,
        }
    }
}

/// Uncaught-error notification, shaped like both a DOM `ErrorEvent` and the
/// positional arguments of a legacy `window.onerror` handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
    pub filename: String,
    pub lineno: u32,
}

impl ErrorEvent {
    pub fn new(message: impl Into<String>, filename: impl Into<String>, lineno: u32) -> Self {
        Self {
            message: message.into(),
            filename: filename.into(),
            lineno,
        }
    }
}

pub type ErrorHandler = Arc<dyn Fn(&ErrorEvent) + Send + Sync + 'static>;

struct InstalledErrorHandler {
    kind: ErrorSinkKind,
    handler: ErrorHandler,
}

/// Shared page context passed to the tracker factory. Owns the command
/// queue and carries at most one installed global error handler.
pub struct PageContext {
    protocol: PageProtocol,
    capabilities: PageCapabilities,
    title: Mutex<String>,
    queue: CommandQueue,
    error_handler: Mutex<Option<InstalledErrorHandler>>,
}

impl PageContext {
    pub fn new(protocol: PageProtocol) -> Self {
        Self::with_capabilities(protocol, PageCapabilities::default())
    }

    pub fn with_capabilities(protocol: PageProtocol, capabilities: PageCapabilities) -> Self {
        Self {
            protocol,
            capabilities,
            title: Mutex::new(String::new()),
            queue: CommandQueue::new(),
            error_handler: Mutex::new(None),
        }
    }

    pub fn protocol(&self) -> PageProtocol {
        self.protocol
    }

    pub fn capabilities(&self) -> PageCapabilities {
        self.capabilities
    }

    pub fn document_title(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    pub fn set_document_title(&self, title: impl Into<String>) {
        *self.title.lock().unwrap() = title.into();
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Snapshot of the queued commands, in append order.
    pub fn commands(&self) -> Vec<Command> {
        self.queue.snapshot()
    }

    /// Installs a global error handler through the first available
    /// mechanism and reports which one was used. The probe runs once per
    /// install; a later install replaces the stored handler.
    pub fn install_error_handler(&self, handler: ErrorHandler) -> ErrorSinkKind {
        let kind = if self.capabilities.event_listener {
            ErrorSinkKind::EventListener
        } else if self.capabilities.attach_event {
            ErrorSinkKind::AttachEvent
        } else {
            ErrorSinkKind::OnErrorProperty
        };
        log::debug!("installing error handler via {}", kind.as_str());
        *self.error_handler.lock().unwrap() = Some(InstalledErrorHandler { kind, handler });
        kind
    }

    pub fn installed_error_sink(&self) -> Option<ErrorSinkKind> {
        self.error_handler.lock().unwrap().as_ref().map(|h| h.kind)
    }

    /// Synchronously forwards an uncaught error to the installed handler.
    /// Returns whether a handler was invoked. The host page calls this from
    /// its global error event dispatch.
    pub fn dispatch_error(&self, event: &ErrorEvent) -> bool {
        let handler = self
            .error_handler
            .lock()
            .unwrap()
            .as_ref()
            .map(|h| Arc::clone(&h.handler));
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("protocol", &self.protocol)
            .field("capabilities", &self.capabilities)
            .field("queued_commands", &self.queue.len())
            .field("error_sink", &self.installed_error_sink())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_sink_prefers_event_listener() {
        let page = PageContext::new(PageProtocol::Http);
        let kind = page.install_error_handler(Arc::new(|_| {}));
        assert_eq!(kind, ErrorSinkKind::EventListener);
        assert_eq!(page.installed_error_sink(), Some(ErrorSinkKind::EventListener));
    }

    #[test]
    fn error_sink_falls_back_to_attach_event() {
        let page = PageContext::with_capabilities(
            PageProtocol::Http,
            PageCapabilities {
                event_listener: false,
                attach_event: true,
            },
        );
        assert_eq!(
            page.install_error_handler(Arc::new(|_| {})),
            ErrorSinkKind::AttachEvent
        );
    }

    #[test]
    fn error_sink_falls_back_to_onerror_property() {
        let page = PageContext::with_capabilities(
            PageProtocol::Http,
            PageCapabilities {
                event_listener: false,
                attach_event: false,
            },
        );
        assert_eq!(
            page.install_error_handler(Arc::new(|_| {})),
            ErrorSinkKind::OnErrorProperty
        );
    }

    #[test]
    fn dispatch_error_reaches_installed_handler() {
        let page = PageContext::new(PageProtocol::Https);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        page.install_error_handler(Arc::new(move |event| {
            seen_cb.lock().unwrap().push(event.clone());
        }));

        let event = ErrorEvent::new("boom", "app.js", 7);
        assert!(page.dispatch_error(&event));
        assert_eq!(seen.lock().unwrap().as_slice(), &[event]);
    }

    #[test]
    fn dispatch_error_without_handler_is_inert() {
        let page = PageContext::new(PageProtocol::Https);
        assert!(!page.dispatch_error(&ErrorEvent::new("boom", "app.js", 7)));
    }

    #[test]
    fn document_title_round_trips() {
        let page = PageContext::new(PageProtocol::Https);
        assert_eq!(page.document_title(), "");
        page.set_document_title("title 01");
        assert_eq!(page.document_title(), "title 01");
    }
}
