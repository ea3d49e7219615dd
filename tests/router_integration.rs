//! End-to-end flow: configure a tracker against a page, connect it to a
//! router, navigate, fail, and verify the exact command sequence the
//! external Piwik script would consume.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

use piwik_router_tracker::{
    initialize_tracker, Command, ErrorEvent, History, Location, LocationCallback, PageContext,
    PageProtocol, TrackerConfig, Unlisten,
};

#[derive(Default)]
struct MemoryHistory {
    callback: Mutex<Option<LocationCallback>>,
    unlisten_calls: Arc<AtomicUsize>,
}

impl History for MemoryHistory {
    fn listen(&self, callback: LocationCallback) -> Unlisten {
        *self.callback.lock().unwrap() = Some(callback);
        let count = Arc::clone(&self.unlisten_calls);
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }
}

impl MemoryHistory {
    fn navigate(&self, location: Location) {
        let callback = self
            .callback
            .lock()
            .unwrap()
            .clone()
            .expect("history not connected");
        callback(&location);
    }
}

fn names(commands: &[Command]) -> Vec<&str> {
    commands.iter().map(Command::name).collect()
}

#[test]
fn full_session_produces_the_expected_command_stream() {
    let page = Arc::new(PageContext::new(PageProtocol::Https));
    page.set_document_title("Dashboard");

    let config = TrackerConfig {
        update_document_title: Some(true),
        track_errors: Some(true),
        ..TrackerConfig::new("stats.example.org", 4u64).with_user_id("user-1")
    };
    let tracker = initialize_tracker(config, Arc::clone(&page));
    assert!(!tracker.is_shim());

    let history = MemoryHistory::default();
    tracker.connect_to_history(&history);

    history.navigate(Location::split("/dashboard", "?tab=traffic"));
    // Identical navigation is dropped.
    history.navigate(Location::path("/dashboard?tab=traffic"));

    page.set_document_title("Settings");
    history.navigate(Location::split("/settings", ""));

    // An uncaught script error arrives through the page's global dispatch.
    assert!(page.dispatch_error(&ErrorEvent::new("boom", "app.js", 42)));

    assert!(tracker.disconnect_from_history());
    assert_eq!(history.unlisten_calls.load(Ordering::SeqCst), 1);
    assert!(!tracker.disconnect_from_history());

    let commands = page.commands();
    assert_eq!(
        names(&commands),
        vec![
            "setSiteId",
            "setUserId",
            "setTrackerUrl",
            "enableLinkTracking",
            "setDocumentTitle",
            "setCustomUrl",
            "trackPageView",
            "setDocumentTitle",
            "setCustomUrl",
            "trackPageView",
            "trackEvent",
        ]
    );

    assert_eq!(commands[0].args(), &[json!(4)]);
    assert_eq!(commands[1].args(), &[json!("user-1")]);
    assert_eq!(
        commands[2].args(),
        &[json!("https://stats.example.org/piwik.php")]
    );
    assert_eq!(commands[4].args(), &[json!("Dashboard")]);
    assert_eq!(commands[5].args(), &[json!("/dashboard?tab=traffic")]);
    assert_eq!(commands[7].args(), &[json!("Settings")]);
    assert_eq!(commands[8].args(), &[json!("/settings")]);
    assert_eq!(
        commands[10].args(),
        &[json!("JavaScript Error"), json!("boom"), json!("app.js: 42")]
    );
}

#[test]
fn options_object_parsed_from_json_drives_initialization() {
    let page = Arc::new(PageContext::new(PageProtocol::Http));
    let config: TrackerConfig = serde_json::from_str(
        r#"{"url": "foo.bar", "siteId": "main-site", "enableLinkTracking": false}"#,
    )
    .unwrap();

    let tracker = initialize_tracker(config, Arc::clone(&page));
    assert!(!tracker.is_shim());

    let commands = page.commands();
    assert_eq!(names(&commands), vec!["setSiteId", "setTrackerUrl"]);
    assert_eq!(commands[0].args(), &[json!("main-site")]);
    assert_eq!(commands[1].args(), &[json!("http://foo.bar/piwik.php")]);
}
