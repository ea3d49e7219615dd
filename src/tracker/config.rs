use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::platform::page::PageContext;
use crate::tracker::error::{invalid_configuration, TrackerResult};

/// Channel the factory reports configuration problems through. Defaults to
/// the crate logger at warn level when unset.
pub type WarningHandler = Arc<dyn Fn(&str) + Send + Sync + 'static>;

const TRACKER_SCRIPT: &str = "piwik.php";

/// Piwik site identifier. The JS options object accepts both a number and a
/// string; the distinction is preserved down to the queued command argument.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SiteId {
    Number(u64),
    Text(String),
}

impl SiteId {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            SiteId::Number(id) => Value::from(*id),
            SiteId::Text(id) => Value::from(id.clone()),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, SiteId::Text(id) if id.is_empty())
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteId::Number(id) => write!(f, "{id}"),
            SiteId::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for SiteId {
    fn from(id: u64) -> Self {
        SiteId::Number(id)
    }
}

impl From<u32> for SiteId {
    fn from(id: u32) -> Self {
        SiteId::Number(id.into())
    }
}

impl From<String> for SiteId {
    fn from(id: String) -> Self {
        SiteId::Text(id)
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        SiteId::Text(id.to_owned())
    }
}

/// Tracker options, one-to-one with the JS options object (hence the
/// camelCase wire names). `url` and `site_id` are required; everything else
/// has a default. The warning channel is not part of the wire shape.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    pub url: Option<String>,
    pub site_id: Option<SiteId>,
    pub enable_link_tracking: Option<bool>,
    pub update_document_title: Option<bool>,
    pub track_errors: Option<bool>,
    pub user_id: Option<String>,
    pub ignore_hash_change: Option<bool>,
    #[serde(skip)]
    pub warning: Option<WarningHandler>,
}

impl TrackerConfig {
    pub fn new(url: impl Into<String>, site_id: impl Into<SiteId>) -> Self {
        Self {
            url: Some(url.into()),
            site_id: Some(site_id.into()),
            ..Default::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_warning<F>(mut self, warning: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.warning = Some(Arc::new(warning));
        self
    }

    /// Checks the required options and resolves the defaults and the full
    /// tracker endpoint against the given page.
    pub(crate) fn validate(&self, page: &PageContext) -> TrackerResult<ResolvedConfig> {
        let mut missing = Vec::new();
        if self.url.as_deref().map_or(true, str::is_empty) {
            missing.push("url");
        }
        match &self.site_id {
            None => missing.push("siteId"),
            Some(site_id) if site_id.is_empty() => missing.push("siteId"),
            Some(_) => {}
        }
        if !missing.is_empty() {
            return Err(invalid_configuration(format!(
                "PiwikTracker cannot be initialized! Missing required option(s): {}.",
                missing.join(", ")
            )));
        }

        let url = self.url.as_deref().unwrap_or_default();
        let site_id = self.site_id.clone().unwrap_or(SiteId::Number(0));

        Ok(ResolvedConfig {
            endpoint: tracker_endpoint(url, page),
            site_id,
            user_id: self.user_id.clone(),
            enable_link_tracking: self.enable_link_tracking.unwrap_or(true),
            update_document_title: self.update_document_title.unwrap_or(false),
            track_errors: self.track_errors.unwrap_or(false),
            ignore_hash_change: self.ignore_hash_change.unwrap_or(false),
        })
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("url", &self.url)
            .field("site_id", &self.site_id)
            .field("enable_link_tracking", &self.enable_link_tracking)
            .field("update_document_title", &self.update_document_title)
            .field("track_errors", &self.track_errors)
            .field("user_id", &self.user_id)
            .field("ignore_hash_change", &self.ignore_hash_change)
            .field("warning", &self.warning.as_ref().map(|_| "<handler>"))
            .finish()
    }
}

/// Validated configuration with every default applied and the tracker
/// endpoint fully derived.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedConfig {
    pub endpoint: String,
    pub site_id: SiteId,
    pub user_id: Option<String>,
    pub enable_link_tracking: bool,
    pub update_document_title: bool,
    pub track_errors: bool,
    pub ignore_hash_change: bool,
}

/// A url given with an explicit scheme is used verbatim; a bare host
/// inherits the protocol of the current page, matching how the browser
/// original read `document.location.protocol`.
fn tracker_endpoint(url: &str, page: &PageContext) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        format!("{url}/{TRACKER_SCRIPT}")
    } else {
        format!("{}://{url}/{TRACKER_SCRIPT}", page.protocol().scheme())
    }
}
