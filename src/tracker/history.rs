//! Router seam: the listen/unlisten contract of `history.js`-style routers
//! and the loose location shape their callbacks deliver.

use std::sync::Arc;

use serde::Deserialize;

pub type LocationCallback = Arc<dyn Fn(&Location) + Send + Sync + 'static>;
pub type Unlisten = Box<dyn FnOnce() + Send + 'static>;

/// Anything that can notify the tracker about navigation. `listen` must
/// invoke the callback on every location change and return a function that
/// cancels the subscription.
pub trait History {
    fn listen(&self, callback: LocationCallback) -> Unlisten;
}

/// Location as delivered by a router callback. Routers disagree on shape:
/// some hand over a pre-built `path`, others split `pathname`/`search`
/// with an optional `basename` prefix and `hash` suffix. All parts are
/// optional on purpose; missing ones concatenate as empty strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Location {
    pub path: Option<String>,
    pub basename: Option<String>,
    pub pathname: Option<String>,
    pub search: Option<String>,
    pub hash: Option<String>,
}

impl Location {
    /// Location carrying a pre-built path, used verbatim as the custom URL.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Location split into `pathname` and `search`, the common router shape.
    pub fn split(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: Some(pathname.into()),
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Normalizes this location into the custom URL recorded as the page
    /// identity. An explicit `path` wins; otherwise the URL is
    /// `basename + pathname + search`, with the `hash` appended only when
    /// hash changes are tracked.
    pub fn custom_url(&self, include_hash: bool) -> String {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let mut url = String::new();
        if let Some(basename) = &self.basename {
            url.push_str(basename);
        }
        if let Some(pathname) = &self.pathname {
            url.push_str(pathname);
        }
        if let Some(search) = &self.search {
            url.push_str(search);
        }
        if include_hash {
            if let Some(hash) = &self.hash {
                url.push_str(hash);
            }
        }
        url
    }
}
