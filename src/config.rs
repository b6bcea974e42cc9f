// Source configuration
//
// Where the two dataset resources live and how the load behaves. Locations are
// opaque strings: http(s) URLs, file:// URLs or plain filesystem paths.

use std::time::Duration;

/// Prefix table file name under a dataset base
pub const PREFIX_FILE: &str = "oui.csv";

/// Localization file name under a dataset base
pub const LOCALIZATION_FILE: &str = "oui_cn.json";

/// Delay before the first fetch so the host can finish its own startup work
pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(500);

const DEFAULT_USER_AGENT: &str = concat!("mac_vendor/", env!("CARGO_PKG_VERSION"));

/// What a failed localization fetch does to the overall load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalizationPolicy {
    /// Any localization failure fails the whole load
    #[default]
    Required,
    /// Localization failure is logged and the index serves vendor names only
    Optional,
}

/// Options for loading a vendor index
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Location of the tab-separated prefix table
    pub prefix_location: String,
    /// Location of the vendor name → localized name JSON document
    pub localization_location: String,
    /// Appended to both locations as `?v=<version>` for cache busting
    pub data_version: Option<String>,
    /// Wait before fetching starts (zero is fine)
    pub start_delay: Duration,
    pub localization_policy: LocalizationPolicy,
    /// Overall timeout for each HTTP request (None = client default)
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            prefix_location: PREFIX_FILE.to_string(),
            localization_location: LOCALIZATION_FILE.to_string(),
            data_version: None,
            start_delay: DEFAULT_START_DELAY,
            localization_policy: LocalizationPolicy::default(),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SourceConfig {
    /// Both resources under a common base, e.g. `https://host/static/mac`
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            prefix_location: format!("{}/{}", base, PREFIX_FILE),
            localization_location: format!("{}/{}", base, LOCALIZATION_FILE),
            ..Default::default()
        }
    }

    /// Two explicit resource locations
    pub fn from_locations(prefix: impl Into<String>, localization: impl Into<String>) -> Self {
        Self {
            prefix_location: prefix.into(),
            localization_location: localization.into(),
            ..Default::default()
        }
    }

    pub fn with_data_version(mut self, version: impl Into<String>) -> Self {
        self.data_version = Some(version.into());
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_localization_policy(mut self, policy: LocalizationPolicy) -> Self {
        self.localization_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Effective location of the prefix table, version suffix included
    pub fn prefix_uri(&self) -> String {
        self.versioned(&self.prefix_location)
    }

    /// Effective location of the localization document, version suffix included
    pub fn localization_uri(&self) -> String {
        self.versioned(&self.localization_location)
    }

    fn versioned(&self, location: &str) -> String {
        match &self.data_version {
            Some(v) => format!("{}?v={}", location, v),
            None => location.to_string(),
        }
    }
}
