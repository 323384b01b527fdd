//! Client configuration

use shared::pagination::{
    CORRECTIONS_PER_PAGE, MEMBERS_PER_PAGE, SEARCH_LOGS_PER_PAGE, VERIFICATIONS_PER_PAGE,
};

/// Page sizes requested by each admin list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub members: u32,
    pub verifications: u32,
    pub corrections: u32,
    pub search_logs: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            members: MEMBERS_PER_PAGE,
            verifications: VERIFICATIONS_PER_PAGE,
            corrections: CORRECTIONS_PER_PAGE,
            search_logs: SEARCH_LOGS_PER_PAGE,
        }
    }
}

/// Client configuration for connecting to sacco-server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://127.0.0.1:5000")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    pub page_sizes: PageSizes,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            page_sizes: PageSizes::default(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_page_sizes(mut self, page_sizes: PageSizes) -> Self {
        self.page_sizes = page_sizes;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:5000")
    }
}
