use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One fetched page and the in-scope links discovered on it.
///
/// `links_found` is deduplicated in document order; each entry is an edge
/// (this page -> link) for the downstream link graph, whether or not the
/// target itself ever gets fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub response_time: Duration,
    pub links_found: Vec<String>,
}

impl PageResult {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            content_type: None,
            content_length: None,
            response_time: Duration::from_secs(0),
            links_found: Vec::new(),
        }
    }
}
