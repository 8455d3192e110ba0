use std::cell::RefCell;
use std::collections::HashMap;

use crate::domain::models::FeedEntry;
use crate::error::FeedError;
use crate::infra::feed::FeedGateway;

/// Canned feed responses keyed by series name. Unknown series fail to fetch.
#[derive(Default)]
pub struct FakeGateway {
    feeds: HashMap<String, Vec<FeedEntry>>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeGateway {
    pub fn with_feed(mut self, series: &str, entries: Vec<FeedEntry>) -> Self {
        self.feeds.insert(series.to_string(), entries);
        self
    }
}

impl FeedGateway for FakeGateway {
    fn fetch_entries(&self, series_name: &str) -> Result<Vec<FeedEntry>, FeedError> {
        self.requests.borrow_mut().push(series_name.to_string());
        self.feeds
            .get(series_name)
            .cloned()
            .ok_or_else(|| FeedError::Fetch {
                series: series_name.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

pub fn entry(title: &str, magnet: &str) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        link: None,
        magnet_uri: Some(magnet.to_string()),
    }
}
