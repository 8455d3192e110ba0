use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::time::Duration;

use crate::domain::models::FeedEntry;
use crate::error::FeedError;

pub const DEFAULT_FEED_URL: &str = "http://www.ezrss.it/search/index.php";

pub trait FeedGateway {
    /// Entries for a series, newest first.
    fn fetch_entries(&self, series_name: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

pub struct RssFeedGateway {
    client: reqwest::blocking::Client,
    feed_url: String,
}

impl RssFeedGateway {
    pub fn new(feed_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, feed_url })
    }
}

impl FeedGateway for RssFeedGateway {
    fn fetch_entries(&self, series_name: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let fetch_error = |reason: String| FeedError::Fetch {
            series: series_name.to_string(),
            reason,
        };

        tracing::debug!("Fetching feed for '{}' from {}", series_name, self.feed_url);
        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("show_name", series_name), ("mode", "rss")])
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let body = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        let entries = parse_feed(&body).map_err(|reason| FeedError::Parse {
            series: series_name.to_string(),
            reason,
        })?;

        tracing::debug!("Parsed {} entries for '{}'", entries.len(), series_name);
        Ok(entries)
    }
}

/// Parse RSS XML into entries, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedEntry>, String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buf = Vec::new();
    let mut current_item: Option<FeedEntryBuilder> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    current_item = Some(FeedEntryBuilder::default());
                }
                current_element = name;
            }
            Ok(Event::Empty(e)) => {
                // <enclosure url="..." type="application/x-bittorrent"/>
                if let Some(ref mut item) = current_item {
                    if e.name().as_ref() == b"enclosure" {
                        if let Ok(Some(url)) = e.try_get_attribute("url") {
                            let url = String::from_utf8_lossy(&url.value).to_string();
                            item.enclosure.get_or_insert(url);
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(entry) = current_item.take().and_then(FeedEntryBuilder::build) {
                        entries.push(entry);
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    // Undeclared entities such as &nbsp; keep their raw text.
                    let text = e
                        .unescape()
                        .map(|text| text.to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).to_string());
                    item.set(&current_element, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    item.set(&current_element, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error at {}: {}", reader.buffer_position(), e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

#[derive(Default)]
struct FeedEntryBuilder {
    title: Option<String>,
    link: Option<String>,
    enclosure: Option<String>,
    magnet_uri: Option<String>,
}

impl FeedEntryBuilder {
    fn set(&mut self, element: &str, text: String) {
        if text.is_empty() {
            return;
        }
        match element {
            "title" => self.title = Some(text),
            "link" => self.link = Some(text),
            "torrent:magnetURI" | "magnetURI" => self.magnet_uri = Some(text),
            _ => {}
        }
    }

    fn build(self) -> Option<FeedEntry> {
        let entry = FeedEntry {
            title: self.title?,
            link: self.link.or(self.enclosure),
            magnet_uri: self.magnet_uri,
        };
        entry.link_or_magnet()?;
        Some(entry)
    }
}
