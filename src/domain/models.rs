use serde::{Deserialize, Serialize};

/// Season/episode value used when a title carries no `NxN` marker.
pub const UNKNOWN_NUMBER: u32 = 1337;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeIdentity {
    pub raw_title: String,
    pub is_hd: bool,
    pub season: u32,
    pub episode_number: u32,
}

impl EpisodeIdentity {
    pub fn is_classified(&self) -> bool {
        self.season != UNKNOWN_NUMBER && self.episode_number != UNKNOWN_NUMBER
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ShowConfig {
    pub name: String,
    #[serde(default)]
    pub hd: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub magnet_uri: Option<String>,
}

impl FeedEntry {
    pub fn link_or_magnet(&self) -> Option<&str> {
        self.magnet_uri.as_deref().or(self.link.as_deref())
    }
}

/// An episode that passed the quality filter and is durably recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedEpisode {
    pub identity: EpisodeIdentity,
    pub link: String,
}
