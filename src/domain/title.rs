use regex::Regex;
use std::sync::OnceLock;

use super::models::{EpisodeIdentity, UNKNOWN_NUMBER};

const HD_MARKER: &str = "720p";

fn season_episode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{1,2})x([0-9]{1,2})").expect("static regex is valid"))
}

/// Derive an episode identity from a feed entry title. Never fails.
pub fn parse(raw_title: &str) -> EpisodeIdentity {
    let is_hd = raw_title.to_lowercase().contains(HD_MARKER);
    let (season, episode_number) =
        parse_season_episode(raw_title).unwrap_or((UNKNOWN_NUMBER, UNKNOWN_NUMBER));

    EpisodeIdentity {
        raw_title: raw_title.to_string(),
        is_hd,
        season,
        episode_number,
    }
}

fn parse_season_episode(title: &str) -> Option<(u32, u32)> {
    let caps = season_episode_regex().captures(title)?;
    let season: u32 = caps.get(1)?.as_str().parse().ok()?;
    let episode: u32 = caps.get(2)?.as_str().parse().ok()?;
    Some((season, episode))
}
