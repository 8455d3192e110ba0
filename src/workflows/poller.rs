use chrono::Utc;

use crate::domain::models::{AcceptedEpisode, ShowConfig};
use crate::domain::title;
use crate::error::PollError;
use crate::infra::feed::FeedGateway;
use crate::infra::ledger::Ledger;

pub struct SeriesPoller<'a> {
    gateway: &'a dyn FeedGateway,
    ledger: &'a mut Ledger,
}

impl<'a> SeriesPoller<'a> {
    pub fn new(gateway: &'a dyn FeedGateway, ledger: &'a mut Ledger) -> Self {
        Self { gateway, ledger }
    }

    /// Check the newest feed entry of a show. Returns the episode only if it
    /// is new, matches the show's quality and was recorded in the ledger.
    pub fn poll(&mut self, show: &ShowConfig) -> Result<Option<AcceptedEpisode>, PollError> {
        let entries = self.gateway.fetch_entries(&show.name)?;

        let Some(newest) = entries.into_iter().next() else {
            tracing::info!("Feed for '{}' has no entries", show.name);
            return Ok(None);
        };

        if self.ledger.has_seen(&show.name, &newest.title)? {
            tracing::debug!("Already handled '{}'", newest.title);
            return Ok(None);
        }

        let identity = title::parse(&newest.title);
        if !identity.is_classified() {
            tracing::debug!("No season/episode marker in '{}'", identity.raw_title);
        }
        if identity.is_hd != show.hd {
            tracing::debug!(
                "Skipping '{}': hd={} but show wants hd={}",
                identity.raw_title,
                identity.is_hd,
                show.hd
            );
            return Ok(None);
        }

        let Some(link) = newest.link_or_magnet() else {
            tracing::debug!("Skipping '{}': entry has no link", identity.raw_title);
            return Ok(None);
        };
        let link = link.to_string();

        match self.ledger.claim(&show.name, &identity, Utc::now())? {
            Some(record_id) => {
                tracing::info!(
                    "Recorded '{}' (S{}E{}) as #{}",
                    identity.raw_title,
                    identity.season,
                    identity.episode_number,
                    record_id
                );
                Ok(Some(AcceptedEpisode { identity, link }))
            }
            // Recorded by an overlapping run since the lookup above.
            None => Ok(None),
        }
    }
}
