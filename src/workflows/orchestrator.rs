use crate::domain::models::ShowConfig;
use crate::infra::activity_log::ActivityLog;
use crate::infra::feed::FeedGateway;
use crate::infra::ledger::Ledger;
use crate::infra::magnet_output::MagnetOutput;
use crate::workflows::poller::SeriesPoller;

pub struct RunOutputs {
    pub magnets: MagnetOutput,
    pub log: ActivityLog,
}

/// Poll every show in configured order and hand off accepted episodes.
/// Failures are reported per show and never stop the remaining shows.
pub fn run(
    shows: &[ShowConfig],
    ledger: &mut Ledger,
    gateway: &dyn FeedGateway,
    outputs: &mut RunOutputs,
) -> usize {
    let mut emitted = 0;

    for show in shows {
        if let Err(e) = ledger.ensure_table(&show.name) {
            eprintln!("Error preparing ledger for {}: {e}", show.name);
            continue;
        }

        let accepted = match SeriesPoller::new(gateway, ledger).poll(show) {
            Ok(Some(accepted)) => accepted,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Error polling {}: {e}", show.name);
                tracing::warn!(show = %show.name, error = %e, "poll failed");
                continue;
            }
        };

        println!("It seems you haven't downloaded that one : {}", accepted.link);

        if let Err(e) = outputs.magnets.push(&accepted.link) {
            eprintln!("Error: {e:#}");
            continue;
        }
        if let Err(e) = outputs.log.add_entry(&accepted.identity.raw_title) {
            eprintln!("Warning: Failed to write activity log: {e:#}");
        }
        emitted += 1;
    }

    emitted
}
