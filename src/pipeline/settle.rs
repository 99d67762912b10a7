// src/pipeline/settle.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::watch::FileEvent;

/// Emitted by the event handler whenever a processed event changed at least
/// one artifact; consumed by the settle coordinator.
#[derive(Debug, Clone)]
pub struct GenerationEvent {
    pub source: FileEvent,
    pub code_changed: bool,
    pub text_changed: bool,
}

/// Called once per settle with the OR of the change flags accumulated since
/// the previous settle.
pub type SettleHook = Arc<dyn Fn(bool, bool) + Send + Sync>;

/// Quiet period after the last regeneration result before a burst is
/// considered settled.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Effectively "never": the timer is parked here while nothing is pending.
const PARKED: Duration = Duration::from_secs(60 * 60 * 24);

/// Debounce coordinator: a single task selecting between "new result" and
/// "timeout". Each incoming result resets the timer to the quiet period and
/// ORs its change flags into the accumulator; when the timer fires with
/// changes accumulated, `on_settle` runs and the accumulator clears.
///
/// If the results channel closes with changes still accumulated, the pending
/// settle is drained before returning. Returns the number of generation
/// events observed.
pub async fn settle_loop(
    mut results: mpsc::Receiver<GenerationEvent>,
    quiet_period: Duration,
    on_settle: SettleHook,
) -> u64 {
    let mut code_changed = false;
    let mut text_changed = false;
    let mut updates: u64 = 0;

    loop {
        let wait = if code_changed || text_changed {
            quiet_period
        } else {
            PARKED
        };

        tokio::select! {
            event = results.recv() => match event {
                Some(event) => {
                    debug!(?event, "settle coordinator received result");
                    code_changed |= event.code_changed;
                    text_changed |= event.text_changed;
                    updates += 1;
                }
                None => break,
            },
            _ = tokio::time::sleep(wait) => {
                if code_changed || text_changed {
                    debug!(code_changed, text_changed, "generation settled");
                    on_settle(code_changed, text_changed);
                    code_changed = false;
                    text_changed = false;
                }
            }
        }
    }

    if code_changed || text_changed {
        debug!("results channel closed, draining pending settle");
        on_settle(code_changed, text_changed);
    }

    updates
}
