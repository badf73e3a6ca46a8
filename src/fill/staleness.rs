//! Stale-price annotation for otherwise-successful fills.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::event::{FillEvent, FillStatus};

/// Attach a stale-price warning to a filled event when the resolved
/// data is older than the threshold. Never blocks the fill and never
/// touches unfilled results.
pub fn annotate_stale_fill(
    event: &mut FillEvent,
    resolved_end: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) {
    if event.status != FillStatus::Filled {
        return;
    }

    if now - resolved_end > threshold {
        let message = format!(
            "Warning: fill at stale price ({} UTC)",
            resolved_end.format("%Y-%m-%d %H:%M:%S")
        );
        warn!(
            order_id = %event.order_id,
            symbol = %event.symbol,
            "{message}"
        );
        event.message = Some(message);
    }
}
