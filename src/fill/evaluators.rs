//! Per-order-type fill rules.
//!
//! Each rule is a pure function from the resolved price view (and, for
//! the session-anchored types, the trade bar plus schedule) to an
//! optional fill price. Prices are worst-case for the order's holder:
//! limit fills clamp to the bar range on the unfavorable side, stop
//! fills never improve on the stop.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::data::TradeBar;
use crate::orders::Direction;
use crate::sessions::SessionSchedule;

use super::prices::Prices;

/// Market order: fills at the current resolved price.
pub(crate) fn market_fill(prices: &Prices) -> Decimal {
    prices.current
}

/// Limit order: Buy fills when the low reaches the limit, at
/// min(limit, high); Sell when the high reaches it, at max(limit, low).
pub(crate) fn limit_fill(direction: Direction, limit_price: Decimal, prices: &Prices) -> Option<Decimal> {
    match direction {
        Direction::Buy => (prices.low <= limit_price).then(|| limit_price.min(prices.high)),
        Direction::Sell => (prices.high >= limit_price).then(|| limit_price.max(prices.low)),
        Direction::Hold => None,
    }
}

/// Stop-market order: triggers off the current resolved price and never
/// fills better than the stop.
pub(crate) fn stop_market_fill(
    direction: Direction,
    stop_price: Decimal,
    prices: &Prices,
) -> Option<Decimal> {
    match direction {
        Direction::Buy => (prices.current >= stop_price).then(|| prices.current.max(stop_price)),
        Direction::Sell => (prices.current <= stop_price).then(|| prices.current.min(stop_price)),
        Direction::Hold => None,
    }
}

/// Stop-limit order: the stop condition is re-derived from the current
/// resolved price on every call (no persisted armed flag); once it
/// holds, the plain limit rule applies.
pub(crate) fn stop_limit_fill(
    direction: Direction,
    stop_price: Decimal,
    limit_price: Decimal,
    prices: &Prices,
) -> Option<Decimal> {
    let triggered = match direction {
        Direction::Buy => prices.current >= stop_price,
        Direction::Sell => prices.current <= stop_price,
        Direction::Hold => false,
    };
    if !triggered {
        return None;
    }
    limit_fill(direction, limit_price, prices)
}

/// Limit-if-touched order: the touch is detected against the trade-bar
/// range and latched on the order; the limit check runs on a later
/// evaluation, and the fill is at the exact limit price (not worst-of).
pub(crate) fn limit_if_touched_fill(
    direction: Direction,
    trigger_price: Decimal,
    limit_price: Decimal,
    trigger_touched: &mut bool,
    trade: &Prices,
    limit_view: &Prices,
) -> Option<Decimal> {
    if !*trigger_touched {
        let touched = match direction {
            Direction::Buy => trade.low <= trigger_price,
            Direction::Sell => trade.high >= trigger_price,
            Direction::Hold => false,
        };
        if touched {
            *trigger_touched = true;
        }
        // The fill requires an evaluation after the touch
        return None;
    }

    match direction {
        Direction::Buy => (limit_view.low <= limit_price).then_some(limit_price),
        Direction::Sell => (limit_view.high >= limit_price).then_some(limit_price),
        Direction::Hold => None,
    }
}

/// Market-on-open order: fills at the open of the first regular-session
/// bar at/after the official open, for orders submitted before that open.
pub(crate) fn market_on_open_fill(
    submitted_at: DateTime<Utc>,
    bar: &TradeBar,
    schedule: &SessionSchedule,
) -> Option<Decimal> {
    let date = schedule.local_date(bar.ts_event);
    let open = schedule.session_open_utc(date)?;

    let eligible = submitted_at < open && bar.ts_event >= open && schedule.is_open(bar.ts_event);
    eligible.then_some(bar.open)
}

/// Market-on-close order: fills at the close of the bar ending at/after
/// the official close, for orders submitted before that close.
pub(crate) fn market_on_close_fill(
    submitted_at: DateTime<Utc>,
    bar: &TradeBar,
    schedule: &SessionSchedule,
) -> Option<Decimal> {
    let date = schedule.local_date(bar.ts_event);
    let close = schedule.session_close_utc(date)?;

    let eligible = submitted_at < close && bar.end_time() >= close;
    eligible.then_some(bar.close)
}
