//! Price resolution: pick the price view a fill evaluation runs against.
//!
//! Selection order follows the freshest data the subscription can see:
//! a tick newer than every bar (tick subscriptions only), then the
//! quote bar, then the trade bar, then the last scalar price. Limit
//! rules run against bar data only, so they resolve with
//! `PriceSources::BarsOnly`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::data::{Bar, SecuritySnapshot, SubscriptionInfo};
use crate::orders::Direction;

/// Which data sources a resolution may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSources {
    /// Ticks, quote bars, trade bars, scalar price
    All,
    /// Bars and the scalar price only (limit-family rules)
    BarsOnly,
}

/// Resolved price view for one evaluation. Built fresh per call,
/// never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prices {
    /// Price to trade at right now, for the requested direction
    pub current: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Start timestamp of the source data point
    pub ts_event: DateTime<Utc>,
    /// End timestamp of the source data point (staleness reference)
    pub end_time: DateTime<Utc>,
}

impl Prices {
    /// Degenerate view where every field is the same price
    pub fn flat(price: Decimal, ts_event: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            current: price,
            open: price,
            high: price,
            low: price,
            close: price,
            ts_event,
            end_time,
        }
    }

    /// View over one side of a bar
    pub fn from_bar(bar: &Bar, ts_event: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            current: bar.close,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            ts_event,
            end_time,
        }
    }
}

/// Resolve the price view for `direction` from the snapshot, honoring
/// the symbol's subscriptions. Pure: reads the snapshot, writes nothing.
///
/// Returns `None` when the snapshot holds nothing resolvable yet.
pub fn resolve_prices(
    snapshot: &SecuritySnapshot,
    subscription: &SubscriptionInfo,
    direction: Direction,
    sources: PriceSources,
) -> Option<Prices> {
    // Freshest bar end time, used to decide whether a tick supersedes bars
    let newest_bar_end = [
        snapshot.quote_bar.as_ref().map(|q| q.end_time()),
        snapshot.trade_bar.as_ref().map(|t| t.end_time()),
    ]
    .into_iter()
    .flatten()
    .max();

    if sources == PriceSources::All && subscription.tick_data {
        if let Some(tick) = &snapshot.tick {
            let newer = newest_bar_end.map_or(true, |end| tick.ts_event > end);
            if newer {
                let side = match direction {
                    Direction::Buy => tick.ask,
                    Direction::Sell => tick.bid,
                    Direction::Hold => None,
                };
                // A tick without the needed quote side falls back to its
                // trade price for any direction
                let price = side
                    .filter(|p| !p.is_zero())
                    .or_else(|| (!tick.price.is_zero()).then_some(tick.price));
                if let Some(price) = price {
                    return Some(Prices::flat(price, tick.ts_event, tick.end_time()));
                }
            }
        }
    }

    if let Some(quote) = &snapshot.quote_bar {
        // Neutral evaluation reflects the last trade when one exists
        let prefer_trade = direction == Direction::Hold && snapshot.trade_bar.is_some();
        if !prefer_trade {
            let side = match direction {
                Direction::Buy => quote.ask,
                Direction::Sell => quote.bid,
                Direction::Hold => quote.midpoint(),
            };
            return Some(Prices::from_bar(&side, quote.ts_event, quote.end_time()));
        }
    }

    if let Some(trade) = &snapshot.trade_bar {
        let bar = Bar::new(trade.open, trade.high, trade.low, trade.close);
        return Some(Prices::from_bar(&bar, trade.ts_event, trade.end_time()));
    }

    if !snapshot.last_price.is_zero() {
        let at = snapshot.last_update.unwrap_or(snapshot.time);
        return Some(Prices::flat(snapshot.last_price, at, at));
    }

    None
}
