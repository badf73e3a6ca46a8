//! Read-only security snapshot used for a single fill evaluation.
//!
//! The surrounding data cache owns the "last known point of each kind";
//! this view hands the engine exactly what it needs for one evaluation:
//! the simulation instant, the freshest tick/quote-bar/trade-bar, the
//! last scalar price, and the symbol's session schedule. The engine
//! never mutates it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{QuoteBar, Tick, TradeBar};
use crate::sessions::SessionSchedule;

/// Point-in-time view of one security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    /// Current simulation instant (the caller's clock, never wall time)
    pub time: DateTime<Utc>,
    /// Symbol
    pub symbol: String,
    /// Last known scalar price; zero when the symbol has never priced
    pub last_price: Decimal,
    /// When the scalar price was last updated
    pub last_update: Option<DateTime<Utc>>,
    /// Most recent tick, if any
    pub tick: Option<Tick>,
    /// Most recent quote bar, if any
    pub quote_bar: Option<QuoteBar>,
    /// Most recent trade bar, if any
    pub trade_bar: Option<TradeBar>,
    /// Trading calendar for the symbol's exchange
    pub session: SessionSchedule,
}

impl SecuritySnapshot {
    /// Create an empty snapshot at the given instant
    pub fn new(symbol: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            time,
            symbol: symbol.into(),
            last_price: Decimal::ZERO,
            last_update: None,
            tick: None,
            quote_bar: None,
            trade_bar: None,
            session: SessionSchedule::always_open(),
        }
    }

    /// Attach a session schedule
    pub fn with_session(mut self, session: SessionSchedule) -> Self {
        self.session = session;
        self
    }

    /// Attach the most recent trade bar and refresh the scalar price
    pub fn with_trade_bar(mut self, bar: TradeBar) -> Self {
        self.last_price = bar.close;
        self.last_update = Some(bar.end_time());
        self.trade_bar = Some(bar);
        self
    }

    /// Attach the most recent quote bar
    pub fn with_quote_bar(mut self, bar: QuoteBar) -> Self {
        self.quote_bar = Some(bar);
        self
    }

    /// Attach the most recent tick and refresh the scalar price
    pub fn with_tick(mut self, tick: Tick) -> Self {
        if !tick.price.is_zero() {
            self.last_price = tick.price;
            self.last_update = Some(tick.ts_event);
        }
        self.tick = Some(tick);
        self
    }

    /// Set the scalar price directly (no tick/bar data)
    pub fn with_last_price(mut self, price: Decimal, at: DateTime<Utc>) -> Self {
        self.last_price = price;
        self.last_update = Some(at);
        self
    }

    /// True when the snapshot holds any price information at all
    pub fn has_data(&self) -> bool {
        self.tick.is_some()
            || self.quote_bar.is_some()
            || self.trade_bar.is_some()
            || !self.last_price.is_zero()
    }
}
