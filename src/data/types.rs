//! Market data point types consumed by the price resolver.
//!
//! The external data cache retains only the most recent point of each
//! kind per symbol; the resolver reads these views and never writes
//! them back.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Custom serde module for `chrono::Duration`, stored as whole seconds.
pub(crate) mod duration_serde {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(secs))
    }
}

/// A single instantaneous trade or quote event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Event timestamp
    pub ts_event: DateTime<Utc>,
    /// Symbol
    pub symbol: String,
    /// Last trade price
    pub price: Decimal,
    /// Best bid, when the tick carries quote data
    pub bid: Option<Decimal>,
    /// Best ask, when the tick carries quote data
    pub ask: Option<Decimal>,
}

impl Tick {
    /// Create a trade tick (no quote sides)
    pub fn trade(ts_event: DateTime<Utc>, symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            ts_event,
            symbol: symbol.into(),
            price,
            bid: None,
            ask: None,
        }
    }

    /// Create a quote tick carrying bid/ask alongside the last trade price
    pub fn quote(
        ts_event: DateTime<Utc>,
        symbol: impl Into<String>,
        price: Decimal,
        bid: Decimal,
        ask: Decimal,
    ) -> Self {
        Self {
            ts_event,
            symbol: symbol.into(),
            price,
            bid: Some(bid),
            ask: Some(ask),
        }
    }

    /// True when both bid and ask are present
    pub fn has_quote(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }

    /// Ticks are instantaneous: end time equals event time
    pub fn end_time(&self) -> DateTime<Utc> {
        self.ts_event
    }
}

/// One side of a quote bar, or the body of a trade bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Bar {
    /// Create a bar from its OHLC values
    pub fn new(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

/// Aggregated executed trades over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBar {
    /// Bar start timestamp
    pub ts_event: DateTime<Utc>,
    /// Symbol
    pub symbol: String,
    /// Bar period length
    #[serde(with = "duration_serde")]
    pub period: Duration,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl TradeBar {
    /// Create a new trade bar
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ts_event: DateTime<Utc>,
        symbol: impl Into<String>,
        period: Duration,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            ts_event,
            symbol: symbol.into(),
            period,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// When the aggregation period completes
    pub fn end_time(&self) -> DateTime<Utc> {
        self.ts_event + self.period
    }
}

/// Aggregated bid-side and ask-side OHLC over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBar {
    /// Bar start timestamp
    pub ts_event: DateTime<Utc>,
    /// Symbol
    pub symbol: String,
    /// Bar period length
    #[serde(with = "duration_serde")]
    pub period: Duration,
    /// Bid-side OHLC
    pub bid: Bar,
    /// Ask-side OHLC
    pub ask: Bar,
}

impl QuoteBar {
    /// Create a new quote bar
    pub fn new(
        ts_event: DateTime<Utc>,
        symbol: impl Into<String>,
        period: Duration,
        bid: Bar,
        ask: Bar,
    ) -> Self {
        Self {
            ts_event,
            symbol: symbol.into(),
            period,
            bid,
            ask,
        }
    }

    /// When the aggregation period completes
    pub fn end_time(&self) -> DateTime<Utc> {
        self.ts_event + self.period
    }

    /// Midpoint bar between the bid and ask sides
    pub fn midpoint(&self) -> Bar {
        let two = Decimal::TWO;
        Bar::new(
            (self.bid.open + self.ask.open) / two,
            (self.bid.high + self.ask.high) / two,
            (self.bid.low + self.ask.low) / two,
            (self.bid.close + self.ask.close) / two,
        )
    }
}
