//! Subscription configuration for a symbol.
//!
//! Tells the resolver which data kinds/resolutions the surrounding
//! platform actually subscribed for the symbol, and whether
//! extended-hours data is enabled. Supplied by the caller; the engine
//! never changes it.

use serde::{Deserialize, Serialize};

/// Active data subscriptions for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Tick-resolution data is subscribed
    #[serde(default)]
    pub tick_data: bool,
    /// Trade (bar or tick) feed is subscribed
    #[serde(default = "default_true")]
    pub trade_data: bool,
    /// Quote (bid/ask) feed is subscribed
    #[serde(default)]
    pub quote_data: bool,
    /// Extended-hours (pre/post market) trading is enabled
    #[serde(default)]
    pub extended_hours: bool,
}

fn default_true() -> bool {
    true
}

impl SubscriptionInfo {
    /// Bar-resolution trade subscription only
    pub fn bars() -> Self {
        Self {
            tick_data: false,
            trade_data: true,
            quote_data: false,
            extended_hours: false,
        }
    }

    /// Tick-resolution subscription (trade + quote ticks)
    pub fn ticks() -> Self {
        Self {
            tick_data: true,
            trade_data: true,
            quote_data: true,
            extended_hours: false,
        }
    }

    /// Enable the quote feed
    pub fn with_quotes(mut self) -> Self {
        self.quote_data = true;
        self
    }

    /// Enable extended-hours trading
    pub fn with_extended_hours(mut self) -> Self {
        self.extended_hours = true;
        self
    }
}

impl Default for SubscriptionInfo {
    fn default() -> Self {
        Self::bars()
    }
}
