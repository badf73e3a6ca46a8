//! Core order identifiers and direction types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order direction, derived from the sign of the order quantity.
///
/// `Hold` is the neutral direction used when resolving prices without an
/// order context (last-trade view); orders themselves are never `Hold`
/// because quantity is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Buy - positive quantity
    Buy,
    /// Sell - negative quantity
    Sell,
    /// Neutral evaluation against the last trade price
    Hold,
}

impl Direction {
    /// Derive the direction from a signed quantity
    pub fn from_quantity(quantity: Decimal) -> Self {
        if quantity > Decimal::ZERO {
            Direction::Buy
        } else if quantity < Decimal::ZERO {
            Direction::Sell
        } else {
            Direction::Hold
        }
    }

    /// Returns the opposite direction (`Hold` stays `Hold`)
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
            Direction::Hold => Direction::Hold,
        }
    }

    /// Returns true if this is a buy
    pub fn is_buy(&self) -> bool {
        matches!(self, Direction::Buy)
    }

    /// Returns true if this is a sell
    pub fn is_sell(&self) -> bool {
        matches!(self, Direction::Sell)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Order ID - unique identifier assigned by the caller's order manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    /// Create a new OrderId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique OrderId using UUID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
