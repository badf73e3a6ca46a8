//! Order model for the fill simulator.
//!
//! Orders are a closed set of variants with one evaluation rule per
//! variant, selected by matching on `OrderKind` - not an open hierarchy.
//! Quantity is signed: positive buys, negative sells, never zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::group::GroupId;
use super::types::{Direction, OrderId};

/// A single order submitted to the fill simulator.
///
/// The engine mutates an order only in one place: the limit-if-touched
/// `trigger_touched` latch, which must survive between evaluation calls
/// and therefore lives on the caller-owned order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Caller-assigned order ID
    pub id: OrderId,
    /// Symbol being traded
    pub symbol: String,
    /// Signed quantity; the sign is the order direction
    pub quantity: Decimal,
    /// Submission instant on the simulation clock
    pub submitted_at: DateTime<Utc>,
    /// Order type and its type-specific parameters
    pub kind: OrderKind,
}

/// Order type with variant-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Execute at the current resolved price
    Market,
    /// Execute at the limit price or better
    Limit { limit_price: Decimal },
    /// Becomes marketable once the stop price is crossed
    StopMarket { stop_price: Decimal },
    /// Becomes a limit order once the stop price is crossed
    StopLimit {
        stop_price: Decimal,
        limit_price: Decimal,
    },
    /// Becomes a limit order once the trigger price is touched.
    /// The touch is latched on the order and the limit check runs on a
    /// later evaluation than the touch.
    LimitIfTouched {
        trigger_price: Decimal,
        limit_price: Decimal,
        #[serde(default)]
        trigger_touched: bool,
    },
    /// Execute at the official session open price
    MarketOnOpen,
    /// Execute at the official session close price
    MarketOnClose,
    /// Combo leg: marketable, synchronized with its group
    ComboMarket { group: GroupId },
    /// Combo leg: limit condition from the group's shared limit price
    ComboLimit { group: GroupId },
    /// Combo leg: limit condition from the leg's own limit price
    ComboLegLimit {
        group: GroupId,
        limit_price: Decimal,
    },
}

impl OrderKind {
    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            OrderKind::Market => "MARKET",
            OrderKind::Limit { .. } => "LIMIT",
            OrderKind::StopMarket { .. } => "STOP_MARKET",
            OrderKind::StopLimit { .. } => "STOP_LIMIT",
            OrderKind::LimitIfTouched { .. } => "LIMIT_IF_TOUCHED",
            OrderKind::MarketOnOpen => "MARKET_ON_OPEN",
            OrderKind::MarketOnClose => "MARKET_ON_CLOSE",
            OrderKind::ComboMarket { .. } => "COMBO_MARKET",
            OrderKind::ComboLimit { .. } => "COMBO_LIMIT",
            OrderKind::ComboLegLimit { .. } => "COMBO_LEG_LIMIT",
        }
    }

    /// Returns true for the combo (multi-leg) variants
    pub fn is_combo(&self) -> bool {
        matches!(
            self,
            OrderKind::ComboMarket { .. }
                | OrderKind::ComboLimit { .. }
                | OrderKind::ComboLegLimit { .. }
        )
    }

    /// The combo group this order belongs to, if any
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            OrderKind::ComboMarket { group }
            | OrderKind::ComboLimit { group }
            | OrderKind::ComboLegLimit { group, .. } => Some(group),
            _ => None,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Order {
    fn new(symbol: impl Into<String>, quantity: Decimal, submitted_at: DateTime<Utc>, kind: OrderKind) -> Self {
        Self {
            id: OrderId::generate(),
            symbol: symbol.into(),
            quantity,
            submitted_at,
            kind,
        }
    }

    /// Create a market order
    pub fn market(symbol: impl Into<String>, quantity: Decimal, submitted_at: DateTime<Utc>) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::Market)
    }

    /// Create a limit order
    pub fn limit(
        symbol: impl Into<String>,
        quantity: Decimal,
        limit_price: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::Limit { limit_price })
    }

    /// Create a stop-market order
    pub fn stop_market(
        symbol: impl Into<String>,
        quantity: Decimal,
        stop_price: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::StopMarket { stop_price })
    }

    /// Create a stop-limit order
    pub fn stop_limit(
        symbol: impl Into<String>,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            symbol,
            quantity,
            submitted_at,
            OrderKind::StopLimit {
                stop_price,
                limit_price,
            },
        )
    }

    /// Create a limit-if-touched order
    pub fn limit_if_touched(
        symbol: impl Into<String>,
        quantity: Decimal,
        trigger_price: Decimal,
        limit_price: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            symbol,
            quantity,
            submitted_at,
            OrderKind::LimitIfTouched {
                trigger_price,
                limit_price,
                trigger_touched: false,
            },
        )
    }

    /// Create a market-on-open order
    pub fn market_on_open(symbol: impl Into<String>, quantity: Decimal, submitted_at: DateTime<Utc>) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::MarketOnOpen)
    }

    /// Create a market-on-close order
    pub fn market_on_close(symbol: impl Into<String>, quantity: Decimal, submitted_at: DateTime<Utc>) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::MarketOnClose)
    }

    /// Create a combo market leg
    pub fn combo_market(
        symbol: impl Into<String>,
        quantity: Decimal,
        group: GroupId,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::ComboMarket { group })
    }

    /// Create a combo limit leg (limit price lives on the group record)
    pub fn combo_limit(
        symbol: impl Into<String>,
        quantity: Decimal,
        group: GroupId,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(symbol, quantity, submitted_at, OrderKind::ComboLimit { group })
    }

    /// Create a combo leg-limit leg carrying its own limit price
    pub fn combo_leg_limit(
        symbol: impl Into<String>,
        quantity: Decimal,
        limit_price: Decimal,
        group: GroupId,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            symbol,
            quantity,
            submitted_at,
            OrderKind::ComboLegLimit { group, limit_price },
        )
    }

    /// Direction derived from the quantity sign
    pub fn direction(&self) -> Direction {
        Direction::from_quantity(self.quantity)
    }

    /// Override the generated order id (builder style)
    pub fn with_id(mut self, id: impl Into<OrderId>) -> Self {
        self.id = id.into();
        self
    }
}
