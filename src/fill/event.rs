//! Fill event: the result record of one fill evaluation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orders::{Order, OrderId};

/// Fill status of an evaluation result.
///
/// There are no partial fills: an order either fills completely or not
/// at all in a given evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillStatus {
    /// Condition not met yet - the caller re-invokes on the next data step
    #[default]
    None,
    /// Order filled completely
    Filled,
}

impl fmt::Display for FillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStatus::None => write!(f, "NONE"),
            FillStatus::Filled => write!(f, "FILLED"),
        }
    }
}

/// Result of one fill evaluation. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// The evaluated order
    pub order_id: OrderId,
    /// Symbol of the evaluated order
    pub symbol: String,
    /// Signed filled quantity; zero when unfilled, otherwise the full
    /// order quantity (times the group ratio for combo legs)
    pub fill_quantity: Decimal,
    /// Fill price; zero when unfilled
    pub fill_price: Decimal,
    /// Fill status
    pub status: FillStatus,
    /// Diagnostic message (carries the stale-price warning, if any)
    pub message: Option<String>,
    /// Fee charged by the injected fee model; zero without one
    pub fee: Decimal,
    /// Simulation instant of the evaluation
    pub time: DateTime<Utc>,
}

impl FillEvent {
    /// Create an unfilled result for an order
    pub fn unfilled(order: &Order, time: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id.clone(),
            symbol: order.symbol.clone(),
            fill_quantity: Decimal::ZERO,
            fill_price: Decimal::ZERO,
            status: FillStatus::None,
            message: None,
            fee: Decimal::ZERO,
            time,
        }
    }

    /// Create a filled result for an order
    pub fn filled(
        order: &Order,
        fill_quantity: Decimal,
        fill_price: Decimal,
        fee: Decimal,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order.id.clone(),
            symbol: order.symbol.clone(),
            fill_quantity,
            fill_price,
            status: FillStatus::Filled,
            message: None,
            fee,
            time,
        }
    }

    /// True when the evaluation produced a fill
    pub fn is_filled(&self) -> bool {
        self.status == FillStatus::Filled
    }
}
