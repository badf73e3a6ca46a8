//! Fee models for fill commission calculation.
//!
//! The engine delegates fee computation to an injected `FeeModel`; when
//! none is supplied every fill carries a zero fee.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orders::Order;

/// Trait for calculating trading fees on a fill.
pub trait FeeModel: Send + Sync + fmt::Debug {
    /// Calculate the fee for filling `fill_quantity` of `order` at
    /// `fill_price`. Quantity is signed; implementations charge on the
    /// absolute notional.
    fn calculate_fee(&self, order: &Order, fill_quantity: Decimal, fill_price: Decimal) -> Decimal;
}

/// Fee model that charges nothing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZeroFeeModel;

impl FeeModel for ZeroFeeModel {
    fn calculate_fee(&self, _order: &Order, _fill_quantity: Decimal, _fill_price: Decimal) -> Decimal {
        Decimal::ZERO
    }
}

/// Percentage-of-notional fee model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentageFeeModel {
    /// Fee rate (e.g. 0.001 for 0.1%)
    pub rate: Decimal,
}

impl PercentageFeeModel {
    /// Create a new percentage fee model
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    /// Flat rate helper, mirroring common venue defaults
    pub fn flat(rate: Decimal) -> Self {
        Self::new(rate)
    }
}

impl FeeModel for PercentageFeeModel {
    fn calculate_fee(&self, _order: &Order, fill_quantity: Decimal, fill_price: Decimal) -> Decimal {
        let notional = (fill_quantity * fill_price).abs();
        notional * self.rate
    }
}
