//! Error types for the fill engine.
//!
//! Unmet fill conditions are not errors: an order that cannot fill yet
//! (no data, session closed, limit untouched) comes back as an unfilled
//! `FillEvent` and the caller re-invokes on the next data step. Only
//! configuration defects - a data view or group record the evaluation
//! structurally requires but the caller never supplied - surface as
//! `FillError`.

use thiserror::Error;

/// Configuration-level defects raised by a fill evaluation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FillError {
    /// Order violates a structural invariant (e.g. zero quantity)
    #[error("Invalid order {order_id}: {reason}")]
    InvalidOrder { order_id: String, reason: String },

    /// The order type requires a data view the snapshot never received
    #[error("{order_type} order {order_id} requires {required} data but the snapshot has none")]
    MissingDataView {
        order_id: String,
        order_type: &'static str,
        required: &'static str,
    },

    /// A combo leg referenced a group id that is not in the registry
    #[error("Unknown combo group: {0}")]
    UnknownGroup(String),

    /// A combo leg was evaluated without any group context
    #[error("Order {0} belongs to a combo group but no group context was supplied")]
    MissingGroupContext(String),

    /// A group member has no entry in the supplied leg map
    #[error("Combo group {group_id} member {order_id} has no snapshot in the leg map")]
    MissingGroupLeg { group_id: String, order_id: String },

    /// Group record is structurally unusable (missing limit price, foreign leg kind)
    #[error("Combo group {group_id} is misconfigured: {reason}")]
    MisconfiguredGroup { group_id: String, reason: String },

    /// Engine configuration value is out of range
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl FillError {
    /// Create an InvalidOrder error
    pub fn invalid_order(order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        FillError::InvalidOrder {
            order_id: order_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingDataView error
    pub fn missing_data_view(
        order_id: impl Into<String>,
        order_type: &'static str,
        required: &'static str,
    ) -> Self {
        FillError::MissingDataView {
            order_id: order_id.into(),
            order_type,
            required,
        }
    }

    /// Create a MissingGroupLeg error
    pub fn missing_group_leg(group_id: impl Into<String>, order_id: impl Into<String>) -> Self {
        FillError::MissingGroupLeg {
            group_id: group_id.into(),
            order_id: order_id.into(),
        }
    }

    /// Create a MisconfiguredGroup error
    pub fn misconfigured_group(group_id: impl Into<String>, reason: impl Into<String>) -> Self {
        FillError::MisconfiguredGroup {
            group_id: group_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        FillError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = FillError::invalid_order("ORD-1", "quantity is zero");
        assert!(err.to_string().contains("Invalid order ORD-1"));

        let err = FillError::missing_data_view("ORD-2", "LIMIT_IF_TOUCHED", "trade bar");
        assert!(err.to_string().contains("requires trade bar data"));

        let err = FillError::misconfigured_group("GRP-1", "no limit price");
        assert!(err.to_string().contains("GRP-1 is misconfigured"));
    }

    #[test]
    fn test_unknown_group_display() {
        let err = FillError::UnknownGroup("GRP-9".to_string());
        assert_eq!(err.to_string(), "Unknown combo group: GRP-9");
    }
}
