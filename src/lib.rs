// fill-engine: Deterministic order-fill simulation for backtesting
// Decides whether an order executes at the current simulation instant,
// and at what price and quantity, against a read-only market snapshot.

pub mod data;
pub mod error;
pub mod fees;
pub mod fill;
pub mod logging;
pub mod orders;
pub mod sessions;

pub use error::FillError;
pub use fill::{FillConfig, FillEngine, FillEvent, FillStatus, GroupContext, GroupLeg, Prices};
pub use orders::{Direction, GroupId, GroupOrderManager, GroupRegistry, Order, OrderId, OrderKind};
