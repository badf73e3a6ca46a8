//! Fill simulation: price resolution, per-order-type evaluation rules,
//! combo synchronization, and the engine entry point.
//!
//! The flow for one evaluation: session gate, price resolution for the
//! order's direction, the order type's trigger/worst-case rule, then
//! event assembly (fee, staleness warning). Combo legs detour through
//! the group synchronizer, which releases all legs atomically or none.

mod combo;
mod config;
mod engine;
mod evaluators;
mod event;
mod prices;
mod staleness;

pub use combo::GroupLeg;
pub use config::FillConfig;
pub use engine::{FillEngine, GroupContext};
pub use event::{FillEvent, FillStatus};
pub use prices::{resolve_prices, PriceSources, Prices};
pub use staleness::annotate_stale_fill;
