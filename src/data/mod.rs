//! Market data views: ticks, bars, quote bars, the per-security
//! snapshot and subscription configuration.

mod snapshot;
mod subscriptions;
mod types;

pub use snapshot::SecuritySnapshot;
pub use subscriptions::SubscriptionInfo;
pub use types::{Bar, QuoteBar, Tick, TradeBar};

pub(crate) use types::duration_serde;
