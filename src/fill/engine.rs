//! The fill engine: entry point for one fill evaluation.
//!
//! The engine holds no mutable state between calls - only the injected
//! fee model and its configuration. Everything an evaluation needs
//! (order, snapshot, subscriptions, combo group registry) arrives from
//! the caller, and "now" is always the snapshot's simulation instant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::data::{Bar, SecuritySnapshot, SubscriptionInfo};
use crate::error::FillError;
use crate::fees::FeeModel;
use crate::orders::{Direction, GroupRegistry, Order, OrderKind};
use crate::sessions::{MarketStatus, SessionState};

use super::combo::{self, GroupLeg};
use super::config::FillConfig;
use super::evaluators;
use super::event::FillEvent;
use super::prices::{resolve_prices, PriceSources, Prices};
use super::staleness::annotate_stale_fill;

/// Combo group context for evaluating a multi-leg order.
pub struct GroupContext<'a> {
    /// Caller-owned arena of combo group records
    pub registry: &'a mut GroupRegistry,
    /// Sibling legs of the order's group (the calling leg may be omitted)
    pub legs: &'a [GroupLeg<'a>],
}

/// Deterministic, side-effect-free fill simulator.
#[derive(Debug)]
pub struct FillEngine {
    config: FillConfig,
    fee_model: Option<Box<dyn FeeModel>>,
}

impl FillEngine {
    /// Create an engine with default configuration and no fee model
    pub fn new() -> Self {
        Self {
            config: FillConfig::default(),
            fee_model: None,
        }
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: FillConfig) -> Result<Self, FillError> {
        config.validate()?;
        Ok(Self {
            config,
            fee_model: None,
        })
    }

    /// Inject a fee model (absent model means zero fees)
    pub fn with_fee_model(mut self, fee_model: Box<dyn FeeModel>) -> Self {
        self.fee_model = Some(fee_model);
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    pub(crate) fn fee_for(&self, order: &Order, quantity: Decimal, price: Decimal) -> Decimal {
        self.fee_model
            .as_ref()
            .map(|m| m.calculate_fee(order, quantity, price))
            .unwrap_or(Decimal::ZERO)
    }

    /// Evaluate one order against the current snapshot.
    ///
    /// Non-combo orders always yield exactly one event (status `None`
    /// or `Filled`). Combo legs yield zero events while the group is
    /// pending, or one event per member - atomically - in the call that
    /// completes the group. Configuration defects (missing data views,
    /// unknown groups) are the only errors; unmet conditions are
    /// unfilled events.
    pub fn fill(
        &self,
        order: &mut Order,
        snapshot: &SecuritySnapshot,
        subscription: &SubscriptionInfo,
        groups: Option<GroupContext<'_>>,
    ) -> Result<Vec<FillEvent>, FillError> {
        if order.quantity.is_zero() {
            return Err(FillError::invalid_order(order.id.as_str(), "quantity is zero"));
        }

        let session_state = snapshot.session.state_at(snapshot.time);

        if order.kind.is_combo() {
            let ctx = groups
                .ok_or_else(|| FillError::MissingGroupContext(order.id.as_str().to_string()))?;
            if !session_eligible(&session_state, subscription) {
                trace!(order_id = %order.id, status = %session_state.status, "combo leg outside eligible session");
                return Ok(Vec::new());
            }
            return combo::evaluate(self, ctx.registry, order, snapshot, subscription, ctx.legs);
        }

        let mut event = FillEvent::unfilled(order, snapshot.time);

        // The session-anchored types carry their own open/close logic;
        // everything else is gated here
        let session_anchored = matches!(order.kind, OrderKind::MarketOnOpen | OrderKind::MarketOnClose);
        if !session_anchored && !session_eligible(&session_state, subscription) {
            trace!(order_id = %order.id, status = %session_state.status, "session not eligible for fills");
            return Ok(vec![event]);
        }

        let direction = order.direction();
        let submitted_at = order.submitted_at;

        let outcome: Option<(Decimal, DateTime<Utc>)> = match &mut order.kind {
            OrderKind::Market => {
                resolve_prices(snapshot, subscription, direction, PriceSources::All)
                    .map(|p| (evaluators::market_fill(&p), p.end_time))
            }
            OrderKind::Limit { limit_price } => {
                bar_prices_since(snapshot, subscription, direction, submitted_at).and_then(|p| {
                    evaluators::limit_fill(direction, *limit_price, &p).map(|px| (px, p.end_time))
                })
            }
            OrderKind::StopMarket { stop_price } => {
                resolve_prices(snapshot, subscription, direction, PriceSources::All).and_then(|p| {
                    evaluators::stop_market_fill(direction, *stop_price, &p)
                        .map(|px| (px, p.end_time))
                })
            }
            OrderKind::StopLimit {
                stop_price,
                limit_price,
            } => bar_prices_since(snapshot, subscription, direction, submitted_at).and_then(|p| {
                evaluators::stop_limit_fill(direction, *stop_price, *limit_price, &p)
                    .map(|px| (px, p.end_time))
            }),
            OrderKind::LimitIfTouched {
                trigger_price,
                limit_price,
                trigger_touched,
            } => match snapshot.trade_bar.as_ref() {
                None => {
                    // A feed that has produced data but never a trade bar
                    // is a setup defect; a feed with nothing yet is the
                    // ordinary "no price" outcome
                    if snapshot.has_data() {
                        return Err(FillError::missing_data_view(
                            order.id.as_str(),
                            "LIMIT_IF_TOUCHED",
                            "trade bar",
                        ));
                    }
                    None
                }
                Some(trade_bar) => {
                    let trade = Prices::from_bar(
                        &Bar::new(trade_bar.open, trade_bar.high, trade_bar.low, trade_bar.close),
                        trade_bar.ts_event,
                        trade_bar.end_time(),
                    );
                    if trade.ts_event < submitted_at {
                        None
                    } else {
                        // The limit check runs against the quote-side view
                        // when one is subscribed, else the trade bar
                        let limit_view = quote_side_view(snapshot, subscription, direction)
                            .filter(|v| v.ts_event >= submitted_at)
                            .unwrap_or(trade);
                        evaluators::limit_if_touched_fill(
                            direction,
                            *trigger_price,
                            *limit_price,
                            trigger_touched,
                            &trade,
                            &limit_view,
                        )
                        .map(|px| (px, limit_view.end_time))
                    }
                }
            },
            OrderKind::MarketOnOpen => snapshot.trade_bar.as_ref().and_then(|bar| {
                evaluators::market_on_open_fill(submitted_at, bar, &snapshot.session)
                    .map(|px| (px, bar.end_time()))
            }),
            OrderKind::MarketOnClose => snapshot.trade_bar.as_ref().and_then(|bar| {
                evaluators::market_on_close_fill(submitted_at, bar, &snapshot.session)
                    .map(|px| (px, bar.end_time()))
            }),
            OrderKind::ComboMarket { .. }
            | OrderKind::ComboLimit { .. }
            | OrderKind::ComboLegLimit { .. } => unreachable!("combo kinds dispatch above"),
        };

        if let Some((price, data_end)) = outcome {
            let quantity = order.quantity;
            let fee = self.fee_for(order, quantity, price);
            event = FillEvent::filled(order, quantity, price, fee, snapshot.time);
            annotate_stale_fill(&mut event, data_end, snapshot.time, self.config.stale_price_threshold);
            debug!(
                order_id = %event.order_id,
                symbol = %event.symbol,
                price = %event.fill_price,
                quantity = %event.fill_quantity,
                "order filled"
            );
        }

        Ok(vec![event])
    }
}

impl Default for FillEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Regular sessions always fill; extended hours only with the
/// subscription's consent; closed or holiday sessions never.
fn session_eligible(state: &SessionState, subscription: &SubscriptionInfo) -> bool {
    match state.status {
        MarketStatus::Open => true,
        MarketStatus::PreMarket | MarketStatus::AfterHours => subscription.extended_hours,
        MarketStatus::Closed => false,
    }
}

/// Bar/quote resolution for the limit-family rules, discarding data
/// from before the order's submission.
fn bar_prices_since(
    snapshot: &SecuritySnapshot,
    subscription: &SubscriptionInfo,
    direction: Direction,
    submitted_at: DateTime<Utc>,
) -> Option<Prices> {
    resolve_prices(snapshot, subscription, direction, PriceSources::BarsOnly)
        .filter(|p| p.ts_event >= submitted_at)
}

/// Quote-bar side view for the limit-if-touched limit check.
fn quote_side_view(
    snapshot: &SecuritySnapshot,
    subscription: &SubscriptionInfo,
    direction: Direction,
) -> Option<Prices> {
    if !subscription.quote_data {
        return None;
    }
    let quote = snapshot.quote_bar.as_ref()?;
    let side = match direction {
        Direction::Buy => quote.ask,
        Direction::Sell => quote.bid,
        Direction::Hold => quote.midpoint(),
    };
    Some(Prices::from_bar(&side, quote.ts_event, quote.end_time()))
}
