//! Combo (multi-leg) order synchronization.
//!
//! A combo group fills atomically: every leg's own condition must hold
//! in the same evaluation pass before any leg fills, and then exactly
//! one event per leg is released, in registration order, scaled by the
//! group ratio. Pending groups return an empty event set - not an
//! unfilled event - and a released group never re-emits.

use rust_decimal::Decimal;
use tracing::debug;

use crate::data::{SecuritySnapshot, SubscriptionInfo};
use crate::error::FillError;
use crate::orders::{Direction, GroupRegistry, Order, OrderKind};

use super::engine::FillEngine;
use super::event::FillEvent;
use super::prices::{resolve_prices, PriceSources, Prices};
use super::staleness::annotate_stale_fill;

/// One sibling leg of a combo group: the order plus its own market view.
#[derive(Debug, Clone, Copy)]
pub struct GroupLeg<'a> {
    pub order: &'a Order,
    pub snapshot: &'a SecuritySnapshot,
    pub subscription: &'a SubscriptionInfo,
}

impl<'a> GroupLeg<'a> {
    /// Pair an order with its market view
    pub fn new(order: &'a Order, snapshot: &'a SecuritySnapshot, subscription: &'a SubscriptionInfo) -> Self {
        Self {
            order,
            snapshot,
            subscription,
        }
    }
}

/// Evaluate one leg of a combo group.
///
/// `legs` must cover every sibling member of the group; the calling
/// leg's own view comes from the call arguments and may be omitted.
/// Returns empty while any member is not yet ready.
pub(crate) fn evaluate(
    engine: &FillEngine,
    registry: &mut GroupRegistry,
    order: &Order,
    snapshot: &SecuritySnapshot,
    subscription: &SubscriptionInfo,
    legs: &[GroupLeg<'_>],
) -> Result<Vec<FillEvent>, FillError> {
    let group_id = order
        .kind
        .group_id()
        .ok_or_else(|| FillError::invalid_order(order.id.as_str(), "not a combo order"))?
        .clone();

    let group = registry
        .get_mut(&group_id)
        .ok_or_else(|| FillError::UnknownGroup(group_id.as_str().to_string()))?;

    // A released group never re-emits
    if group.is_filled() {
        return Ok(Vec::new());
    }

    group.mark_evaluated(&order.id);

    // Market legs have no price condition of their own, so the pass is
    // complete only once every leg has reached the evaluator
    if matches!(order.kind, OrderKind::ComboMarket { .. }) && !group.all_evaluated() {
        debug!(group = %group_id, order_id = %order.id, "combo group pending: legs not all evaluated");
        return Ok(Vec::new());
    }

    let ratio = group.ratio;
    let group_direction = group.direction();
    let group_limit = group.limit_price;

    // Every member must be ready before anything fills
    let mut ready: Vec<(&Order, Prices, Decimal)> = Vec::with_capacity(group.members().len());
    for member_id in group.members() {
        let leg = if *member_id == order.id {
            GroupLeg::new(order, snapshot, subscription)
        } else {
            *legs
                .iter()
                .find(|l| l.order.id == *member_id)
                .ok_or_else(|| FillError::missing_group_leg(group_id.as_str(), member_id.as_str()))?
        };

        let leg_direction = Direction::from_quantity(leg.order.quantity * ratio);

        let outcome = match &leg.order.kind {
            OrderKind::ComboMarket { .. } => {
                resolve_prices(leg.snapshot, leg.subscription, leg_direction, PriceSources::All)
                    .map(|p| (p, p.current))
            }
            OrderKind::ComboLimit { .. } => {
                let limit_price = group_limit.ok_or_else(|| {
                    FillError::misconfigured_group(group_id.as_str(), "combo limit group has no limit price")
                })?;
                limit_leg_outcome(&leg, group_direction, limit_price)
            }
            OrderKind::ComboLegLimit { limit_price, .. } => {
                limit_leg_outcome(&leg, leg_direction, *limit_price)
            }
            other => {
                return Err(FillError::misconfigured_group(
                    group_id.as_str(),
                    format!("member {} has non-combo kind {}", leg.order.id, other),
                ))
            }
        };

        match outcome {
            Some((prices, price)) => ready.push((leg.order, prices, price)),
            None => {
                debug!(group = %group_id, member = %member_id, "combo group pending: leg condition unmet");
                return Ok(Vec::new());
            }
        }
    }

    group.mark_filled();

    let now = snapshot.time;
    let events = ready
        .into_iter()
        .map(|(leg_order, prices, price)| {
            let quantity = leg_order.quantity * ratio;
            let fee = engine.fee_for(leg_order, quantity, price);
            let mut event = FillEvent::filled(leg_order, quantity, price, fee, now);
            annotate_stale_fill(
                &mut event,
                prices.end_time,
                now,
                engine.config().stale_price_threshold,
            );
            event
        })
        .collect();

    Ok(events)
}

/// A limit-style leg is ready when its own bar satisfies the worst-of
/// limit rule for the chosen side, on data at/after its submission.
fn limit_leg_outcome(
    leg: &GroupLeg<'_>,
    side: Direction,
    limit_price: Decimal,
) -> Option<(Prices, Decimal)> {
    let prices = resolve_prices(leg.snapshot, leg.subscription, side, PriceSources::BarsOnly)?;
    if prices.ts_event < leg.order.submitted_at {
        return None;
    }
    let price = super::evaluators::limit_fill(side, limit_price, &prices)?;
    Some((prices, price))
}
