//! Combo group state shared between the legs of a multi-leg order.
//!
//! Legs reference their group by `GroupId` and the caller owns the
//! `GroupRegistry` arena, so several legs can resolve the same group
//! record without aliasing a shared reference. A group lives from
//! submission until all legs fill (or the caller drops it on cancel).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::types::{Direction, OrderId};

/// Combo group ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    /// Create a new GroupId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique GroupId using UUID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Shared state for one combo group.
///
/// Members are kept in registration order; fills are emitted in that
/// same order. The `filled` latch is terminal: a released group never
/// re-emits events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOrderManager {
    /// Group ID
    pub id: GroupId,
    /// Quantity multiplier applied to every leg; its sign is the group direction
    pub ratio: Decimal,
    /// Shared limit price for combo-limit groups
    pub limit_price: Option<Decimal>,
    /// Member order ids in registration order
    members: Vec<OrderId>,
    /// Legs that have reached the evaluator in the current pass
    #[serde(default)]
    evaluated: HashSet<OrderId>,
    /// Set once the group has released its fills
    #[serde(default)]
    filled: bool,
}

impl GroupOrderManager {
    /// Create a new group with the given quantity ratio
    pub fn new(id: GroupId, ratio: Decimal) -> Self {
        Self {
            id,
            ratio,
            limit_price: None,
            members: Vec::new(),
            evaluated: HashSet::new(),
            filled: false,
        }
    }

    /// Set the group-level limit price (combo-limit groups)
    pub fn with_limit_price(mut self, limit_price: Decimal) -> Self {
        self.limit_price = Some(limit_price);
        self
    }

    /// Register a member leg. Registration order is fill-emission order.
    pub fn register(&mut self, order_id: OrderId) {
        if !self.members.contains(&order_id) {
            self.members.push(order_id);
        }
    }

    /// Member order ids in registration order
    pub fn members(&self) -> &[OrderId] {
        &self.members
    }

    /// Group direction: the sign of the ratio
    pub fn direction(&self) -> Direction {
        Direction::from_quantity(self.ratio)
    }

    /// Record that a leg has reached the evaluator in the current pass
    pub fn mark_evaluated(&mut self, order_id: &OrderId) {
        if self.members.contains(order_id) {
            self.evaluated.insert(order_id.clone());
        }
    }

    /// True once every registered leg has reached the evaluator
    pub fn all_evaluated(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| self.evaluated.contains(m))
    }

    /// True once the group has released its fills
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Latch the group as released
    pub fn mark_filled(&mut self) {
        self.filled = true;
    }
}

/// Arena of combo groups, owned by the surrounding simulation loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, GroupOrderManager>,
}

impl GroupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group and return its id
    pub fn create(&mut self, ratio: Decimal) -> GroupId {
        let id = GroupId::generate();
        self.groups
            .insert(id.clone(), GroupOrderManager::new(id.clone(), ratio));
        id
    }

    /// Insert an externally built group record
    pub fn insert(&mut self, group: GroupOrderManager) {
        self.groups.insert(group.id.clone(), group);
    }

    /// Look up a group
    pub fn get(&self, id: &GroupId) -> Option<&GroupOrderManager> {
        self.groups.get(id)
    }

    /// Look up a group mutably
    pub fn get_mut(&mut self, id: &GroupId) -> Option<&mut GroupOrderManager> {
        self.groups.get_mut(id)
    }

    /// Remove a group (cancel or cleanup)
    pub fn remove(&mut self, id: &GroupId) -> Option<GroupOrderManager> {
        self.groups.remove(id)
    }

    /// Number of live groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when no groups are registered
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
