//! Cargo gift dispatch.
//!
//! A gift rule names a manifest of products the station receives for free.
//! The dispatcher feeds that manifest into the cargo order book one batch
//! per interval, always leaving a few order slots free for real requests.

use std::collections::BTreeMap;

use riftworks_core::clock::Unpaused;
use riftworks_core::fixed::{DEFAULT_TICKS_PER_SECOND, Ticks, seconds_to_ticks};
use serde::{Deserialize, Serialize};

/// Seconds between dispatch attempts.
pub const DEFAULT_GIFT_INTERVAL_SECONDS: f64 = 10.0;

/// Configuration of one gift event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftRule {
    /// What is being sent.
    pub description: String,
    pub sender: String,
    /// Recipient on the station.
    pub care_of: String,
    /// Product id to quantity.
    pub gifts: BTreeMap<String, u32>,
    /// Order slots that must stay free for regular orders.
    pub order_space_to_leave: u32,
    /// Ticks between dispatch attempts.
    pub interval: Ticks,
}

impl Default for GiftRule {
    fn default() -> Self {
        Self {
            description: "A bundle of gifts".to_string(),
            sender: "NanoTrasen".to_string(),
            care_of: "The Cargo Dept.".to_string(),
            gifts: BTreeMap::new(),
            order_space_to_leave: 5,
            interval: seconds_to_ticks(DEFAULT_GIFT_INTERVAL_SECONDS, DEFAULT_TICKS_PER_SECOND),
        }
    }
}

/// A pre-approved order placed on behalf of a gift rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftOrder {
    pub product: String,
    pub quantity: u32,
    pub description: String,
    pub sender: String,
    pub care_of: String,
}

/// The cargo order book gifts are placed into.
pub trait OrderBook {
    /// Order slots currently free.
    fn free_slots(&self) -> u32;

    /// Add and approve an order. Returns false if the book refused it.
    fn try_add_order(&mut self, order: GiftOrder) -> bool;
}

/// A bounded in-memory order book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDatabase {
    capacity: u32,
    orders: Vec<GiftOrder>,
}

impl OrderDatabase {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            orders: Vec::new(),
        }
    }

    pub fn orders(&self) -> &[GiftOrder] {
        &self.orders
    }

    /// Remove an order once it has been fulfilled.
    pub fn fulfil(&mut self, product: &str) -> Option<GiftOrder> {
        let index = self.orders.iter().position(|o| o.product == product)?;
        Some(self.orders.remove(index))
    }
}

impl OrderBook for OrderDatabase {
    fn free_slots(&self) -> u32 {
        let used = u32::try_from(self.orders.len()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(used)
    }

    fn try_add_order(&mut self, order: GiftOrder) -> bool {
        if self.free_slots() == 0 {
            return false;
        }
        self.orders.push(order);
        true
    }
}

/// Outcome of one [`GiftDispatcher::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiftTick {
    /// The interval has not elapsed yet.
    Waiting,
    /// Orders placed this tick; gifts remain.
    Dispatched(Vec<GiftOrder>),
    /// The manifest is empty. Carries the final batch, possibly empty.
    Finished(Vec<GiftOrder>),
}

/// Drives one gift rule against an order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftDispatcher {
    rule: GiftRule,
    remaining: BTreeMap<String, u32>,
    next_dispatch: Ticks,
    last_unpause: u64,
}

impl GiftDispatcher {
    /// Start dispatching at `now`; the first batch goes out one interval
    /// later.
    pub fn new(rule: GiftRule, now: Ticks) -> Self {
        Self {
            remaining: rule.gifts.clone(),
            next_dispatch: now.saturating_add(rule.interval),
            rule,
            last_unpause: 0,
        }
    }

    pub fn rule(&self) -> &GiftRule {
        &self.rule
    }

    /// Gifts not yet placed.
    pub fn remaining(&self) -> &BTreeMap<String, u32> {
        &self.remaining
    }

    pub fn next_dispatch(&self) -> Ticks {
        self.next_dispatch
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Place as many remaining gifts as the order book allows while keeping
    /// `order_space_to_leave` slots free. Gifts go out in product order.
    pub fn tick(&mut self, now: Ticks, orders: &mut dyn OrderBook) -> GiftTick {
        if self.remaining.is_empty() {
            return GiftTick::Finished(Vec::new());
        }
        if now < self.next_dispatch {
            return GiftTick::Waiting;
        }
        self.next_dispatch = now.saturating_add(self.rule.interval);

        let mut placed = Vec::new();
        while let Some((product, &quantity)) = self.remaining.first_key_value() {
            if orders.free_slots() <= self.rule.order_space_to_leave {
                tracing::debug!(remaining = self.remaining.len(), "order book full, holding gifts");
                break;
            }
            let order = GiftOrder {
                product: product.clone(),
                quantity,
                description: self.rule.description.clone(),
                sender: self.rule.sender.clone(),
                care_of: self.rule.care_of.clone(),
            };
            if !orders.try_add_order(order.clone()) {
                tracing::warn!(product = %order.product, "order book refused gift");
                break;
            }
            self.remaining.remove(&order.product);
            placed.push(order);
        }

        if self.remaining.is_empty() {
            tracing::info!(sender = %self.rule.sender, "all gifts dispatched");
            GiftTick::Finished(placed)
        } else {
            GiftTick::Dispatched(placed)
        }
    }

    /// Shift the next dispatch forward by the paused duration, once per
    /// report sequence.
    pub fn on_unpaused(&mut self, report: Unpaused) -> bool {
        if report.sequence <= self.last_unpause {
            return false;
        }
        self.last_unpause = report.sequence;
        self.next_dispatch = self.next_dispatch.saturating_add(report.paused_for);
        true
    }
}
