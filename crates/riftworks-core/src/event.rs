//! Typed event bus with buffered delivery.
//!
//! Systems emit events while they run; the host calls [`EventBus::deliver`]
//! once per tick to hand the batch to subscribers. Each crate defines its own
//! event enum and a matching discriminant via [`Classify`].
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which drops them
//! at emission time. Suppressed events are never buffered.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Maps an event to its discriminant kind, used for filtering and suppression.
pub trait Classify {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// A passive listener receives events read-only.
pub type PassiveListener<E> = Box<dyn FnMut(&E)>;

struct Subscription<E: Classify> {
    /// `None` subscribes to every kind.
    kind: Option<E::Kind>,
    listener: PassiveListener<E>,
}

/// Buffers events during a tick and delivers them in emission order.
pub struct EventBus<E: Classify> {
    pending: Vec<E>,
    subscriptions: Vec<Subscription<E>>,
    suppressed: HashSet<E::Kind>,
    total_emitted: u64,
}

impl<E: Classify> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            subscriptions: Vec::new(),
            suppressed: HashSet::new(),
            total_emitted: 0,
        }
    }
}

impl<E: Classify> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("suppressed", &self.suppressed)
            .field("total_emitted", &self.total_emitted)
            .finish()
    }
}

impl<E: Classify> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an event for the next delivery. Suppressed kinds are dropped.
    pub fn emit(&mut self, event: E) {
        if self.suppressed.contains(&event.kind()) {
            return;
        }
        self.total_emitted += 1;
        self.pending.push(event);
    }

    /// Stop recording events of this kind.
    pub fn suppress(&mut self, kind: E::Kind) {
        self.suppressed.insert(kind);
    }

    pub fn unsuppress(&mut self, kind: E::Kind) {
        self.suppressed.remove(&kind);
    }

    pub fn is_suppressed(&self, kind: E::Kind) -> bool {
        self.suppressed.contains(&kind)
    }

    /// Subscribe to a single event kind.
    pub fn on(&mut self, kind: E::Kind, listener: PassiveListener<E>) {
        self.subscriptions.push(Subscription {
            kind: Some(kind),
            listener,
        });
    }

    /// Subscribe to every event kind.
    pub fn on_any(&mut self, listener: PassiveListener<E>) {
        self.subscriptions.push(Subscription {
            kind: None,
            listener,
        });
    }

    /// Events waiting for delivery, oldest first.
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    /// Total events accepted since creation (suppressed ones excluded).
    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }

    /// Hand every pending event to matching subscribers in emission order,
    /// then return the delivered batch to the caller.
    pub fn deliver(&mut self) -> Vec<E> {
        let batch = std::mem::take(&mut self.pending);
        for event in &batch {
            let kind = event.kind();
            for sub in &mut self.subscriptions {
                if sub.kind.is_none_or(|k| k == kind) {
                    (sub.listener)(event);
                }
            }
        }
        batch
    }

    /// Drop pending events without delivering them.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
