//! # Channels: per-event ordered listener lists.
//!
//! A [`Channel`] keeps the registrations of one event sorted by descending
//! priority. Ties keep insertion order because the re-sort after each insert
//! is stable.
//!
//! [`ChannelMap`] stores channels of different payload types side by side,
//! keyed by the `TypeId` of the event marker. A channel exists only while it
//! has at least one registration.
//!
//! ## Rules
//! - Emissions never iterate a channel in place; they take a snapshot.
//! - Removal drops the whole registration (`Arc`); running emissions keep their copy.

use std::any::{Any, TypeId};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use crate::events::Event;
use crate::listeners::{ListenerId, Registration};

/// Ordered registrations of one event.
pub(crate) struct Channel<E: Event> {
    regs: Vec<Arc<Registration<E>>>,
}

impl<E: Event> Channel<E> {
    fn new() -> Self {
        Self { regs: Vec::new() }
    }

    /// Appends and re-establishes descending priority order.
    fn insert(&mut self, reg: Registration<E>) {
        self.regs.push(Arc::new(reg));
        self.regs.sort_by_key(|r| Reverse(r.priority));
    }

    fn remove_id(&mut self, id: ListenerId) -> bool {
        let before = self.regs.len();
        self.regs.retain(|r| r.id != id);
        self.regs.len() != before
    }

    fn remove_holding(&mut self, ptr: *const ()) -> usize {
        let before = self.regs.len();
        self.regs.retain(|r| !r.holds(ptr));
        before - self.regs.len()
    }

    fn snapshot(&self) -> Vec<Arc<Registration<E>>> {
        self.regs.clone()
    }
}

/// Object-safe view of a `Channel<E>` of unknown `E`.
trait ErasedChannel: Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Event> ErasedChannel for Channel<E> {
    fn len(&self) -> usize {
        self.regs.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Type-erased channel with the event label kept for introspection.
struct Slot {
    name: &'static str,
    channel: Box<dyn ErasedChannel>,
}

impl Slot {
    fn new<E: Event>() -> Self {
        Self {
            name: E::NAME,
            channel: Box::new(Channel::<E>::new()),
        }
    }
}

/// All channels of one dispatcher.
#[derive(Default)]
pub(crate) struct ChannelMap {
    slots: HashMap<TypeId, Slot>,
}

impl ChannelMap {
    fn get<E: Event>(&self) -> Option<&Channel<E>> {
        self.slots
            .get(&TypeId::of::<E>())
            .and_then(|slot| slot.channel.as_any().downcast_ref::<Channel<E>>())
    }

    fn get_mut<E: Event>(&mut self) -> Option<&mut Channel<E>> {
        self.slots
            .get_mut(&TypeId::of::<E>())
            .and_then(|slot| slot.channel.as_any_mut().downcast_mut::<Channel<E>>())
    }

    /// Drops the channel of `E` if it has no registrations left.
    fn prune<E: Event>(&mut self) {
        if self.get::<E>().is_some_and(|ch| ch.regs.is_empty()) {
            self.slots.remove(&TypeId::of::<E>());
        }
    }

    /// Adds a registration, creating the channel on first use.
    pub(crate) fn insert<E: Event>(&mut self, reg: Registration<E>) {
        let slot = self
            .slots
            .entry(TypeId::of::<E>())
            .or_insert_with(Slot::new::<E>);
        if let Some(ch) = slot.channel.as_any_mut().downcast_mut::<Channel<E>>() {
            ch.insert(reg);
        }
    }

    /// Removes the registration with `id` from `E`'s channel.
    pub(crate) fn remove_id<E: Event>(&mut self, id: ListenerId) -> bool {
        let removed = self.get_mut::<E>().is_some_and(|ch| ch.remove_id(id));
        self.prune::<E>();
        removed
    }

    /// Removes every registration of `E` holding the allocation at `ptr`.
    pub(crate) fn remove_holding<E: Event>(&mut self, ptr: *const ()) -> usize {
        let removed = self
            .get_mut::<E>()
            .map_or(0, |ch| ch.remove_holding(ptr));
        self.prune::<E>();
        removed
    }

    /// Removes `E`'s channel; returns how many registrations it held.
    pub(crate) fn clear_event<E: Event>(&mut self) -> usize {
        let count = self.len::<E>();
        self.slots.remove(&TypeId::of::<E>());
        count
    }

    /// Removes every channel; returns how many registrations were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.total();
        self.slots.clear();
        count
    }

    /// Copy of `E`'s registrations in dispatch order (empty if none).
    pub(crate) fn snapshot<E: Event>(&self) -> Vec<Arc<Registration<E>>> {
        self.get::<E>().map(Channel::snapshot).unwrap_or_default()
    }

    pub(crate) fn len<E: Event>(&self) -> usize {
        self.get::<E>().map_or(0, |ch| ch.regs.len())
    }

    /// Sum of registrations across all events.
    pub(crate) fn total(&self) -> usize {
        self.slots.values().map(|slot| slot.channel.len()).sum()
    }

    /// Labels of events that currently have listeners, sorted.
    ///
    /// Distinct marker types sharing a `NAME` are separate channels but show
    /// up once here; [`ChannelMap::total`] still counts both.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.slots.values().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
