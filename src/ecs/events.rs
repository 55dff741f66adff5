//! Typed observer registry
//!
//! Handlers subscribe to an (event type, component kind) pair. Raising an
//! event on an entity runs, in subscription order, every handler whose
//! component kind the entity currently has. Each handler returns a `Vote`;
//! the dispatcher runs all of them and ANDs the votes, so any listener can
//! veto a cancellable notification.

use ahash::AHashMap;
use std::any::{Any, TypeId};

use crate::core::types::EntityId;
use crate::ecs::component::ComponentKind;
use crate::host::ComponentQuery;

/// A listener's answer to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vote {
    #[default]
    Allow,
    Veto,
}

impl Vote {
    pub fn and(self, other: Vote) -> Vote {
        match (self, other) {
            (Vote::Allow, Vote::Allow) => Vote::Allow,
            _ => Vote::Veto,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Vote::Allow)
    }

    pub fn is_vetoed(&self) -> bool {
        matches!(self, Vote::Veto)
    }

    pub fn veto_if(condition: bool) -> Vote {
        if condition {
            Vote::Veto
        } else {
            Vote::Allow
        }
    }
}

type Handler<C, E> = Box<dyn FnMut(&mut C, EntityId, &mut E) -> Vote>;

struct Subscription<C, E> {
    kind: ComponentKind,
    handler: Handler<C, E>,
}

/// Event dispatcher over a host context `C`
pub struct EventBus<C> {
    handlers: AHashMap<TypeId, Box<dyn Any>>,
    _context: std::marker::PhantomData<fn(&mut C)>,
}

impl<C: ComponentQuery + 'static> EventBus<C> {
    pub fn new() -> Self {
        Self {
            handlers: AHashMap::new(),
            _context: std::marker::PhantomData,
        }
    }

    /// Register a handler for `E` raised on entities that have `kind`
    pub fn subscribe<E: 'static>(
        &mut self,
        kind: ComponentKind,
        handler: impl FnMut(&mut C, EntityId, &mut E) -> Vote + 'static,
    ) {
        let entry = self
            .handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Subscription<C, E>>::new()));

        if let Some(list) = entry.downcast_mut::<Vec<Subscription<C, E>>>() {
            list.push(Subscription {
                kind,
                handler: Box::new(handler),
            });
        }
    }

    /// Number of handlers registered for `E`
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_ref::<Vec<Subscription<C, E>>>())
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// Deliver `event` to every matching handler and combine their votes
    pub fn raise<E: 'static>(&mut self, ctx: &mut C, entity: EntityId, event: &mut E) -> Vote {
        let Some(list) = self
            .handlers
            .get_mut(&TypeId::of::<E>())
            .and_then(|entry| entry.downcast_mut::<Vec<Subscription<C, E>>>())
        else {
            return Vote::Allow;
        };

        let mut vote = Vote::Allow;
        for sub in list.iter_mut() {
            if !ctx.has_component(entity, sub.kind) {
                continue;
            }
            vote = vote.and((sub.handler)(ctx, entity, event));
        }
        vote
    }
}

impl<C: ComponentQuery + 'static> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
