use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use crossbeam_channel::{Receiver, unbounded};
use uuid::Uuid;

use crate::tail::ParsedLine;

/// Events published by tail readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    /// A line read back from the log file.
    Line(ParsedLine),
    /// The tailed file was closed. Published once per file.
    End,
}

/// Handle returned on registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

type Listener = Arc<dyn Fn(&TailEvent) + Send + Sync>;

/// Listener registry shared between a logger and its tail readers.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<Vec<(SubscriptionId, Listener)>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener receiving every event.
    pub fn listen<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&TailEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        let listener: Listener = Arc::new(listener);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn on_line<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ParsedLine) + Send + Sync + 'static,
    {
        self.listen(move |event| {
            if let TailEvent::Line(line) = event {
                listener(line)
            }
        })
    }

    pub fn on_end<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listen(move |event| {
            if let TailEvent::End = event {
                listener()
            }
        })
    }

    /// Channel based subscription. The sending side is dropped when the
    /// subscription is removed.
    pub fn subscribe(&self) -> (SubscriptionId, Receiver<TailEvent>) {
        let (sender, receiver) = unbounded();
        let id = self.listen(move |event| {
            sender.send(event.clone()).ok();
        });
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `event` to a snapshot of the current listeners, in registration order.
    pub fn publish(&self, event: &TailEvent) {
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }
}
