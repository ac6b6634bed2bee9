//! Transient status messages.
//!
//! Every `notify` writes the slot and schedules its own clear timer. Timers
//! are never cancelled, so an older timer can clear a newer message early;
//! hosts that care can read `pending_timers` to see this happening.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Source of the current time. The notifier never sleeps; the host calls
/// `Notifier::tick` and the clock decides which timers have fired.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and replay.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// The designated message slots, one per form area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSlot {
    Book,
    Member,
    Borrowing,
    Return,
}

impl MessageSlot {
    pub const ALL: [MessageSlot; 4] = [
        MessageSlot::Book,
        MessageSlot::Member,
        MessageSlot::Borrowing,
        MessageSlot::Return,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MessageSlot::Book => "book-message",
            MessageSlot::Member => "member-message",
            MessageSlot::Borrowing => "borrowing-message",
            MessageSlot::Return => "return-message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    /// CSS-style class list of a filled slot, e.g. `message error`.
    pub fn class(&self) -> String {
        format!("message {}", self.kind.as_str())
    }
}

#[derive(Debug)]
pub struct Notifier<C: Clock = SystemClock> {
    clock: C,
    clear_after: Duration,
    slots: HashMap<MessageSlot, Message>,
    timers: Vec<(Instant, MessageSlot)>,
}

impl<C: Clock> Notifier<C> {
    pub fn new(clock: C, clear_after: Duration) -> Self {
        Self {
            clock,
            clear_after,
            slots: HashMap::new(),
            timers: Vec::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn notify(&mut self, slot: MessageSlot, text: impl Into<String>, kind: MessageKind) {
        let text = text.into();
        tracing::debug!(slot = slot.id(), kind = kind.as_str(), %text, "notify");
        self.slots.insert(slot, Message { text, kind });
        let deadline = self.clock.now() + self.clear_after;
        self.timers.push((deadline, slot));
    }

    /// Fire every timer whose deadline has passed. Returns the slots that
    /// were cleared, in firing order.
    pub fn tick(&mut self) -> Vec<MessageSlot> {
        let now = self.clock.now();
        let mut due: Vec<(Instant, MessageSlot)> = Vec::new();
        self.timers.retain(|&(deadline, slot)| {
            if deadline <= now {
                due.push((deadline, slot));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(deadline, _)| deadline);
        due.into_iter()
            .map(|(_, slot)| {
                self.slots.remove(&slot);
                slot
            })
            .collect()
    }

    pub fn message(&self, slot: MessageSlot) -> Option<&Message> {
        self.slots.get(&slot)
    }

    /// Class list of the slot as a view would show it.
    pub fn class(&self, slot: MessageSlot) -> String {
        self.message(slot)
            .map(Message::class)
            .unwrap_or_else(|| "message".to_string())
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|&(deadline, _)| deadline).min()
    }
}
