//! Event surface of the voice chat controller.
//!
//! Events fan out through a per-controller observer registry keyed by event
//! kind. Fan-out is synchronous and in registration order; there is no global
//! event bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::types::VoiceChatState;

// =============================================================================
// Events
// =============================================================================

/// Events emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceChatEvent {
    /// The lifecycle state changed. Fires only on an actual value change.
    StateChanged(VoiceChatState),
    /// The microphone was muted
    Muted,
    /// The microphone was unmuted
    Unmuted,
}

/// Event kind used to key listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceChatEventKind {
    StateChanged,
    Muted,
    Unmuted,
}

impl VoiceChatEvent {
    /// The registration kind this event fans out to.
    pub fn kind(&self) -> VoiceChatEventKind {
        match self {
            VoiceChatEvent::StateChanged(_) => VoiceChatEventKind::StateChanged,
            VoiceChatEvent::Muted => VoiceChatEventKind::Muted,
            VoiceChatEvent::Unmuted => VoiceChatEventKind::Unmuted,
        }
    }
}

/// Callback type for voice chat events.
pub type VoiceChatEventCallback = Arc<dyn Fn(&VoiceChatEvent) + Send + Sync>;

/// Handle identifying a registered listener, usable for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// Registry
// =============================================================================

struct Listener {
    id: ListenerId,
    kind: VoiceChatEventKind,
    callback: VoiceChatEventCallback,
}

/// Per-controller observer registry with synchronous, in-order fan-out.
pub(crate) struct EventRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Listener>>,
}

impl EventRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener for one event kind. Listeners fire in
    /// registration order.
    pub(crate) fn add(&self, kind: VoiceChatEventKind, callback: VoiceChatEventCallback) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push(Listener { id, kind, callback });
        id
    }

    /// Remove a listener by id. Returns false if the id is unknown.
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    /// Fan an event out to every listener registered for its kind.
    ///
    /// The listener list is snapshotted first so callbacks may re-enter the
    /// registry (or the controller) without deadlocking.
    pub(crate) fn emit(&self, event: VoiceChatEvent) {
        let kind = event.kind();
        let snapshot: Vec<VoiceChatEventCallback> = self
            .listeners
            .lock()
            .iter()
            .filter(|listener| listener.kind == kind)
            .map(|listener| Arc::clone(&listener.callback))
            .collect();
        for callback in snapshot {
            callback(&event);
        }
    }
}
