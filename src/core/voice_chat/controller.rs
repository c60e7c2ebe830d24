//! The voice chat controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use crate::core::session::{ConnectionState, LocalAudioTrack, MediaSession};

use super::events::{
    EventRegistry, ListenerId, VoiceChatEvent, VoiceChatEventCallback, VoiceChatEventKind,
};
use super::messages::{
    PushToTalkClientEvent, PushToTalkServerEvent, TurnDirection, TurnOutcome,
};
use super::types::{InteractivityMode, VoiceChatConfig, VoiceChatError, VoiceChatResult, VoiceChatState};

/// Slot holding the resolver for an in-flight turn request.
///
/// At most one request per direction may be pending; the slot is taken when
/// the matching acknowledgment arrives or when the controller is stopped.
type PendingTurnRequest = Arc<Mutex<Option<oneshot::Sender<TurnOutcome>>>>;

/// Voice chat controller for a real-time avatar session.
///
/// Owns microphone capture, mute state, the `Inactive -> Starting -> Active`
/// state machine, and the push-to-talk request/acknowledgment protocol. The
/// media session is owned by the caller and only referenced here; the
/// controller never tears the session down.
///
/// # Concurrency
///
/// Public calls are expected to be serialized by the embedding application;
/// overlapping a `stop()` with a still-suspended `start()` is a caller error.
/// Inbound acknowledgments may arrive from the session's delivery context at
/// any time and only touch the pending-request slots.
pub struct VoiceChat {
    session: Arc<dyn MediaSession>,
    state: Arc<Mutex<VoiceChatState>>,
    is_muted: Arc<AtomicBool>,
    mode: Arc<Mutex<Option<InteractivityMode>>>,
    track: Arc<Mutex<Option<Arc<dyn LocalAudioTrack>>>>,
    pending_start: PendingTurnRequest,
    pending_stop: PendingTurnRequest,
    /// Set once a start-talking request has been acknowledged as successful
    /// and cleared when the matching stop succeeds (or the chat stops).
    turn_active: Arc<AtomicBool>,
    ack_timeout: Mutex<Option<Duration>>,
    registry: EventRegistry,
}

impl VoiceChat {
    /// Create a controller bound to a connected-or-connecting media session.
    ///
    /// The controller starts `Inactive` and muted; no audio leaves the client
    /// until a session is started and explicitly unmuted.
    pub fn new(session: Arc<dyn MediaSession>) -> Self {
        let pending_start: PendingTurnRequest = Arc::new(Mutex::new(None));
        let pending_stop: PendingTurnRequest = Arc::new(Mutex::new(None));

        {
            let pending_start = Arc::clone(&pending_start);
            let pending_stop = Arc::clone(&pending_stop);
            session.on_message(Arc::new(move |payload| {
                let event = match serde_json::from_value::<PushToTalkServerEvent>(payload) {
                    Ok(event) => event,
                    // Not part of the acknowledgment vocabulary
                    Err(_) => return,
                };
                match event {
                    PushToTalkServerEvent::StartSuccess => {
                        resolve_pending(&pending_start, TurnDirection::Start, TurnOutcome::Success)
                    }
                    PushToTalkServerEvent::StartFailed => {
                        resolve_pending(&pending_start, TurnDirection::Start, TurnOutcome::Failed)
                    }
                    PushToTalkServerEvent::StopSuccess => {
                        resolve_pending(&pending_stop, TurnDirection::Stop, TurnOutcome::Success)
                    }
                    PushToTalkServerEvent::StopFailed => {
                        resolve_pending(&pending_stop, TurnDirection::Stop, TurnOutcome::Failed)
                    }
                }
            }));
        }

        Self {
            session,
            state: Arc::new(Mutex::new(VoiceChatState::Inactive)),
            is_muted: Arc::new(AtomicBool::new(true)),
            mode: Arc::new(Mutex::new(None)),
            track: Arc::new(Mutex::new(None)),
            pending_start,
            pending_stop,
            turn_active: Arc::new(AtomicBool::new(false)),
            ack_timeout: Mutex::new(None),
            registry: EventRegistry::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Readable state
    // -------------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceChatState {
        *self.state.lock()
    }

    /// Whether the microphone is muted. Defaults to true before any start.
    pub fn is_muted(&self) -> bool {
        self.is_muted.load(Ordering::SeqCst)
    }

    /// The interactivity mode, if one has been set.
    pub fn mode(&self) -> Option<InteractivityMode> {
        *self.mode.lock()
    }

    /// Whether a push-to-talk turn is currently held by the user.
    pub fn is_turn_active(&self) -> bool {
        self.turn_active.load(Ordering::SeqCst)
    }

    /// Whether a turn request of the given direction is awaiting its
    /// acknowledgment.
    pub fn has_pending_turn_request(&self, direction: TurnDirection) -> bool {
        self.pending_slot(direction).lock().is_some()
    }

    /// Bound the wait for turn acknowledgments. `None` (the default) waits
    /// indefinitely; with a timeout the pending request is cleared and the
    /// call fails with [`VoiceChatError::AckTimeout`].
    pub fn set_ack_timeout(&self, timeout: Option<Duration>) {
        *self.ack_timeout.lock() = timeout;
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Register a listener for one event kind. Fan-out is synchronous and in
    /// registration order.
    pub fn on(&self, kind: VoiceChatEventKind, callback: VoiceChatEventCallback) -> ListenerId {
        self.registry.add(kind, callback)
    }

    /// Remove a previously registered listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.registry.remove(id)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Start the voice chat: acquire a microphone track, publish it into the
    /// session, and transition `Inactive -> Starting -> Active`.
    ///
    /// A no-op (no events, no side effects) when the session is not connected
    /// or the controller is already `Starting`/`Active`. Exactly one of
    /// `MUTED`/`UNMUTED` fires per successful start, after the `ACTIVE`
    /// transition, according to `config.default_muted`.
    ///
    /// If capture or publish fails the controller reverts to `Inactive`
    /// (emitting the transition) and the session error is returned.
    pub async fn start(&self, config: Option<VoiceChatConfig>) -> VoiceChatResult<()> {
        if self.session.connection_state() != ConnectionState::Connected {
            debug!("voice chat not started: media session is not connected");
            return Ok(());
        }
        if self.state() != VoiceChatState::Inactive {
            debug!("voice chat not started: already starting or active");
            return Ok(());
        }

        let config = config.unwrap_or_default();
        if let Some(mode) = config.mode {
            self.set_mode(mode);
        }

        self.set_state(VoiceChatState::Starting);

        let track = match self
            .session
            .create_audio_track(config.device_id.as_deref())
            .await
        {
            Ok(track) => track,
            Err(err) => {
                error!(error = %err, "microphone acquisition failed, reverting to inactive");
                self.set_state(VoiceChatState::Inactive);
                return Err(err.into());
            }
        };

        if let Err(err) = self.session.publish_track(Arc::clone(&track)).await {
            error!(error = %err, "track publish failed, reverting to inactive");
            track.stop().await;
            self.set_state(VoiceChatState::Inactive);
            return Err(err.into());
        }

        *self.track.lock() = Some(track);
        self.set_state(VoiceChatState::Active);

        // Mute resolution always emits, even when the flag keeps its value.
        self.apply_mute(config.default_muted).await?;
        Ok(())
    }

    /// Stop the voice chat: stop and unpublish the local track and return to
    /// `Inactive`. No-op unless `Active`; idempotent thereafter.
    ///
    /// Pending turn requests are dropped; a suspended push-to-talk call then
    /// fails with [`VoiceChatError::Interrupted`].
    pub async fn stop(&self) {
        if self.state() != VoiceChatState::Active {
            return;
        }

        self.pending_start.lock().take();
        self.pending_stop.lock().take();
        self.turn_active.store(false, Ordering::SeqCst);

        let track = self.track.lock().take();
        if let Some(track) = track {
            track.stop().await;
            if let Err(err) = self.session.unpublish_track(track).await {
                warn!(error = %err, "failed to unpublish audio track");
            }
        }

        self.set_state(VoiceChatState::Inactive);
    }

    // -------------------------------------------------------------------------
    // Mute control
    // -------------------------------------------------------------------------

    /// Mute the microphone. No-op unless `Active`; emits `MUTED` only when
    /// the flag actually changes.
    pub async fn mute(&self) -> VoiceChatResult<()> {
        self.set_muted(true).await
    }

    /// Unmute the microphone. No-op unless `Active`; emits `UNMUTED` only
    /// when the flag actually changes.
    pub async fn unmute(&self) -> VoiceChatResult<()> {
        self.set_muted(false).await
    }

    /// Re-target the published track's capture device. Returns `false`
    /// without side effects when there is no active track to redirect.
    pub async fn set_device(&self, device_id: &str) -> VoiceChatResult<bool> {
        if self.state() != VoiceChatState::Active {
            return Ok(false);
        }
        let track = self.track.lock().clone();
        match track {
            Some(track) => {
                track.set_device(device_id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Set the interactivity mode. Write-once: the first call fixes the mode
    /// permanently and later calls are ignored with a warning.
    pub fn set_mode(&self, mode: InteractivityMode) {
        let mut slot = self.mode.lock();
        if slot.is_some() {
            warn!("Voice chat mode can only be set once");
            return;
        }
        debug!(%mode, "voice chat mode set");
        *slot = Some(mode);
    }

    // -------------------------------------------------------------------------
    // Push-to-talk
    // -------------------------------------------------------------------------

    /// Request the talking turn from the remote peer.
    ///
    /// Sends a start-talking message over the session data channel and
    /// suspends until the matching acknowledgment arrives. On
    /// `START_SUCCESS` the microphone is unmuted and the call resolves; on
    /// `START_FAILED` the call fails without a guaranteed error payload.
    ///
    /// Precondition violations (not active, wrong or unset mode, a start
    /// already pending or granted) log a warning and resolve trivially.
    pub async fn start_push_to_talk(&self) -> VoiceChatResult<()> {
        if self.state() != VoiceChatState::Active {
            warn!("Push to talk can only be started when voice chat is active");
            return Ok(());
        }
        if self.mode() != Some(InteractivityMode::PushToTalk) {
            warn!("Push to talk can only be started in push to talk mode");
            return Ok(());
        }

        let receiver = {
            let mut pending = self.pending_start.lock();
            if pending.is_some() || self.turn_active.load(Ordering::SeqCst) {
                warn!("Push to talk has already been started");
                return Ok(());
            }
            let (sender, receiver) = oneshot::channel();
            *pending = Some(sender);
            receiver
        };

        if let Err(err) = self.send_turn_event(PushToTalkClientEvent::StartTalking).await {
            self.pending_start.lock().take();
            return Err(err);
        }

        match self.await_ack(receiver, TurnDirection::Start).await? {
            TurnOutcome::Success => {
                self.turn_active.store(true, Ordering::SeqCst);
                // The user may now speak.
                if self.is_muted() {
                    self.apply_mute(false).await?;
                }
                Ok(())
            }
            TurnOutcome::Failed => {
                error!("Push to talk start request was rejected by the remote peer");
                Err(VoiceChatError::TurnRequestFailed(TurnDirection::Start))
            }
        }
    }

    /// Release the talking turn.
    ///
    /// Only valid once a start has been acknowledged as successful; calling
    /// it without an active turn logs a warning and performs no send. The
    /// mute state is left unchanged regardless of the outcome.
    pub async fn stop_push_to_talk(&self) -> VoiceChatResult<()> {
        if !self.turn_active.load(Ordering::SeqCst) {
            warn!("Push to talk has not been started");
            return Ok(());
        }

        let receiver = {
            let mut pending = self.pending_stop.lock();
            if pending.is_some() {
                warn!("Push to talk stop has already been requested");
                return Ok(());
            }
            let (sender, receiver) = oneshot::channel();
            *pending = Some(sender);
            receiver
        };

        if let Err(err) = self.send_turn_event(PushToTalkClientEvent::StopTalking).await {
            self.pending_stop.lock().take();
            return Err(err);
        }

        match self.await_ack(receiver, TurnDirection::Stop).await? {
            TurnOutcome::Success => {
                self.turn_active.store(false, Ordering::SeqCst);
                Ok(())
            }
            TurnOutcome::Failed => {
                error!("Push to talk stop request was rejected by the remote peer");
                Err(VoiceChatError::TurnRequestFailed(TurnDirection::Stop))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn pending_slot(&self, direction: TurnDirection) -> &PendingTurnRequest {
        match direction {
            TurnDirection::Start => &self.pending_start,
            TurnDirection::Stop => &self.pending_stop,
        }
    }

    fn set_state(&self, next: VoiceChatState) {
        {
            let mut state = self.state.lock();
            if *state == next {
                return;
            }
            *state = next;
        }
        debug!(state = %next, "voice chat state changed");
        self.registry.emit(VoiceChatEvent::StateChanged(next));
    }

    /// No-op unless active; suppresses redundant changes entirely (no event,
    /// no track call).
    async fn set_muted(&self, muted: bool) -> VoiceChatResult<()> {
        if self.state() != VoiceChatState::Active {
            return Ok(());
        }
        if self.is_muted() == muted {
            return Ok(());
        }
        self.apply_mute(muted).await
    }

    /// Apply a mute value to the published track, update the flag, and emit
    /// the corresponding event unconditionally.
    async fn apply_mute(&self, muted: bool) -> VoiceChatResult<()> {
        let track = self.track.lock().clone();
        if let Some(track) = track {
            track.set_enabled(!muted).await?;
        }
        self.is_muted.store(muted, Ordering::SeqCst);
        self.registry.emit(if muted {
            VoiceChatEvent::Muted
        } else {
            VoiceChatEvent::Unmuted
        });
        Ok(())
    }

    async fn send_turn_event(&self, event: PushToTalkClientEvent) -> VoiceChatResult<()> {
        let payload = serde_json::to_value(event)?;
        self.session.send_message(payload).await?;
        Ok(())
    }

    /// Suspend until the acknowledgment for `direction` resolves the oneshot,
    /// honoring the configured timeout.
    async fn await_ack(
        &self,
        receiver: oneshot::Receiver<TurnOutcome>,
        direction: TurnDirection,
    ) -> VoiceChatResult<TurnOutcome> {
        let timeout = *self.ack_timeout.lock();
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver).await {
                Ok(result) => result,
                Err(_) => {
                    self.pending_slot(direction).lock().take();
                    error!(%direction, "push to talk acknowledgment timed out");
                    return Err(VoiceChatError::AckTimeout(direction));
                }
            },
            None => receiver.await,
        };
        // The sender is dropped only when the controller is stopped with the
        // request still pending.
        result.map_err(|_| VoiceChatError::Interrupted(direction))
    }
}

/// Resolve a pending turn request with the acknowledged outcome; unmatched
/// acknowledgments are ignored.
fn resolve_pending(slot: &PendingTurnRequest, direction: TurnDirection, outcome: TurnOutcome) {
    match slot.lock().take() {
        Some(sender) => {
            // The receiver may have timed out in the meantime; nothing to do.
            let _ = sender.send(outcome);
        }
        None => {
            debug!(%direction, "ignoring acknowledgment with no pending turn request");
        }
    }
}
