//! Base traits and types for the underlying real-time media session.
//!
//! The voice chat controller treats the media connection to the avatar
//! service as an opaque capability: connection state, local audio track
//! creation and publication, and a reliable low-latency data channel for
//! application-level control messages. Transport, ICE negotiation, and codec
//! selection all live behind these traits.
//!
//! The session object is owned by the embedding application and merely
//! referenced by the controller; the controller never tears the session down.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced by a media session implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Microphone capture could not be acquired
    #[error("Audio capture failed: {0}")]
    CaptureFailed(String),

    /// Publishing the local track into the session failed
    #[error("Track publish failed: {0}")]
    PublishFailed(String),

    /// Unpublishing the local track failed
    #[error("Track unpublish failed: {0}")]
    UnpublishFailed(String),

    /// Sending a control message over the data channel failed
    #[error("Messaging failed: {0}")]
    MessagingFailed(String),

    /// Re-targeting the capture device failed
    #[error("Device error: {0}")]
    DeviceError(String),

    /// The session is not connected
    #[error("Not connected")]
    NotConnected,
}

/// Result type for media session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of the underlying media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the avatar service
    #[default]
    Disconnected,
    /// Currently connecting
    Connecting,
    /// Connected and ready
    Connected,
    /// Reconnecting after connection loss
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Callback type for inbound control messages on the session data channel.
///
/// Payloads are delivered as raw JSON values; subscribers inspect the
/// `event_type` field and ignore messages they do not recognize.
pub type MessageCallback = Arc<dyn Fn(serde_json::Value) + Send + Sync>;

// =============================================================================
// Base Traits
// =============================================================================

/// The media session capability consumed by the voice chat controller.
///
/// Implementations wrap whatever real-time transport carries the avatar
/// session (a WebRTC room, in production) and expose only the surface the
/// controller needs. Tests inject a mock.
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Current connection state of the session.
    fn connection_state(&self) -> ConnectionState;

    /// Acquire a microphone capture track, honoring `device_id` if given.
    async fn create_audio_track(
        &self,
        device_id: Option<&str>,
    ) -> SessionResult<Arc<dyn LocalAudioTrack>>;

    /// Attach the track to the outgoing session.
    async fn publish_track(&self, track: Arc<dyn LocalAudioTrack>) -> SessionResult<()>;

    /// Detach the track from the outgoing session.
    async fn unpublish_track(&self, track: Arc<dyn LocalAudioTrack>) -> SessionResult<()>;

    /// Send an application-level control message to the remote peer over a
    /// reliable low-latency channel.
    async fn send_message(&self, payload: serde_json::Value) -> SessionResult<()>;

    /// Subscribe to inbound control messages.
    fn on_message(&self, callback: MessageCallback);
}

/// A published local microphone track.
///
/// Only the owning controller mutates the enabled state of the track; no
/// other collaborator should write to it directly.
#[async_trait]
pub trait LocalAudioTrack: Send + Sync {
    /// Enable or disable outgoing audio on the track.
    async fn set_enabled(&self, enabled: bool) -> SessionResult<()>;

    /// Re-target the capture device behind the track.
    async fn set_device(&self, device_id: &str) -> SessionResult<()>;

    /// Stop capturing and release the underlying device.
    async fn stop(&self);
}
