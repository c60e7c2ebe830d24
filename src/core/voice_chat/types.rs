//! Core types and errors for the voice chat controller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::session::SessionError;

use super::messages::TurnDirection;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during voice chat operations.
///
/// None of these are fatal to the controller itself: precondition violations
/// degrade to logged warnings and never produce an error, so this enum only
/// covers session failures and the push-to-talk protocol.
#[derive(Debug, Error)]
pub enum VoiceChatError {
    /// The underlying media session failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The remote peer acknowledged a turn request as failed.
    ///
    /// No error payload is guaranteed beyond the direction that failed.
    #[error("Push to talk {0} request failed")]
    TurnRequestFailed(TurnDirection),

    /// A turn request acknowledgment did not arrive within the configured
    /// timeout
    #[error("Push to talk {0} request timed out waiting for acknowledgment")]
    AckTimeout(TurnDirection),

    /// The controller was stopped while a turn request was still pending
    #[error("Push to talk {0} request interrupted")]
    Interrupted(TurnDirection),

    /// Serialization of a turn-control message failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for voice chat operations.
pub type VoiceChatResult<T> = Result<T, VoiceChatError>;

// =============================================================================
// State & Mode
// =============================================================================

/// Lifecycle state of the voice chat controller.
///
/// The lifecycle is linear: created `Inactive`, driven through `Starting` to
/// `Active` by [`VoiceChat::start`](super::VoiceChat::start), and back to
/// `Inactive` by [`VoiceChat::stop`](super::VoiceChat::stop). No other
/// transitions exist; attempts from disallowed states are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceChatState {
    /// No microphone is captured or published
    #[default]
    Inactive,
    /// Microphone acquisition and publish are in flight
    Starting,
    /// A local audio track is published into the session
    Active,
}

impl fmt::Display for VoiceChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceChatState::Inactive => write!(f, "INACTIVE"),
            VoiceChatState::Starting => write!(f, "STARTING"),
            VoiceChatState::Active => write!(f, "ACTIVE"),
        }
    }
}

/// Interactivity mode of the session.
///
/// Write-once: the first `set_mode` call fixes the mode permanently; later
/// calls are ignored with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractivityMode {
    /// Free-flowing conversation; turn-taking is handled remotely
    Conversational,
    /// The user must explicitly request and release the talking turn
    PushToTalk,
}

impl fmt::Display for InteractivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractivityMode::Conversational => write!(f, "CONVERSATIONAL"),
            InteractivityMode::PushToTalk => write!(f, "PUSH_TO_TALK"),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for [`VoiceChat::start`](super::VoiceChat::start).
#[derive(Debug, Clone, Default)]
pub struct VoiceChatConfig {
    /// Start muted. Defaults to false: a successful start unmutes the track
    /// and emits `UNMUTED` unless this is set.
    pub default_muted: bool,

    /// Capture device to acquire the microphone from.
    pub device_id: Option<String>,

    /// Interactivity mode to set on start (write-once semantics apply).
    pub mode: Option<InteractivityMode>,
}
