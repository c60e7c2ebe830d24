mod base;

// Re-export public types and traits
pub use base::{
    ConnectionState, LocalAudioTrack, MediaSession, MessageCallback, SessionError, SessionResult,
};
