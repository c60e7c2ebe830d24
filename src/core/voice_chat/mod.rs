//! Voice chat controller for real-time avatar sessions.
//!
//! This module owns the local microphone lifecycle on top of an externally
//! supplied [`MediaSession`](crate::core::session::MediaSession): a strict
//! `Inactive -> Starting -> Active` state machine, mute state, a write-once
//! interactivity mode, and the push-to-talk request/acknowledgment protocol
//! spoken over the session data channel.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use avatar_voice_client::core::voice_chat::{VoiceChat, VoiceChatConfig, InteractivityMode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = connect_media_session().await; // Arc<dyn MediaSession>
//!     let voice_chat = VoiceChat::new(session);
//!
//!     voice_chat
//!         .start(Some(VoiceChatConfig {
//!             default_muted: true,
//!             mode: Some(InteractivityMode::PushToTalk),
//!             ..Default::default()
//!         }))
//!         .await
//!         .unwrap();
//!
//!     // Unmutes once the remote side acknowledges the turn.
//!     voice_chat.start_push_to_talk().await.unwrap();
//! }
//! ```

mod controller;
mod events;
mod messages;
mod types;


// Re-export public types
pub use controller::VoiceChat;
pub use events::{
    ListenerId, VoiceChatEvent, VoiceChatEventCallback, VoiceChatEventKind,
};
pub use messages::{PushToTalkClientEvent, PushToTalkServerEvent, TurnDirection};
pub use types::{
    InteractivityMode, VoiceChatConfig, VoiceChatError, VoiceChatResult, VoiceChatState,
};
