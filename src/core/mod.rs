pub mod session;
pub mod voice_chat;

// Re-export commonly used types for convenience
pub use session::{
    ConnectionState, LocalAudioTrack, MediaSession, MessageCallback, SessionError, SessionResult,
};

pub use voice_chat::{
    InteractivityMode, ListenerId, PushToTalkClientEvent, PushToTalkServerEvent, TurnDirection,
    VoiceChat, VoiceChatConfig, VoiceChatError, VoiceChatEvent, VoiceChatEventCallback,
    VoiceChatEventKind, VoiceChatResult, VoiceChatState,
};
