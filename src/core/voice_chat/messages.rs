//! Turn-control wire messages for push-to-talk.
//!
//! Control messages travel over the media session's data channel as JSON
//! objects discriminated by an `event_type` field. The client expresses
//! start/stop-talking intent; the server mirrors each intent with a success
//! or failure acknowledgment. Inbound payloads whose `event_type` is not part
//! of the acknowledgment vocabulary are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a push-to-talk turn request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    /// Requesting the talking turn
    Start,
    /// Releasing the talking turn
    Stop,
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::Start => write!(f, "start"),
            TurnDirection::Stop => write!(f, "stop"),
        }
    }
}

/// Client -> server turn-control intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum PushToTalkClientEvent {
    /// The user wants to start talking
    #[serde(rename = "START_TALKING")]
    StartTalking,
    /// The user is done talking
    #[serde(rename = "STOP_TALKING")]
    StopTalking,
}

/// Server -> client turn-control acknowledgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum PushToTalkServerEvent {
    /// The start-talking request was granted
    #[serde(rename = "START_SUCCESS")]
    StartSuccess,
    /// The start-talking request was denied
    #[serde(rename = "START_FAILED")]
    StartFailed,
    /// The stop-talking request was accepted
    #[serde(rename = "STOP_SUCCESS")]
    StopSuccess,
    /// The stop-talking request failed
    #[serde(rename = "STOP_FAILED")]
    StopFailed,
}

/// Outcome carried from the acknowledgment handler to the suspended caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnOutcome {
    Success,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_serialization() {
        assert_eq!(
            serde_json::to_value(PushToTalkClientEvent::StartTalking).unwrap(),
            json!({ "event_type": "START_TALKING" })
        );
        assert_eq!(
            serde_json::to_value(PushToTalkClientEvent::StopTalking).unwrap(),
            json!({ "event_type": "STOP_TALKING" })
        );
    }

    #[test]
    fn test_server_event_parsing() {
        let event: PushToTalkServerEvent =
            serde_json::from_value(json!({ "event_type": "START_SUCCESS" })).unwrap();
        assert_eq!(event, PushToTalkServerEvent::StartSuccess);

        let event: PushToTalkServerEvent =
            serde_json::from_value(json!({ "event_type": "STOP_FAILED" })).unwrap();
        assert_eq!(event, PushToTalkServerEvent::StopFailed);
    }

    #[test]
    fn test_server_event_parsing_ignores_extra_fields() {
        let event: PushToTalkServerEvent = serde_json::from_value(json!({
            "event_type": "STOP_SUCCESS",
            "session_id": "abc",
            "timestamp": 12345
        }))
        .unwrap();
        assert_eq!(event, PushToTalkServerEvent::StopSuccess);
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result: Result<PushToTalkServerEvent, _> =
            serde_json::from_value(json!({ "event_type": "AVATAR_TALKING" }));
        assert!(result.is_err());

        let result: Result<PushToTalkServerEvent, _> =
            serde_json::from_value(json!({ "text": "no event type" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_turn_direction_display() {
        assert_eq!(TurnDirection::Start.to_string(), "start");
        assert_eq!(TurnDirection::Stop.to_string(), "stop");
    }
}
