//! WebSocket Message Types
//!
//! Every frame is a JSON object naming the event and carrying its payload:
//!
//! ```json
//! {"event": "switch-room", "data": "sovmain"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::worker::WorkerEvent;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Move this connection into the named room
    SwitchRoom(String),
    /// Keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// A worker of the room's network processed a transaction
    #[serde(rename_all = "camelCase")]
    TxProcessed { worker_data: Value, tx_data: Value },
    /// A worker of the room's network scheduled a rescan
    #[serde(rename_all = "camelCase")]
    RescanScheduled {
        worker_data: Value,
        ms_till_rescan: Value,
    },
    /// Confirms a `switch-room` request
    SwitchedRoomNotification { text: String },
    /// Pong response to ping
    Pong,
    /// Error message
    Error { message: String },
}

impl ServerMessage {
    /// Confirmation sent after entering `room`
    pub fn switched_room(room: &str) -> Self {
        ServerMessage::SwitchedRoomNotification {
            text: format!("Entered room {}", room),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Event name as seen on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::TxProcessed { .. } => "tx-processed",
            ServerMessage::RescanScheduled { .. } => "rescan-scheduled",
            ServerMessage::SwitchedRoomNotification { .. } => "switched-room-notification",
            ServerMessage::Pong => "pong",
            ServerMessage::Error { .. } => "error",
        }
    }
}

impl From<WorkerEvent> for ServerMessage {
    fn from(event: WorkerEvent) -> Self {
        match event {
            WorkerEvent::TxProcessed {
                worker_data,
                tx_data,
            } => ServerMessage::TxProcessed {
                worker_data,
                tx_data,
            },
            WorkerEvent::RescanScheduled {
                worker_data,
                ms_till_rescan,
            } => ServerMessage::RescanScheduled {
                worker_data,
                ms_till_rescan,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_deserialize_switch_room() {
        let json = r#"{"event": "switch-room", "data": "net-b"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::SwitchRoom(room) => assert_eq!(room, "net-b"),
            _ => panic!("Expected SwitchRoom"),
        }
    }

    #[test]
    fn test_client_message_rejects_non_string_room() {
        let json = r#"{"event": "switch-room", "data": {"room": "net-b"}}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());

        let json = r#"{"event": "switch-room", "data": 42}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_worker_event_name_is_wire_event() {
        let events = [
            WorkerEvent::TxProcessed {
                worker_data: json!({"id": 1}),
                tx_data: json!({}),
            },
            WorkerEvent::RescanScheduled {
                worker_data: json!({"id": 1}),
                ms_till_rescan: json!(1000),
            },
        ];

        for event in events {
            let name = event.name();
            let wire = serde_json::to_value(ServerMessage::from(event)).unwrap();
            assert_eq!(wire["event"], name.as_str());
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"event": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialize_tx_processed() {
        let msg = ServerMessage::TxProcessed {
            worker_data: json!({"id": 1}),
            tx_data: json!({"hash": "abc"}),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "tx-processed",
                "data": {"workerData": {"id": 1}, "txData": {"hash": "abc"}}
            })
        );
    }

    #[test]
    fn test_server_message_serialize_rescan_scheduled() {
        let msg = ServerMessage::RescanScheduled {
            worker_data: json!({"id": 7}),
            ms_till_rescan: json!(30000),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "rescan-scheduled");
        assert_eq!(value["data"]["msTillRescan"], 30000);
        assert_eq!(value["data"]["workerData"]["id"], 7);
    }

    #[test]
    fn test_switched_room_notification() {
        let value = serde_json::to_value(ServerMessage::switched_room("net-b")).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "switched-room-notification",
                "data": {"text": "Entered room net-b"}
            })
        );
    }

    #[test]
    fn test_worker_event_payload_forwarded_verbatim() {
        let event = WorkerEvent::TxProcessed {
            worker_data: Value::Null,
            tx_data: json!("not-an-object"),
        };
        let msg = ServerMessage::from(event);
        assert_eq!(msg.event_name(), "tx-processed");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["data"]["workerData"], Value::Null);
        assert_eq!(value["data"]["txData"], "not-an-object");
    }
}
