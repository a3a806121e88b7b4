//! WebSocket Real-Time Streaming
//!
//! Pushes ledger worker events to clients grouped into rooms, one room per
//! network id.
//!
//! ## Architecture
//!
//! - **ChannelDirectory**: Room membership, connection admission and fan-out
//! - **ConnectionSession**: Per-connection room state and the switch protocol
//! - **Handler**: WebSocket upgrade and frame processing
//! - **Messages**: Client and server frame formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3708/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({event: 'switch-room', data: 'sovmain'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.event === 'tx-processed') console.log(msg.data.txData);
//! };
//! ```

mod directory;
mod handler;
mod messages;
mod session;

pub use directory::{ChannelDirectory, ConnectionId, HubConfig, HubError, Outbound, Outbox};
pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};
pub use session::{ConnectionSession, RoomState};
