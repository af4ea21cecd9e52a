//! Gateway: HTTP + WebSocket transport for the chat page.
//!
//! Single port serves the landing page, a health probe and the chat WebSocket.
//! Every WebSocket connection owns one conversation session.

mod protocol;
mod server;

pub use protocol::{ClientEvent, ServerEvent};
pub use server::{build_state, router, run_gateway, serve, GatewayState};
