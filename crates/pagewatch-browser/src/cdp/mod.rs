//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium via WebSocket and speaks the CDP JSON-RPC
//! protocol. Only the pieces a page monitor needs are here: page
//! discovery, session attach, reload, script evaluation and load events.
//!
//! Start Chrome with remote debugging:
//! ```bash
//! chrome --remote-debugging-port=9222
//! ```

pub(crate) mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
