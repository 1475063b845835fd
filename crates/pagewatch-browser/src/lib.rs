//! # pagewatch Browser
//!
//! [`TabBrowser`](pagewatch_protocols::TabBrowser) over the Chrome DevTools
//! Protocol. Chrome must run with `--remote-debugging-port`.

pub mod cdp;
mod browser;

pub use browser::{CdpBrowser, LoadCallback};
pub use cdp::{CdpClient, CdpError, PageSession};
