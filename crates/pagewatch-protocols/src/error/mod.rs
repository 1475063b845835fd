//! Error types for the collaborator boundary.

mod alert;
mod browser;
mod store;

pub use alert::*;
pub use browser::*;
pub use store::*;
