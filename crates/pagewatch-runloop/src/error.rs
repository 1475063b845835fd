//! RunLoop errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunLoopError {
    #[error("Failed to install {signal} handler: {source}")]
    Signal {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Source closed: {0}")]
    SourceClosed(String),
}
