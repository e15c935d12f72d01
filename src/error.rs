use thiserror::Error;

use crate::run::RunState;

/// Failure of the terminal image tier. Network tiers never surface errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to prepare image directory {path}: {source}")]
    Prepare {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode JPEG for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to persist image to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Unexpected failures inside a run. Caught by the orchestrator and turned
/// into an aborted outcome.
#[derive(Debug, Error)]
pub enum CuratorError {
    #[error("image resolution failed: {0}")]
    Image(#[from] ImageError),

    #[error("run panicked while {state:?}: {message}")]
    Panic { state: RunState, message: String },
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
