//! Error types for scenedom

use crate::events::EventKind;
use crate::scene::ObjectId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneDomError {
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("Event kind {0} cannot be dispatched from pointer input")]
    InvalidDispatchKind(EventKind),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Listener for {kind} on {object} failed: {source}")]
    Listener {
        kind: EventKind,
        object: ObjectId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Pointer {0} is busy dispatching")]
    PointerBusy(u32),
}

pub type Result<T> = std::result::Result<T, SceneDomError>;
