//! Guard rejections reported by the operation engine.
//!
//! A rejected trigger never changes state. Callers log it and carry on.

use maritime_core::enums::OperationStep;

/// Why the engine ignored a command or a scheduled callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("map surface is not ready")]
    MapUnavailable,

    #[error("operation already started")]
    AlreadyStarted,

    #[error("operation already completed")]
    AlreadyCompleted,

    #[error("HIN verification is not open (current step: {0:?})")]
    NotAwaitingVerification(OperationStep),

    #[error("{trigger} does not apply during {step:?}")]
    OutOfSequence {
        trigger: &'static str,
        step: OperationStep,
    },
}
