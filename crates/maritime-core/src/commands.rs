//! Operator commands sent from the dashboard to the operation engine.

use serde::{Deserialize, Serialize};

/// All possible operator actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    // --- Operation lifecycle ---
    /// Start the engine and begin the operation sequence.
    StartOperation,
    /// Submit a hull identification number for verification.
    VerifyHin { code: String },
    /// Abandon the current run and return to the initial state.
    ResetOperation,

    // --- Presentation ---
    /// Show or hide the log panel.
    ToggleLogs,
    /// Close the boundary alert dialog.
    DismissBoundaryAlert,
}
