//! Application state shared between the control layer and the loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use maritime_core::commands::OperatorCommand;
use maritime_core::state::OperationSnapshot;

/// Commands sent from the control layer to the loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// An operator command to forward to the engine.
    Operator(OperatorCommand),
    /// Shut down the loop thread gracefully.
    Shutdown,
}

/// Handle to a running loop thread.
#[derive(Debug)]
pub struct LoopHandle {
    pub command_tx: mpsc::Sender<LoopCommand>,
    pub thread: JoinHandle<()>,
}

/// Shared application state.
///
/// - the loop handle is `None` until the loop is started
/// - the latest snapshot is shared with the loop thread, which replaces it
///   after every frame
#[derive(Debug, Default)]
pub struct AppState {
    pub handle: Mutex<Option<LoopHandle>>,
    pub latest_snapshot: Arc<Mutex<Option<OperationSnapshot>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
