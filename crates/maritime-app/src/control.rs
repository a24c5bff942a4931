//! Control layer between the console and the operation loop.
//!
//! Mirrors what a dashboard front end would invoke: start the loop, send
//! operator commands, poll the latest snapshot, stop.

use maritime_core::commands::OperatorCommand;
use maritime_core::state::OperationSnapshot;
use maritime_sim::SimConfig;

use crate::operation_loop;
use crate::state::{AppState, LoopCommand};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("operation loop already running")]
    AlreadyRunning,

    #[error("operation loop not started")]
    NotRunning,

    #[error("operation loop has stopped")]
    Disconnected,

    #[error("shared state lock poisoned")]
    Poisoned,

    #[error("failed to spawn operation loop: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Start the operation loop. Fails if one is already running.
pub fn start_loop(state: &AppState, config: SimConfig, speed: f64) -> Result<(), ControlError> {
    let mut handle = state.handle.lock().map_err(|_| ControlError::Poisoned)?;
    if handle.is_some() {
        return Err(ControlError::AlreadyRunning);
    }
    *handle = Some(operation_loop::spawn_operation_loop(
        config,
        speed,
        state.latest_snapshot.clone(),
    )?);
    Ok(())
}

/// Forward an operator command to the loop.
pub fn send_command(state: &AppState, command: OperatorCommand) -> Result<(), ControlError> {
    let handle = state.handle.lock().map_err(|_| ControlError::Poisoned)?;
    match handle.as_ref() {
        Some(h) => h
            .command_tx
            .send(LoopCommand::Operator(command))
            .map_err(|_| ControlError::Disconnected),
        None => Err(ControlError::NotRunning),
    }
}

/// Latest snapshot published by the loop, if any.
pub fn get_snapshot(state: &AppState) -> Result<Option<OperationSnapshot>, ControlError> {
    let lock = state
        .latest_snapshot
        .lock()
        .map_err(|_| ControlError::Poisoned)?;
    Ok(lock.clone())
}

/// Stop the loop and wait for its thread to exit.
pub fn stop_loop(state: &AppState) -> Result<(), ControlError> {
    let handle = state
        .handle
        .lock()
        .map_err(|_| ControlError::Poisoned)?
        .take()
        .ok_or(ControlError::NotRunning)?;
    // The loop may already have exited; joining is enough either way.
    let _ = handle.command_tx.send(LoopCommand::Shutdown);
    handle.thread.join().map_err(|_| ControlError::Disconnected)
}
