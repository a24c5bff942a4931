//! Line-based operator console: parses typed commands and renders state.

use std::fmt::Write as _;

use maritime_core::commands::OperatorCommand;
use maritime_core::enums::{AlertLevel, StepStatus};
use maritime_core::state::OperationSnapshot;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Operator(OperatorCommand),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  start            start the engine
  verify <HIN>     submit a hull identification number
  reset            abandon the operation
  logs             show or hide the log panel
  dismiss          close the boundary alert
  status           print the operation status
  quit             exit";

/// Parse one console line. Blank lines yield `None`.
///
/// Everything after the single separator following `verify` is the code,
/// surrounding whitespace included.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, String> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    let (word, rest) = match line.find(char::is_whitespace) {
        Some(i) => {
            let sep_len = line[i..].chars().next().map_or(0, char::len_utf8);
            (&line[..i], &line[i + sep_len..])
        }
        None => (line, ""),
    };

    let input = match word {
        "" => return Ok(None),
        "start" => ConsoleInput::Operator(OperatorCommand::StartOperation),
        // An empty code is still a submission.
        "verify" => ConsoleInput::Operator(OperatorCommand::VerifyHin {
            code: rest.to_string(),
        }),
        "reset" => ConsoleInput::Operator(OperatorCommand::ResetOperation),
        "logs" => ConsoleInput::Operator(OperatorCommand::ToggleLogs),
        "dismiss" => ConsoleInput::Operator(OperatorCommand::DismissBoundaryAlert),
        "status" => ConsoleInput::Status,
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" => ConsoleInput::Quit,
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };
    Ok(Some(input))
}

/// Status panel plus, when visible, the log panel.
pub fn render_status(snap: &OperationSnapshot) -> String {
    let mut out = String::new();
    let state = &snap.state;

    let _ = writeln!(out, "Operation Status  (t = {} ms)", snap.now_ms);
    for step in &snap.steps {
        let mark = match step.status {
            StepStatus::Done => "[x]",
            StepStatus::Active => "[>]",
            StepStatus::Pending => "[ ]",
        };
        let _ = writeln!(out, "  {mark} {}. {}", step.number, step.name);
    }
    let _ = writeln!(
        out,
        "  vessel at {:.6}, {:.6}",
        state.vessel_position.lat, state.vessel_position.lon
    );
    if let Some(leg) = snap.active_leg {
        let _ = writeln!(out, "  {:?} leg {:.0}%", leg.leg, leg.progress * 100.0);
    }
    if state.hin_input_visible && !state.verified {
        let _ = writeln!(out, "  HIN required: verify <HIN>");
    }
    if state.boundary_alert_visible {
        let _ = writeln!(out, "  !! boundary reached (dismiss to close)");
    }
    if state.operation_completed {
        let _ = writeln!(out, "  operation completed");
    }

    if state.log_panel_visible {
        let _ = writeln!(out, "Logs");
        for entry in &state.logs {
            let _ = writeln!(out, "  {}", render_log_line(entry));
        }
    }
    out
}

pub fn render_log_line(entry: &maritime_core::events::LogEntry) -> String {
    let tag = match entry.level {
        AlertLevel::Info => "info",
        AlertLevel::Warning => "warn",
        AlertLevel::Critical => "FAIL",
    };
    format!("{} {tag} {}", entry.timestamp(), entry.message)
}
