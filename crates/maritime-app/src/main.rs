use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maritime_app::config::AppConfig;
use maritime_app::console::{self, ConsoleInput};
use maritime_app::control;
use maritime_app::routes::{self, Session};
use maritime_app::state::AppState;
use maritime_core::commands::OperatorCommand;
use maritime_core::enums::OperationStep;
use maritime_sim::engine::Verification;
use maritime_sim::{OperationEngine, OperationError, SimConfig};

/// Maritime operation tracker.
#[derive(Debug, Parser)]
#[command(name = "maritime", version)]
struct Cli {
    /// Configuration file (TOML). Built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the whole operation on the virtual clock and print the log.
    Script {
        /// Codes submitted before the correct one.
        #[arg(long = "wrong-code")]
        wrong_codes: Vec<String>,

        /// Print the final snapshot as JSON instead of the log.
        #[arg(long)]
        json: bool,
    },

    /// Run the operation in real time, reading commands from stdin.
    Run {
        /// Wall-clock speed multiplier.
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },

    /// Resolve a dashboard path.
    Route {
        path: String,

        #[arg(long)]
        authenticated: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Script { wrong_codes, json } => script(config.sim_config(), &wrong_codes, json),
        Command::Run { speed } => run(config.sim_config(), speed),
        Command::Route {
            path,
            authenticated,
        } => {
            let resolution = routes::resolve(&path, Session { authenticated });
            println!("{resolution:?}");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Drive one scripted operation to completion on the virtual clock.
fn script(
    config: SimConfig,
    wrong_codes: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = OperationEngine::headless(config);
    let outcome = script_engine(&mut engine, wrong_codes)?;
    tracing::debug!(?outcome, "script finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    } else {
        for entry in &engine.state().logs {
            println!("{}", console::render_log_line(entry));
        }
    }
    Ok(())
}

/// Start, submit `codes` then the accepted code, and run to completion.
///
/// Submission stops at the first accepted code.
fn script_engine(
    engine: &mut OperationEngine,
    codes: &[String],
) -> Result<Verification, OperationError> {
    let accepted = engine.config().accepted_hin.clone();
    let delay = engine.config().engine_start_delay_ms;

    engine.start_operation()?;
    engine.advance_by(delay);
    debug_assert_eq!(engine.state().step, OperationStep::AwaitingVerification);

    let mut outcome = Verification::Rejected;
    for code in codes.iter().chain(std::iter::once(&accepted)) {
        outcome = engine.verify_hin(code)?;
        if outcome == Verification::Accepted {
            break;
        }
    }
    engine.run_until_idle(usize::MAX);
    Ok(outcome)
}

/// Real-time operation driven from stdin.
fn run(config: SimConfig, speed: f64) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new();
    control::start_loop(&state, config, speed)?;
    println!("{}", console::HELP);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        match console::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleInput::Operator(cmd))) => {
                let toggles_logs = cmd == OperatorCommand::ToggleLogs;
                control::send_command(&state, cmd)?;
                if toggles_logs {
                    println!("log panel toggled");
                }
            }
            Ok(Some(ConsoleInput::Status)) => {
                if let Some(snap) = control::get_snapshot(&state)? {
                    print!("{}", console::render_status(&snap));
                }
            }
            Ok(Some(ConsoleInput::Help)) => println!("{}", console::HELP),
            Ok(Some(ConsoleInput::Quit)) => break,
            Err(msg) => println!("{msg}"),
        }
        stdout.flush()?;
    }

    control::stop_loop(&state)?;
    Ok(())
}
