//! CDU binary - terminal session management and the event loop.
//!
//! The loop runs on a fixed 25 ms cadence:
//!
//! 1. Drain the input pump into the console
//! 2. Advance the console's deadlines (`tick`)
//! 3. Draw the published frame

mod assets;

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::{CrosstermBackend, Terminal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cdu_engine::{
    Console, DialogAction, FrameBuffer, LaterThanReference, MemoryStore, NotAboveReference,
    RequiresGuard,
};
use cdu_types::{DatapointKind, DatapointMetadata, Value};
use cdu_tui::{InputPump, Palette, draw, handle_events};

const FRAME_CADENCE: Duration = Duration::from_millis(25);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %path.display(), "logging initialized");
        return;
    }

    // No writable log location: prefer "no logs" over corrupting the TUI by
    // writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && fs::create_dir_all(parent).is_err()
        {
            continue;
        }
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&candidate) {
            return Some((candidate, file));
        }
    }
    None
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(dir) = env::var("CDU_LOG_DIR") {
        candidates.push(PathBuf::from(dir).join("cdu.log"));
    }
    if let Ok(home) = env::var("HOME") {
        candidates.push(PathBuf::from(home).join(".cdu").join("logs").join("cdu.log"));
    }
    candidates.push(PathBuf::from(".cdu").join("logs").join("cdu.log"));
    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
    }
}

/// Demo device table backing the built-in pages.
fn demo_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(
        "env.temp",
        Value::Number(21.0),
        DatapointMetadata::writable(DatapointKind::Number)
            .with_range(16.0, 30.0)
            .with_unit("C"),
    );
    store.insert(
        "env.target",
        Value::Number(22.0),
        DatapointMetadata::writable(DatapointKind::Number).with_unit("C"),
    );
    store.insert(
        "env.humidity",
        Value::Number(43.0),
        DatapointMetadata::read_only(DatapointKind::Number).with_unit("PCT"),
    );
    store.insert(
        "limits.max",
        Value::Number(26.0),
        DatapointMetadata::read_only(DatapointKind::Number),
    );
    store.insert(
        "dev.pump",
        Value::Bool(true),
        DatapointMetadata::writable(DatapointKind::Boolean),
    );
    store.insert(
        "dev.callsign",
        Value::Text("CDU1".to_string()),
        DatapointMetadata::writable(DatapointKind::Text),
    );
    store.insert(
        "dev.purgecmd",
        Value::Text("".to_string()),
        DatapointMetadata::writable(DatapointKind::Text),
    );
    store.insert(
        "sched.deptime",
        Value::Text("12:30".to_string()),
        DatapointMetadata::writable(DatapointKind::Text),
    );
    store.insert(
        "sys.clock",
        Value::Text("12:00".to_string()),
        DatapointMetadata::read_only(DatapointKind::Text),
    );
    store.insert(
        "sys.armed",
        Value::Bool(false),
        DatapointMetadata::writable(DatapointKind::Boolean),
    );
    store
}

/// Startup self-test dialog action: nothing to roll back, just log.
struct SelfTestAction;

impl DialogAction for SelfTestAction {
    fn confirm(&mut self) -> Result<()> {
        tracing::info!("self test acknowledged");
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        tracing::info!("self test skipped");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let display = FrameBuffer::new();
    let pages = assets::demo_pages()?;
    let mut console = Console::new(demo_store(), pages, display.clone());
    console
        .validation_mut()
        .register("not-above-limit", Box::new(NotAboveReference::new("limits.max")));
    console
        .validation_mut()
        .register("later-than-clock", Box::new(LaterThanReference::new("sys.clock")));
    console
        .validation_mut()
        .register("requires-armed", Box::new(RequiresGuard::new("sys.armed")));

    // Greet the operator with the countdown variant; EXEC or the confirm
    // line-key dismisses it early.
    console.show_countdown_confirmation(
        "TERMINAL SELF TEST",
        vec!["ALL DATAPOINTS SIMULATED".to_string()],
        5,
        Some(Box::new(SelfTestAction)),
        Instant::now(),
    );

    let mut session = TerminalSession::new()?;
    let mut pump = InputPump::new();
    let palette = Palette::default();

    let mut ticker = tokio::time::interval(FRAME_CADENCE);
    let run_result: Result<()> = loop {
        ticker.tick().await;
        let now = Instant::now();
        match handle_events(&mut console, &mut pump, now) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(err) => break Err(err),
        }
        console.tick(now);
        let snapshot = display.snapshot();
        if let Err(err) = session
            .terminal
            .draw(|frame| draw(frame, &snapshot, &palette))
        {
            break Err(err.into());
        }
    };

    pump.shutdown().await;
    drop(session);
    run_result
}
