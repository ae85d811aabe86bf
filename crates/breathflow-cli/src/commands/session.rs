//! Session control commands.
//!
//! Every invocation opens the store, replays the persisted session if one
//! exists, applies the requested command, and saves the result. `watch`
//! additionally drives the countdown live until the session ends or
//! Ctrl-C cancels it.

use std::io::Write;

use clap::Subcommand;

use breathflow_core::storage::validate_duration_secs;
use breathflow_core::timer::pacer;
use breathflow_core::{technique, Config, Database, Event, SessionConfig, SessionController};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Create a session in its ready state
    Start {
        /// Session length in minutes, from the fixed menu
        #[arg(long)]
        minutes: Option<u32>,
        /// Technique id (see `technique list`)
        #[arg(long)]
        technique: Option<String>,
    },
    /// Begin the countdown
    Play,
    /// Freeze the countdown
    Pause,
    /// Continue a paused countdown
    Resume,
    /// Return to the ready state, optionally with a new duration
    Restart {
        /// New session length in minutes, from the fixed menu
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// End the session early (today still counts as practice)
    Cancel,
    /// Print the current session state as JSON
    Status,
    /// Drive the countdown live until it ends or Ctrl-C cancels
    Watch,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut controller = SessionController::open(db);

    // Catch the persisted session up with the wall clock before acting on
    // it. A session that expired while the process was away completes
    // here, so `start` finds a clean slate and `cancel` has nothing stale
    // to end.
    let caught_up = controller.sync();
    for event in caught_up.iter().filter(|e| {
        matches!(
            e,
            Event::SessionCompleted { .. } | Event::PracticeRecorded { .. }
        )
    }) {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    // Persist the catch-up now; the command below may bail out before the
    // save at the end, and a replayed expiry must not print twice.
    if !caught_up.is_empty() {
        controller.save()?;
    }

    match action {
        SessionAction::Start { minutes, technique } => {
            let defaults = Config::load_or_default();
            let duration_secs = match minutes {
                Some(m) => m.saturating_mul(60),
                None => defaults.session.duration_secs,
            };
            validate_duration_secs(duration_secs)?;
            let id = technique.unwrap_or(defaults.session.technique);
            let technique = technique::find(&id)
                .ok_or_else(|| format!("unknown technique '{id}' (see `technique list`)"))?;
            let event = controller.start_session(SessionConfig::new(technique, duration_secs)?)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        SessionAction::Play => {
            let event = controller.play()?;
            print_event_or_snapshot(&controller, event)?;
        }
        SessionAction::Pause => {
            let event = controller.pause()?;
            print_event_or_snapshot(&controller, event)?;
        }
        SessionAction::Resume => {
            let event = controller.resume()?;
            print_event_or_snapshot(&controller, event)?;
        }
        SessionAction::Restart { minutes } => {
            let new_secs = minutes.map(|m| m.saturating_mul(60));
            if let Some(secs) = new_secs {
                validate_duration_secs(secs)?;
            }
            let event = controller.restart(new_secs)?;
            print_event_or_snapshot(&controller, event)?;
        }
        SessionAction::Cancel => {
            for event in controller.cancel()? {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        SessionAction::Status => match controller.timer() {
            Some(timer) => println!("{}", serde_json::to_string_pretty(&timer.snapshot_event())?),
            None => println!("{{\"type\": \"no_session\"}}"),
        },
        SessionAction::Watch => watch(&mut controller)?,
    }

    controller.save()?;
    Ok(())
}

fn print_event_or_snapshot(
    controller: &SessionController,
    event: Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => {
            if let Some(timer) = controller.timer() {
                println!("{}", serde_json::to_string_pretty(&timer.snapshot_event())?);
            }
        }
    }
    Ok(())
}

enum WatchOutcome {
    Completed,
    Cancelled,
}

fn watch(controller: &mut SessionController) -> Result<(), Box<dyn std::error::Error>> {
    if controller.state().is_none() {
        return Err("no active session (run `session start` first)".into());
    }
    controller.play()?;
    render_frame(controller);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = rt.block_on(async {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        // The first tick resolves immediately; consume it so the cadence
        // starts one second from now.
        interval.tick().await;
        loop {
            let Some(wakeup) = controller.schedule_tick() else {
                break Ok::<WatchOutcome, Box<dyn std::error::Error>>(WatchOutcome::Completed);
            };
            tokio::select! {
                _ = interval.tick() => {
                    controller.on_wakeup(wakeup);
                    if controller.state().is_none() {
                        break Ok(WatchOutcome::Completed);
                    }
                    render_frame(controller);
                }
                _ = tokio::signal::ctrl_c() => {
                    controller.cancel()?;
                    break Ok(WatchOutcome::Cancelled);
                }
            }
        }
    })?;

    match outcome {
        WatchOutcome::Completed => {
            println!(
                "\nsession complete - practice recorded (streak {})",
                controller.streak()
            );
        }
        WatchOutcome::Cancelled => {
            println!(
                "\nsession cancelled - practice recorded (streak {})",
                controller.streak()
            );
        }
    }
    Ok(())
}

const BAR_WIDTH: usize = 24;

fn render_frame(controller: &SessionController) {
    let Some(timer) = controller.timer() else {
        return;
    };
    let snapshot = timer.snapshot();
    let pct = timer.session_progress_pct();
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar: String = "#".repeat(filled) + &"-".repeat(BAR_WIDTH - filled);
    print!(
        "\r{:<10} {:>2}s  [{bar}] {} left (pacer x{:.1})  ",
        pacer::label(snapshot.phase),
        snapshot.phase_secs_remaining,
        format_clock(snapshot.session_secs_remaining),
        pacer::scale(snapshot.phase),
    );
    let _ = std::io::stdout().flush();
}

pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
