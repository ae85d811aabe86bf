//! Practice statistics commands.

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use breathflow_core::practice::{day_key, quotes};
use breathflow_core::{Config, Database, SessionController};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current practice streak
    Streak,
    /// This week's practice calendar as JSON
    Week,
    /// Streak, weekly calendar, and the daily quote
    Summary,
}

#[derive(Serialize)]
struct StreakReport {
    streak: u32,
    practiced_today: bool,
}

#[derive(Serialize)]
struct WeekDay {
    date: NaiveDate,
    weekday: &'static str,
    practiced: bool,
    today: bool,
}

/// Sunday-first single-letter weekday headers.
const WEEKDAY_LETTERS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let controller = SessionController::open(db);
    let today = day_key::today();

    match action {
        StatsAction::Streak => {
            let report = StreakReport {
                streak: controller.streak(),
                practiced_today: controller.practiced_today(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Week => {
            let week = week_days(&controller, today);
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
        StatsAction::Summary => render_summary(&controller, today),
    }
    Ok(())
}

fn week_days(controller: &SessionController, today: NaiveDate) -> Vec<WeekDay> {
    day_key::week_of(today)
        .iter()
        .enumerate()
        .map(|(i, &date)| WeekDay {
            date,
            weekday: WEEKDAY_LETTERS[i],
            practiced: controller.practice_days().contains(&date),
            today: date == today,
        })
        .collect()
}

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn render_summary(controller: &SessionController, today: NaiveDate) {
    let streak = controller.streak();
    if streak > 0 {
        let unit = if streak == 1 { "day" } else { "days" };
        println!("{BOLD}streak:{RESET} {GREEN}{streak} {unit}{RESET}");
    } else {
        println!("{BOLD}streak:{RESET} {DIM}none yet{RESET}");
    }
    println!();

    let week = week_days(controller, today);
    let mut header = String::new();
    let mut marks = String::new();
    for day in &week {
        let mark = if day.practiced {
            format!("{GREEN}*{RESET}")
        } else {
            format!("{DIM}.{RESET}")
        };
        if day.today {
            header.push_str(&format!("{CYAN}{BOLD} {} {RESET}", day.weekday));
            marks.push_str(&format!("{CYAN}[{RESET}{mark}{CYAN}]{RESET}"));
        } else {
            header.push_str(&format!(" {} ", day.weekday));
            marks.push_str(&format!(" {mark} "));
        }
    }
    println!("{header}");
    println!("{marks}");

    if Config::load_or_default().display.daily_quote {
        println!();
        println!("{DIM}\"{}\"{RESET}", quotes::daily_quote(today));
    }
}
