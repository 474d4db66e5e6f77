use chrono::format::strftime::StrftimeItems;
use chrono::{DateTime, Local, Utc};
use colored::{Color, Colorize};
use std::collections::HashMap;
use std::fmt::Write;
use std::io::{self, Write as _};

use crate::fetch::FetchOutcome;

const RED_STATUSES: [&str; 2] = ["testfail", "error"];
const GREEN_STATUSES: [&str; 5] = ["testok", "testing", "merging", "building", "deploy"];
const BLUE_STATUSES: [&str; 1] = ["pr"];

const LABEL_WIDTH: usize = 10;

/// Color for a raw status token, matched case-insensitively. An empty status
/// means nothing usable came back and is shown as a failure.
pub fn status_color(status: &str) -> Color {
    if status.is_empty() {
        return Color::Red;
    }

    let lower = status.to_lowercase();
    let lower = lower.as_str();

    if RED_STATUSES.contains(&lower) {
        Color::Red
    } else if GREEN_STATUSES.contains(&lower) {
        Color::Green
    } else if BLUE_STATUSES.contains(&lower) {
        Color::Blue
    } else {
        Color::White
    }
}

pub fn format_clock(datetime: DateTime<Utc>) -> String {
    let format = StrftimeItems::new("%H:%M:%S");
    datetime
        .with_timezone(&Local)
        .format_with_items(format)
        .to_string()
}

fn push_line(out: &mut String, label: &str, outcome: Option<&FetchOutcome>) {
    let (value, color) = match outcome {
        Some(FetchOutcome {
            error: Some(err), ..
        }) => (err.as_str(), Color::Red),
        Some(outcome) => (outcome.status.as_str(), status_color(&outcome.status)),
        None => ("", Color::Red),
    };

    let _ = writeln!(
        out,
        "{label:<width$} {}",
        value.color(color),
        width = LABEL_WIDTH
    );
}

/// Builds the dashboard. `updated_at` and the exit hint are only shown when
/// `footer` is set (watch mode).
pub fn render(
    statuses: &HashMap<String, FetchOutcome>,
    updated_at: Option<DateTime<Utc>>,
    footer: bool,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "CSuite Deploy Status".bold());
    out.push('\n');

    push_line(&mut out, "Status", statuses.get("overall"));
    for region in ["au", "ca", "or", "us"] {
        push_line(&mut out, &region.to_uppercase(), statuses.get(region));
    }

    if footer {
        out.push('\n');
        if let Some(updated_at) = updated_at {
            let line = format!("Last updated: {}", format_clock(updated_at));
            let _ = writeln!(out, "{}", line.bright_black());
        }
        let _ = writeln!(out, "{}", "Press Ctrl+C to exit".bright_black());
    }

    out
}

pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1B[2J\x1B[H")?;
    stdout.flush()
}
