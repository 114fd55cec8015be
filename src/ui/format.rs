use ratatui::style::Color;

use crate::models::session::Fulfillment;
use crate::session::history::HeatLevel;

/// Countdown display: `H:MM:SS` from one hour up, `M:SS` below.
pub fn format_countdown(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

pub fn session_count_label(count: usize) -> String {
    if count == 1 {
        "1 session".to_string()
    } else {
        format!("{} sessions", count)
    }
}

pub fn heat_color(level: HeatLevel) -> Color {
    match level {
        HeatLevel::Empty => Color::DarkGray,
        HeatLevel::Low => Color::Rgb(147, 197, 253),
        HeatLevel::Medium => Color::Rgb(96, 165, 250),
        HeatLevel::High => Color::Rgb(37, 99, 235),
        HeatLevel::Max => Color::Rgb(30, 64, 175),
    }
}

pub fn fulfillment_color(fulfilled: Fulfillment) -> Color {
    match fulfilled {
        Fulfillment::Completely => Color::Green,
        Fulfillment::Mostly => Color::Yellow,
        Fulfillment::Partially => Color::Rgb(251, 146, 60),
        Fulfillment::NotReally => Color::Red,
    }
}
