use ratatui::style::{Color, Modifier, Style};

use crate::app::StatusKind;
use crate::models::Availability;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SUCCESS: Color = Color::Rgb(96, 160, 96);
pub const WARNING: Color = Color::Rgb(208, 144, 48);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn station_name_style() -> Style {
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
}

pub fn status_style(kind: StatusKind) -> Style {
    match kind {
        StatusKind::Info => Style::default().fg(WARNING),
        StatusKind::Success => Style::default().fg(SUCCESS),
        StatusKind::Error => Style::default().fg(ERROR),
    }
}

/// Card edge color for a station's service state: green when both bikes
/// and docks are available, orange for bikes only, blue for docks only,
/// red when out of service.
pub fn availability_style(availability: Availability) -> Style {
    let color = match availability {
        Availability::FullService => SUCCESS,
        Availability::BikesOnly => WARNING,
        Availability::DocksOnly => PRIMARY,
        Availability::OutOfService => ERROR,
    };
    Style::default().fg(color)
}

/// Count coloring inside a card: green/blue while stock remains, red at zero.
pub fn count_style(count: u32, nonzero: Color) -> Style {
    if count > 0 {
        Style::default().fg(nonzero).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
    }
}

pub fn help_key_style() -> Style {
    Style::default().fg(WARNING).add_modifier(Modifier::BOLD)
}
