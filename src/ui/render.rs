//! Frame rendering and layout.
//!
//! The whole frame is rebuilt on every draw: title bar, status region,
//! coordinate display, the station card list (or its empty-state notice),
//! and the key-hint footer.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::AnnotatedStation;
use crate::utils::format_km;

use super::styles;

/// Widest a station name gets before truncation.
const MAX_NAME_WIDTH: usize = 48;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(1), // Status region
            Constraint::Length(1), // Coordinate display
            Constraint::Min(6),    // Results container
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_status(frame, app, chunks[1]);
    render_coords(frame, app, chunks[2]);
    render_results(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title_line = Line::from(vec![
        Span::styled("  nearbike", styles::title_style()),
        Span::styled("  bike-share stations near you", styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(Span::styled(
        format!(" {}", app.status.text),
        styles::status_style(app.status.kind),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_coords(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.position {
        Some(position) => format!(" {}", position.display()),
        None => String::new(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))),
        area,
    );
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style())
        .title(" Stations ");

    if app.results.is_empty() {
        let notice = if app.has_searched {
            format!(
                "No stations found within {} km.",
                app.config.radius_km
            )
        } else {
            String::new()
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            notice,
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(station_card)
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// One visual card per station: name, distance, and the two occupancy
/// counts, edged in the availability color.
fn station_card(annotated: &AnnotatedStation) -> ListItem<'static> {
    let station = &annotated.station;
    let edge = styles::availability_style(station.availability());
    let name = crate::utils::truncate(&station.name, MAX_NAME_WIDTH);

    let lines = vec![
        Line::from(vec![
            Span::styled("▌ ", edge),
            Span::styled(name, styles::station_name_style()),
        ]),
        Line::from(vec![
            Span::styled("▌ ", edge),
            Span::styled("Distance: ", styles::muted_style()),
            Span::raw(format_km(annotated.distance_km)),
        ]),
        Line::from(vec![
            Span::styled("▌ ", edge),
            Span::styled("Bikes: ", styles::muted_style()),
            Span::styled(
                station.free_bikes.to_string(),
                styles::count_style(station.free_bikes, styles::SUCCESS),
            ),
            Span::raw("   "),
            Span::styled("Docks: ", styles::muted_style()),
            Span::styled(
                station.empty_slots.to_string(),
                styles::count_style(station.empty_slots, styles::PRIMARY),
            ),
        ]),
        Line::from(""),
    ];

    ListItem::new(lines)
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let spans = if app.is_busy() {
        vec![Span::styled(
            format!(" {} ", app.trigger_label()),
            styles::muted_style(),
        )]
    } else {
        vec![
            Span::styled(" [f] ", styles::help_key_style()),
            Span::raw(app.trigger_label()),
            Span::styled("  [q] ", styles::help_key_style()),
            Span::raw("Quit"),
        ]
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
