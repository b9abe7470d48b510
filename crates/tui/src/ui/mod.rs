pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    // Main layout: info bar, content, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::transactions::render(frame, layout[1], state, &theme);
    render_bottom_bar(frame, layout[2], state, &theme);

    if let Some(modal) = &state.form {
        components::form::render(frame, area, modal, &theme);
    }
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let refresh = state
        .last_refresh
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let line = Line::from(vec![
        Span::styled("Servidor", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.base_url)),
        Span::styled("Movimientos", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", state.transactions.items.len())),
        Span::styled("Actualizado", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}")),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints: &[(&str, &str)] = if state.form.is_some() {
        &[
            ("Tab", "campo"),
            ("↑/↓", "opción"),
            ("Ctrl+S", "dividir"),
            ("Ctrl+N", "fila"),
            ("Ctrl+D", "quitar"),
            ("Ctrl+A", "cuenta nueva"),
            ("Enter", "guardar"),
            ("Esc", "cerrar"),
        ]
    } else {
        &[
            ("a", "nueva"),
            ("e", "editar"),
            ("r", "actualizar"),
            ("j/k", "mover"),
            ("q", "salir"),
        ]
    };

    let mut parts: Vec<Span<'static>> = Vec::new();
    for (idx, (key, action)) in hints.iter().enumerate() {
        if idx > 0 {
            parts.push(Span::raw("  "));
        }
        parts.push(Span::styled(
            (*key).to_string(),
            Style::default().fg(theme.accent),
        ));
        parts.push(Span::raw(format!(" {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
