use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use engine::MoneyCents;

use crate::{app::AppState, ui::theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if state.transactions.items.is_empty() {
        render_empty(frame, area, state, theme);
        return;
    }

    let items = state
        .transactions
        .items
        .iter()
        .map(|tx| {
            let date = tx.date.format("%d %b %Y").to_string();
            let amount = MoneyCents::from_decimal(tx.amount).to_string();
            let tags = if tx.tags.is_empty() {
                String::new()
            } else {
                format!(
                    "  {}",
                    tx.tags
                        .iter()
                        .map(|tag| format!("#{tag}"))
                        .collect::<Vec<_>>()
                        .join(" ")
                )
            };
            let transfer = if tx.is_transfer { "  ⇄" } else { "" };

            let text = format!(
                "{date}  {kind:<22} {amount:>12}  {category:<20} {description}{tags}{transfer}",
                kind = tx.kind,
                category = tx.category,
                description = tx.description,
            );
            ListItem::new(Line::from(text))
        })
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.transactions.selected));

    let list = List::new(items)
        .block(block(state, theme))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_empty(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let message = if state.transactions.error.is_some() {
        "No se pudieron cargar los movimientos. Pulsa r para reintentar."
    } else {
        "Sin movimientos todavía. Pulsa a para registrar el primero."
    };
    let content = Paragraph::new(Line::from(Span::styled(
        message,
        Style::default().fg(theme.dim),
    )))
    .block(block(state, theme))
    .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(content, area);
}

fn block<'a>(state: &'a AppState, theme: &Theme) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title("Transacciones");
    if let Some(err) = &state.transactions.error {
        block = block.title_bottom(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(theme.error),
        )));
    }
    block
}
