use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use engine::CatalogItem;

use crate::{
    app::{FormField, FormModal, SplitColumn},
    ui::theme::Theme,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, modal: &FormModal, theme: &Theme) {
    let lines = build_lines(modal, theme);

    let width = 76.min(area.width.saturating_sub(2)).max(40);
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let block = Block::default()
        .title(modal.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent));

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn build_lines(modal: &FormModal, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for field in modal.visible_fields() {
        match field {
            FormField::Description => lines.push(input_line(
                modal,
                theme,
                field,
                "Descripción",
                &modal.form.description,
            )),
            FormField::Amount => lines.push(input_line(
                modal,
                theme,
                field,
                "Monto",
                &modal.form.amount_text,
            )),
            FormField::Date => lines.push(input_line(
                modal,
                theme,
                field,
                "Fecha",
                &modal.form.date_text,
            )),
            FormField::Type => {
                let value = modal
                    .form
                    .type_id
                    .and_then(|id| modal.catalogs.type_label(id))
                    .unwrap_or("—");
                lines.push(option_line(modal, theme, field, "Tipo", value.to_string()));
            }
            FormField::Account => {
                let value = labeled(&modal.catalogs.accounts, modal.form.account_id);
                lines.push(option_line(modal, theme, field, "Cuenta", value));
            }
            FormField::TransferAccount => {
                let value = labeled(&modal.catalogs.accounts, modal.form.transfer_account_id);
                lines.push(option_line(modal, theme, field, "Cuenta destino", value));
            }
            FormField::Direction => {
                let value = modal
                    .form
                    .portfolio_direction
                    .map(|direction| direction.label().to_string())
                    .unwrap_or_else(|| "—".to_string());
                lines.push(option_line(modal, theme, field, "Dirección", value));
            }
            FormField::Goal => {
                let value = labeled(&modal.catalogs.goals, modal.form.goal_id);
                lines.push(option_line(modal, theme, field, "Meta", value));
            }
            FormField::Debt => {
                let value = labeled(&modal.catalogs.debts, modal.form.debt_id);
                lines.push(option_line(modal, theme, field, "Deuda", value));
            }
            FormField::Category => {
                let mut value = modal
                    .form
                    .category
                    .clone()
                    .unwrap_or_else(|| "—".to_string());
                if modal.form.category_from_budget {
                    value.push_str(" (del presupuesto)");
                }
                lines.push(option_line(modal, theme, field, "Categoría", value));
            }
            FormField::Budget => {
                let value = modal
                    .form
                    .budget_entry_id
                    .and_then(|id| modal.catalogs.budget_entry(id))
                    .map(|entry| {
                        format!(
                            "{} · {} · quedan {} ({})",
                            entry.category, entry.type_label, entry.remaining, entry.frequency
                        )
                    })
                    .unwrap_or_else(|| "—".to_string());
                lines.push(option_line(modal, theme, field, "Presupuesto", value));
            }
            FormField::Splits => render_splits(modal, theme, &mut lines),
            FormField::Tags => render_tags(modal, theme, &mut lines),
            FormField::Receipts => render_receipts(modal, theme, &mut lines),
        }
    }

    if let Some(name) = &modal.account_prompt {
        lines.push(Line::from(vec![
            Span::styled("Nueva cuenta: ", Style::default().fg(theme.accent)),
            Span::raw(format!("{name}▏")),
        ]));
    }

    if let Some(advisory) = &modal.advisory {
        lines.push(Line::from(Span::styled(
            advisory.clone(),
            Style::default().fg(theme.dim),
        )));
    }
    if let Some(error) = &modal.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(theme.error),
        )));
    }

    lines
}

fn marker(modal: &FormModal, field: FormField, theme: &Theme) -> Span<'static> {
    if modal.focus == field && modal.account_prompt.is_none() {
        Span::styled("» ", Style::default().fg(theme.accent))
    } else {
        Span::raw("  ")
    }
}

fn input_line(
    modal: &FormModal,
    theme: &Theme,
    field: FormField,
    label: &str,
    value: &str,
) -> Line<'static> {
    let focused = modal.focus == field && modal.account_prompt.is_none();
    let mut text = value.to_string();
    if focused {
        text.push('▏');
    }
    Line::from(vec![
        marker(modal, field, theme),
        Span::styled(format!("{label}: "), Style::default().fg(theme.dim)),
        Span::raw(text),
    ])
}

fn option_line(
    modal: &FormModal,
    theme: &Theme,
    field: FormField,
    label: &str,
    value: String,
) -> Line<'static> {
    let focused = modal.focus == field && modal.account_prompt.is_none();
    let value_style = if focused {
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    Line::from(vec![
        marker(modal, field, theme),
        Span::styled(format!("{label}: "), Style::default().fg(theme.dim)),
        Span::styled(value, value_style),
    ])
}

fn labeled(items: &[CatalogItem], id: Option<i64>) -> String {
    id.and_then(|id| {
        items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.label.clone())
    })
    .unwrap_or_else(|| "—".to_string())
}

fn render_splits(modal: &FormModal, theme: &Theme, lines: &mut Vec<Line<'static>>) {
    let Some(split) = &modal.form.split else {
        return;
    };
    let focused = modal.focus == FormField::Splits && modal.account_prompt.is_none();

    let total = modal.form.amount().ok();
    let sum = split.partial_sum();
    let summary = match total {
        Some(total) => format!("suma {} / total {}", sum, total),
        None => format!("suma {}", sum),
    };
    lines.push(Line::from(vec![
        marker(modal, FormField::Splits, theme),
        Span::styled("Divisiones: ", Style::default().fg(theme.dim)),
        Span::raw(summary),
    ]));

    for (idx, row) in split.rows().iter().enumerate() {
        let row_focused = focused && idx == modal.split_row;
        let category_style = cell_style(theme, row_focused, modal.split_column == SplitColumn::Category);
        let amount_style = cell_style(theme, row_focused, modal.split_column == SplitColumn::Amount);

        let category = if row.category.is_empty() {
            "(categoría)".to_string()
        } else {
            row.category.clone()
        };
        let amount = if row.amount_text.is_empty() {
            "(monto)".to_string()
        } else {
            row.amount_text.clone()
        };

        lines.push(Line::from(vec![
            Span::raw(format!("    {}. ", idx + 1)),
            Span::styled(format!("{category:<28}"), category_style),
            Span::raw(" "),
            Span::styled(amount, amount_style),
        ]));
    }
}

fn cell_style(theme: &Theme, row_focused: bool, column_focused: bool) -> Style {
    if row_focused && column_focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else if row_focused {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.dim)
    }
}

fn render_tags(modal: &FormModal, theme: &Theme, lines: &mut Vec<Line<'static>>) {
    let focused = modal.focus == FormField::Tags && modal.account_prompt.is_none();

    let selected = modal
        .form
        .tags
        .labels()
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ");
    let mut input = modal.form.tag_input.clone();
    if focused {
        input.push('▏');
    }

    lines.push(Line::from(vec![
        marker(modal, FormField::Tags, theme),
        Span::styled("Etiquetas: ", Style::default().fg(theme.dim)),
        Span::styled(selected, Style::default().fg(theme.accent)),
        Span::raw(if modal.form.tags.is_empty() { "" } else { " " }),
        Span::raw(input),
    ]));

    if focused {
        let suggestions = modal.form.tag_suggestions(&modal.catalogs);
        if !suggestions.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    Sugerencias: {}", suggestions.join(", ")),
                Style::default().fg(theme.dim),
            )));
        }
    }
}

fn render_receipts(modal: &FormModal, theme: &Theme, lines: &mut Vec<Line<'static>>) {
    let focused = modal.focus == FormField::Receipts && modal.account_prompt.is_none();
    let staging = &modal.form.receipts;

    let count = staging.existing.len() + staging.pending().len();
    lines.push(Line::from(vec![
        marker(modal, FormField::Receipts, theme),
        Span::styled("Recibos: ", Style::default().fg(theme.dim)),
        Span::raw(if count == 0 {
            "—".to_string()
        } else {
            count.to_string()
        }),
    ]));

    for (idx, receipt) in staging.existing.iter().enumerate() {
        let selected = focused && idx == modal.receipt_row;
        let mut text = format!(
            "    {} ({} KB)",
            receipt.filename,
            receipt.size_bytes / 1024
        );
        let style = if staging.is_delete_staged(receipt.id) {
            text.push_str(" · se eliminará");
            Style::default().fg(theme.error)
        } else if selected {
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    for pending in staging.pending() {
        lines.push(Line::from(Span::styled(
            format!("    + {}", pending.filename),
            Style::default().fg(theme.positive),
        )));
    }

    if focused {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled("Archivo: ", Style::default().fg(theme.dim)),
            Span::raw(format!("{}▏", modal.receipt_input)),
        ]));
    }
}
