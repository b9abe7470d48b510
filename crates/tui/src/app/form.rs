use chrono::NaiveDate;

use engine::{
    CatalogSnapshot, ExistingTransaction, FormState, PortfolioDirection, TypeChange,
};

use crate::ui::keymap::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Form fields in focus order. Some are only visible for certain types; see
/// [`FormModal::visible_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Description,
    Amount,
    Date,
    Type,
    Account,
    TransferAccount,
    Direction,
    Goal,
    Debt,
    Category,
    Budget,
    Splits,
    Tags,
    Receipts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitColumn {
    Category,
    Amount,
}

/// What the app must execute after the form handled a key.
#[derive(Debug)]
pub enum FormEffect {
    None,
    /// Run a [`TypeChange`] directive (clear/fetch the category list).
    TypeChanged(TypeChange),
    /// POST the new account name, then select the created id.
    CreateAccount(String),
    Submit,
    Close,
}

/// The open transaction form: engine state plus everything the terminal UI
/// needs to drive it (focus, prompts, in-flight fetch tokens).
#[derive(Debug)]
pub struct FormModal {
    pub mode: FormMode,
    pub form: FormState,
    pub catalogs: CatalogSnapshot,
    pub focus: FormField,
    pub split_row: usize,
    pub split_column: SplitColumn,
    pub error: Option<String>,
    pub advisory: Option<String>,
    /// Inline account-creation prompt, when open.
    pub account_prompt: Option<String>,
    /// Path input for queueing a receipt upload.
    pub receipt_input: String,
    /// Selected persisted receipt while focus is on the receipt list.
    pub receipt_row: usize,
    /// Liveness token of the in-flight category fetch; stale completions
    /// carrying another token are dropped.
    pub pending_fetch: Option<u64>,
    /// Category override to keep valid once the pending fetch lands.
    pub pending_override: Option<String>,
}

impl FormModal {
    pub fn create(catalogs: CatalogSnapshot, today: NaiveDate) -> Self {
        Self::with_form(FormMode::Create, FormState::new(today), catalogs)
    }

    pub fn edit(
        id: i64,
        existing: ExistingTransaction,
        catalogs: CatalogSnapshot,
        today: NaiveDate,
    ) -> Self {
        Self::with_form(FormMode::Edit(id), FormState::edit(existing, today), catalogs)
    }

    fn with_form(mode: FormMode, form: FormState, catalogs: CatalogSnapshot) -> Self {
        Self {
            mode,
            form,
            catalogs,
            focus: FormField::Description,
            split_row: 0,
            split_column: SplitColumn::Category,
            error: None,
            advisory: None,
            account_prompt: None,
            receipt_input: String::new(),
            receipt_row: 0,
            pending_fetch: None,
            pending_override: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Nueva transacción",
            FormMode::Edit(_) => "Editar transacción",
        }
    }

    /// Fields currently shown, in focus order, derived from the selected
    /// type's profile.
    pub fn visible_fields(&self) -> Vec<FormField> {
        let profile = self.form.profile(&self.catalogs);
        let mut fields = vec![
            FormField::Description,
            FormField::Amount,
            FormField::Date,
            FormField::Type,
            FormField::Account,
        ];
        if profile.is_transfer {
            fields.push(FormField::TransferAccount);
        }
        if profile.is_portfolio {
            fields.push(FormField::Direction);
        }
        if profile.needs_goal {
            fields.push(FormField::Goal);
        }
        if profile.needs_debt {
            fields.push(FormField::Debt);
        }
        if !self.form.is_transfer && self.form.split.is_none() {
            fields.push(FormField::Category);
        }
        fields.push(FormField::Budget);
        if self.form.split.is_some() {
            fields.push(FormField::Splits);
        }
        fields.push(FormField::Tags);
        fields.push(FormField::Receipts);
        fields
    }

    pub fn handle(&mut self, action: AppAction) -> FormEffect {
        match action {
            AppAction::Cancel => {
                if self.account_prompt.is_some() {
                    self.account_prompt = None;
                    FormEffect::None
                } else {
                    FormEffect::Close
                }
            }
            AppAction::NextField => {
                self.commit_tag_on_blur();
                self.advance_focus(1);
                FormEffect::None
            }
            AppAction::PrevField => {
                self.commit_tag_on_blur();
                self.advance_focus(-1);
                FormEffect::None
            }
            AppAction::Submit => self.handle_submit(),
            AppAction::Backspace => {
                self.handle_backspace();
                FormEffect::None
            }
            AppAction::Up => self.handle_vertical(-1),
            AppAction::Down => self.handle_vertical(1),
            AppAction::Left => {
                if self.focus == FormField::Splits {
                    self.split_column = SplitColumn::Category;
                }
                FormEffect::None
            }
            AppAction::Right => {
                if self.focus == FormField::Splits {
                    self.split_column = SplitColumn::Amount;
                }
                FormEffect::None
            }
            AppAction::ToggleSplit => {
                self.handle_toggle_split();
                FormEffect::None
            }
            AppAction::AddRow => {
                if let Some(split) = self.form.split.as_mut() {
                    split.add_row();
                    self.focus = FormField::Splits;
                    self.split_row = split.len() - 1;
                    self.split_column = SplitColumn::Category;
                }
                FormEffect::None
            }
            AppAction::Remove => {
                self.handle_remove();
                FormEffect::None
            }
            AppAction::NewAccount => {
                self.account_prompt = Some(String::new());
                FormEffect::None
            }
            AppAction::Input(ch) => {
                self.handle_input(ch);
                FormEffect::None
            }
            AppAction::Quit | AppAction::None => FormEffect::None,
        }
    }

    fn advance_focus(&mut self, delta: i32) {
        let fields = self.visible_fields();
        let len = fields.len() as i32;
        let current = fields
            .iter()
            .position(|field| *field == self.focus)
            .map(|idx| idx as i32)
            .unwrap_or(0);
        let next = (current + delta).rem_euclid(len) as usize;
        self.focus = fields[next];
        self.clamp_rows();
    }

    /// Keeps the focus on a visible field after type changes hide the old one.
    fn ensure_focus_visible(&mut self) {
        if !self.visible_fields().contains(&self.focus) {
            self.focus = FormField::Type;
        }
        self.clamp_rows();
    }

    fn clamp_rows(&mut self) {
        if let Some(split) = &self.form.split {
            self.split_row = self.split_row.min(split.len().saturating_sub(1));
        }
        let existing = self.form.receipts.existing.len();
        self.receipt_row = self.receipt_row.min(existing.saturating_sub(1));
    }

    fn commit_tag_on_blur(&mut self) {
        if self.focus == FormField::Tags && !self.form.tag_input.trim().is_empty() {
            self.form.commit_tag_input();
        }
    }

    fn handle_submit(&mut self) -> FormEffect {
        if let Some(name) = &self.account_prompt {
            let name = name.trim().to_string();
            if name.is_empty() {
                self.account_prompt = None;
                return FormEffect::None;
            }
            return FormEffect::CreateAccount(name);
        }
        if self.focus == FormField::Tags && !self.form.tag_input.trim().is_empty() {
            self.form.commit_tag_input();
            return FormEffect::None;
        }
        if self.focus == FormField::Receipts && !self.receipt_input.trim().is_empty() {
            let path = std::mem::take(&mut self.receipt_input);
            self.form.receipts.queue_upload(path.trim());
            return FormEffect::None;
        }
        FormEffect::Submit
    }

    fn handle_input(&mut self, ch: char) {
        if let Some(prompt) = self.account_prompt.as_mut() {
            prompt.push(ch);
            return;
        }
        match self.focus {
            FormField::Description => self.form.description.push(ch),
            FormField::Amount => self.form.amount_text.push(ch),
            FormField::Date => self.form.date_text.push(ch),
            FormField::Tags => {
                if ch == ',' {
                    self.form.commit_tag_input();
                } else {
                    self.form.tag_input.push(ch);
                }
            }
            FormField::Splits => {
                let row = self.split_row;
                let column = self.split_column;
                if let Some(target) = self.split_cell_mut(row) {
                    match column {
                        SplitColumn::Category => target.category.push(ch),
                        SplitColumn::Amount => target.amount_text.push(ch),
                    }
                }
            }
            FormField::Receipts => self.receipt_input.push(ch),
            _ => {}
        }
    }

    fn handle_backspace(&mut self) {
        if let Some(prompt) = self.account_prompt.as_mut() {
            prompt.pop();
            return;
        }
        match self.focus {
            FormField::Description => {
                self.form.description.pop();
            }
            FormField::Amount => {
                self.form.amount_text.pop();
            }
            FormField::Date => {
                self.form.date_text.pop();
            }
            FormField::Tags => self.form.tag_backspace(),
            FormField::Splits => {
                let row = self.split_row;
                let column = self.split_column;
                if let Some(target) = self.split_cell_mut(row) {
                    match column {
                        SplitColumn::Category => {
                            target.category.pop();
                        }
                        SplitColumn::Amount => {
                            target.amount_text.pop();
                        }
                    }
                }
            }
            FormField::Receipts => {
                self.receipt_input.pop();
            }
            _ => {}
        }
    }

    fn split_cell_mut(&mut self, row: usize) -> Option<&mut engine::SplitRow> {
        let split = self.form.split.as_mut()?;
        let local_id = split.rows().get(row)?.local_id;
        split.row_mut(local_id)
    }

    fn handle_toggle_split(&mut self) {
        if self.form.toggle_split(&self.catalogs) {
            if self.form.split.is_some() {
                self.focus = FormField::Splits;
                self.split_row = 0;
                self.split_column = SplitColumn::Category;
            } else {
                self.ensure_focus_visible();
            }
        } else {
            self.advisory = Some("Este tipo no permite dividir la transacción.".to_string());
        }
    }

    fn handle_remove(&mut self) {
        match self.focus {
            FormField::Splits => {
                if let Some(split) = self.form.split.as_mut() {
                    let id = split.rows().get(self.split_row).map(|row| row.local_id);
                    if let Some(id) = id {
                        split.remove_row(id);
                    }
                }
                self.clamp_rows();
            }
            FormField::Receipts => {
                let selected = self
                    .form
                    .receipts
                    .existing
                    .get(self.receipt_row)
                    .map(|receipt| receipt.id);
                if let Some(id) = selected {
                    self.form.receipts.toggle_delete(id);
                } else {
                    let pending = self.form.receipts.pending().len();
                    if pending > 0 {
                        self.form.receipts.remove_pending(pending - 1);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_vertical(&mut self, delta: i32) -> FormEffect {
        if self.account_prompt.is_some() {
            return FormEffect::None;
        }
        match self.focus {
            FormField::Type => {
                let options: Vec<i64> = self.catalogs.types.iter().map(|item| item.id).collect();
                let next = cycle_wrapping(self.form.type_id.as_ref(), &options, delta);
                if let Some(type_id) = next {
                    if self.form.type_id != Some(type_id) {
                        let change = self.form.set_type(type_id, &self.catalogs, None);
                        self.ensure_focus_visible();
                        return FormEffect::TypeChanged(change);
                    }
                }
                FormEffect::None
            }
            FormField::Category => {
                let next = cycle_optional(
                    self.form.category.as_ref(),
                    &self.catalogs.categories,
                    delta,
                );
                self.form.category = next;
                self.form.category_from_budget = false;
                FormEffect::None
            }
            FormField::Account => {
                let options: Vec<i64> =
                    self.catalogs.accounts.iter().map(|item| item.id).collect();
                self.form.account_id =
                    cycle_optional(self.form.account_id.as_ref(), &options, delta);
                FormEffect::None
            }
            FormField::TransferAccount => {
                let options: Vec<i64> =
                    self.catalogs.accounts.iter().map(|item| item.id).collect();
                self.form.transfer_account_id =
                    cycle_optional(self.form.transfer_account_id.as_ref(), &options, delta);
                FormEffect::None
            }
            FormField::Goal => {
                let options: Vec<i64> = self.catalogs.goals.iter().map(|item| item.id).collect();
                self.form.goal_id = cycle_optional(self.form.goal_id.as_ref(), &options, delta);
                FormEffect::None
            }
            FormField::Debt => {
                let options: Vec<i64> = self.catalogs.debts.iter().map(|item| item.id).collect();
                self.form.debt_id = cycle_optional(self.form.debt_id.as_ref(), &options, delta);
                FormEffect::None
            }
            FormField::Direction => {
                let options = [PortfolioDirection::Compra, PortfolioDirection::Venta];
                self.form.portfolio_direction =
                    cycle_wrapping(self.form.portfolio_direction.as_ref(), &options, delta);
                FormEffect::None
            }
            FormField::Budget => {
                let options: Vec<i64> = self
                    .catalogs
                    .budget_entries
                    .iter()
                    .map(|entry| entry.id)
                    .collect();
                let next = cycle_optional(self.form.budget_entry_id.as_ref(), &options, delta);
                match next {
                    Some(entry_id) => {
                        if let Some(entry) = self.catalogs.budget_entry(entry_id).cloned() {
                            let change = self.form.link_budget(&entry, &self.catalogs);
                            self.ensure_focus_visible();
                            return FormEffect::TypeChanged(change);
                        }
                        FormEffect::None
                    }
                    None => {
                        self.form.unlink_budget();
                        FormEffect::None
                    }
                }
            }
            FormField::Splits => {
                if let Some(split) = &self.form.split {
                    let len = split.len() as i32;
                    if len > 0 {
                        let next = (self.split_row as i32 + delta).rem_euclid(len);
                        self.split_row = next as usize;
                    }
                }
                FormEffect::None
            }
            FormField::Receipts => {
                let len = self.form.receipts.existing.len() as i32;
                if len > 0 {
                    let next = (self.receipt_row as i32 + delta).rem_euclid(len);
                    self.receipt_row = next as usize;
                }
                FormEffect::None
            }
            _ => FormEffect::None,
        }
    }
}

/// Cycles within `options`, never clearing the value.
fn cycle_wrapping<T: Clone + PartialEq>(current: Option<&T>, options: &[T], delta: i32) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let len = options.len() as i64;
    let next = match current.and_then(|value| options.iter().position(|opt| opt == value)) {
        None => {
            if delta >= 0 {
                0
            } else {
                len - 1
            }
        }
        Some(idx) => (idx as i64 + i64::from(delta)).rem_euclid(len),
    };
    Some(options[next as usize].clone())
}

/// Cycles through `options` with an empty position at both ends, so the
/// field can be cleared by stepping past the edges.
fn cycle_optional<T: Clone + PartialEq>(current: Option<&T>, options: &[T], delta: i32) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    match current.and_then(|value| options.iter().position(|opt| opt == value)) {
        None => {
            if delta >= 0 {
                options.first().cloned()
            } else {
                options.last().cloned()
            }
        }
        Some(idx) => {
            if delta >= 0 {
                options.get(idx + 1).cloned()
            } else if idx == 0 {
                None
            } else {
                options.get(idx - 1).cloned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_cycle_clears_at_the_edges() {
        let options = vec![1, 2, 3];
        assert_eq!(cycle_optional(None, &options, 1), Some(1));
        assert_eq!(cycle_optional(Some(&3), &options, 1), None);
        assert_eq!(cycle_optional(Some(&1), &options, -1), None);
        assert_eq!(cycle_optional(None, &options, -1), Some(3));
    }

    #[test]
    fn wrapping_cycle_never_clears() {
        let options = vec![10, 20];
        assert_eq!(cycle_wrapping(Some(&20), &options, 1), Some(10));
        assert_eq!(cycle_wrapping(Some(&10), &options, -1), Some(20));
        assert_eq!(cycle_wrapping(None, &options, 1), Some(10));
    }
}
