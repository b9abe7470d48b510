use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::{
    BudgetEntry, CatalogSnapshot, FormResult, MoneyCents, PortfolioDirection, ReceiptRef,
    ReceiptStaging, SPLIT_CATEGORY, SPLIT_TOLERANCE, SplitPart, SplitState, TRANSFER_CATEGORY,
    TagSet, TypeChange, TypeProfile,
    error::FormError,
};

/// Advisory shown when a goal-requiring type is selected with no goals yet.
pub const GOALS_ADVISORY: &str = "Necesitas crear una meta de ahorro primero para usar este tipo.";

/// Advisory shown when a debt-requiring type is selected with no debts yet.
pub const DEBTS_ADVISORY: &str = "Necesitas registrar una deuda primero para usar este tipo.";

/// Canonical fields of a persisted transaction, as loaded for editing.
///
/// The frontend maps the wire view into this (resolving the type label to a
/// catalog id) before handing it to [`FormState::edit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingTransaction {
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub type_id: Option<i64>,
    pub category: Option<String>,
    pub account_id: Option<i64>,
    pub goal_id: Option<i64>,
    pub debt_id: Option<i64>,
    pub budget_entry_id: Option<i64>,
    pub is_transfer: bool,
    pub transfer_account_id: Option<i64>,
    pub portfolio_direction: Option<PortfolioDirection>,
    pub splits: Vec<SplitPart>,
    pub tags: Vec<String>,
    pub receipts: Vec<ReceiptRef>,
}

/// Mutable state of the transaction entry form.
///
/// Owns every user-entered field for the lifetime of the modal. Catalogs are
/// borrowed per call; asynchronous consequences of a mutation (category
/// fetches) come back to the caller as [`TypeChange`] directives.
#[derive(Debug, Clone)]
pub struct FormState {
    pub description: String,
    pub amount_text: String,
    /// `YYYY-MM-DD`, as typed.
    pub date_text: String,
    pub type_id: Option<i64>,
    pub category: Option<String>,
    /// The category came from a linked budget entry, not the dropdown.
    pub category_from_budget: bool,
    pub account_id: Option<i64>,
    pub goal_id: Option<i64>,
    pub debt_id: Option<i64>,
    pub budget_entry_id: Option<i64>,
    pub is_transfer: bool,
    pub transfer_account_id: Option<i64>,
    pub portfolio_direction: Option<PortfolioDirection>,
    /// `Some` while split mode is active.
    pub split: Option<SplitState>,
    pub tags: TagSet,
    /// Partial tag text not yet committed.
    pub tag_input: String,
    pub receipts: ReceiptStaging,
    today: NaiveDate,
    initial: Option<Snapshot>,
}

impl FormState {
    /// Blank form for creating a transaction, dated today.
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            description: String::new(),
            amount_text: String::new(),
            date_text: today.format("%Y-%m-%d").to_string(),
            type_id: None,
            category: None,
            category_from_budget: false,
            account_id: None,
            goal_id: None,
            debt_id: None,
            budget_entry_id: None,
            is_transfer: false,
            transfer_account_id: None,
            portfolio_direction: None,
            split: None,
            tags: TagSet::default(),
            tag_input: String::new(),
            receipts: ReceiptStaging::default(),
            today,
            initial: None,
        }
    }

    /// Form populated from an existing transaction, with the load-time
    /// snapshot captured for the dirty-check.
    #[must_use]
    pub fn edit(existing: ExistingTransaction, today: NaiveDate) -> Self {
        let mut form = Self::new(today);
        form.description = existing.description;
        form.amount_text = existing.amount.input_text();
        form.date_text = existing.date.format("%Y-%m-%d").to_string();
        form.type_id = existing.type_id;
        form.account_id = existing.account_id;
        form.goal_id = existing.goal_id;
        form.debt_id = existing.debt_id;
        form.budget_entry_id = existing.budget_entry_id;
        form.is_transfer = existing.is_transfer;
        form.transfer_account_id = existing.transfer_account_id;
        form.portfolio_direction = existing.portfolio_direction;
        form.tags = TagSet::from_labels(&existing.tags);
        form.receipts = ReceiptStaging::with_existing(existing.receipts);
        if existing.is_transfer {
            form.category = Some(TRANSFER_CATEGORY.to_string());
        } else if existing.splits.is_empty() {
            form.category = existing.category;
            form.category_from_budget = existing.budget_entry_id.is_some();
        } else {
            form.split = Some(SplitState::from_parts(&existing.splits));
            form.category = Some(SPLIT_CATEGORY.to_string());
        }
        form.initial = Some(Snapshot::capture(&form));
        form
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.initial.is_some()
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Requirements of the currently selected type.
    #[must_use]
    pub fn profile(&self, catalogs: &CatalogSnapshot) -> TypeProfile {
        self.type_id
            .and_then(|id| catalogs.type_label(id))
            .map(TypeProfile::from_label)
            .unwrap_or_default()
    }

    /// Parsed, positive transaction total.
    pub fn amount(&self) -> FormResult<MoneyCents> {
        let amount: MoneyCents = self.amount_text.parse()?;
        if !amount.is_positive() {
            return Err(FormError::InvalidAmount);
        }
        Ok(amount)
    }

    /// Parsed calendar date.
    pub fn date(&self) -> FormResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date_text.trim(), "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate)
    }

    /// Selects a transaction type and resolves its field dependencies.
    ///
    /// Transfers force the category sentinel, invalidate the category list
    /// and leave transfer mode on; every other type asks the caller to fetch
    /// its scoped categories. Entering transfer or portfolio turns split mode
    /// off; fields no longer required by the new type are cleared so hidden
    /// values never reach the payload. `category_override` (from a budget
    /// link) survives the change and is echoed in the directive so it can be
    /// kept valid once the fetch lands.
    pub fn set_type(
        &mut self,
        type_id: i64,
        catalogs: &CatalogSnapshot,
        category_override: Option<&str>,
    ) -> TypeChange {
        self.type_id = Some(type_id);
        let profile = self.profile(catalogs);

        let mut change = TypeChange::default();

        if profile.is_transfer {
            self.is_transfer = true;
            self.split = None;
            self.category = Some(TRANSFER_CATEGORY.to_string());
            self.category_from_budget = false;
            change.clear_categories = true;
        } else {
            self.is_transfer = false;
            self.transfer_account_id = None;
            change.fetch_categories = Some(type_id);
            if profile.is_portfolio {
                self.split = None;
            }
            if self.split.is_some() {
                self.category = Some(SPLIT_CATEGORY.to_string());
                self.category_from_budget = false;
            } else if let Some(label) = category_override {
                self.category = Some(label.to_string());
                self.category_from_budget = true;
                change.category_override = Some(label.to_string());
            } else {
                self.category = None;
                self.category_from_budget = false;
            }
        }

        if !profile.is_portfolio {
            self.portfolio_direction = None;
        }
        if !profile.needs_goal {
            self.goal_id = None;
        }
        if !profile.needs_debt {
            self.debt_id = None;
        }

        if profile.needs_goal && catalogs.goals.is_empty() {
            change.advisory = Some(GOALS_ADVISORY.to_string());
        } else if profile.needs_debt && catalogs.debts.is_empty() {
            change.advisory = Some(DEBTS_ADVISORY.to_string());
        }

        change
    }

    /// Turns split mode on or off.
    ///
    /// Returns `false` (no-op) when the current type disallows splitting.
    /// Toggling off restores a linked budget's category; otherwise the
    /// sentinel is simply cleared.
    pub fn toggle_split(&mut self, catalogs: &CatalogSnapshot) -> bool {
        if self.split.is_some() {
            self.split = None;
            let budget_category = self
                .budget_entry_id
                .and_then(|id| catalogs.budget_entry(id))
                .map(|entry| entry.category.clone());
            self.category_from_budget = budget_category.is_some();
            self.category = budget_category;
            true
        } else {
            if !self.profile(catalogs).allows_split() {
                return false;
            }
            self.split = Some(SplitState::seeded());
            self.category = Some(SPLIT_CATEGORY.to_string());
            self.category_from_budget = false;
            true
        }
    }

    /// Links a budget entry, cascading into type and category selection.
    ///
    /// A matching transaction type switches the form to it (with the budget's
    /// category preserved as an override); otherwise only the category is
    /// overridden. Goal/debt ids declared by the entry carry over either way.
    pub fn link_budget(&mut self, entry: &BudgetEntry, catalogs: &CatalogSnapshot) -> TypeChange {
        self.budget_entry_id = Some(entry.id);
        let change = match catalogs.type_by_label(&entry.type_label) {
            Some(matched) => {
                let matched_id = matched.id;
                self.set_type(matched_id, catalogs, Some(&entry.category))
            }
            None => {
                if self.split.is_none() {
                    self.category = Some(entry.category.clone());
                    self.category_from_budget = true;
                }
                TypeChange::default()
            }
        };
        if entry.goal_id.is_some() {
            self.goal_id = entry.goal_id;
        }
        if entry.debt_id.is_some() {
            self.debt_id = entry.debt_id;
        }
        change
    }

    /// Drops the budget reference without touching fields derived from it.
    pub fn unlink_budget(&mut self) {
        self.budget_entry_id = None;
        self.category_from_budget = false;
    }

    /// Commits the pending tag input (Enter, comma, or blur).
    /// Duplicates are dropped silently; the input clears either way.
    pub fn commit_tag_input(&mut self) -> bool {
        let raw = std::mem::take(&mut self.tag_input);
        self.tags.add(&raw)
    }

    /// Backspace inside the tag input: edits the input, or removes the most
    /// recently added tag when the input is already empty.
    pub fn tag_backspace(&mut self) {
        if self.tag_input.pop().is_none() {
            self.tags.pop();
        }
    }

    #[must_use]
    pub fn tag_suggestions<'a>(&self, catalogs: &'a CatalogSnapshot) -> Vec<&'a str> {
        crate::tags::suggestions(&catalogs.known_tags, &self.tags, &self.tag_input)
    }

    /// Whether any compared field differs from the load-time snapshot.
    /// Always `true` in create mode.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        let Some(initial) = &self.initial else {
            return true;
        };
        let current = Snapshot::capture(self);
        current.description != initial.description
            || current.amount != initial.amount
            || current.date != initial.date
            || current.type_id != initial.type_id
            || current.category != initial.category
            || current.account_id != initial.account_id
            || current.goal_id != initial.goal_id
            || current.debt_id != initial.debt_id
            || current.budget_entry_id != initial.budget_entry_id
            || current.is_transfer != initial.is_transfer
            || current.transfer_account_id != initial.transfer_account_id
            || current.portfolio_direction != initial.portfolio_direction
            || current.tags != initial.tags
            || !splits_equal(current.splits.as_deref(), initial.splits.as_deref())
    }
}

/// Comparable projection of the form, frozen at load time in edit mode.
#[derive(Debug, Clone)]
struct Snapshot {
    description: String,
    amount: Option<MoneyCents>,
    date: String,
    type_id: Option<i64>,
    category: Option<String>,
    account_id: Option<i64>,
    goal_id: Option<i64>,
    debt_id: Option<i64>,
    budget_entry_id: Option<i64>,
    is_transfer: bool,
    transfer_account_id: Option<i64>,
    portfolio_direction: Option<PortfolioDirection>,
    tags: BTreeSet<String>,
    splits: Option<Vec<(String, Option<MoneyCents>)>>,
}

impl Snapshot {
    fn capture(form: &FormState) -> Self {
        Self {
            description: form.description.trim().to_string(),
            amount: form.amount_text.parse().ok(),
            date: form.date_text.trim().to_string(),
            type_id: form.type_id,
            category: form.category.clone(),
            account_id: form.account_id,
            goal_id: form.goal_id,
            debt_id: form.debt_id,
            budget_entry_id: form.budget_entry_id,
            is_transfer: form.is_transfer,
            transfer_account_id: form.transfer_account_id,
            portfolio_direction: form.portfolio_direction,
            tags: form.tags.keys(),
            splits: form.split.as_ref().map(split_projection),
        }
    }
}

/// Rows normalized to (trimmed category, parsed amount), sorted so the
/// comparison is order-independent.
fn split_projection(split: &SplitState) -> Vec<(String, Option<MoneyCents>)> {
    let mut rows: Vec<(String, Option<MoneyCents>)> = split
        .rows()
        .iter()
        .map(|row| (row.category.trim().to_string(), row.amount_text.parse().ok()))
        .collect();
    rows.sort();
    rows
}

/// Split lists are equal when pairwise categories match and amounts agree
/// within the reconciliation tolerance.
fn splits_equal(
    current: Option<&[(String, Option<MoneyCents>)]>,
    initial: Option<&[(String, Option<MoneyCents>)]>,
) -> bool {
    match (current, initial) {
        (None, None) => true,
        (Some(current), Some(initial)) => {
            current.len() == initial.len()
                && current.iter().zip(initial).all(|((ca, aa), (cb, ab))| {
                    ca == cb
                        && match (aa, ab) {
                            (Some(a), Some(b)) => (*a - *b).abs() <= SPLIT_TOLERANCE,
                            (None, None) => true,
                            _ => false,
                        }
                })
        }
        _ => false,
    }
}
