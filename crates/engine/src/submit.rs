use chrono::NaiveDate;

use crate::{
    CatalogSnapshot, FormError, FormResult, FormState, MoneyCents, PortfolioDirection,
    SPLIT_CATEGORY, SplitPart, TRANSFER_CATEGORY, TypeProfile,
};

/// Validated submission payload, ready to be mapped onto the wire schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub account_id: i64,
    pub type_label: String,
    pub category: String,
    pub goal_id: Option<i64>,
    pub debt_id: Option<i64>,
    pub budget_entry_id: Option<i64>,
    pub is_transfer: bool,
    pub transfer_account_id: Option<i64>,
    pub splits: Vec<SplitPart>,
    pub tags: Vec<String>,
    pub portfolio_direction: Option<PortfolioDirection>,
}

impl FormState {
    /// Validates the whole form and assembles the submission payload.
    ///
    /// Edit mode is additionally guarded by the no-changes check, before any
    /// field validation; nothing here touches the network.
    pub fn build_submission(&self, catalogs: &CatalogSnapshot) -> FormResult<TransactionDraft> {
        if self.is_edit() && !self.has_changes() {
            return Err(FormError::NoChanges);
        }
        self.assemble(catalogs)
    }

    /// Field validation and payload assembly, without the edit-mode guard.
    ///
    /// Checks run in a fixed order and report one blocking message at a
    /// time: type, amount, date, direction, account, goal/debt, category,
    /// transfer target, split reconciliation.
    pub fn assemble(&self, catalogs: &CatalogSnapshot) -> FormResult<TransactionDraft> {
        let type_id = self.type_id.ok_or(FormError::MissingType)?;
        let type_label = catalogs
            .type_label(type_id)
            .ok_or(FormError::MissingType)?
            .to_string();
        let profile = TypeProfile::from_label(&type_label);

        let amount = self.amount()?;

        let date = self.date()?;
        if date > self.today() {
            return Err(FormError::FutureDate);
        }

        if profile.is_portfolio && self.portfolio_direction.is_none() {
            return Err(FormError::MissingDirection);
        }

        let account_id = self.account_id.ok_or(FormError::MissingAccount)?;

        if profile.needs_goal && self.goal_id.is_none() {
            return Err(FormError::MissingGoal);
        }
        if profile.needs_debt && self.debt_id.is_none() {
            return Err(FormError::MissingDebt);
        }

        if !self.is_transfer
            && self.split.is_none()
            && self.category.is_none()
            && self.budget_entry_id.is_none()
        {
            return Err(FormError::MissingCategory);
        }

        let transfer_account_id = if self.is_transfer {
            let target = self
                .transfer_account_id
                .ok_or(FormError::MissingTransferAccount)?;
            if target == account_id {
                return Err(FormError::SameTransferAccount);
            }
            Some(target)
        } else {
            None
        };

        let splits = match &self.split {
            Some(split) => split.reconcile(amount)?,
            None => Vec::new(),
        };

        // Category precedence: transfer sentinel, split sentinel, linked
        // budget's category, then the user's selection.
        let category = if self.is_transfer {
            TRANSFER_CATEGORY.to_string()
        } else if self.split.is_some() {
            SPLIT_CATEGORY.to_string()
        } else if let Some(entry) = self.budget_entry_id.and_then(|id| catalogs.budget_entry(id)) {
            entry.category.clone()
        } else {
            self.category.clone().ok_or(FormError::MissingCategory)?
        };

        Ok(TransactionDraft {
            description: self.description.trim().to_string(),
            amount,
            date,
            account_id,
            type_label,
            category,
            goal_id: self.goal_id,
            debt_id: self.debt_id,
            budget_entry_id: self.budget_entry_id,
            is_transfer: self.is_transfer,
            transfer_account_id,
            splits,
            tags: self.tags.labels().to_vec(),
            portfolio_direction: self.portfolio_direction,
        })
    }
}
