use crate::{
    FormError, FormResult, MoneyCents,
    error::SplitDifference,
};

/// Largest tolerated gap between the split sum and the total: one cent.
pub const SPLIT_TOLERANCE: MoneyCents = MoneyCents::new(1);

/// One split line: a category plus the amount text as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitRow {
    pub local_id: u64,
    pub category: String,
    pub amount_text: String,
}

/// A validated split line ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub category: String,
    pub amount: MoneyCents,
}

/// Split-mode state: the transaction divided across category/amount pairs.
///
/// Row ids are local to the form session and only exist so the UI can address
/// rows stably while the user adds and removes lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitState {
    rows: Vec<SplitRow>,
    next_id: u64,
}

impl SplitState {
    /// Fresh split state with one empty row, as seeded when the user turns
    /// split mode on.
    #[must_use]
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.add_row();
        state
    }

    /// Rebuilds split state from persisted parts (edit mode).
    #[must_use]
    pub fn from_parts(parts: &[SplitPart]) -> Self {
        let mut state = Self::default();
        for part in parts {
            let id = state.add_row();
            if let Some(row) = state.row_mut(id) {
                row.category = part.category.clone();
                row.amount_text = part.amount.input_text();
            }
        }
        state
    }

    #[must_use]
    pub fn rows(&self) -> &[SplitRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends an empty row and returns its local id.
    pub fn add_row(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(SplitRow {
            local_id: id,
            ..Default::default()
        });
        id
    }

    /// Removes a row. List mutation is free; an empty list only fails at
    /// submission time.
    pub fn remove_row(&mut self, local_id: u64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.local_id != local_id);
        self.rows.len() != before
    }

    pub fn row_mut(&mut self, local_id: u64) -> Option<&mut SplitRow> {
        self.rows.iter_mut().find(|row| row.local_id == local_id)
    }

    /// Sum of the rows that currently parse, for live feedback in the UI.
    #[must_use]
    pub fn partial_sum(&self) -> MoneyCents {
        self.rows
            .iter()
            .filter_map(|row| row.amount_text.parse::<MoneyCents>().ok())
            .fold(MoneyCents::ZERO, |acc, amount| acc + amount)
    }

    /// Validates every row and checks the sum against the transaction total.
    ///
    /// Each row needs a non-empty category and a positive amount; the sum
    /// must match `total` within [`SPLIT_TOLERANCE`], otherwise the exact
    /// difference is reported.
    pub fn reconcile(&self, total: MoneyCents) -> FormResult<Vec<SplitPart>> {
        if self.rows.is_empty() {
            return Err(FormError::EmptySplit);
        }

        let mut parts = Vec::with_capacity(self.rows.len());
        let mut sum = MoneyCents::ZERO;
        for row in &self.rows {
            let category = row.category.trim();
            if category.is_empty() {
                return Err(FormError::IncompleteSplit);
            }
            let amount: MoneyCents = row
                .amount_text
                .parse()
                .map_err(|_| FormError::IncompleteSplit)?;
            if !amount.is_positive() {
                return Err(FormError::IncompleteSplit);
            }
            sum += amount;
            parts.push(SplitPart {
                category: category.to_string(),
                amount,
            });
        }

        let difference = sum - total;
        if difference.abs() > SPLIT_TOLERANCE {
            return Err(FormError::SplitMismatch(SplitDifference(difference)));
        }

        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(rows: &[(&str, &str)]) -> SplitState {
        let mut state = SplitState::default();
        for (category, amount) in rows {
            let id = state.add_row();
            let row = state.row_mut(id).unwrap();
            row.category = (*category).to_string();
            row.amount_text = (*amount).to_string();
        }
        state
    }

    #[test]
    fn seeded_starts_with_one_empty_row() {
        let state = SplitState::seeded();
        assert_eq!(state.len(), 1);
        assert!(state.rows()[0].category.is_empty());
    }

    #[test]
    fn reconcile_accepts_exact_and_one_cent_off() {
        let total = MoneyCents::new(100_000);
        let exact = state_with(&[("Comida", "500"), ("Transporte", "500")]);
        assert_eq!(exact.reconcile(total).unwrap().len(), 2);

        let one_off = state_with(&[("Comida", "500.00"), ("Transporte", "499.99")]);
        assert!(one_off.reconcile(total).is_ok());
    }

    #[test]
    fn reconcile_rejects_mismatch_with_difference() {
        let total = MoneyCents::new(100_000);
        let short = state_with(&[("Comida", "500"), ("Transporte", "499")]);
        match short.reconcile(total) {
            Err(FormError::SplitMismatch(diff)) => assert_eq!(diff.0.cents(), -100),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn reconcile_rejects_incomplete_rows() {
        let total = MoneyCents::new(1000);
        let missing_category = state_with(&[("", "10")]);
        assert_eq!(
            missing_category.reconcile(total),
            Err(FormError::IncompleteSplit)
        );

        let zero_amount = state_with(&[("Comida", "0")]);
        assert_eq!(zero_amount.reconcile(total), Err(FormError::IncompleteSplit));

        assert_eq!(
            SplitState::default().reconcile(total),
            Err(FormError::EmptySplit)
        );
    }
}
