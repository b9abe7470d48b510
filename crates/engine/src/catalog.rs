use crate::{MoneyCents, normalize::fold};

/// One selectable entry of a reference catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: i64,
    pub label: String,
}

impl CatalogItem {
    #[must_use]
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Snapshot of a budget entry the form may link against.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    pub id: i64,
    pub category: String,
    /// Declared transaction-type label of the entry.
    pub type_label: String,
    pub goal_id: Option<i64>,
    pub debt_id: Option<i64>,
    pub planned: MoneyCents,
    pub actual: MoneyCents,
    pub remaining: MoneyCents,
    pub frequency: String,
}

/// Read-only reference data the form works against.
///
/// Fetched when the form opens and replaced wholesale on refresh. The form
/// never mutates it, with one exception: the type-scoped `categories` list,
/// which follows the selected type (see [`install_categories`]).
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub accounts: Vec<CatalogItem>,
    pub types: Vec<CatalogItem>,
    /// Category labels scoped to the currently selected type.
    pub categories: Vec<String>,
    pub goals: Vec<CatalogItem>,
    pub debts: Vec<CatalogItem>,
    pub budget_entries: Vec<BudgetEntry>,
    pub known_tags: Vec<String>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn type_label(&self, id: i64) -> Option<&str> {
        self.types
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.label.as_str())
    }

    /// Finds a transaction type whose label folds equal to `label`.
    #[must_use]
    pub fn type_by_label(&self, label: &str) -> Option<&CatalogItem> {
        let needle = fold(label);
        self.types.iter().find(|item| fold(&item.label) == needle)
    }

    #[must_use]
    pub fn account_label(&self, id: i64) -> Option<&str> {
        self.accounts
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.label.as_str())
    }

    #[must_use]
    pub fn budget_entry(&self, id: i64) -> Option<&BudgetEntry> {
        self.budget_entries.iter().find(|entry| entry.id == id)
    }
}

/// Installs a freshly fetched category list.
///
/// The list is replaced wholesale. A category override (typically from a
/// linked budget entry) missing from the backend's list is appended as a
/// synthetic entry so the selection stays valid.
pub fn install_categories(
    catalogs: &mut CatalogSnapshot,
    fetched: Vec<String>,
    override_label: Option<&str>,
) {
    catalogs.categories = fetched;
    if let Some(label) = override_label {
        let needle = fold(label);
        if !catalogs.categories.iter().any(|c| fold(c) == needle) {
            catalogs.categories.push(label.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_lookup_ignores_case_and_accents() {
        let catalogs = CatalogSnapshot {
            types: vec![CatalogItem::new(1, "Gasto"), CatalogItem::new(2, "Ahorro")],
            ..Default::default()
        };
        assert_eq!(catalogs.type_by_label("gásto").map(|t| t.id), Some(1));
        assert!(catalogs.type_by_label("Ingreso").is_none());
    }

    #[test]
    fn install_appends_missing_override() {
        let mut catalogs = CatalogSnapshot::default();
        install_categories(
            &mut catalogs,
            vec!["Comida".into(), "Transporte".into()],
            Some("Supermercado"),
        );
        assert_eq!(catalogs.categories.len(), 3);
        assert_eq!(catalogs.categories[2], "Supermercado");

        install_categories(&mut catalogs, vec!["Supermercado".into()], Some("supermercado"));
        assert_eq!(catalogs.categories, vec!["Supermercado".to_string()]);
    }
}
