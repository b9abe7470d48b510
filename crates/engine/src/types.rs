use crate::normalize::fold;

/// Category sentinel forced onto internal transfers.
pub const TRANSFER_CATEGORY: &str = "Transferencia interna";

/// Category sentinel shown while a transaction is split across categories.
pub const SPLIT_CATEGORY: &str = "Múltiples categorías";

/// Buy/sell marker required by portfolio transaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioDirection {
    Compra,
    Venta,
}

impl PortfolioDirection {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Compra => "Compra",
            Self::Venta => "Venta",
        }
    }

}

/// Field requirements derived from a transaction type's label.
///
/// The backend does not flag types; the frontend keys off the folded label,
/// so "Ahorro programado" and "ahórro" both require a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeProfile {
    pub needs_goal: bool,
    pub needs_debt: bool,
    pub is_transfer: bool,
    pub is_portfolio: bool,
}

impl TypeProfile {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let folded = fold(label);
        Self {
            needs_goal: folded.contains("ahorro"),
            needs_debt: folded.contains("deuda"),
            is_transfer: folded.contains("transferencia"),
            is_portfolio: folded.contains("portafolio"),
        }
    }

    /// Split mode cannot be combined with transfers or portfolio movements.
    #[must_use]
    pub fn allows_split(self) -> bool {
        !self.is_transfer && !self.is_portfolio
    }
}

/// What the caller must do after a type change or budget link.
///
/// The engine never performs I/O; category fetches and list clearing are
/// carried out by the frontend, which reports fetch results back through
/// [`crate::install_categories`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeChange {
    /// Fetch the category catalog scoped to this type id.
    pub fetch_categories: Option<i64>,
    /// Category label that must stay selectable once the fetch lands.
    pub category_override: Option<String>,
    /// The current type-scoped category list is no longer valid.
    pub clear_categories: bool,
    /// Non-blocking notice (e.g. the type requires a goal but none exist).
    pub advisory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_from_labels() {
        let savings = TypeProfile::from_label("Ahorro programado");
        assert!(savings.needs_goal);
        assert!(savings.allows_split());

        let transfer = TypeProfile::from_label("Transferencia interna");
        assert!(transfer.is_transfer);
        assert!(!transfer.allows_split());

        let portfolio = TypeProfile::from_label("Portafolio de inversión");
        assert!(portfolio.is_portfolio);
        assert!(!portfolio.allows_split());

        let debt = TypeProfile::from_label("Pago de deudas");
        assert!(debt.needs_debt);

        assert_eq!(TypeProfile::from_label("Gasto"), TypeProfile::default());
    }
}
