use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod account {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Account {
        pub id: i64,
        pub name: String,
    }

    /// Request body for creating an account inline from the transaction form.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub id: i64,
    }
}

pub mod parameters {
    use super::*;

    /// A transaction type from `GET /parameters/transaction-types`.
    ///
    /// The `name` is the user-visible label; field requirements (goal, debt,
    /// transfer target, portfolio direction) are derived from it client-side.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionType {
        pub id: i64,
        pub name: String,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Goal {
        pub id: i64,
        pub name: String,
    }
}

pub mod debt {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Debt {
        pub id: i64,
        pub name: String,
    }
}

pub mod budget {
    use super::*;

    /// An active budget entry, as returned by
    /// `GET /budget?status=active&reference_date=YYYY-MM-DD`.
    ///
    /// Linking a transaction to an entry may override the transaction's
    /// type and category with the entry's own classification.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BudgetEntry {
        pub id: i64,
        pub category: String,
        /// Declared transaction-type label of the entry.
        #[serde(rename = "type")]
        pub kind: String,
        pub goal_id: Option<i64>,
        pub debt_id: Option<i64>,
        pub planned_amount: f64,
        pub actual_amount: f64,
        pub remaining_amount: f64,
        pub frequency: String,
    }
}

pub mod receipt {
    use super::*;

    /// An attachment already persisted on the backend.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Receipt {
        pub id: i64,
        pub filename: String,
        pub url: String,
        pub size_bytes: u64,
        pub uploaded_at: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptCreated {
        pub id: i64,
    }
}

pub mod transaction {
    use super::*;

    /// Buy/sell marker for portfolio movements.
    ///
    /// Serialized with the user-visible Spanish labels.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum PortfolioDirection {
        Compra,
        Venta,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Split {
        pub category: String,
        pub amount: f64,
    }

    /// Submit body for `POST /transactions` and `PUT /transactions/{id}`.
    ///
    /// `type` and `category` carry catalog labels; `*_id` fields carry
    /// backend ids. Dates travel as `YYYY-MM-DD`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionUpsert {
        pub description: String,
        pub amount: f64,
        pub date: NaiveDate,
        pub account_id: i64,
        #[serde(rename = "type")]
        pub kind: String,
        pub category: String,
        pub goal_id: Option<i64>,
        pub debt_id: Option<i64>,
        pub budget_entry_id: Option<i64>,
        pub is_transfer: bool,
        pub transfer_account_id: Option<i64>,
        pub splits: Vec<Split>,
        pub tags: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub portfolio_direction: Option<PortfolioDirection>,
        /// Optional idempotency key for safely retrying the same create request.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: i64,
    }

    /// A persisted transaction, as listed by `GET /transactions` and loaded
    /// into the form for editing.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub description: String,
        pub amount: f64,
        pub date: NaiveDate,
        pub account_id: i64,
        #[serde(rename = "type")]
        pub kind: String,
        pub category: String,
        pub goal_id: Option<i64>,
        pub debt_id: Option<i64>,
        pub budget_entry_id: Option<i64>,
        pub is_transfer: bool,
        pub transfer_account_id: Option<i64>,
        #[serde(default)]
        pub splits: Vec<Split>,
        #[serde(default)]
        pub tags: Vec<String>,
        pub portfolio_direction: Option<PortfolioDirection>,
        #[serde(default)]
        pub receipts: Vec<super::receipt::Receipt>,
    }
}
