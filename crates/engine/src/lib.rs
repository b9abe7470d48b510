//! Transaction form reconciliation engine.
//!
//! Pure, I/O-free state machine behind the transaction entry form: field
//! dependencies derived from the selected type, split reconciliation, tag
//! normalization, budget linkage, the edit-mode dirty check and submission
//! assembly. Catalogs are borrowed, never fetched; the frontend performs the
//! network work and feeds results back in through [`TypeChange`] directives
//! and [`install_categories`].

pub use catalog::{BudgetEntry, CatalogItem, CatalogSnapshot, install_categories};
pub use error::{FormError, FormResult, SplitDifference};
pub use form::{DEBTS_ADVISORY, ExistingTransaction, FormState, GOALS_ADVISORY};
pub use money::MoneyCents;
pub use normalize::{fold, normalize_tag};
pub use receipts::{PendingReceipt, ReceiptRef, ReceiptStaging};
pub use splits::{SPLIT_TOLERANCE, SplitPart, SplitRow, SplitState};
pub use submit::TransactionDraft;
pub use tags::{MAX_SUGGESTIONS, TagSet, suggestions};
pub use types::{PortfolioDirection, SPLIT_CATEGORY, TRANSFER_CATEGORY, TypeChange, TypeProfile};

mod catalog;
mod error;
mod form;
mod money;
mod normalize;
mod receipts;
mod splits;
mod submit;
mod tags;
mod types;
