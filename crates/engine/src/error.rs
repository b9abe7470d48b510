use std::fmt;

use thiserror::Error;

use crate::MoneyCents;

pub type FormResult<T> = Result<T, FormError>;

/// Blocking validation errors of the transaction form.
///
/// Surfaced one at a time, before any network call; the `#[error]` texts are
/// the exact user-facing messages.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Selecciona un tipo de transacción.")]
    MissingType,
    #[error("El monto debe ser un número mayor a cero.")]
    InvalidAmount,
    #[error("La fecha no es válida (usa AAAA-MM-DD).")]
    InvalidDate,
    #[error("La fecha no puede estar en el futuro.")]
    FutureDate,
    #[error("Selecciona la dirección del movimiento (Compra o Venta).")]
    MissingDirection,
    #[error("Selecciona una cuenta.")]
    MissingAccount,
    #[error("Este tipo requiere una meta de ahorro.")]
    MissingGoal,
    #[error("Este tipo requiere una deuda.")]
    MissingDebt,
    #[error("Selecciona una categoría o vincula un presupuesto.")]
    MissingCategory,
    #[error("Selecciona la cuenta destino de la transferencia.")]
    MissingTransferAccount,
    #[error("La cuenta destino debe ser distinta a la cuenta origen.")]
    SameTransferAccount,
    #[error("Agrega al menos una división.")]
    EmptySplit,
    #[error("Cada división necesita una categoría y un monto mayor a cero.")]
    IncompleteSplit,
    #[error("Las divisiones no cuadran con el total: {0}")]
    SplitMismatch(SplitDifference),
    #[error("No hay cambios para guardar.")]
    NoChanges,
}

/// Signed difference between the split sum and the transaction total
/// (`sum - total`), reported to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDifference(pub MoneyCents);

impl fmt::Display for SplitDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_negative() {
            write!(f, "faltan {} para llegar al total.", -self.0)
        } else {
            write!(f, "sobran {}.", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_names_exact_difference() {
        let short = FormError::SplitMismatch(SplitDifference(MoneyCents::new(-100)));
        assert_eq!(
            short.to_string(),
            "Las divisiones no cuadran con el total: faltan $1.00 para llegar al total."
        );

        let over = FormError::SplitMismatch(SplitDifference(MoneyCents::new(25)));
        assert!(over.to_string().contains("sobran $0.25"));
    }
}
