use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Folds text for comparison: Unicode-decomposed, combining marks stripped,
/// lowercased. `"Ahorro programado"` and `"ahórro PROGRAMADO"` fold equal.
#[must_use]
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        for lower in ch.to_lowercase() {
            out.push(lower);
        }
    }
    out
}

/// Display form of a tag: leading `#` characters stripped, trimmed.
///
/// Case is preserved for display; equality uses [`fold`] on this form.
#[must_use]
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_string()
}

/// Comparison key of a tag.
#[must_use]
pub fn tag_key(raw: &str) -> String {
    fold(&normalize_tag(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_diacritics_and_case() {
        assert_eq!(fold("Transferencia Interna"), "transferencia interna");
        assert_eq!(fold("Múltiples categorías"), "multiples categorias");
        assert_eq!(fold("AHÓRRO"), "ahorro");
    }

    #[test]
    fn tag_normalization() {
        assert_eq!(normalize_tag("  ##viaje "), "viaje");
        assert_eq!(tag_key("#Viaje"), tag_key("VIAJE"));
        assert_ne!(tag_key("viaje"), tag_key("viajes"));
    }
}
