use std::collections::BTreeSet;

use crate::normalize::{normalize_tag, tag_key};

/// Maximum number of tag suggestions offered for the current input.
pub const MAX_SUGGESTIONS: usize = 8;

/// Deduplicated, insertion-ordered free-text labels.
///
/// Two tags are equivalent when their normalized forms (leading `#` stripped,
/// trimmed, case-folded) are equal; the first spelling wins and insertion
/// order is preserved for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    #[must_use]
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for label in labels {
            set.add(label.as_ref());
        }
        set
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// True if an equivalent tag is already selected.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        let needle = tag_key(raw);
        self.tags.iter().any(|tag| tag_key(tag) == needle)
    }

    /// Adds a tag unless it is blank or an equivalent one exists.
    /// Returns whether it was inserted.
    pub fn add(&mut self, raw: &str) -> bool {
        let display = normalize_tag(raw);
        if display.is_empty() || self.contains(&display) {
            return false;
        }
        self.tags.push(display);
        true
    }

    /// Removes the most recently added tag (Backspace on an empty input).
    pub fn pop(&mut self) -> Option<String> {
        self.tags.pop()
    }

    pub fn remove(&mut self, raw: &str) -> bool {
        let needle = tag_key(raw);
        let before = self.tags.len();
        self.tags.retain(|tag| tag_key(tag) != needle);
        self.tags.len() != before
    }

    /// Order-independent comparison keys, for the dirty-check.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<String> {
        self.tags.iter().map(|tag| tag_key(tag)).collect()
    }
}

/// Suggestions for a partial input: substring-matched against the known
/// pool, already-selected tags excluded, capped at [`MAX_SUGGESTIONS`].
#[must_use]
pub fn suggestions<'a>(pool: &'a [String], selected: &TagSet, partial: &str) -> Vec<&'a str> {
    let needle = tag_key(partial);
    pool.iter()
        .filter(|tag| !selected.contains(tag))
        .filter(|tag| needle.is_empty() || tag_key(tag).contains(&needle))
        .map(String::as_str)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_equivalent_duplicates() {
        let mut tags = TagSet::default();
        assert!(tags.add("#Viaje"));
        assert!(!tags.add("viaje"));
        assert!(!tags.add("  VIAJE "));
        assert!(tags.add("trabajo"));
        assert_eq!(tags.labels(), ["Viaje", "trabajo"]);
    }

    #[test]
    fn blank_input_is_not_a_tag() {
        let mut tags = TagSet::default();
        assert!(!tags.add("   "));
        assert!(!tags.add("##"));
        assert!(tags.is_empty());
    }

    #[test]
    fn suggestions_exclude_selected_and_cap() {
        let pool: Vec<String> = (0..12).map(|i| format!("tag{i}")).collect();
        let selected = TagSet::from_labels(["tag0"]);

        let all = suggestions(&pool, &selected, "");
        assert_eq!(all.len(), MAX_SUGGESTIONS);
        assert!(!all.contains(&"tag0"));

        let filtered = suggestions(&pool, &selected, "#TAG1");
        assert_eq!(filtered, ["tag1", "tag10", "tag11"]);
    }
}
