//! POI category synonym table.
//!
//! Maps free-text tokens — brand names, colloquial phrases, cuisine words —
//! onto the closed [`PoiCategory`] taxonomy. A built-in table ships with the
//! binary; deployments can override it with a YAML file of the same shape.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::poi::PoiCategory;

/// Built-in synonym table. Tokens are lowercase; multi-word tokens are
/// matched as substrings of the lowercased query text.
const BUILTIN_TABLE: &str = r"
synonyms:
  - { token: coffee, category: cafe }
  - { token: coffee shop, category: cafe }
  - { token: coffee shops, category: cafe }
  - { token: espresso, category: cafe }
  - { token: starbucks, category: cafe }
  - { token: dunkin, category: cafe }
  - { token: food, category: restaurant }
  - { token: dinner, category: restaurant }
  - { token: lunch, category: restaurant }
  - { token: eat, category: restaurant }
  - { token: fast food, category: fast_food }
  - { token: burger, category: fast_food }
  - { token: mcdonald's, category: fast_food }
  - { token: mcdonalds, category: fast_food }
  - { token: taco bell, category: fast_food }
  - { token: drive-thru, category: fast_food }
  - { token: pub, category: bar }
  - { token: drinks, category: bar }
  - { token: beer, category: bar }
  - { token: grocery, category: supermarket }
  - { token: grocery store, category: supermarket }
  - { token: groceries, category: supermarket }
  - { token: walmart, category: supermarket }
  - { token: kroger, category: supermarket }
  - { token: drugstore, category: pharmacy }
  - { token: cvs, category: pharmacy }
  - { token: walgreens, category: pharmacy }
  - { token: er, category: hospital }
  - { token: emergency room, category: hospital }
  - { token: clinic, category: hospital }
  - { token: playground, category: park }
  - { token: green space, category: park }
  - { token: gas, category: fuel }
  - { token: gas station, category: fuel }
  - { token: petrol, category: fuel }
  - { token: shell, category: fuel }
  - { token: cash machine, category: atm }
  - { token: motel, category: hotel }
  - { token: place to stay, category: hotel }
  - { token: workout, category: gym }
  - { token: fitness, category: gym }
  - { token: movie theater, category: cinema }
  - { token: movies, category: cinema }
  - { token: park my car, category: parking }
  - { token: parking lot, category: parking }
cuisines:
  - italian
  - mexican
  - chinese
  - thai
  - indian
  - japanese
  - sushi
  - vietnamese
  - korean
  - greek
  - mediterranean
  - french
  - bbq
  - pizza
  - vegan
  - vegetarian
";

#[derive(Debug, Clone, Deserialize)]
pub struct SynonymEntry {
    pub token: String,
    pub category: PoiCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTable {
    synonyms: Vec<SynonymEntry>,
    cuisines: Vec<String>,
}

impl CategoryTable {
    /// The compiled-in default table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded YAML is malformed — a build-time defect caught
    /// by the test suite, not a runtime condition.
    #[must_use]
    pub fn builtin() -> Self {
        serde_yaml::from_str(BUILTIN_TABLE).expect("builtin category table must parse")
    }

    /// Exact-token lookup against canonical category names and synonyms.
    #[must_use]
    pub fn category_for(&self, token: &str) -> Option<PoiCategory> {
        let token = token.to_lowercase();
        if let Ok(cat) = token.parse::<PoiCategory>() {
            return Some(cat);
        }
        self.synonyms
            .iter()
            .find(|s| s.token == token)
            .map(|s| s.category)
    }

    /// All matchable phrases: canonical names first, then synonyms.
    ///
    /// Canonical names come first so a direct category word ("cafe") wins a
    /// position tie against a synonym match at the same offset.
    pub fn phrases(&self) -> impl Iterator<Item = (&str, PoiCategory)> + '_ {
        PoiCategory::ALL
            .iter()
            .map(|c| (c.as_str(), *c))
            .chain(self.synonyms.iter().map(|s| (s.token.as_str(), s.category)))
    }

    #[must_use]
    pub fn cuisines(&self) -> &[String] {
        &self.cuisines
    }

    /// First cuisine word present in the lowercased text, if any.
    #[must_use]
    pub fn find_cuisine(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.cuisines
            .iter()
            .filter(|c| contains_word(&lower, c))
            .min_by_key(|c| lower.find(c.as_str()).unwrap_or(usize::MAX))
            .map(String::as_str)
    }
}

/// Substring match constrained to word boundaries on both sides.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let before_ok = abs == 0
            || !haystack[..abs]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = !haystack[abs + needle.len()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        if before_ok && after_ok {
            return true;
        }
        start = abs + needle.len().max(1);
    }
    false
}

/// Load a synonym table override from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty or duplicate tokens).
pub fn load_category_table(path: &Path) -> Result<CategoryTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoryFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let table: CategoryTable =
        serde_yaml::from_str(&content).map_err(ConfigError::CategoryFileParse)?;

    validate_table(&table)?;

    Ok(table)
}

fn validate_table(table: &CategoryTable) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in &table.synonyms {
        let token = entry.token.trim();
        if token.is_empty() {
            return Err(ConfigError::Validation(
                "synonym token must be non-empty".to_string(),
            ));
        }
        if token != entry.token || token.to_lowercase() != entry.token {
            return Err(ConfigError::Validation(format!(
                "synonym token must be trimmed lowercase: '{}'",
                entry.token
            )));
        }
        if !seen.insert(entry.token.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate synonym token: '{}'",
                entry.token
            )));
        }
    }
    Ok(())
}
