//! The rule catalog: bare utility names mapped to the CSS rule each one emits.
//!
//! Catalogs are two-column CSV tables (`name,rule`). Every rule is stored split
//! into its selector and its declaration block so that variant builders can
//! re-synthesize selectors without slicing strings.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_CATALOG_CSV: &str = include_str!("catalog.csv");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read rule catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule catalog record: {0}")]
    Csv(#[from] csv::Error),

    #[error("rule catalog line {line}: empty rule name")]
    EmptyName { line: u64 },

    #[error("rule catalog line {line}: duplicate rule name '{name}'")]
    DuplicateName { name: String, line: u64 },

    #[error("rule catalog line {line}: rule for '{name}' is not shaped selector{{declarations}}")]
    MalformedRule { name: String, line: u64 },
}

/// One catalog entry, kept as the selector and declaration block it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRule {
    selector: String,
    declarations: String,
    /// Whitespace after the closing brace.
    trailing: String,
}

impl CatalogRule {
    pub fn parse(rule: &str) -> Option<Self> {
        let open = rule.find('{')?;
        let close = rule.rfind('}')?;
        let selector = &rule[..open];
        let trailing = &rule[close + 1..];
        if close < open || selector.trim().is_empty() || !trailing.trim().is_empty() {
            return None;
        }
        Some(Self {
            selector: selector.to_string(),
            declarations: rule[open + 1..close].to_string(),
            trailing: trailing.to_string(),
        })
    }

    pub fn declarations(&self) -> &str {
        &self.declarations
    }

    /// The rule text exactly as it appeared in the catalog.
    pub fn css(&self) -> String {
        format!("{}{{{}}}{}", self.selector, self.declarations, self.trailing)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    name: String,
    rule: String,
}

/// Immutable name -> rule mapping, loaded once and passed by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalog {
    rules: BTreeMap<String, CatalogRule>,
}

impl RuleCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_csv_str(BUILTIN_CATALOG_CSV)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_str(&text)
    }

    pub fn from_csv_str(text: &str) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let mut row = csv::StringRecord::new();
        let mut rules = BTreeMap::new();
        while reader.read_record(&mut row)? {
            let line = row.position().map(|pos| pos.line()).unwrap_or_default();
            let record: CatalogRecord = row.deserialize(Some(&headers))?;
            // Rule text is kept exactly as written; only the name is trimmed.
            let name = record.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::EmptyName { line });
            }
            let Some(rule) = CatalogRule::parse(&record.rule) else {
                return Err(CatalogError::MalformedRule { name, line });
            };
            if rules.contains_key(&name) {
                return Err(CatalogError::DuplicateName { name, line });
            }
            rules.insert(name, rule);
        }

        Ok(Self { rules })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut rules = BTreeMap::new();
        for (idx, (name, rule)) in entries.into_iter().enumerate() {
            let name = name.into();
            let line = idx as u64 + 1;
            if name.is_empty() {
                return Err(CatalogError::EmptyName { line });
            }
            let Some(parsed) = CatalogRule::parse(rule.as_ref()) else {
                return Err(CatalogError::MalformedRule { name, line });
            };
            if rules.insert(name.clone(), parsed).is_some() {
                return Err(CatalogError::DuplicateName { name, line });
            }
        }
        Ok(Self { rules })
    }

    pub fn get(&self, name: &str) -> Option<&CatalogRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
