//! Deterministic lookup-table categorizer.
//!
//! Rules come from a small CSV:
//!
//! ```text
//! kind,pattern,category
//! creditor,Employer AG,Salary
//! debitor,Migros,Groceries
//! keyword,SBB,Transport
//! ```
//!
//! Priority: exact party match for the transaction's side > keyword in party
//! name or info > `Uncategorized`. No network, no fuzzy matching.

use crate::engine::{Categorizer, Category};
use crate::errors::Result;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Party that pays us (incoming money).
    Creditor,
    /// Party we pay (outgoing money).
    Debitor,
    /// Case-insensitive substring of party name or info.
    Keyword,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    kind: RuleKind,
    pattern: String,
    category: String,
}

#[derive(Debug, Default, Clone)]
pub struct RuleCategorizer {
    creditors: HashMap<String, String>,
    debitors: HashMap<String, String>,
    keywords: Vec<(String, String)>,
}

impl RuleCategorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening rules {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("loading rules {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut rules = Self::new();
        for (idx, row) in rdr.deserialize::<RuleRow>().enumerate() {
            let row = row.with_context(|| format!("rule row {}", idx + 1))?;
            if row.pattern.is_empty() || row.category.is_empty() {
                bail!("rule row {}: pattern and category must not be empty", idx + 1);
            }
            rules.add(row.kind, &row.pattern, &row.category);
        }
        debug!(
            creditors = rules.creditors.len(),
            debitors = rules.debitors.len(),
            keywords = rules.keywords.len(),
            "loaded categorization rules"
        );
        Ok(rules)
    }

    /// Later rules for the same party replace earlier ones; keywords are
    /// tried in insertion order.
    pub fn add(&mut self, kind: RuleKind, pattern: &str, category: &str) {
        let key = normalize(pattern);
        let category = category.trim().to_string();
        match kind {
            RuleKind::Creditor => {
                self.creditors.insert(key, category);
            }
            RuleKind::Debitor => {
                self.debitors.insert(key, category);
            }
            RuleKind::Keyword => self.keywords.push((key, category)),
        }
    }

    pub fn len(&self) -> usize {
        self.creditors.len() + self.debitors.len() + self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, party_name: &str, is_debtor: bool, info: &str) -> Option<&str> {
        let party = normalize(party_name);
        let side = if is_debtor {
            &self.debitors
        } else {
            &self.creditors
        };
        if let Some(category) = side.get(&party) {
            return Some(category.as_str());
        }

        let info = normalize(info);
        self.keywords
            .iter()
            .find(|(kw, _)| party.contains(kw.as_str()) || info.contains(kw.as_str()))
            .map(|(_, category)| category.as_str())
    }
}

impl Categorizer for RuleCategorizer {
    fn categorize(
        &self,
        party_name: &str,
        is_debtor: bool,
        _amount: &str,
        _date: &str,
        info: &str,
    ) -> anyhow::Result<Category> {
        Ok(self
            .lookup(party_name, is_debtor, info)
            .map(Category::new)
            .unwrap_or_else(Category::uncategorized))
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "\
kind,pattern,category
# salary
creditor,Employer AG,Salary
debitor,Migros,Groceries
debitor,Employer AG,Refund
keyword,sbb,Transport
";

    fn rules() -> RuleCategorizer {
        RuleCategorizer::from_reader(RULES.as_bytes()).unwrap()
    }

    #[test]
    fn party_match_respects_side() {
        let r = rules();
        let cat = |name, debtor| r.categorize(name, debtor, "-1.00", "2025-01-01", "").unwrap().name;
        assert_eq!(cat("employer  ag", false), "Salary");
        assert_eq!(cat("Employer AG", true), "Refund");
        assert_eq!(cat("MIGROS", true), "Groceries");
        // Migros is only a debitor rule
        assert_eq!(cat("Migros", false), "Uncategorized");
    }

    #[test]
    fn keyword_matches_name_or_info() {
        let r = rules();
        let by_name = r.categorize("SBB CFF FFS", true, "-5.00", "2025-01-01", "").unwrap();
        assert_eq!(by_name.name, "Transport");
        let by_info = r
            .categorize("Kiosk", true, "-5.00", "2025-01-01", "Ticket SBB Zürich")
            .unwrap();
        assert_eq!(by_info.name, "Transport");
    }

    #[test]
    fn no_match_is_sentinel() {
        let c = rules().categorize("Nobody", true, "-1.00", "2025-01-01", "").unwrap();
        assert!(c.is_uncategorized());
    }

    #[test]
    fn rejects_unknown_kind_and_blank_fields() {
        assert!(RuleCategorizer::from_reader("kind,pattern,category\nfuzzy,a,b\n".as_bytes()).is_err());
        assert!(RuleCategorizer::from_reader("kind,pattern,category\nkeyword,,b\n".as_bytes()).is_err());
    }

    #[test]
    fn counts_rules() {
        assert_eq!(rules().len(), 4);
        assert!(RuleCategorizer::new().is_empty());
    }
}
