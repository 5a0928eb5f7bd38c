use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// A snapshot is balanced when |sum| is within this many cents of zero.
    pub balance_tolerance_cents: i64,
    /// Two amounts for the same account are UNCHANGED within this many cents.
    pub match_tolerance_cents: i64,
    /// How many rows from the top are searched for the header row.
    pub header_scan_rows: usize,
    /// Tokens forced to uppercase in derived descriptions.
    pub abbreviations: Vec<String>,
    /// Default size of the variance ranking handed to insight consumers.
    pub top_n: usize,
    pub columns: ColumnKeywords,
    pub rename: RenameConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            balance_tolerance_cents: 1,
            match_tolerance_cents: 1,
            header_scan_rows: 50,
            abbreviations: ["PNC", "LLC", "INC", "USA", "LLP", "LTD", "IRS", "VAT"]
                .into_iter()
                .map(String::from)
                .collect(),
            top_n: 10,
            columns: ColumnKeywords::default(),
            rename: RenameConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Header keywords
// ---------------------------------------------------------------------------

/// Header text fragments (case-insensitive containment) that assign a column
/// its role. A header cell matching any fragment marks the header row.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnKeywords {
    pub account: Vec<String>,
    pub description: Vec<String>,
    pub amount: Vec<String>,
    pub debit: Vec<String>,
    pub credit: Vec<String>,
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        Self {
            account: vec!["account".into()],
            description: vec!["description".into()],
            amount: vec!["amount".into()],
            debit: vec!["debit".into()],
            credit: vec!["credit".into()],
        }
    }
}

impl ColumnKeywords {
    /// All keywords in role precedence order.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.description
            .iter()
            .chain(&self.debit)
            .chain(&self.credit)
            .chain(&self.amount)
            .chain(&self.account)
    }
}

// ---------------------------------------------------------------------------
// Rename detection
// ---------------------------------------------------------------------------

/// Year-over-year rename detection settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenameConfig {
    /// Minimum similarity for an unmatched A/B pair to become RENAMED.
    pub threshold: f64,
    pub metric: SimilarityMetric,
    /// Among equal scores, prefer the pair with the closer amounts.
    pub amount_tie_break: bool,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            metric: SimilarityMetric::TokenOverlap,
            amount_tie_break: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Dice coefficient over word tokens.
    #[default]
    TokenOverlap,
    /// Normalized Levenshtein ratio over the whole description.
    EditDistance,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.balance_tolerance_cents < 0 || self.match_tolerance_cents < 0 {
            return Err(ReconError::ConfigValidation(
                "tolerances must not be negative".into(),
            ));
        }

        if self.header_scan_rows == 0 {
            return Err(ReconError::ConfigValidation(
                "header_scan_rows must be at least 1".into(),
            ));
        }

        let c = &self.columns;
        for (role, words) in [
            ("account", &c.account),
            ("description", &c.description),
            ("amount", &c.amount),
            ("debit", &c.debit),
            ("credit", &c.credit),
        ] {
            if words.iter().any(|w| w.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{role} contains an empty keyword"
                )));
            }
        }
        if c.account.is_empty() {
            return Err(ReconError::ConfigValidation(
                "columns.account must contain at least one keyword".into(),
            ));
        }

        if self.top_n == 0 {
            return Err(ReconError::ConfigValidation("top_n must be at least 1".into()));
        }

        let t = self.rename.threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "rename.threshold must be in (0, 1], got {t}"
            )));
        }

        Ok(())
    }

    /// Whether `token` (compared case-insensitively) is on the abbreviation list.
    pub fn is_abbreviation(&self, token: &str) -> bool {
        self.abbreviations
            .iter()
            .any(|a| a.eq_ignore_ascii_case(token))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_default() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.rename.threshold, 0.6);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn parse_overrides() {
        let input = r#"
balance_tolerance_cents = 5
abbreviations = ["PNC", "LLC", "FICA"]
top_n = 25

[rename]
threshold = 0.75
metric = "edit_distance"
amount_tie_break = false
"#;
        let config = EngineConfig::from_toml(input).unwrap();
        assert_eq!(config.balance_tolerance_cents, 5);
        assert_eq!(config.match_tolerance_cents, 1);
        assert!(config.is_abbreviation("fica"));
        assert!(!config.is_abbreviation("VAT"));
        assert_eq!(config.top_n, 25);
        assert_eq!(config.rename.threshold, 0.75);
        assert_eq!(config.rename.metric, SimilarityMetric::EditDistance);
        assert!(!config.rename.amount_tie_break);
    }

    #[test]
    fn reject_unknown_metric() {
        let input = "[rename]\nmetric = \"soundex\"\n";
        let err = EngineConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_key() {
        let err = EngineConfig::from_toml("treshold = 0.5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let err = EngineConfig::from_toml("[rename]\nthreshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("rename.threshold"));

        let err = EngineConfig::from_toml("[rename]\nthreshold = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("rename.threshold"));
    }

    #[test]
    fn column_aliases_extend_without_code_change() {
        let input = r#"
[columns]
account = ["account", "gl code"]
amount = ["amount", "balance"]
"#;
        let config = EngineConfig::from_toml(input).unwrap();
        assert_eq!(config.columns.amount, vec!["amount", "balance"]);
        assert_eq!(config.columns.debit, vec!["debit"]);
    }

    #[test]
    fn reject_empty_account_keywords() {
        let err = EngineConfig::from_toml("[columns]\naccount = []\n").unwrap_err();
        assert!(err.to_string().contains("columns.account"));
    }

    #[test]
    fn reject_zero_top_n() {
        let err = EngineConfig::from_toml("top_n = 0\n").unwrap_err();
        assert!(err.to_string().contains("top_n"));
    }

    #[test]
    fn toml_roundtrip_of_defaults() {
        let text = EngineConfig::default().to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), EngineConfig::default());
    }
}
