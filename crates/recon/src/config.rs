use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_THRESHOLD: i64 = 70;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Minimum score (0..=100) for a codename or token match.
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    /// Run the three fuzzy passes after the exact pass.
    #[serde(default = "default_true")]
    pub fuzzy: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "SideConfig::default_left")]
    pub left: SideConfig,
    #[serde(default = "SideConfig::default_right")]
    pub right: SideConfig,
    #[serde(default)]
    pub auxiliary: AuxiliaryConfig,
}

fn default_name() -> String {
    "document reconciliation".into()
}

fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            threshold: DEFAULT_THRESHOLD,
            fuzzy: true,
            case_sensitive: false,
            left: SideConfig::default_left(),
            right: SideConfig::default_right(),
            auxiliary: AuxiliaryConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SideConfig {
    /// Used in output file names and the summary.
    pub label: String,
    /// Name columns in priority order; the first non-empty value per row wins.
    pub name_columns: Vec<String>,
    /// Columns copied into fuzzy match rows.
    #[serde(default)]
    pub carry_columns: Vec<String>,
}

impl SideConfig {
    pub fn default_left() -> Self {
        Self {
            label: "salesforce".into(),
            name_columns: vec!["Document Title".into()],
            carry_columns: vec!["Opportunity Name".into(), "Fund".into()],
        }
    }

    pub fn default_right() -> Self {
        Self {
            label: "sharepoint".into(),
            name_columns: vec!["Name".into(), "FileLeafRef".into(), "Title".into()],
            carry_columns: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auxiliary cross-reference
// ---------------------------------------------------------------------------

/// Auxiliary cross-reference pass settings.
///
/// The pass bar is `max(threshold - threshold_offset, threshold_floor)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuxiliaryConfig {
    /// Left-side columns (e.g. an opportunity name) a codename may be
    /// extracted from when the left name itself has none.
    #[serde(default = "default_aux_columns")]
    pub columns: Vec<String>,
    #[serde(default = "default_aux_offset")]
    pub threshold_offset: i64,
    #[serde(default = "default_aux_floor")]
    pub threshold_floor: i64,
}

fn default_aux_columns() -> Vec<String> {
    vec!["Opportunity Name".into()]
}

fn default_aux_offset() -> i64 {
    10
}

fn default_aux_floor() -> i64 {
    60
}

impl Default for AuxiliaryConfig {
    fn default() -> Self {
        Self {
            columns: default_aux_columns(),
            threshold_offset: default_aux_offset(),
            threshold_floor: default_aux_floor(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !(0..=100).contains(&self.threshold) {
            return Err(ReconError::InvalidThreshold(self.threshold));
        }

        for (which, side) in [("left", &self.left), ("right", &self.right)] {
            if side.label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{which}: label must not be empty")));
            }
            if side.name_columns.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{which}: at least one name column is required"
                )));
            }
            if side.name_columns.iter().any(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{which}: name columns must not be empty"
                )));
            }
        }

        if self.left.label == self.right.label {
            return Err(ReconError::ConfigValidation(format!(
                "left and right labels must differ, both are '{}'",
                self.left.label
            )));
        }

        if self.auxiliary.threshold_offset < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "auxiliary.threshold_offset must not be negative, got {}",
                self.auxiliary.threshold_offset
            )));
        }
        if !(0..=100).contains(&self.auxiliary.threshold_floor) {
            return Err(ReconError::ConfigValidation(format!(
                "auxiliary.threshold_floor must be between 0 and 100, got {}",
                self.auxiliary.threshold_floor
            )));
        }

        Ok(())
    }

    /// Bar for the auxiliary cross-reference pass.
    pub fn auxiliary_threshold(&self) -> i64 {
        (self.threshold - self.auxiliary.threshold_offset).max(self.auxiliary.threshold_floor)
    }
}
