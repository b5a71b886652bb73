use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::evaluation::{Formula, DEFAULT_FORMULA};
use crate::error::BitgaError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// Expression in `x` evaluated for every phenotype
    pub formula: String,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self { formula: DEFAULT_FORMULA.to_string() }
    }
}

impl ObjectiveConfig {
    pub fn build(&self) -> Result<Formula, BitgaError> {
        Formula::parse(&self.formula)
    }
}

impl ConfigSection for ObjectiveConfig {
    fn section_name() -> &'static str {
        "objective"
    }

    fn validate(&self) -> Result<(), BitgaError> {
        self.build().map(|_| ())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Objective".to_string(),
            fields: vec![FieldManifest::new(
                "formula",
                "string",
                serde_json::json!(DEFAULT_FORMULA),
                (None, None),
                "Function of x to optimize",
            )],
        }
    }
}
