use super::{
    evolution::EvolutionConfig,
    objective::ObjectiveConfig,
    traits::{ConfigManifest, ConfigSection},
};
use crate::error::BitgaError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `BITGA_EVOLUTION__PRECISION=0.01`
pub const ENV_PREFIX: &str = "BITGA";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub objective: ObjectiveConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), BitgaError> {
        self.evolution.validate()?;
        self.objective.validate()?;
        Ok(())
    }

    /// Field listings for every section, in file order
    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![self.evolution.to_manifest(), self.objective.to_manifest()]
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Layers defaults, then the file (TOML or JSON by extension), then
    /// `BITGA_`-prefixed environment variables. The result is validated
    /// before it replaces the current configuration.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), BitgaError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BitgaError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&AppConfig::default())?)
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        *self.write_lock()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), BitgaError> {
        let toml_str = toml::to_string_pretty(&self.get())?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Applies `f` to a copy and only commits it if the result validates
    pub fn update<F>(&self, f: F) -> Result<(), BitgaError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        *self.write_lock()? = candidate;
        Ok(())
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, BitgaError> {
        self.config
            .write()
            .map_err(|_| BitgaError::Configuration("Config lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptimizationDirection;

    #[test]
    fn test_manifests_name_environment_overrides() {
        let manifests = AppConfig::default().manifests();
        assert_eq!(manifests.len(), 2);

        let evolution = &manifests[0];
        let precision = evolution.fields.iter().find(|f| f.name == "precision").unwrap();
        assert_eq!(evolution.env_var(precision), "BITGA_EVOLUTION__PRECISION");
        assert_eq!(precision.default, serde_json::json!(0.05));

        let objective = &manifests[1];
        assert_eq!(objective.fields.len(), 1);
        assert_eq!(objective.env_var(&objective.fields[0]), "BITGA_OBJECTIVE__FORMULA");
    }

    #[test]
    fn test_update_rejects_invalid_and_keeps_previous() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.precision = -1.0);
        assert!(result.is_err());
        assert_eq!(manager.get().evolution.precision, 0.05);

        manager
            .update(|c| c.evolution.direction = OptimizationDirection::Minimize)
            .unwrap();
        assert_eq!(manager.get().evolution.direction, OptimizationDirection::Minimize);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let manager = ConfigManager::new();
        let result = manager.load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(BitgaError::Configuration(_))));
    }
}
