pub mod traits;
pub mod evolution;
pub mod objective;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use objective::ObjectiveConfig;
pub use traits::{ConfigSection, ConfigManifest, FieldManifest};
