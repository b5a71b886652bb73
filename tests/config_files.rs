use bitga::{BitgaError, ConfigManager, OptimizationDirection, PruningPolicy};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

// Loading reads BITGA_* variables, so tests that touch the environment
// must not overlap with any other load.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn test_load_partial_toml_keeps_defaults() {
    let _env = env_lock();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[evolution]
precision = 0.01
range_min = -10.0
range_max = 10.0
direction = "minimize"
pruning = "truncation"
seed = 7

[objective]
formula = "x^2 - 3*x"
"#
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(file.path()).unwrap();
    let config = manager.get();

    assert_eq!(config.evolution.precision, 0.01);
    assert_eq!(config.evolution.range_min, -10.0);
    assert_eq!(config.evolution.direction, OptimizationDirection::Minimize);
    assert_eq!(config.evolution.pruning, PruningPolicy::Truncation);
    assert_eq!(config.evolution.seed, Some(7));
    assert_eq!(config.evolution.max_generations, 50);
    assert_eq!(config.objective.formula, "x^2 - 3*x");
}

#[test]
fn test_load_json() {
    let _env = env_lock();
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"evolution": {{"max_generations": 5, "max_population": 3}}}}"#
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(file.path()).unwrap();
    assert_eq!(manager.get().evolution.max_generations, 5);
    assert_eq!(manager.get().evolution.max_population, 3);
}

#[test]
fn test_invalid_file_is_rejected_and_previous_kept() {
    let _env = env_lock();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[evolution]\nrange_min = 5.0\nrange_max = 1.0").unwrap();

    let manager = ConfigManager::new();
    let result = manager.load_from_file(file.path());
    assert!(matches!(result, Err(BitgaError::Configuration(_))));
    assert_eq!(manager.get().evolution.range_min, -4.0);
}

#[test]
fn test_bad_formula_is_rejected() {
    let _env = env_lock();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[objective]\nformula = \"import(x)\"").unwrap();

    let manager = ConfigManager::new();
    assert!(matches!(
        manager.load_from_file(file.path()),
        Err(BitgaError::Formula(_))
    ));
}

#[test]
fn test_save_and_reload() {
    let _env = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bitga.toml");

    let manager = ConfigManager::new();
    manager
        .update(|c| {
            c.evolution.gene_mutation_probability = 0.5;
            c.evolution.seed = Some(99);
        })
        .unwrap();
    manager.save_to_file(&path).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&path).unwrap();
    assert_eq!(reloaded.get(), manager.get());
}

#[test]
fn test_environment_overrides_file() {
    let _env = env_lock();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[evolution]\nprecision = 0.05\nmax_generations = 12").unwrap();

    std::env::set_var("BITGA_EVOLUTION__PRECISION", "0.01");
    std::env::set_var("BITGA_EVOLUTION__DIRECTION", "minimize");
    let manager = ConfigManager::new();
    let result = manager.load_from_file(file.path());
    std::env::remove_var("BITGA_EVOLUTION__PRECISION");
    std::env::remove_var("BITGA_EVOLUTION__DIRECTION");

    result.unwrap();
    let config = manager.get();
    assert_eq!(config.evolution.precision, 0.01);
    assert_eq!(config.evolution.direction, OptimizationDirection::Minimize);
    assert_eq!(config.evolution.max_generations, 12);
}
