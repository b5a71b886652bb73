//! bitga CLI - run a binary genetic algorithm search from the command line.

use anyhow::Context;
use bitga::engines::generation::{ConsoleProgressCallback, GenerationRecord, ProgressCallback};
use bitga::{
    AppConfig, ConfigManager, EvolutionEngine, Formula, Individual, OptimizationDirection, RunReport,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Search for the optimum of f(x) with a bit-string genetic algorithm
#[derive(Parser, Debug)]
#[command(name = "bitga")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML or JSON); BITGA_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Objective as an expression in x, e.g. "x^2 * cos(x)"
    #[arg(short, long)]
    formula: Option<String>,

    /// Search for the minimum
    #[arg(long, conflicts_with = "maximize")]
    minimize: bool,

    /// Search for the maximum
    #[arg(long)]
    maximize: bool,

    /// Number of generations
    #[arg(short, long)]
    generations: Option<usize>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write a JSON report of the run
    #[arg(long)]
    report: Option<PathBuf>,

    /// Save the effective configuration as TOML and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Suppress the per-generation table
    #[arg(short, long)]
    quiet: bool,

    /// List every configuration key with its default and exit
    #[arg(long)]
    config_help: bool,
}

/// Prints one table row per generation
struct TableProgressCallback {
    log: ConsoleProgressCallback,
}

impl ProgressCallback for TableProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        self.log.on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        self.log.on_generation_complete(record);
        println!(
            "{:>5}  {:>12.6}  {:>14}  {:>14}  {:>14.6}",
            record.generation + 1,
            record.best.phenotype(),
            format_fitness(&record.best),
            format_fitness(&record.worst),
            record.mean_fitness
        );
    }

    fn on_run_complete(&mut self, generations: usize) {
        self.log.on_run_complete(generations);
    }
}

fn format_fitness(individual: &Individual) -> String {
    individual
        .fitness()
        .map_or_else(|| "undefined".to_string(), |f| format!("{:.6}", f))
}

fn print_config_help() {
    for manifest in AppConfig::default().manifests() {
        println!("[{}]", manifest.section.to_lowercase());
        for field in &manifest.fields {
            let bounds = match (field.min, field.max) {
                (Some(min), Some(max)) => format!(", range [{}, {}]", min, max),
                (Some(min), None) => format!(", min {}", min),
                (None, Some(max)) => format!(", max {}", max),
                (None, None) => String::new(),
            };
            println!(
                "  {} ({}, default {}{})",
                field.name, field.field_type, field.default, bounds
            );
            println!("      {}", field.description);
            println!("      env: {}", manifest.env_var(field));
        }
        println!();
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.config_help {
        print_config_help();
        return Ok(());
    }

    let manager = ConfigManager::new();
    if let Some(path) = &args.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    manager.update(|config| {
        if let Some(formula) = &args.formula {
            config.objective.formula = formula.clone();
        }
        if args.minimize {
            config.evolution.direction = OptimizationDirection::Minimize;
        } else if args.maximize {
            config.evolution.direction = OptimizationDirection::Maximize;
        }
        if let Some(generations) = args.generations {
            config.evolution.max_generations = generations;
        }
        if args.seed.is_some() {
            config.evolution.seed = args.seed;
        }
    })?;

    if let Some(path) = &args.save_config {
        manager.save_to_file(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let config = manager.get();
    let formula: Formula = config.objective.build()?;
    println!("Objective: f(x) = {}", formula);
    println!(
        "Interval [{}, {}] at precision {}, {}",
        config.evolution.range_min,
        config.evolution.range_max,
        config.evolution.precision,
        config.evolution.direction.label()
    );

    let mut engine = EvolutionEngine::from_seed(config.evolution, formula)?;
    println!(
        "Genome: {} bits, crossover point {}\n",
        engine.codec().bit_length(),
        engine.crossover_point()
    );

    if args.quiet {
        engine.run_with_callback(&mut ConsoleProgressCallback)?;
    } else {
        println!(
            "{:>5}  {:>12}  {:>14}  {:>14}  {:>14}",
            "gen", "best x", "best f(x)", "worst f(x)", "mean f(x)"
        );
        engine.run_with_callback(&mut TableProgressCallback {
            log: ConsoleProgressCallback,
        })?;
    }

    match engine.best_overall() {
        Some(best) => {
            println!("\nBest individual:");
            println!("  Genotype:  {}", best.genotype());
            println!("  Integer:   {}", best.integer_value());
            println!("  x:         {}", best.phenotype());
            println!("  f(x):      {}", format_fitness(best));
        }
        None => println!("\nNo generations were recorded"),
    }

    if let Some(path) = &args.report {
        RunReport::from_engine(&engine)
            .write_to(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("\nReport written to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
