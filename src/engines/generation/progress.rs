use super::history::GenerationRecord;
use std::sync::mpsc::Sender;

/// Hooks invoked by `EvolutionEngine::run_with_callback`.
///
/// `on_generation_complete` fires after the generation's statistics are
/// recorded and before pruning; it is the pacing point for live displays.
pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, record: &GenerationRecord);
    fn on_run_complete(&mut self, _generations: usize) {}
}

/// Discards every notification
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_generation_complete(&mut self, _record: &GenerationRecord) {}
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation + 1);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        log::info!(
            "Generation {} complete. Best: x = {:.4}, f = {}, mean = {:.4}",
            record.generation + 1,
            record.best.phenotype(),
            record
                .best
                .fitness()
                .map_or_else(|| "undefined".to_string(), |f| format!("{:.4}", f)),
            record.mean_fitness
        );
    }

    fn on_run_complete(&mut self, generations: usize) {
        log::info!("Run finished after {} generations", generations);
    }
}

// For a front end that charts generations as they arrive
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
    disconnected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete {
        generation: usize,
        best_phenotype: f64,
        best_fitness: Option<f64>,
        worst_fitness: Option<f64>,
        mean_fitness: f64,
    },
    RunComplete(usize),
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender, disconnected: false }
    }

    // A dropped receiver does not stop the run; it is logged once.
    fn send(&mut self, message: ProgressMessage) {
        if self.sender.send(message).is_err() && !self.disconnected {
            self.disconnected = true;
            log::debug!("Progress receiver disconnected; further updates are dropped");
        }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        self.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        self.send(ProgressMessage::GenerationComplete {
            generation: record.generation,
            best_phenotype: record.best.phenotype(),
            best_fitness: record.best.fitness(),
            worst_fitness: record.worst.fitness(),
            mean_fitness: record.mean_fitness,
        });
    }

    fn on_run_complete(&mut self, generations: usize) {
        self.send(ProgressMessage::RunComplete(generations));
    }
}
