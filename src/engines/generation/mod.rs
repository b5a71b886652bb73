pub mod genome;
pub mod codec;
pub mod operators;
pub mod history;
pub mod evolution_engine;
pub mod progress;

pub use genome::Genotype;
pub use codec::{genome_length, GenomeCodec, Individual};
pub use history::{GenerationRecord, RunHistory};
pub use evolution_engine::{EngineState, EvolutionEngine};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressMessage,
    SilentProgressCallback,
};
