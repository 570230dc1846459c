//! Local AI backend for c6.
//!
//! This crate downloads the artifacts c6 works with (the SQLite database and
//! the GGUF model weights) and runs the model in-process with llama.cpp.

mod error;
mod fetch;
mod inference;
#[cfg(feature = "llama-cpp")]
mod llama;
mod lock;
pub mod paths;
mod side_file;

pub use error::LocalAIError;
pub use fetch::{ArtifactFetcher, ArtifactInfo, Compression};
pub use inference::{
    InferenceBackend, ModelOptions, PredictOptions, DEFAULT_CONTEXT_SIZE, DEFAULT_GPU_LAYERS,
    DEFAULT_SEED,
};
#[cfg(feature = "llama-cpp")]
pub use llama::{LlamaCppBackend, LlamaCppEngine};
pub use lock::UpdateLock;
pub use side_file::{SideFile, METAL_SHADER_FILENAME};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "c6.db";

/// Default model filename.
pub const DEFAULT_MODEL_FILENAME: &str = "codellama-7b-instruct.Q4_K_M.gguf";

/// Where `update` downloads the database from.
pub const DEFAULT_DATABASE_URL: &str = "https://assets.c6.dk/c6.db.gz";

/// Where `update` downloads the model from.
pub const DEFAULT_MODEL_URL: &str =
    "https://huggingface.co/TheBloke/CodeLlama-7B-Instruct-GGUF/resolve/main/codellama-7b-instruct.Q4_K_M.gguf";
