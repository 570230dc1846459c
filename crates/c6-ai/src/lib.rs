//! # c6 question answering
//!
//! Turns a natural-language question into a SQLite query for the c6
//! database, using a local model.
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐     ┌────────────┐
//! │  Question  │ --> │   Schema   │ --> │   Prompt   │ --> │  Inference │ --> tokens
//! │            │     │ (sqlite3)  │     │  (llama2)  │     │ (llama.cpp)│
//! └────────────┘     └────────────┘     └────────────┘     └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use c6_ai::{AskEngine, C6Config, Context};
//! use c6_local_ai::LlamaCppBackend;
//!
//! let config = C6Config::from_env()?;
//! let (mut out, mut log) = (std::io::stdout(), std::io::stderr());
//! let mut ctx = Context::new(&config, &mut out, &mut log);
//!
//! AskEngine::new(LlamaCppBackend::new()).ask(&mut ctx, "Which company is the largest?")?;
//! ```

mod config;
mod context;
mod database;
mod engine;
mod prompt;
mod schema;

pub use config::{C6Config, C6ConfigBuilder};
pub use context::Context;
pub use database::{ping, shell};
pub use engine::{AIError, AskEngine};
pub use prompt::{build_prompt, build_system_prompt, SYSTEM_PROMPT};
pub use schema::dump_schema;

// Re-export local AI types
pub use c6_local_ai::{
    paths as local_ai_paths, ArtifactFetcher, ArtifactInfo, Compression, InferenceBackend,
    LocalAIError, ModelOptions, PredictOptions, UpdateLock,
};
