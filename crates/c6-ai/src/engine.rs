//! Ask engine - turns a question into a streamed SQL answer.

use std::io::{self, Write};
use std::process::ExitStatus;
use thiserror::Error;
use tracing::{debug, info};

use c6_local_ai::{
    InferenceBackend, LocalAIError, ModelOptions, PredictOptions, SideFile, METAL_SHADER_FILENAME,
};

use crate::context::Context;
use crate::prompt::{build_prompt, build_system_prompt};
use crate::schema::dump_schema;

/// Errors from c6 operations.
#[derive(Debug, Error)]
pub enum AIError {
    #[error(transparent)]
    LocalAI(#[from] LocalAIError),
    #[error("cannot get schema: cannot run {binary}: {source}")]
    SchemaSpawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot get schema: {status}: {output}")]
    SchemaFailed { status: ExitStatus, output: String },
    #[error("cannot open database: {0}")]
    OpenDatabase(#[source] rusqlite::Error),
    #[error("cannot ping database: {0}")]
    Ping(#[source] rusqlite::Error),
    #[error("cannot run {binary}: {source}")]
    ShellSpawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("sqlite shell failed: {0}")]
    ShellExited(ExitStatus),
    #[error("cannot write answer: {0}")]
    Output(#[from] io::Error),
}

/// Answers questions about the c6 database with a local model.
pub struct AskEngine<B> {
    backend: B,
    model_options: ModelOptions,
    predict_options: PredictOptions,
}

impl<B: InferenceBackend> AskEngine<B> {
    /// Create an engine with the default sampling configuration.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            model_options: ModelOptions::default(),
            predict_options: PredictOptions::default(),
        }
    }

    /// Dump the database schema and answer `question` with it as context.
    pub fn ask(&self, ctx: &mut Context<'_>, question: &str) -> Result<String, AIError> {
        info!("Asking: {}", question);
        let schema = dump_schema(&ctx.config.sqlite_binary, &ctx.config.database)?;
        self.answer(ctx, Some(&schema), question)
    }

    /// Run the model on `question`, streaming tokens to `ctx.out` as they arrive.
    pub fn answer(
        &self,
        ctx: &mut Context<'_>,
        schema: Option<&str>,
        question: &str,
    ) -> Result<String, AIError> {
        let prompt = build_prompt(&build_system_prompt(schema), question);
        debug!("Prompt:\n{}", prompt);

        let _shader = match &ctx.config.metal_shader {
            Some(source) => Some(SideFile::beside_executable(source, METAL_SHADER_FILENAME)?),
            None => None,
        };

        let mut engine = self.backend.load(&ctx.config.model, &self.model_options)?;

        let out = &mut *ctx.out;
        let mut sink_error = None;
        let completion = self.backend.predict(
            &mut engine,
            &prompt,
            &self.predict_options,
            &mut |token: &str| match out.write_all(token.as_bytes()).and_then(|()| out.flush()) {
                Ok(()) => true,
                Err(e) => {
                    sink_error = Some(e);
                    false
                }
            },
        )?;

        if let Some(e) = sink_error {
            return Err(AIError::Output(e));
        }
        writeln!(ctx.out)?;

        Ok(completion)
    }
}
