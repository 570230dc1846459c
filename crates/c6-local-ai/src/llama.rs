//! GGUF inference through llama.cpp.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use tracing::{debug, info};

use crate::error::LocalAIError;
use crate::inference::{InferenceBackend, ModelOptions, PredictOptions};

/// Upper bound on tokens per decode call while prefilling the prompt.
const PREFILL_BATCH_SIZE: usize = 512;

/// Runs models in-process with llama.cpp.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlamaCppBackend;

/// A loaded model. Fields drop in order, so the model goes before the backend.
pub struct LlamaCppEngine {
    model: LlamaModel,
    backend: LlamaBackend,
    context_size: NonZeroU32,
}

impl LlamaCppBackend {
    pub fn new() -> Self {
        Self
    }
}

fn load_failed(path: &Path, reason: impl ToString) -> LocalAIError {
    LocalAIError::ModelLoadFailed {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

/// `<s>` in the prompt is parsed as the BOS token, so only add one when it is missing.
fn add_bos(prompt: &str) -> AddBos {
    if prompt.starts_with("<s>") {
        AddBos::Never
    } else {
        AddBos::Always
    }
}

fn predict_failed(e: impl ToString) -> LocalAIError {
    LocalAIError::PredictionFailed(e.to_string())
}

impl InferenceBackend for LlamaCppBackend {
    type Engine = LlamaCppEngine;

    fn load(&self, path: &Path, options: &ModelOptions) -> Result<LlamaCppEngine, LocalAIError> {
        if !path.is_file() {
            return Err(load_failed(path, "file not found"));
        }
        let context_size = NonZeroU32::new(options.context_size)
            .ok_or_else(|| load_failed(path, "context size must be positive"))?;

        info!("Loading model {:?}", path);

        let backend = LlamaBackend::init().map_err(|e| load_failed(path, e))?;
        let model_params = LlamaModelParams::default().with_n_gpu_layers(options.gpu_layers);
        let model = LlamaModel::load_from_file(&backend, path, &model_params)
            .map_err(|e| load_failed(path, e))?;

        Ok(LlamaCppEngine {
            model,
            backend,
            context_size,
        })
    }

    fn predict(
        &self,
        engine: &mut LlamaCppEngine,
        prompt: &str,
        options: &PredictOptions,
        on_token: &mut dyn FnMut(&str) -> bool,
    ) -> Result<String, LocalAIError> {
        let n_threads = options.threads.max(1) as i32;
        let ctx_params = LlamaContextParams::default()
            .with_n_ctx(Some(engine.context_size))
            .with_n_threads(n_threads)
            .with_n_threads_batch(n_threads);

        let mut ctx = engine
            .model
            .new_context(&engine.backend, ctx_params)
            .map_err(predict_failed)?;

        let tokens_list = engine
            .model
            .str_to_token(prompt, add_bos(prompt))
            .map_err(predict_failed)?;

        let n_ctx = engine.context_size.get();
        let n_tokens = tokens_list.len();
        if n_tokens == 0 || n_tokens >= n_ctx as usize {
            return Err(LocalAIError::ContextOverflow {
                tokens: n_tokens,
                context: n_ctx,
            });
        }
        debug!("Prompt is {} tokens", n_tokens);

        let mut batch = LlamaBatch::new(PREFILL_BATCH_SIZE, 1);
        let last_pos = (n_tokens as i32) - 1;

        let mut pos = 0i32;
        for chunk in tokens_list.chunks(PREFILL_BATCH_SIZE) {
            batch.clear();
            for (j, &token) in chunk.iter().enumerate() {
                let p = pos + j as i32;
                batch
                    .add(token, p, &[0], p == last_pos)
                    .map_err(predict_failed)?;
            }
            ctx.decode(&mut batch).map_err(predict_failed)?;
            pos += chunk.len() as i32;
        }

        let mut sampler = LlamaSampler::chain_simple([
            LlamaSampler::top_k(options.top_k),
            LlamaSampler::top_p(options.top_p, 1),
            LlamaSampler::dist(options.seed),
        ]);

        let mut output = String::new();
        let mut n_cur = n_tokens as i32;

        for _ in 0..options.max_tokens {
            if n_cur as u32 >= n_ctx {
                debug!("Context window full after {} tokens", n_cur);
                break;
            }

            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            sampler.accept(token);

            if engine.model.is_eog_token(token) {
                break;
            }

            let piece = engine
                .model
                .token_to_str(token, Special::Tokenize)
                .unwrap_or_default();
            output.push_str(&piece);
            if !on_token(&piece) {
                break;
            }

            batch.clear();
            batch.add(token, n_cur, &[0], true).map_err(predict_failed)?;
            n_cur += 1;

            ctx.decode(&mut batch).map_err(predict_failed)?;
        }

        Ok(output)
    }
}
