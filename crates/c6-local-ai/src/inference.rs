//! Inference backend abstraction.

use std::path::Path;

use crate::error::LocalAIError;

/// Context window in tokens.
pub const DEFAULT_CONTEXT_SIZE: u32 = 4096;

/// Number of layers offloaded to the GPU.
pub const DEFAULT_GPU_LAYERS: u32 = 1;

/// llama.cpp's `LLAMA_DEFAULT_SEED`, which makes the sampler pick a random seed.
pub const DEFAULT_SEED: u32 = u32::MAX;

/// Options applied when a model is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    pub context_size: u32,
    pub gpu_layers: u32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            context_size: DEFAULT_CONTEXT_SIZE,
            gpu_layers: DEFAULT_GPU_LAYERS,
        }
    }
}

/// Sampling options for a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictOptions {
    pub threads: u32,
    pub top_k: i32,
    pub top_p: f32,
    pub seed: u32,
    pub max_tokens: usize,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            top_k: 40,
            top_p: 0.9,
            seed: DEFAULT_SEED,
            max_tokens: 4000,
        }
    }
}

/// A local LLM runtime.
///
/// `predict` calls `on_token` synchronously for every generated piece of
/// text, in order. Returning `false` from the callback stops generation.
pub trait InferenceBackend {
    type Engine;

    /// Load model weights.
    fn load(&self, model: &Path, options: &ModelOptions) -> Result<Self::Engine, LocalAIError>;

    /// Run the prompt through a loaded model. Returns the full completion.
    fn predict(
        &self,
        engine: &mut Self::Engine,
        prompt: &str,
        options: &PredictOptions,
        on_token: &mut dyn FnMut(&str) -> bool,
    ) -> Result<String, LocalAIError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sampling() {
        let model = ModelOptions::default();
        assert_eq!(model.context_size, 4096);
        assert_eq!(model.gpu_layers, 1);

        let predict = PredictOptions::default();
        assert_eq!(predict.threads, 1);
        assert_eq!(predict.top_k, 40);
        assert_eq!(predict.top_p, 0.9);
        assert_eq!(predict.seed, DEFAULT_SEED);
        assert_eq!(predict.max_tokens, 4000);
    }
}
