//! Ask command - answer a question with a generated SQLite query.

use c6_ai::Context;

#[cfg(feature = "llama-cpp")]
pub(crate) fn run(ctx: &mut Context<'_>, question: &str) -> miette::Result<()> {
    use c6_ai::AskEngine;
    use c6_local_ai::LlamaCppBackend;

    AskEngine::new(LlamaCppBackend::new())
        .ask(ctx, question)
        .map_err(|e| miette::miette!("{}", e))?;
    Ok(())
}

#[cfg(not(feature = "llama-cpp"))]
pub(crate) fn run(_ctx: &mut Context<'_>, _question: &str) -> miette::Result<()> {
    Err(miette::miette!("{}", c6_ai::LocalAIError::BackendUnavailable))
}
