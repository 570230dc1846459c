//! Update command - download the database and the model.

use c6_ai::{AIError, ArtifactFetcher, ArtifactInfo, Context, UpdateLock};

pub(crate) fn run(ctx: &mut Context<'_>) -> miette::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?;

    runtime
        .block_on(update(ctx, &ArtifactFetcher::new()))
        .map_err(|e| miette::miette!("{}", e))
}

/// Replace the database, then the model. Only one update runs at a time.
async fn update(ctx: &mut Context<'_>, fetcher: &ArtifactFetcher) -> Result<(), AIError> {
    let _lock = UpdateLock::acquire(&ctx.config.dir)?;

    ctx.log_line("Downloading database…");
    let mut database = ArtifactInfo::database(&ctx.config.database_url, &ctx.config.database);
    if let Some(sha256) = &ctx.config.database_sha256 {
        database = database.with_sha256(sha256);
    }
    let path = fetcher.fetch(&database).await?;
    ctx.log_line(format!("Database downloaded to {}", path.display()));

    ctx.log_line("Downloading model…");
    let mut model = ArtifactInfo::model(&ctx.config.model_url, &ctx.config.model);
    if let Some(sha256) = &ctx.config.model_sha256 {
        model = model.with_sha256(sha256);
    }
    let path = fetcher.fetch(&model).await?;
    ctx.log_line(format!("Model downloaded to {}", path.display()));

    Ok(())
}
