//! Ping command - check that the database opens and answers.

use c6_ai::Context;

pub(crate) fn run(ctx: &mut Context<'_>) -> miette::Result<()> {
    c6_ai::ping(ctx).map_err(|e| miette::miette!("{}", e))
}
