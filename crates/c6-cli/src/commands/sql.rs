//! Sql command - interactive read-only shell on the database.

use c6_ai::Context;

pub(crate) fn run(ctx: &Context<'_>) -> miette::Result<()> {
    c6_ai::shell(ctx).map_err(|e| miette::miette!("{}", e))
}
