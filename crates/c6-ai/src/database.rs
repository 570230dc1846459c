//! Direct access to the c6 database: liveness check and interactive shell.

use rusqlite::{Connection, OpenFlags};
use std::process::Command;
use tracing::debug;

use crate::context::Context;
use crate::engine::AIError;

/// Open the database read-only and run a trivial query.
pub fn ping(ctx: &mut Context<'_>) -> Result<(), AIError> {
    let conn = Connection::open_with_flags(
        &ctx.config.database,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(AIError::OpenDatabase)?;

    let one: i64 = conn
        .query_row("select 1", [], |row| row.get(0))
        .map_err(AIError::Ping)?;
    debug!("select 1 returned {}", one);

    ctx.log_line("Pong!");
    Ok(())
}

/// Hand the terminal to an interactive read-only sqlite3 shell until it exits.
pub fn shell(ctx: &Context<'_>) -> Result<(), AIError> {
    let binary = &ctx.config.sqlite_binary;
    debug!("Starting {} on {:?}", binary, ctx.config.database);

    let status = Command::new(binary)
        .arg("-readonly")
        .arg(&ctx.config.database)
        .status()
        .map_err(|source| AIError::ShellSpawn {
            binary: binary.clone(),
            source,
        })?;

    if !status.success() {
        return Err(AIError::ShellExited(status));
    }
    Ok(())
}
