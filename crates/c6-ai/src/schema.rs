//! Schema dumps through the sqlite3 shell.

use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::engine::AIError;

/// Run `<sqlite> -readonly <database> .schema` and return stdout followed by stderr.
pub fn dump_schema(sqlite: &str, database: &Path) -> Result<String, AIError> {
    debug!("Dumping schema of {:?} with {}", database, sqlite);

    let output = Command::new(sqlite)
        .arg("-readonly")
        .arg(database)
        .arg(".schema")
        .output()
        .map_err(|source| AIError::SchemaSpawn {
            binary: sqlite.to_string(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(AIError::SchemaFailed {
            status: output.status,
            output: text,
        });
    }

    Ok(text)
}
