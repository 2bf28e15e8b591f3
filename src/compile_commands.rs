//! Reads a `compile_commands.json` database into [`ToolInvocation`]s.

use std::path::Path;

use serde::Deserialize;

use crate::error::ScanError;
use crate::queue::ToolInvocation;

#[derive(Debug, Deserialize)]
struct CompileCommandEntry {
    directory: String,
    file: String,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
}

/// Split a shell-quoted command line the way a compile_commands.json
/// `"command"` field needs to be, handling single and double quotes.
fn split_command_line(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = command.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ' ' | '\t' if !in_single && !in_double => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            '\\' if !in_single => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

pub fn read_compile_commands(path: &Path) -> Result<Vec<ToolInvocation>, ScanError> {
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::CompileCommands {
        path: path.display().to_string(),
        source,
    })?;
    let entries: Vec<CompileCommandEntry> = serde_json::from_str(&content)?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let arguments = entry
                .arguments
                .unwrap_or_else(|| split_command_line(entry.command.as_deref().unwrap_or_default()));
            ToolInvocation {
                source_file: entry.file,
                arguments,
                directory: entry.directory,
            }
        })
        .collect())
}
