//! Terminal directory picker

use async_trait::async_trait;
use shadow_agent::DirectoryPicker;
use shadow_foundation::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Prompts on stdout and reads one line from stdin.
/// An empty answer (or end of input) cancels.
pub struct StdinPicker;

#[async_trait]
impl DirectoryPicker for StdinPicker {
    async fn pick_directory(&self, title: &str) -> Result<Option<PathBuf>> {
        print!("{}: ", title);
        io::stdout().flush()?;

        let line = read_stdin_line().await?;
        Ok(line.as_deref().and_then(parse_answer))
    }
}

/// Blocking stdin read off the runtime threads; `None` at end of input
pub async fn read_stdin_line() -> io::Result<Option<String>> {
    let (n, line) = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|n| (n, line))
    })
    .await
    .map_err(io::Error::other)??;

    Ok((n > 0).then_some(line))
}

fn parse_answer(line: &str) -> Option<PathBuf> {
    let answer = line.trim();
    if answer.is_empty() {
        None
    } else {
        Some(PathBuf::from(answer))
    }
}
