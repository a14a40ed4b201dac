//! Assistant CLI invocation

use shadow_foundation::{AssistantConfig, Error, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `<program> <args...> <prompt>` inside the repository
#[derive(Debug, Clone)]
pub struct AssistantInvoker {
    program: String,
    args: Vec<String>,
}

impl AssistantInvoker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Combined stdout then stderr of a successful run
    pub async fn invoke(&self, repo: &Path, prompt: &str) -> Result<String> {
        debug!(
            program = %self.program,
            args = ?self.args,
            cwd = %repo.display(),
            "Invoking assistant"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .current_dir(repo)
            .output()
            .await
            .map_err(|e| Error::assistant(format!("failed to launch {}: {}", self.program, e), ""))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::assistant(
                format!("{} exited with {}", self.program, output.status),
                combined,
            ));
        }

        info!(bytes = combined.len(), "Assistant finished");
        Ok(combined)
    }
}
