//! Non-interactive CLI mode

use crate::output;
use crate::Command;
use anyhow::{anyhow, Result};
use shadow_agent::{Session, Workspace};
use std::path::PathBuf;

/// Run a single command against `--repo`
pub async fn run_once(workspace: &Workspace, repo: Option<PathBuf>, command: Command) -> Result<()> {
    let repo = repo.ok_or_else(|| anyhow!("--repo <DIR> is required for `{}`", command.name()))?;

    let mut session = Session::new();
    workspace.select_path(&mut session, &repo).await?;
    workspace.check_history_exists(&mut session).await?;

    match command {
        Command::Init => {
            let store = workspace.initialize_history(&mut session).await?;
            println!("✓ Initialized snapshot store at {}", store.path().display());
        }
        Command::Commit { message } => {
            let outcome = workspace.commit_changes(&session, &message).await?;
            println!("{}", output::commit_line(&outcome));
        }
        Command::Log => {
            let entries = workspace.commit_history(&session).await?;
            for line in output::history_lines(&entries) {
                println!("{}", line);
            }
        }
        Command::Ask { prompt } => {
            let reply = workspace.invoke_assistant(&session, &prompt).await?;
            print!("{}", reply.output);

            // The process must outlive the settle delay
            if let Some(task_id) = reply.auto_commit {
                println!(
                    "Auto-commit {} scheduled in {} ms",
                    task_id,
                    workspace.config().assistant.settle_delay_ms
                );
                if let Some(state) = workspace.wait_for_auto_commit(task_id).await {
                    println!("Auto-commit {}: {} {}", task_id, state.symbol(), output::describe_state(&state));
                }
            }
        }
        Command::Files => {
            for file in workspace.list_files(&session).await? {
                println!("{}", file);
            }
        }
        Command::Read { path } => {
            print!("{}", workspace.read_file(&session, &path).await?);
        }
        Command::Write { path, content } => {
            workspace.write_file(&session, &path, &content).await?;
            println!("✓ Wrote {}", path);
        }
        Command::Status => {
            print_status(workspace, &session);
        }
        Command::Shell => return Err(anyhow!("`shell` is handled by the interactive loop")),
    }

    Ok(())
}

pub fn print_status(workspace: &Workspace, session: &Session) {
    let config = workspace.config();
    match session.selected_repo() {
        Some(repo) => println!("Repository: {}", repo.display()),
        None => println!("Repository: (none selected)"),
    }
    match session.snapshot_store() {
        Some(store) => println!("History:    {}", store.path().display()),
        None => println!("History:    not initialized"),
    }
    println!(
        "Assistant:  {} {}",
        config.assistant.program,
        config.assistant.args.join(" ")
    );
    println!("VCS:        {}", config.vcs.program);
    println!("Settle:     {} ms", config.assistant.settle_delay_ms);
}
