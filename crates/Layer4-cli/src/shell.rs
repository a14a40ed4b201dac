//! Interactive shell mode
//!
//! One line per command. Background auto-commit results are printed by an
//! event listener as they arrive.

use crate::cli::print_status;
use crate::output;
use crate::picker::{read_stdin_line, StdinPicker};
use async_trait::async_trait;
use shadow_agent::{Session, Workspace};
use shadow_foundation::{EventCategory, EventKind, EventListener, ShadowEvent};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Select(Option<PathBuf>),
    Repo,
    Init,
    Exists,
    Commit(String),
    Log,
    Ask(String),
    Ls,
    Cat(String),
    Write { path: String, content: String },
    Tasks,
    ClearTasks,
    Cancel(String),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  select [DIR]          select a repository (prompts when DIR is omitted)
  repo                  show the selected repository
  init                  initialize local history
  exists                check for (and attach) existing history
  commit <MESSAGE>      snapshot the repository
  log                   show recent snapshots
  ask <PROMPT>          run the assistant, then auto-commit
  ls                    list files
  cat <PATH>            print a file
  write <PATH> <TEXT>   write a file
  tasks                 list auto-commit tasks
  tasks clear           forget finished auto-commit tasks
  cancel <ID>           cancel a pending auto-commit
  status                show session and configuration
  help                  show this help
  quit                  leave the shell";

impl ShellCommand {
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "select" => ShellCommand::Select(non_empty(rest).map(PathBuf::from)),
            "repo" => ShellCommand::Repo,
            "init" => ShellCommand::Init,
            "exists" => ShellCommand::Exists,
            "commit" => ShellCommand::Commit(required(rest, "commit <MESSAGE>")?),
            "log" => ShellCommand::Log,
            "ask" => ShellCommand::Ask(required(rest, "ask <PROMPT>")?),
            "ls" | "files" => ShellCommand::Ls,
            "cat" | "read" => ShellCommand::Cat(required(rest, "cat <PATH>")?),
            "write" => {
                let usage = "write <PATH> <TEXT>";
                let (path, content) = rest.split_once(char::is_whitespace).ok_or(usage)?;
                ShellCommand::Write {
                    path: path.to_string(),
                    content: content.trim_start().to_string(),
                }
            }
            "tasks" => match rest {
                "" => ShellCommand::Tasks,
                "clear" => ShellCommand::ClearTasks,
                _ => return Err("Usage: tasks [clear]".to_string()),
            },
            "cancel" => ShellCommand::Cancel(required(rest, "cancel <ID>")?),
            "status" => ShellCommand::Status,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };

        Ok(Some(command))
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn required(text: &str, usage: &str) -> Result<String, String> {
    non_empty(text)
        .map(str::to_string)
        .ok_or_else(|| format!("Usage: {}", usage))
}

// ============================================================================
// Background output
// ============================================================================

/// Prints auto-commit results while the user keeps typing
struct AutoCommitPrinter;

#[async_trait]
impl EventListener for AutoCommitPrinter {
    fn name(&self) -> &str {
        "auto-commit-printer"
    }

    fn categories(&self) -> Option<Vec<EventCategory>> {
        Some(vec![EventCategory::Task])
    }

    async fn on_event(&self, event: &ShadowEvent) {
        if let EventKind::AutoCommitFinished { task_id, outcome } = &event.kind {
            println!("\n{}", output::auto_commit_line(task_id, outcome));
            prompt();
        }
    }
}

fn prompt() {
    print!("shadow> ");
    let _ = io::stdout().flush();
}

// ============================================================================
// Loop
// ============================================================================

pub async fn run(workspace: Workspace, repo: Option<PathBuf>) -> anyhow::Result<()> {
    let mut session = Session::new();

    let events = workspace.events();
    let printer = events.subscribe(Arc::new(AutoCommitPrinter)).await;

    println!("Shadow - snapshot history for assistant edits. Type 'help' for commands.");
    if let Some(repo) = repo {
        execute(&workspace, &mut session, ShellCommand::Select(Some(repo))).await;
    }

    loop {
        prompt();
        let line = match read_stdin_line().await? {
            Some(line) => line,
            None => break,
        };

        match ShellCommand::parse(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => execute(&workspace, &mut session, command).await,
            Ok(None) => {}
            Err(message) => eprintln!("{}", message),
        }
    }

    let pending = workspace.auto_commits().await;
    if pending.iter().any(|task| !task.state.is_terminal()) {
        println!("Waiting for pending auto-commits...");
        workspace.wait_for_auto_commits().await;
    }
    events.unsubscribe(printer).await;
    Ok(())
}

async fn execute(workspace: &Workspace, session: &mut Session, command: ShellCommand) {
    debug!(command = ?command, "Shell command");
    if let Err(e) = dispatch(workspace, session, command).await {
        eprintln!("✗ {}", e);
    }
}

async fn dispatch(
    workspace: &Workspace,
    session: &mut Session,
    command: ShellCommand,
) -> anyhow::Result<()> {
    match command {
        ShellCommand::Select(path) => {
            let selected = match path {
                Some(path) => Some(workspace.select_path(session, path).await?),
                None => workspace.select_repository(session, &StdinPicker).await?,
            };
            match selected {
                Some(repo) => {
                    println!("Selected {}", repo.display());
                    if workspace.check_history_exists(session).await? {
                        println!("Attached existing history");
                    }
                }
                None => println!("Selection cancelled"),
            }
        }
        ShellCommand::Repo => match session.selected_repo() {
            Some(repo) => println!("{}", repo.display()),
            None => println!("(none selected)"),
        },
        ShellCommand::Init => {
            let store = workspace.initialize_history(session).await?;
            println!("✓ Initialized snapshot store at {}", store.path().display());
        }
        ShellCommand::Exists => {
            if workspace.check_history_exists(session).await? {
                println!("History exists");
            } else {
                println!("No history yet; run 'init'");
            }
        }
        ShellCommand::Commit(message) => {
            let outcome = workspace.commit_changes(session, &message).await?;
            println!("{}", output::commit_line(&outcome));
        }
        ShellCommand::Log => {
            let entries = workspace.commit_history(session).await?;
            for line in output::history_lines(&entries) {
                println!("{}", line);
            }
        }
        ShellCommand::Ask(prompt) => {
            let reply = workspace.invoke_assistant(session, &prompt).await?;
            print!("{}", reply.output);
            if let Some(task_id) = reply.auto_commit {
                println!(
                    "Auto-commit {} scheduled in {} ms (cancel {} to skip)",
                    task_id,
                    workspace.config().assistant.settle_delay_ms,
                    task_id
                );
            }
        }
        ShellCommand::Ls => {
            for file in workspace.list_files(session).await? {
                println!("{}", file);
            }
        }
        ShellCommand::Cat(path) => {
            let content = workspace.read_file(session, &path).await?;
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
        ShellCommand::Write { path, content } => {
            workspace.write_file(session, &path, &content).await?;
            println!("✓ Wrote {}", path);
        }
        ShellCommand::Tasks => {
            let tasks = workspace.auto_commits().await;
            if tasks.is_empty() {
                println!("(no auto-commits)");
            }
            for task in tasks {
                println!("{}", output::task_line(&task));
            }
        }
        ShellCommand::ClearTasks => {
            let removed = workspace.clear_finished_auto_commits().await;
            println!("Cleared {} finished auto-commit(s)", removed);
        }
        ShellCommand::Cancel(prefix) => {
            let task_id = workspace.find_auto_commit(&prefix).await?;
            if workspace.cancel_auto_commit(task_id).await {
                println!("✓ Cancelled auto-commit {}", task_id);
            } else {
                println!("Auto-commit {} already started or finished", task_id);
            }
        }
        ShellCommand::Status => print_status(workspace, session),
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }

    Ok(())
}
