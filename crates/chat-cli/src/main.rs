mod command;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chat_core::{Config, Role, RESULT_FILE_NAME};
use clap::Parser;
use colored::Colorize;
use llm_client::{Credential, OpenAIProvider};
use session_manager::{FileChange, Session, TranscriptController};

use command::{Command, HELP};

/// Ask questions about a CSV file.
#[derive(Parser)]
#[command(name = "data-to-text")]
#[command(version)]
struct Cli {
    /// CSV file to load at start-up
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// OpenAI API key; kept in memory for this run only
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat completions model
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long)]
    api_base: Option<String>,
}

/// Print `label` and read one trimmed line. `None` once the input is exhausted.
fn prompt_line<R: BufRead>(input: &mut R, label: &str) -> io::Result<Option<String>> {
    print!("{} ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn load_file(session: &mut Session, path: &Path) -> anyhow::Result<FileChange> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(session.set_file(&name, raw)?)
}

fn save_result(session: &Session, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let export = session
        .export_latest()
        .context("no answer to save yet")?;
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export.file_name));
    std::fs::write(&target, export.content)
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(target)
}

fn print_history(session: &Session) {
    for message in session.transcript().iter().filter(|m| !m.is_system()) {
        let label = match message.role {
            Role::User => "You:".cyan().bold(),
            _ => "Assistant:".green().bold(),
        };
        println!("{}\n{}\n", label, message.content);
    }
}

fn report_load(result: anyhow::Result<FileChange>, path: &Path) {
    match result {
        Ok(FileChange::Unchanged) => {
            println!("{}", format!("{} is already loaded", path.display()).dimmed())
        }
        Ok(FileChange::Replaced) => println!(
            "{}",
            format!("Reading: {} (previous conversation cleared)", path.display()).blue()
        ),
        Ok(FileChange::Loaded) => {
            println!("{}", format!("Reading: {}", path.display()).blue())
        }
        Err(e) => println!("{}", format!("❌ Error: {:#}", e).red()),
    }
}

/// Read commands until `:quit` or end of input.
async fn run_repl<R: BufRead>(
    input: &mut R,
    session: &mut Session,
    controller: &TranscriptController,
    credential: &Credential,
) -> anyhow::Result<()> {
    let label = "You:".cyan().bold().to_string();

    while let Some(line) = prompt_line(input, &label)? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::History => print_history(session),
            Command::Load(path) => report_load(load_file(session, &path), &path),
            Command::Save(path) => match save_result(session, path.as_deref()) {
                Ok(target) => println!("{}", format!("Saved {}", target.display()).green()),
                Err(e) => println!("{}", format!("❌ Error: {:#}", e).red()),
            },
            Command::Unknown(other) => {
                println!("{}", format!("Unknown command: {} (try :help)", other).yellow())
            }
            Command::Ask(query) => {
                match controller.submit(session, &query, credential).await {
                    Ok(answer) => {
                        println!("{}", "Assistant:".green().bold());
                        println!("{}", answer);
                        println!(
                            "{}",
                            format!("(:save writes this answer to {})", RESULT_FILE_NAME).dimmed()
                        );
                    }
                    Err(e) => println!("{}", format!("❌ Error: {}", e).red()),
                }
                println!();
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = Config::new();
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }

    let provider =
        OpenAIProvider::from_config(&config).context("Failed to build completion client")?;
    let controller = TranscriptController::new(Arc::new(provider), config.model.clone());

    println!("{}", "Data to text".blue().bold());
    println!("{}", "Load your data and ask anything. Type :help for commands.".dimmed());
    println!(
        "{}",
        "Usage is billed to the OpenAI account of the API key you enter.".red()
    );
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let credential = match cli.api_key {
        Some(key) => Credential::new(key),
        None => match prompt_line(&mut input, "API key:")? {
            Some(key) => Credential::new(key),
            None => anyhow::bail!("no API key given (pass --api-key or set OPENAI_API_KEY)"),
        },
    };
    log::debug!("Using model {} at {}", config.model, config.api_base);

    let mut session = Session::new("cli");
    if let Some(path) = cli.file.as_deref() {
        report_load(load_file(&mut session, path), path);
    }

    run_repl(&mut input, &mut session, &controller, &credential).await?;

    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_core::Message;
    use llm_client::{CompletionProvider, CompletionRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CannedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest<'_>,
            _credential: &Credential,
        ) -> llm_client::Result<Message> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Message::assistant("42"))
        }
    }

    fn controller() -> (Arc<CannedProvider>, TranscriptController) {
        let provider = Arc::new(CannedProvider::default());
        let controller = TranscriptController::new(provider.clone(), "test-model");
        (provider, controller)
    }

    fn loaded_session() -> Session {
        let mut session = Session::new("t");
        session.set_file("votes.csv", b"age,intent\n18-24,Remain\n".to_vec()).unwrap();
        session
    }

    #[test]
    fn prompt_line_is_none_at_end_of_input() {
        let mut input = io::Cursor::new("  sk-abc  \n");
        assert_eq!(prompt_line(&mut input, "API key:").unwrap().as_deref(), Some("sk-abc"));
        assert_eq!(prompt_line(&mut input, "API key:").unwrap(), None);
    }

    #[tokio::test]
    async fn repl_returns_on_empty_input() {
        let (provider, controller) = controller();
        let mut session = Session::new("t");

        run_repl(&mut io::empty(), &mut session, &controller, &Credential::new("sk-x"))
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn repl_answers_then_stops_at_end_of_input() {
        let (provider, controller) = controller();
        let mut session = loaded_session();
        let mut input = io::Cursor::new("\n   \nWhich age group?\n\n");

        run_repl(&mut input, &mut session, &controller, &Credential::new("sk-x"))
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.latest_answer(), Some("42"));
    }

    #[tokio::test]
    async fn repl_quit_ignores_remaining_input() {
        let (provider, controller) = controller();
        let mut session = loaded_session();
        let mut input = io::Cursor::new(":quit\nWhich age group?\n");

        run_repl(&mut input, &mut session, &controller, &Credential::new("sk-x"))
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn load_file_uses_file_name_as_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.csv");
        std::fs::write(&path, "age,intent\n18-24,Remain\n").unwrap();
        let mut session = Session::new("t");

        assert_eq!(load_file(&mut session, &path).unwrap(), FileChange::Loaded);
        assert_eq!(load_file(&mut session, &path).unwrap(), FileChange::Unchanged);
        assert_eq!(session.file().unwrap().name(), "votes.csv");
        assert!(session.transcript()[0].content.contains("18-24,Remain"));
    }

    #[test]
    fn load_missing_file_errors() {
        let mut session = Session::new("t");
        assert!(load_file(&mut session, Path::new("/no/such/file.csv")).is_err());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn save_result_writes_latest_answer() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new("t");
        session.set_file("votes.csv", b"a\n1\n".to_vec()).unwrap();
        session.append_user("q").unwrap();
        session.append_assistant("the answer");

        let target = dir.path().join("out.txt");
        let written = save_result(&session, Some(&target)).unwrap();

        assert_eq!(written, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "the answer");
    }

    #[test]
    fn save_without_answer_errors() {
        let session = Session::new("t");
        assert!(save_result(&session, None).is_err());
    }
}
