//! promptsmith binary: draft a prompt for a task, score it against the rubric, refine it.
//!
//! Subcommands: `chat` (default, interactive), `draft`, `evaluate`, `render` (offline).

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use promptsmith::prompts::{load_or_default, EVALUATION_RUBRIC};
use promptsmith::{rendered_text, run_evaluation, LlmClient};
use promptsmith_cli::{build_llm, build_orchestrator, improvement_filter, render_raw, repl};
use promptsmith_config::Settings;
use tokio::io::BufReader;

const APP_NAME: &str = "promptsmith";
const DEFAULT_USER: &str = "local";

#[derive(Parser, Debug)]
#[command(name = "promptsmith")]
#[command(about = "Draft, evaluate and refine LLM prompts")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Model name (overrides OPENAI_MODEL)
    #[arg(long, global = true, value_name = "MODEL")]
    model: Option<String>,

    /// Directory of YAML prompt template overrides
    #[arg(long, global = true, value_name = "DIR", env = "PROMPTS_DIR")]
    prompts_dir: Option<PathBuf>,

    /// SQLite file for sessions (in-memory when unset)
    #[arg(long, global = true, value_name = "PATH", env = "PROMPTSMITH_SESSION_DB")]
    session_db: Option<PathBuf>,

    /// Which low-scoring criteria go into a refinement: include_all or skip_empty_or_none
    #[arg(long, global = true, value_name = "FILTER")]
    improvement_filter: Option<String>,

    /// Session id for chat and draft
    #[arg(long, global = true, default_value = DEFAULT_USER)]
    user: String,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive session (/start, /evaluate, /improve, /quit; other text drafts a prompt)
    Chat,
    /// Draft a prompt for TASK and print it
    Draft {
        #[arg(required = true, trailing_var_arg = true)]
        task: Vec<String>,
    },
    /// Evaluate a prompt read from --file or stdin and print the report
    Evaluate {
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Run the evaluation pipeline on raw model output from --file or stdin (no backend call)
    Render {
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Print the normalized report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            Ok(buf)
        }
    }
}

fn apply_flags(settings: &mut Settings, args: &Args) {
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if args.prompts_dir.is_some() {
        settings.prompts_dir = args.prompts_dir.clone();
    }
    if args.session_db.is_some() {
        settings.session_db = args.session_db.clone();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = promptsmith_config::load_and_apply(APP_NAME, None) {
        eprintln!("config: {}", e);
    }
    let args = Args::parse();
    let mut settings = Settings::from_env()?;
    apply_flags(&mut settings, &args);
    let _log_guard = promptsmith_config::logging::init(settings.log_file.as_deref())?;
    tracing::debug!(model = %settings.model, "settings loaded");

    let llm: Arc<dyn LlmClient> = Arc::new(build_llm(&settings));
    let filter = improvement_filter(&settings, args.improvement_filter.as_deref())?;

    match args.cmd.clone().unwrap_or(Command::Chat) {
        Command::Chat => {
            let orchestrator = build_orchestrator(llm, &settings, filter)?;
            let interactive = std::io::stdin().is_terminal();
            let mut stdout = std::io::stdout();
            if interactive {
                match orchestrator.greeting() {
                    Ok(greeting) => println!("{}", greeting),
                    Err(e) => println!("{}", promptsmith::handle_failure(&args.user, &e)),
                }
            }
            let input = BufReader::new(tokio::io::stdin());
            repl::run_repl_loop(&orchestrator, &args.user, input, &mut stdout, interactive)
                .await?;
        }
        Command::Draft { task } => {
            let orchestrator = build_orchestrator(llm, &settings, filter)?;
            let draft = orchestrator
                .draft(&args.user, &task.join(" "))
                .await
                .map_err(|e| anyhow::anyhow!(promptsmith::handle_failure(&args.user, &e)))?;
            println!("{}", draft);
        }
        Command::Evaluate { file } => {
            let prompt = read_input(file.as_deref())?;
            let templates = load_or_default(settings.prompts_dir.as_deref());
            let rubric = templates.require(EVALUATION_RUBRIC)?;
            let report = run_evaluation(llm.as_ref(), prompt.trim(), rubric)
                .await
                .map_err(|e| anyhow::anyhow!(promptsmith::handle_failure(&args.user, &e)))?;
            println!("{}", rendered_text(&report));
        }
        Command::Render { file, json } => {
            let raw = read_input(file.as_deref())?;
            let out = render_raw(&raw, json).map_err(|e| {
                tracing::warn!(error = %e, "render failed");
                anyhow::anyhow!(e.user_message())
            })?;
            println!("{}", out);
        }
    }
    Ok(())
}
