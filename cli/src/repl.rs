//! Interactive chat loop: read a line, run one turn, print the reply, repeat until EOF or quit.
//!
//! `/start`, `/evaluate` and `/improve` map to orchestrator operations; any other non-empty
//! line is a task description to draft a prompt for.

use std::io::Write;

use promptsmith::{handle_failure, ConversationOrchestrator};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const HELP: &str = "Commands: /start, /evaluate, /improve, /help, /quit. \
Any other text is a task to draft a prompt for.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Start,
    Evaluate,
    Improve,
    Help,
    Quit,
    Draft(String),
    Unknown(String),
}

/// Parses one input line; `None` for a blank line.
pub fn parse_line(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if is_quit_command(line) {
        return Some(ReplCommand::Quit);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(ReplCommand::Draft(line.to_string()));
    };
    let cmd = match command.to_lowercase().as_str() {
        "start" => ReplCommand::Start,
        "evaluate" | "eval" => ReplCommand::Evaluate,
        "improve" => ReplCommand::Improve,
        "help" => ReplCommand::Help,
        _ => ReplCommand::Unknown(line.to_string()),
    };
    Some(cmd)
}

pub fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit" | "/exit")
}

/// Runs one command and returns the text to show. Failures become their user message.
pub async fn run_one_turn(
    orchestrator: &ConversationOrchestrator,
    user_id: &str,
    command: &ReplCommand,
) -> String {
    let result = match command {
        ReplCommand::Start => orchestrator.start(user_id).await,
        ReplCommand::Evaluate => orchestrator.evaluate(user_id).await.map(|turn| turn.text),
        ReplCommand::Improve => orchestrator.improve(user_id).await,
        ReplCommand::Draft(task) => orchestrator.draft(user_id, task).await,
        ReplCommand::Help => Ok(HELP.to_string()),
        ReplCommand::Unknown(line) => Ok(format!("Unknown command: {}\n{}", line, HELP)),
        ReplCommand::Quit => Ok(String::new()),
    };
    result.unwrap_or_else(|e| handle_failure(user_id, &e))
}

/// Reads commands from `input` until EOF or a quit command, writing replies to `out`.
pub async fn run_repl_loop<R, W>(
    orchestrator: &ConversationOrchestrator,
    user_id: &str,
    input: R,
    out: &mut W,
    show_prompt: bool,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if show_prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_line(&line) {
            None => continue,
            Some(ReplCommand::Quit) => break,
            Some(c) => c,
        };
        let reply = run_one_turn(orchestrator, user_id, &command).await;
        writeln!(out, "{}", reply)?;
        out.flush()?;
    }
    writeln!(out, "Bye.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_commands_are_case_insensitive() {
        assert_eq!(parse_line("/START"), Some(ReplCommand::Start));
        assert_eq!(parse_line(" /evaluate "), Some(ReplCommand::Evaluate));
        assert_eq!(parse_line("/eval"), Some(ReplCommand::Evaluate));
        assert_eq!(parse_line("/Improve"), Some(ReplCommand::Improve));
        assert_eq!(parse_line("/help"), Some(ReplCommand::Help));
    }

    #[test]
    fn plain_text_is_a_task() {
        assert_eq!(
            parse_line("  write a haiku about rust "),
            Some(ReplCommand::Draft("write a haiku about rust".into()))
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn unknown_slash_command() {
        assert_eq!(
            parse_line("/frobnicate"),
            Some(ReplCommand::Unknown("/frobnicate".into()))
        );
    }

    #[test]
    fn quit_variants() {
        for s in ["quit", "EXIT", "/quit", " /exit "] {
            assert!(is_quit_command(s), "{}", s);
            assert_eq!(parse_line(s), Some(ReplCommand::Quit));
        }
        assert!(!is_quit_command("quitting time"));
    }
}
