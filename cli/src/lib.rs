//! Library side of the `promptsmith` binary: orchestrator wiring and the chat REPL.

pub mod app;
pub mod repl;

pub use app::{build_llm, build_orchestrator, build_store, improvement_filter, render_raw};
pub use repl::{is_quit_command, parse_line, run_one_turn, run_repl_loop, ReplCommand};
