// Interactive interview REPL
//
// Plain lines are answers. A line ending in `\` is added to the draft and
// composition continues on the next line. Lines starting with `/` are
// commands.

use anyhow::Result;
use crossterm::{
    cursor,
    style::Stylize,
    terminal::{self, Clear, ClearType},
    ExecutableCommand,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use crate::errors::InterviewError;
use crate::interview::{InterviewSession, TurnOutcome};

use super::commands::{format_help, format_history, format_progress, format_status, Command};

/// Get current terminal width, or default to 80 if not a TTY
fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

/// Answer being written across several lines.
///
/// `open` tracks whether a `\` continuation is pending, separately from the
/// text, so a draft that is still empty keeps swallowing `/word` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
    open: bool,
}

impl Draft {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Join `line` onto the draft. Returns the full answer once a line
    /// without a trailing backslash closes it.
    pub fn feed(&mut self, line: &str) -> Option<String> {
        let (text, more) = match line.trim_end().strip_suffix('\\') {
            Some(text) => (text, true),
            None => (line, false),
        };

        if self.open {
            self.text.push('\n');
        }
        self.text.push_str(text);

        if more {
            self.open = true;
            None
        } else {
            self.open = false;
            Some(std::mem::take(&mut self.text))
        }
    }

    pub fn discard(&mut self) {
        self.text.clear();
        self.open = false;
    }
}

pub struct Repl {
    session: Arc<InterviewSession>,
    editor: DefaultEditor,
    draft: Draft,
    is_interactive: bool,
}

impl Repl {
    pub fn new(session: Arc<InterviewSession>) -> Result<Self> {
        Ok(Self {
            session,
            editor: DefaultEditor::new()?,
            draft: Draft::default(),
            is_interactive: io::stdout().is_terminal(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.is_interactive {
            println!("Psyche v{} - Self-reflection interview", env!("CARGO_PKG_VERSION"));
            println!("{}", "Type /help for commands.".dark_grey());
            if let Some(warning) = self.session.persistence_warning().await {
                println!("{}", warning.yellow());
            }
        }

        self.print_question().await;
        self.session.announce().await;

        loop {
            let composing = self.draft.is_open();
            let prompt = if composing { ". " } else { "> " };

            let line = match self.editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) if composing => {
                    self.draft.discard();
                    self.session.set_draft(String::new()).await;
                    println!("{}", "Draft discarded.".dark_grey());
                    continue;
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            if !composing && Command::looks_like_command(&line) {
                match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => self.handle_command(command).await?,
                    None => println!("Unknown command: {} (try /help)", line.trim()),
                }
                continue;
            }

            match self.draft.feed(&line) {
                None => self.session.set_draft(self.draft.text()).await,
                Some(answer) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.submit(&answer).await?;
                }
            }
        }

        self.session.close();
        if self.is_interactive {
            println!("Goodbye!");
        }
        Ok(())
    }

    async fn submit(&mut self, answer: &str) -> Result<()> {
        if self.is_interactive {
            print!("{}", "Reflecting...".dark_grey());
            io::stdout().flush()?;
        }

        let result = self.session.submit_answer(answer).await;

        if self.is_interactive {
            io::stdout()
                .execute(cursor::MoveToColumn(0))?
                .execute(Clear(ClearType::CurrentLine))?;
        }

        match result {
            Ok(outcome) => self.print_outcome(&outcome),
            Err(InterviewError::EmptyAnswer) => {
                self.draft.discard();
                self.session.set_draft(String::new()).await;
                println!("{}", InterviewError::EmptyAnswer.to_string().yellow());
            }
            Err(e) => eprintln!("Error: {}", e),
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", format_help()),
            Command::Play => {
                if let Err(e) = self.session.play_question().await {
                    println!("{}", format!("Audio unavailable: {}", e).dark_grey());
                }
            }
            Command::Stop => self.session.stop_speaking(),
            Command::Audio => {
                let enabled = self.session.toggle_audio().await;
                println!("Read-aloud {}", if enabled { "on" } else { "off" });
            }
            Command::History => println!("{}", format_history(&self.session.history().await)),
            Command::Progress => println!("{}", format_progress(&self.session.progress().await)),
            Command::Status => println!("{}", format_status(&self.session.status().await)),
            Command::Erase => {
                let confirm = self
                    .editor
                    .readline("Erase all your answers and start over? [y/N] ")
                    .unwrap_or_default();
                if !confirm.trim().eq_ignore_ascii_case("y") {
                    println!("Nothing erased.");
                    return Ok(());
                }
                match self.session.erase_all().await {
                    Ok(()) => {
                        println!("All your data has been erased.");
                        self.print_question().await;
                    }
                    Err(e) => eprintln!("Error: {:#}", e),
                }
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn print_question(&self) {
        let question = self.session.current_question().await;
        let extended = self.session.is_extended().await;
        self.print_question_text(&question, extended, false);
    }

    fn print_outcome(&self, outcome: &TurnOutcome) {
        if outcome.fallback && self.is_interactive {
            println!("{}", "(offline: continuing with the next question)".dark_grey());
        }
        if let Some(ref warning) = outcome.persistence_warning {
            println!("{}", warning.as_str().yellow());
        }
        self.print_question_text(&outcome.question, outcome.extended, outcome.branched);
    }

    fn print_question_text(&self, question: &str, extended: bool, follow_up: bool) {
        if !self.is_interactive {
            println!("{}", question);
            return;
        }

        println!();
        println!("{}", "─".repeat(terminal_width()));
        let mut badges = Vec::new();
        if extended {
            badges.push("extended session");
        }
        if follow_up {
            badges.push("follow-up");
        }
        if !badges.is_empty() {
            println!("{}", format!("[{}]", badges.join(" · ")).magenta());
        }
        println!("{}", question.bold());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_submits() {
        let mut draft = Draft::default();
        assert_eq!(draft.feed("I am fine"), Some("I am fine".to_string()));
        assert!(!draft.is_open());
    }

    #[test]
    fn test_backslash_continues_draft() {
        let mut draft = Draft::default();
        assert_eq!(draft.feed("first line \\"), None);
        assert!(draft.is_open());
        assert_eq!(draft.text(), "first line ");
        assert_eq!(
            draft.feed("second line"),
            Some("first line \nsecond line".to_string())
        );
        assert_eq!(draft, Draft::default());
    }

    #[test]
    fn test_lone_backslash_keeps_composing() {
        let mut draft = Draft::default();
        assert_eq!(draft.feed("\\"), None);
        assert!(draft.is_open());
        assert_eq!(draft.text(), "");
        assert_eq!(draft.feed("/help"), Some("\n/help".to_string()));
    }

    #[test]
    fn test_blank_line_submits_draft_so_far() {
        let mut draft = Draft::default();
        draft.feed("kept\\");
        assert_eq!(draft.feed(""), Some("kept\n".to_string()));
    }

    #[test]
    fn test_discard_closes_draft() {
        let mut draft = Draft::default();
        draft.feed("half a thought\\");
        draft.discard();
        assert!(!draft.is_open());
        assert_eq!(draft.text(), "");
    }
}
