// Slash command handling

use crate::interview::{Progress, SessionStatus, Step, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Play,
    Stop,
    Audio,
    History,
    Progress,
    Status,
    Erase,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/play" => Some(Command::Play),
            "/stop" => Some(Command::Stop),
            "/audio" => Some(Command::Audio),
            "/history" => Some(Command::History),
            "/progress" => Some(Command::Progress),
            "/status" => Some(Command::Status),
            "/erase" => Some(Command::Erase),
            _ => None,
        }
    }

    /// A single `/word` token: meant as a command even if unknown.
    pub fn looks_like_command(input: &str) -> bool {
        let input = input.trim();
        input.starts_with('/') && input.len() > 1 && !input.contains(char::is_whitespace)
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /help      - Show this help message
  /play      - Read the current question aloud
  /stop      - Stop speaking
  /audio     - Toggle automatic read-aloud
  /history   - Show your answers so far
  /progress  - Show progress through the questions
  /status    - Show session details
  /erase     - Erase all your stored answers and start over
  /quit      - Exit

Type your answer and press Enter. End a line with \ to keep writing."#
        .to_string()
}

pub fn format_history(entries: &[TranscriptEntry]) -> String {
    if entries.is_empty() {
        return "No answers yet.".to_string();
    }

    let mut output = format!("Your reflections ({}):\n", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!(
            "\n{}. [{}] {}\n   {}\n",
            i + 1,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.question,
            entry.answer
        ));
    }
    output
}

pub fn format_progress(progress: &Progress) -> String {
    let marks: String = progress
        .steps
        .iter()
        .map(|step| match step {
            Step::Completed => '●',
            Step::Current => '◉',
            Step::Upcoming => '○',
        })
        .collect();

    let position = progress
        .steps
        .iter()
        .position(|s| *s == Step::Current)
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut output = format!("{}  question {} of {}", marks, position, progress.steps.len());
    if progress.cycle > 0 {
        output.push_str(&format!("  (extended session, pass {})", progress.cycle + 1));
    }
    output
}

pub fn format_status(status: &SessionStatus) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    format!(
        "Session status:\n\
        Session: {}\n\
        User: {}\n\
        Classifier: {}\n\
        Storage: {}\n\
        Question index: {} (script of {}){}\n\
        Follow-up depth: {}\n\
        Answers recorded: {}\n\
        Audio: {}{}\n\
        Save failures: {}",
        status.session_id,
        status.user_tag,
        status.classifier,
        status.backend,
        status.cursor,
        status.script_len,
        if status.extended { ", extended" } else { "" },
        status.branch_depth,
        status.answers,
        on_off(status.audio_enabled),
        if status.speaking { " (speaking)" } else { "" },
        status.persistence_failures,
    )
}
