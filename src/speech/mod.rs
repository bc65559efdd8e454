// Speech output
//
// Text-to-speech is best-effort: the interview never waits on it and never
// changes state because of it. Implementations are chosen per platform; the
// session only sees the `SpeechOutput` trait.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use crate::errors::SpeechError;

/// Capability to read text aloud.
pub trait SpeechOutput: Send + Sync {
    /// Start speaking `text`, interrupting anything already playing.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Stop any speech in progress.
    fn stop(&self);

    fn is_speaking(&self) -> bool;
}

/// No audio at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechOutput for SilentSpeech {
    fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Disabled)
    }

    fn stop(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}

/// Speaks by running an external TTS program (`say`, `espeak`, ...) with the
/// text as its last argument.
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: Mutex::new(None),
        }
    }

    /// Platform default TTS program, if one is conventionally available.
    pub fn platform_default() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(Self::new("say", vec!["-r".to_string(), "180".to_string()]))
        } else if cfg!(target_os = "linux") {
            Some(Self::new("espeak", vec!["-s".to_string(), "150".to_string()]))
        } else {
            None
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechOutput for CommandSpeech {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.stop();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }
        Ok(())
    }

    fn stop(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(mut child) = slot.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_speaking(&self) -> bool {
        let Ok(mut slot) = self.child.lock() else {
            return false;
        };
        match slot.as_mut().map(|c| c.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                // Finished or unpollable: reap it
                *slot = None;
                false
            }
            None => false,
        }
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_speech_reports_disabled() {
        let speech = SilentSpeech;
        assert!(matches!(speech.speak("hello"), Err(SpeechError::Disabled)));
        assert!(!speech.is_speaking());
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let speech = CommandSpeech::new("definitely-not-a-tts-binary-xyz", vec![]);
        let err = speech.speak("hello").unwrap_err();
        assert!(matches!(err, SpeechError::Spawn { .. }));
        assert!(!speech.is_speaking());
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_ends_running_command() {
        // The spoken text lands in $0
        let speech = CommandSpeech::new("sh", vec!["-c".to_string(), "sleep 30".to_string()]);
        speech.speak("ignored").unwrap();
        assert!(speech.is_speaking());
        speech.stop();
        assert!(!speech.is_speaking());
    }
}
