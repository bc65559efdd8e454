// Advisory decision and the rule that derives it from a raw classifier reply

/// Marker the classifier returns when the planned question should follow.
pub const CONTINUE_SENTINEL: &str = "NEXT_STANDARD";

/// Replies this short (after trimming) are never treated as real questions.
pub const MIN_BRANCH_CHARS: usize = 10;

/// What to show after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryDecision {
    /// Advance the cursor and show the next scripted question.
    Continue,
    /// Keep the cursor and show a generated follow-up question.
    Branch(String),
}

impl AdvisoryDecision {
    /// Interpret a raw classifier reply.
    ///
    /// `Continue` when the reply is absent, blank, mentions the sentinel, is
    /// at most [`MIN_BRANCH_CHARS`] characters long, or is nothing but quote
    /// characters. Otherwise the reply, with surrounding quotes removed,
    /// becomes the follow-up question.
    pub fn from_response(response: Option<&str>) -> Self {
        let Some(raw) = response else {
            return AdvisoryDecision::Continue;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.contains(CONTINUE_SENTINEL)
            || trimmed.chars().count() <= MIN_BRANCH_CHARS
        {
            return AdvisoryDecision::Continue;
        }

        let question = strip_surrounding_quotes(trimmed);
        if question.is_empty() {
            return AdvisoryDecision::Continue;
        }

        AdvisoryDecision::Branch(question.to_string())
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, AdvisoryDecision::Branch(_))
    }
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’' | '`')
}

/// Remove quote characters (and whitespace between them) from both ends.
pub fn strip_surrounding_quotes(text: &str) -> &str {
    text.trim_matches(|c: char| is_quote(c) || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_and_blank_continue() {
        assert_eq!(AdvisoryDecision::from_response(None), AdvisoryDecision::Continue);
        assert_eq!(AdvisoryDecision::from_response(Some("")), AdvisoryDecision::Continue);
        assert_eq!(
            AdvisoryDecision::from_response(Some("  \n ")),
            AdvisoryDecision::Continue
        );
    }

    #[test]
    fn test_exact_sentinel_continues() {
        assert_eq!(
            AdvisoryDecision::from_response(Some("NEXT_STANDARD")),
            AdvisoryDecision::Continue
        );
        assert_eq!(
            AdvisoryDecision::from_response(Some("NEXT_STANDARD\n")),
            AdvisoryDecision::Continue
        );
    }

    #[test]
    fn test_sentinel_inside_longer_reply_continues() {
        let reply = "The answer was shallow, so: NEXT_STANDARD";
        assert_eq!(
            AdvisoryDecision::from_response(Some(reply)),
            AdvisoryDecision::Continue
        );
    }

    #[test]
    fn test_short_reply_continues() {
        assert_eq!(
            AdvisoryDecision::from_response(Some("Why not?")),
            AdvisoryDecision::Continue
        );
        // Exactly ten characters is still too short
        assert_eq!(
            AdvisoryDecision::from_response(Some("0123456789")),
            AdvisoryDecision::Continue
        );
    }

    #[test]
    fn test_eleven_chars_branches() {
        assert_eq!(
            AdvisoryDecision::from_response(Some("Who hurt u?")),
            AdvisoryDecision::Branch("Who hurt u?".to_string())
        );
    }

    #[test]
    fn test_branch_strips_surrounding_quotes() {
        assert_eq!(
            AdvisoryDecision::from_response(Some("\"What did your mother say?\"\n")),
            AdvisoryDecision::Branch("What did your mother say?".to_string())
        );
        assert_eq!(
            AdvisoryDecision::from_response(Some("“Why does that scare you?”")),
            AdvisoryDecision::Branch("Why does that scare you?".to_string())
        );
    }

    #[test]
    fn test_inner_apostrophes_kept() {
        let decision = AdvisoryDecision::from_response(Some("'What's stopping you today?'"));
        assert_eq!(
            decision,
            AdvisoryDecision::Branch("What's stopping you today?".to_string())
        );
    }

    #[test]
    fn test_only_quotes_continue() {
        assert_eq!(
            AdvisoryDecision::from_response(Some("\"\"\"\"\"\"\"\"\"\"\"\"")),
            AdvisoryDecision::Continue
        );
    }
}
