// Classification prompt

use crate::interview::decision::CONTINUE_SENTINEL;
use crate::interview::ClassificationRequest;

/// Build the single prompt sent to the advisory service.
pub fn build_prompt(request: &ClassificationRequest) -> String {
    format!(
        "You are an expert psychologist conducting a deep self-discovery interview.\n\
         \n\
         User's last answer: \"{answer}\"\n\
         Current question was: \"{current}\"\n\
         Next planned standard question: \"{planned}\"\n\
         \n\
         TASK:\n\
         Analyse the user's answer.\n\
         1. If the answer was short, superficial, or unclear, return \"{sentinel}\".\n\
         2. If the answer was deep, emotional, or revealed a contradiction, generate a \
         specific, short, powerful follow-up question to dig deeper.\n\
         \n\
         Output ONLY the question text or \"{sentinel}\".",
        answer = request.last_answer.trim(),
        current = request.current_question,
        planned = request.planned_next,
        sentinel = CONTINUE_SENTINEL,
    )
}
