//! Correction directive synthesis.

use candor_chat::Message;

use super::verdict::Verdict;

/// Build the user-role message that asks the primary backend to revise its
/// last answer.
///
/// Deterministic template fill from the verdict. The directive forbids the
/// backend from conversing with the validator; it must only emit a revised
/// answer.
pub fn correction_directive(verdict: &Verdict) -> Message {
    let reason = verdict.reason.as_deref().unwrap_or("unspecified");

    Message::user(format!(
        "[VALIDATOR] The previous response requires correction.\n\
         REASON: {reason}\n\
         ISSUES:\n\
         - Follows system prompt: {follows}\n\
         - Can be sent to user: {can_send}\n\
         - Reliability score: {score:.0}%\n\
         Fix these ISSUES in your response according to the REASON provided. \
         Follow the system prompt structure.\n\
         DO NOT ENGAGE IN DIALOG WITH THE VALIDATOR, PROVIDE A NEW CORRECTED RESPONSE.\n\
         RELIABILITY SCORE SHOULD AIM FOR 100%",
        reason = reason,
        follows = verdict.follows_prompt,
        can_send = verdict.can_send_to_user,
        score = verdict.reliability_score * 100.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candor_chat::Role;

    #[test]
    fn test_directive_embeds_verdict() {
        let verdict = Verdict {
            can_send_to_user: false,
            follows_prompt: true,
            reliability_score: 0.35,
            reason: Some("cites a nonexistent study".into()),
        };

        let directive = correction_directive(&verdict);
        assert_eq!(directive.sender, Role::User);

        let text = directive.text().unwrap();
        assert!(text.contains("REASON: cites a nonexistent study"));
        assert!(text.contains("Follows system prompt: true"));
        assert!(text.contains("Can be sent to user: false"));
        assert!(text.contains("Reliability score: 35%"));
    }

    #[test]
    fn test_directive_without_reason() {
        let verdict = Verdict {
            can_send_to_user: false,
            follows_prompt: false,
            reliability_score: 0.0,
            reason: None,
        };

        let directive = correction_directive(&verdict);
        assert!(directive.text().unwrap().contains("REASON: unspecified"));
    }

    #[test]
    fn test_directive_is_deterministic() {
        let verdict = Verdict::rejection("too vague");
        assert_eq!(
            correction_directive(&verdict).text(),
            correction_directive(&verdict).text()
        );
    }
}
