//! Verdict synthesis: anonymized transcripts in, structured guess out.

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::GameError;
use crate::provider::ChatMessage;
use crate::role::ModelRole;
use crate::router::ModelRouter;
use crate::transcript::Transcript;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*\n?(.*?)\s*```$").expect("valid fence pattern")
});

/// Anonymous identifier of a transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Label {
    A,
    B,
}

impl Label {
    /// Draw a label uniformly at random.
    pub fn random() -> Self {
        if rand::rng().random_bool(0.5) {
            Label::A
        } else {
            Label::B
        }
    }

    pub fn other(self) -> Self {
        match self {
            Label::A => Label::B,
            Label::B => Label::A,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::A => f.write_str("A"),
            Label::B => f.write_str("B"),
        }
    }
}

/// The two transcripts in their anonymized slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTranscripts {
    pub a: Transcript,
    pub b: Transcript,
    pub human_label: Label,
}

impl LabeledTranscripts {
    /// Place the human transcript in the slot named by `human_label` and the
    /// AI transcript in the other one.
    pub fn assign(human: Transcript, ai: Transcript, human_label: Label) -> Self {
        match human_label {
            Label::A => Self {
                a: human,
                b: ai,
                human_label,
            },
            Label::B => Self {
                a: ai,
                b: human,
                human_label,
            },
        }
    }

    pub fn get(&self, label: Label) -> &Transcript {
        match label {
            Label::A => &self.a,
            Label::B => &self.b,
        }
    }

    /// The same pair with the slots exchanged.
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            human_label: self.human_label.other(),
        }
    }

    /// Both transcripts as one prompt, A first.
    pub fn to_prompt(&self) -> String {
        format!(
            "Transcript A:\n{}\n\nTranscript B:\n{}",
            self.a.to_qa_block(),
            self.b.to_qa_block()
        )
    }
}

/// Per-label commentary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Analysis {
    #[serde(rename = "A", default)]
    pub a: String,
    #[serde(rename = "B", default)]
    pub b: String,
}

/// The judge's final decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub human_is: Label,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub summary: String,
}

impl Verdict {
    /// Substitute verdict used when the model reply cannot be parsed.
    pub fn fallback(raw: &str, human_label: Label) -> Self {
        Self {
            human_is: human_label,
            analysis: Analysis {
                a: raw.to_string(),
                b: String::new(),
            },
            summary: String::new(),
        }
    }

    /// The same verdict expressed under exchanged labels.
    pub fn swapped(self) -> Self {
        Self {
            human_is: self.human_is.other(),
            analysis: Analysis {
                a: self.analysis.b,
                b: self.analysis.a,
            },
            summary: self.summary,
        }
    }

    pub fn guessed_correctly(&self, human_label: Label) -> bool {
        self.human_is == human_label
    }
}

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed)
}

/// Parse a model reply into a verdict, falling back instead of failing.
pub fn parse_verdict(raw: &str, human_label: Label) -> Verdict {
    match serde_json::from_str::<Verdict>(strip_code_fence(raw)) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(error = %e, "verdict reply was not valid JSON, using fallback");
            Verdict::fallback(raw, human_label)
        }
    }
}

/// Ask the verdict model which transcript is human.
pub async fn synthesize_verdict(
    router: &ModelRouter,
    verdict_prompt: &str,
    transcripts: &LabeledTranscripts,
) -> Result<Verdict, GameError> {
    let raw = router
        .invoke(
            ModelRole::Verdict,
            verdict_prompt,
            vec![ChatMessage::user(transcripts.to_prompt())],
        )
        .await?;

    Ok(parse_verdict(&raw, transcripts.human_label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RolesConfig;
    use crate::mock::MockProvider;
    use crate::role::RoleSettings;
    use crate::transcript::Round;
    use std::sync::Arc;

    const VALID: &str = r#"{"humanIs":"B","analysis":{"A":"Too polished.","B":"Typos and a tangent."},"summary":"B felt lived-in."}"#;

    fn transcript(tag: &str) -> Transcript {
        Transcript::from(vec![
            Round::answered("Q one?", format!("{tag} one")),
            Round::answered("Q two?", format!("{tag} two")),
        ])
    }

    #[test]
    fn test_parse_plain_json() {
        let verdict = parse_verdict(VALID, Label::A);
        assert_eq!(verdict.human_is, Label::B);
        assert_eq!(verdict.analysis.b, "Typos and a tangent.");
        assert_eq!(verdict.summary, "B felt lived-in.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(parse_verdict(&fenced, Label::A).human_is, Label::B);

        let bare_fence = format!("  ```\n{}\n```\n", VALID);
        assert_eq!(parse_verdict(&bare_fence, Label::A).human_is, Label::B);
    }

    #[test]
    fn test_garbage_falls_back() {
        let raw = "I think it's probably the first one, honestly.";
        let verdict = parse_verdict(raw, Label::B);
        assert_eq!(verdict.human_is, Label::B);
        assert_eq!(verdict.analysis.a, raw);
        assert!(verdict.analysis.b.is_empty());
        assert!(verdict.summary.is_empty());
    }

    #[test]
    fn test_invalid_label_falls_back() {
        let raw = r#"{"humanIs":"C","analysis":{"A":"","B":""},"summary":""}"#;
        let verdict = parse_verdict(raw, Label::A);
        assert_eq!(verdict.human_is, Label::A);
        assert_eq!(verdict.analysis.a, raw);
    }

    #[test]
    fn test_swapping_labels_is_equivalent() {
        let human = transcript("human");
        let ai = transcript("ai");
        let verdict = parse_verdict(VALID, Label::B);

        let pair = LabeledTranscripts::assign(human.clone(), ai.clone(), Label::B);
        let swapped_pair = pair.clone().swapped();
        let swapped_verdict = verdict.clone().swapped();

        assert_eq!(swapped_pair.human_label, Label::A);
        assert_eq!(swapped_pair.get(Label::A), &human);
        assert_eq!(
            verdict.guessed_correctly(pair.human_label),
            swapped_verdict.guessed_correctly(swapped_pair.human_label)
        );
        assert_eq!(swapped_verdict.analysis.a, verdict.analysis.b);
        assert_eq!(swapped_verdict.swapped(), verdict);
    }

    #[test]
    fn test_assign_places_human_by_label() {
        let human = transcript("human");
        let ai = transcript("ai");

        let as_a = LabeledTranscripts::assign(human.clone(), ai.clone(), Label::A);
        assert_eq!(as_a.a, human);
        assert_eq!(as_a.b, ai);

        let as_b = LabeledTranscripts::assign(human.clone(), ai.clone(), Label::B);
        assert_eq!(as_b.a, ai);
        assert_eq!(as_b.b, human);
    }

    #[test]
    fn test_prompt_lists_a_then_b() {
        let pair = LabeledTranscripts::assign(transcript("human"), transcript("ai"), Label::B);
        let prompt = pair.to_prompt();
        let a_pos = prompt.find("Transcript A:").unwrap();
        let b_pos = prompt.find("Transcript B:").unwrap();
        assert!(a_pos < b_pos);
        assert!(prompt[a_pos..b_pos].contains("ai one"));
        assert!(prompt[b_pos..].contains("human one"));
    }

    #[test]
    fn test_random_label_hits_both() {
        let labels: Vec<Label> = (0..200).map(|_| Label::random()).collect();
        assert!(labels.contains(&Label::A));
        assert!(labels.contains(&Label::B));
    }

    #[test]
    fn test_verdict_wire_format() {
        let json = serde_json::to_value(Verdict::fallback("raw", Label::A)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"humanIs": "A", "analysis": {"A": "raw", "B": ""}, "summary": ""})
        );
    }

    #[tokio::test]
    async fn test_synthesize_sends_single_prompt() {
        let mock = Arc::new(MockProvider::constant(VALID));
        let roles = RolesConfig {
            judge: RoleSettings::new("mock", "j", 0.9),
            respondent: RoleSettings::new("mock", "r", 1.0),
            verdict: RoleSettings::new("mock", "v", 0.2),
        };
        let router = ModelRouter::new(roles).with_provider(mock.clone());
        let pair = LabeledTranscripts::assign(transcript("human"), transcript("ai"), Label::A);

        let verdict = synthesize_verdict(&router, "decide", &pair).await.unwrap();
        assert_eq!(verdict.human_is, Label::B);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "v");
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].content.contains("Transcript A:"));
    }
}
