//! Rounds, transcripts and their conversions into model prompts.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::provider::ChatMessage;

/// Opening user turn that asks the judge for its first question.
const KICKOFF: &str = "The respondent is ready. Ask your first question.";

/// One question/answer exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Round {
    pub question: String,
    /// Missing while the round is awaiting a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Round {
    /// A round that has been asked but not answered yet.
    pub fn asked(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
        }
    }

    pub fn answered(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: Some(answer.into()),
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// The chronological rounds of one respondent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Transcript {
    rounds: Vec<Round>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn push(&mut self, round: Round) {
        self.rounds.push(round);
    }

    pub fn first_question(&self) -> Option<&str> {
        self.rounds.first().map(|r| r.question.as_str())
    }

    /// Check that no round except the last is missing its answer and that
    /// the transcript fits within `max_rounds`.
    pub fn validate(&self, max_rounds: usize) -> Result<(), GameError> {
        if self.rounds.len() > max_rounds {
            return Err(GameError::InvalidHistory(format!(
                "history has {} rounds, the game allows at most {}",
                self.rounds.len(),
                max_rounds
            )));
        }

        let last = self.rounds.len().saturating_sub(1);
        if let Some(idx) = self.rounds[..last].iter().position(|r| !r.is_answered()) {
            return Err(GameError::InvalidHistory(format!(
                "round {} has no answer but is not the latest round",
                idx + 1
            )));
        }

        Ok(())
    }

    /// Attach an answer to the in-flight round.
    pub fn answer_last(&mut self, answer: impl Into<String>) -> Result<(), GameError> {
        let last = self
            .rounds
            .last_mut()
            .ok_or_else(|| GameError::InvalidHistory("history is empty".to_string()))?;
        last.answer = Some(answer.into());
        Ok(())
    }

    /// The judge's view of the interview so far: a kickoff turn followed by
    /// alternating question (assistant) and answer (user) turns.
    pub fn judge_messages(&self, kickoff: Option<&str>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.rounds.len() * 2 + 1);
        messages.push(ChatMessage::user(kickoff.unwrap_or(KICKOFF)));

        for round in &self.rounds {
            messages.push(ChatMessage::assistant(round.question.clone()));
            if let Some(answer) = &round.answer {
                messages.push(ChatMessage::user(answer.clone()));
            }
        }

        messages
    }

    /// Numbered Q/A block, e.g. `Q1: ...\nA1: ...`.
    pub fn to_qa_block(&self) -> String {
        self.rounds
            .iter()
            .enumerate()
            .map(|(i, round)| {
                format!(
                    "Q{n}: {q}\nA{n}: {a}",
                    n = i + 1,
                    q = round.question,
                    a = round.answer.as_deref().unwrap_or("(no answer)")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<Round>> for Transcript {
    fn from(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }
}

/// Kickoff turn for an opening question that steers away from recent ones.
pub fn kickoff_avoiding(recent: &[String]) -> String {
    if recent.is_empty() {
        return KICKOFF.to_string();
    }

    let listed = recent
        .iter()
        .map(|q| format!("- {}", q))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nThese opening questions were used recently. Ask something different:\n{}",
        KICKOFF, listed
    )
}
