//! Interview orchestration.
//!
//! Drives one respondent through the configured number of rounds, feeding
//! every earlier answer back to the judge so later questions can build on
//! them.

use crate::config::PromptsConfig;
use crate::error::GameError;
use crate::provider::ChatMessage;
use crate::role::ModelRole;
use crate::router::ModelRouter;
use crate::sanitize::sanitize_response;
use crate::transcript::{Round, Transcript};

/// Runs the AI respondent's interview.
pub struct InterviewOrchestrator<'a> {
    router: &'a ModelRouter,
    prompts: &'a PromptsConfig,
    rounds: usize,
}

impl<'a> InterviewOrchestrator<'a> {
    pub fn new(router: &'a ModelRouter, prompts: &'a PromptsConfig, rounds: usize) -> Self {
        Self {
            router,
            prompts,
            rounds,
        }
    }

    /// Run the full interview.
    ///
    /// With a `seed_question`, round 1 reuses it verbatim and the judge is
    /// only consulted from round 2 on. Any failed model call aborts the
    /// whole interview.
    pub async fn run(&self, seed_question: Option<&str>) -> Result<Transcript, GameError> {
        let mut transcript = Transcript::new();
        let mut conversation = Transcript::new().judge_messages(None);

        for i in 0..self.rounds {
            let question = match (i, seed_question) {
                (0, Some(seed)) => seed.to_string(),
                _ => self.ask_judge(conversation.clone()).await?,
            };

            let answer = self.ask_respondent(&question).await?;
            tracing::debug!(round = i + 1, "respondent answered");

            if i + 1 < self.rounds {
                conversation.push(ChatMessage::assistant(question.clone()));
                conversation.push(ChatMessage::user(answer.clone()));
            }
            transcript.push(Round::answered(question, answer));
        }

        Ok(transcript)
    }

    async fn ask_judge(&self, conversation: Vec<ChatMessage>) -> Result<String, GameError> {
        next_question(self.router, &self.prompts.judge(self.rounds), conversation).await
    }

    /// The respondent sees only the current question; each call is
    /// independent of earlier rounds.
    async fn ask_respondent(&self, question: &str) -> Result<String, GameError> {
        let response = self
            .router
            .invoke(
                ModelRole::Respondent,
                self.prompts.respondent(),
                vec![ChatMessage::user(question)],
            )
            .await?;

        Ok(sanitize_response(&response))
    }
}

/// Ask the judge for its next question given the conversation so far.
pub async fn next_question(
    router: &ModelRouter,
    judge_prompt: &str,
    conversation: Vec<ChatMessage>,
) -> Result<String, GameError> {
    let response = router
        .invoke(ModelRole::Judge, judge_prompt, conversation)
        .await?;
    let question = sanitize_response(&response);

    if question.is_empty() {
        return Err(GameError::UpstreamError(
            "judge returned an empty question".to_string(),
        ));
    }

    Ok(question)
}
