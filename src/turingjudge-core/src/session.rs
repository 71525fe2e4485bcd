//! Request-level game flow.
//!
//! The server keeps no per-game record. Each request carries the client's
//! copy of the human transcript and the handler rebuilds the game state
//! from it: start, advance a round, or finish with the AI interview and the
//! verdict.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::GameError;
use crate::interview::{InterviewOrchestrator, next_question};
use crate::recent::RecentQuestions;
use crate::router::ModelRouter;
use crate::transcript::{Round, Transcript, kickoff_avoiding};
use crate::verdict::{Label, LabeledTranscripts, Verdict, synthesize_verdict};

/// Reply to a game start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartResponse {
    pub question: String,
    pub round: usize,
}

/// A human answer plus the client's transcript so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub human_answer: String,
    pub round: usize,
    /// Last entry is the question being answered.
    pub history: Transcript,
}

/// Reply to an answer: either the next question or the finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Next(NextQuestion),
    Complete(GameResult),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextQuestion {
    pub question: String,
    pub round: usize,
    pub history: Transcript,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub verdict: Verdict,
    pub human_transcript: Transcript,
    pub ai_transcript: Transcript,
    pub human_label: Label,
}

/// Handles game requests. One instance serves the whole process.
#[derive(Debug)]
pub struct GameHandler {
    config: Config,
    router: ModelRouter,
    recent: RecentQuestions,
    pick_label: fn() -> Label,
}

impl GameHandler {
    pub fn new(config: Config, router: ModelRouter) -> Self {
        let recent = RecentQuestions::new(config.game.recent_question_capacity);
        Self {
            config,
            router,
            recent,
            pick_label: Label::random,
        }
    }

    /// Replace the label draw, e.g. to pin the human's slot in tests.
    pub fn with_label_picker(mut self, pick_label: fn() -> Label) -> Self {
        self.pick_label = pick_label;
        self
    }

    pub fn rounds(&self) -> usize {
        self.config.game.rounds
    }

    pub fn recent_questions(&self) -> Vec<String> {
        self.recent.snapshot()
    }

    /// Open a new game with a question that differs from recent openers.
    pub async fn start(&self) -> Result<StartResponse, GameError> {
        let kickoff = kickoff_avoiding(&self.recent.snapshot());
        let conversation = Transcript::new().judge_messages(Some(&kickoff));

        let question = next_question(&self.router, &self.judge_prompt(), conversation).await?;
        self.recent.record(question.clone());

        tracing::info!("game started");
        Ok(StartResponse { question, round: 1 })
    }

    /// Record the human's answer and move the game forward.
    pub async fn answer(&self, request: AnswerRequest) -> Result<AnswerResponse, GameError> {
        let AnswerRequest {
            human_answer,
            round,
            mut history,
        } = request;

        history.validate(self.rounds())?;
        if round != history.len() {
            tracing::warn!(
                round,
                history_len = history.len(),
                "round counter disagrees with history length, trusting the counter"
            );
        }
        history.answer_last(human_answer)?;

        if round < self.rounds() {
            if history.len() >= self.rounds() {
                return Err(GameError::InvalidHistory(format!(
                    "round {} is not final but history already holds {} rounds",
                    round,
                    history.len()
                )));
            }
            self.advance(round, history).await.map(AnswerResponse::Next)
        } else {
            self.complete(history).await.map(AnswerResponse::Complete)
        }
    }

    async fn advance(&self, round: usize, mut history: Transcript) -> Result<NextQuestion, GameError> {
        let conversation = history.judge_messages(None);
        let question = next_question(&self.router, &self.judge_prompt(), conversation).await?;
        history.push(Round::asked(question.clone()));

        tracing::info!(round = round + 1, "advanced to next round");
        Ok(NextQuestion {
            question,
            round: round + 1,
            history,
        })
    }

    async fn complete(&self, human_transcript: Transcript) -> Result<GameResult, GameError> {
        let seed = human_transcript.first_question();
        let orchestrator =
            InterviewOrchestrator::new(&self.router, &self.config.prompts, self.rounds());
        let ai_transcript = orchestrator.run(seed).await?;

        let human_label = (self.pick_label)();
        let labeled =
            LabeledTranscripts::assign(human_transcript.clone(), ai_transcript.clone(), human_label);
        let verdict =
            synthesize_verdict(&self.router, self.config.prompts.verdict(), &labeled).await?;

        tracing::info!(
            human_label = %human_label,
            guessed = %verdict.human_is,
            correct = verdict.guessed_correctly(human_label),
            "game complete"
        );

        Ok(GameResult {
            verdict,
            human_transcript,
            ai_transcript,
            human_label,
        })
    }

    fn judge_prompt(&self) -> String {
        self.config.prompts.judge(self.rounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RolesConfig, default_config};
    use crate::mock::{MOCK_RESPONSE, MockProvider};
    use crate::role::RoleSettings;
    use std::sync::Arc;

    fn mock_handler() -> GameHandler {
        let mut config = default_config();
        config.roles = RolesConfig {
            judge: RoleSettings::new("mock", "m", 0.9),
            respondent: RoleSettings::new("mock", "m", 1.0),
            verdict: RoleSettings::new("mock", "m", 0.2),
        };
        let router = ModelRouter::new(config.roles.clone())
            .with_provider(Arc::new(MockProvider::default()));
        GameHandler::new(config, router)
    }

    fn answer(round: usize, history: Transcript) -> AnswerRequest {
        AnswerRequest {
            human_answer: format!("human answer {round}"),
            round,
            history,
        }
    }

    #[tokio::test]
    async fn test_full_game_with_mock() {
        let handler = mock_handler();

        let start = handler.start().await.unwrap();
        assert_eq!(start.question, MOCK_RESPONSE);
        assert_eq!(start.round, 1);

        let mut history = Transcript::from(vec![Round::asked(start.question)]);
        let mut round = start.round;
        let result = loop {
            match handler.answer(answer(round, history.clone())).await.unwrap() {
                AnswerResponse::Next(next) => {
                    assert_eq!(next.round, round + 1);
                    assert_eq!(next.history.len(), round + 1);
                    history = next.history;
                    round = next.round;
                }
                AnswerResponse::Complete(result) => break result,
            }
        };

        assert_eq!(round, 3);
        assert_eq!(result.human_transcript.len(), 3);
        assert_eq!(result.ai_transcript.len(), 3);
        assert_eq!(
            result.ai_transcript.first_question(),
            result.human_transcript.first_question()
        );
        assert!(result.human_transcript.rounds().iter().all(Round::is_answered));
        // The mock reply is not JSON, so the fallback applies.
        assert_eq!(result.verdict.human_is, result.human_label);
        assert_eq!(result.verdict.analysis.a, MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn test_start_records_recent_questions() {
        let handler = mock_handler();
        for _ in 0..6 {
            handler.start().await.unwrap();
        }
        assert_eq!(handler.recent_questions().len(), 5);
    }

    #[tokio::test]
    async fn test_start_tells_judge_about_recent_openers() {
        let judge = Arc::new(MockProvider::new(vec![
            "First opener?".to_string(),
            "Second opener?".to_string(),
        ]));
        let mut config = default_config();
        config.roles.judge = RoleSettings::new("mock", "m", 0.9);
        let router = ModelRouter::new(config.roles.clone()).with_provider(judge.clone());
        let handler = GameHandler::new(config, router);

        handler.start().await.unwrap();
        handler.start().await.unwrap();

        let requests = judge.requests();
        assert!(!requests[0].messages[0].content.contains("First opener?"));
        assert!(requests[1].messages[0].content.contains("- First opener?"));
    }

    #[tokio::test]
    async fn test_final_round_uses_pinned_label() {
        let handler = mock_handler().with_label_picker(|| Label::B);
        let history = Transcript::from(vec![
            Round::answered("Q1", "a1"),
            Round::answered("Q2", "a2"),
            Round::asked("Q3"),
        ]);

        let response = handler.answer(answer(3, history)).await.unwrap();
        let AnswerResponse::Complete(result) = response else {
            panic!("expected a finished game");
        };
        assert_eq!(result.human_label, Label::B);
        assert_eq!(result.ai_transcript.first_question(), Some("Q1"));
        assert_eq!(
            result.human_transcript.rounds()[2].answer.as_deref(),
            Some("human answer 3")
        );
    }

    #[tokio::test]
    async fn test_round_counter_drives_branching() {
        let handler = mock_handler();
        // Counter says final round although only one round exists.
        let history = Transcript::from(vec![Round::asked("Q1")]);
        let response = handler.answer(answer(3, history)).await.unwrap();
        let AnswerResponse::Complete(result) = response else {
            panic!("expected a finished game");
        };
        assert_eq!(result.human_transcript.len(), 1);
        assert_eq!(result.ai_transcript.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_history_is_rejected() {
        let handler = mock_handler();

        let empty = handler.answer(answer(1, Transcript::new())).await;
        assert!(matches!(empty, Err(GameError::InvalidHistory(_))));

        let gap = Transcript::from(vec![Round::asked("Q1"), Round::asked("Q2")]);
        let result = handler.answer(answer(2, gap)).await;
        assert!(result.as_ref().is_err_and(GameError::is_client_error));
    }

    #[tokio::test]
    async fn test_full_history_cannot_grow_past_round_limit() {
        let handler = mock_handler();
        let history = Transcript::from(vec![
            Round::answered("Q1", "a1"),
            Round::answered("Q2", "a2"),
            Round::asked("Q3"),
        ]);

        let result = handler.answer(answer(1, history)).await;
        assert!(matches!(result, Err(GameError::InvalidHistory(_))));
    }

    #[test]
    fn test_answer_request_wire_format() {
        let request: AnswerRequest = serde_json::from_value(serde_json::json!({
            "humanAnswer": "hi",
            "round": 1,
            "history": [{"question": "Q1"}]
        }))
        .unwrap();
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.round, 1);
    }
}
