//! TuringJudge Core Library
//!
//! Game logic for an interview in which an AI judge questions a human and an
//! AI respondent, then guesses which of the two is human.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod interview;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod recent;
pub mod role;
pub mod router;
pub mod sanitize;
pub mod session;
pub mod transcript;
pub mod verdict;

pub use config::{Config, default_config};
pub use error::GameError;
pub use interview::InterviewOrchestrator;
pub use mock::{MOCK_RESPONSE, MockProvider};
pub use provider::{ChatMessage, ChatRole, CompletionRequest, LlmProvider};
pub use recent::RecentQuestions;
pub use role::{ModelRole, RoleSettings};
pub use router::ModelRouter;
pub use session::{AnswerRequest, AnswerResponse, GameHandler, GameResult, NextQuestion, StartResponse};
pub use transcript::{Round, Transcript};
pub use verdict::{Label, LabeledTranscripts, Verdict};
