//! Configuration: embedded defaults, optional TOML file, environment overrides.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::GameError;
use crate::role::{ModelRole, RoleSettings};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub roles: RolesConfig,
    pub prompts: PromptsConfig,
    pub providers: ProvidersConfig,
}

/// Shape of a game.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Question/answer rounds per respondent.
    pub rounds: usize,
    /// How many recent opening questions the judge is told to avoid.
    pub recent_question_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            recent_question_capacity: 5,
        }
    }
}

/// Settings for each model role.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub judge: RoleSettings,
    pub respondent: RoleSettings,
    pub verdict: RoleSettings,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            judge: RoleSettings::new("openai", "gpt-4o", 0.9).with_max_tokens(300),
            respondent: RoleSettings::new("anthropic", "claude-3-5-sonnet-latest", 1.0)
                .with_max_tokens(400),
            verdict: RoleSettings::new("openai", "gpt-4o", 0.3).with_max_tokens(1200),
        }
    }
}

impl RolesConfig {
    pub fn get(&self, role: ModelRole) -> &RoleSettings {
        match role {
            ModelRole::Judge => &self.judge,
            ModelRole::Respondent => &self.respondent,
            ModelRole::Verdict => &self.verdict,
        }
    }

    pub fn get_mut(&mut self, role: ModelRole) -> &mut RoleSettings {
        match role {
            ModelRole::Judge => &mut self.judge,
            ModelRole::Respondent => &mut self.respondent,
            ModelRole::Verdict => &mut self.verdict,
        }
    }
}

/// Instruction texts for the three roles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub judge_prompt: String,
    pub respondent_prompt: String,
    pub verdict_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            judge_prompt: DEFAULT_JUDGE_PROMPT.to_string(),
            respondent_prompt: DEFAULT_RESPONDENT_PROMPT.to_string(),
            verdict_prompt: DEFAULT_VERDICT_PROMPT.to_string(),
        }
    }
}

impl PromptsConfig {
    /// Get the judge prompt with the round count filled in.
    pub fn judge(&self, rounds: usize) -> String {
        self.judge_prompt.replace("{rounds}", &rounds.to_string())
    }

    pub fn respondent(&self) -> &str {
        &self.respondent_prompt
    }

    pub fn verdict(&self) -> &str {
        &self.verdict_prompt
    }
}

/// Credentials and endpoints of the hosted backends.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_base: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: crate::openai::DEFAULT_API_BASE.to_string(),
            anthropic_api_key: None,
            anthropic_api_base: crate::anthropic::DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| GameError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Load configuration from string content.
    pub fn from_toml(content: &str) -> Result<Self, GameError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| GameError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, GameError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup.
    ///
    /// Recognised keys are `<ROLE>_PROVIDER`, `<ROLE>_MODEL`,
    /// `<ROLE>_TEMPERATURE`, `<ROLE>_MAX_TOKENS` for each role prefix,
    /// `GAME_ROUNDS`, and the provider credential variables.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, GameError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for role in ModelRole::all() {
            let prefix = role.env_prefix();
            let settings = self.roles.get_mut(role);

            if let Some(provider) = lookup(&format!("{prefix}_PROVIDER")) {
                settings.provider = provider.trim().to_lowercase();
            }
            if let Some(model) = lookup(&format!("{prefix}_MODEL")) {
                settings.model = model;
            }
            if let Some(raw) = lookup(&format!("{prefix}_TEMPERATURE")) {
                settings.temperature = parse_value(&format!("{prefix}_TEMPERATURE"), &raw)?;
            }
            if let Some(raw) = lookup(&format!("{prefix}_MAX_TOKENS")) {
                settings.max_tokens = parse_value(&format!("{prefix}_MAX_TOKENS"), &raw)?;
            }
        }

        if let Some(raw) = lookup("GAME_ROUNDS") {
            self.game.rounds = parse_value("GAME_ROUNDS", &raw)?;
        }

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.providers.openai_api_key = Some(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE").or_else(|| lookup("OPENAI_BASE_URL")) {
            self.providers.openai_api_base = base;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.providers.anthropic_api_key = Some(key);
        }
        if let Some(base) = lookup("ANTHROPIC_API_BASE") {
            self.providers.anthropic_api_base = base;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), GameError> {
        if self.game.rounds == 0 {
            return Err(GameError::ConfigError(
                "game.rounds must be at least 1".to_string(),
            ));
        }
        if self.game.recent_question_capacity == 0 {
            return Err(GameError::ConfigError(
                "game.recent_question_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, GameError> {
    raw.trim()
        .parse()
        .map_err(|_| GameError::ConfigError(format!("Invalid value for {}: '{}'", key, raw)))
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        game: GameConfig::default(),
        roles: RolesConfig::default(),
        prompts: PromptsConfig::default(),
        providers: ProvidersConfig::default(),
    }
}

const DEFAULT_JUDGE_PROMPT: &str = r#"You are the interviewer in a game that tests whether a conversation partner is a human or an AI.

You will ask exactly {rounds} questions, one at a time. After each answer you ask the next question.

INTERVIEW RULES:
- Ask one short, open question per turn
- Favour questions about lived experience, senses, memory, and small everyday details
- Build on what the respondent said in earlier answers
- Do not reveal what you suspect and do not comment on the answers

CRITICAL OUTPUT RULES:
- Output ONLY the question itself
- No greetings, numbering, preamble, or markdown formatting
"#;

const DEFAULT_RESPONDENT_PROMPT: &str = r#"You are taking part in a game where an interviewer tries to tell humans and AIs apart. Answer as a real person would.

ANSWERING STYLE:
- Keep answers short and conversational, one to three sentences
- Use casual language; small imperfections are fine
- Draw on plausible, specific personal details
- Never mention being an AI, a language model, or an assistant

CRITICAL OUTPUT RULES:
- Output ONLY your answer
- No quotation marks, stage directions, or markdown formatting
"#;

const DEFAULT_VERDICT_PROMPT: &str = r#"You are the judge in a game that tests whether a respondent is a human or an AI.

You will receive two interview transcripts labeled "A" and "B". Exactly one respondent is a human; the other is an AI.

Decide which transcript belongs to the human. Explain the evidence you see in each transcript and reflect briefly on the decision.

Respond with ONLY a JSON object of this exact shape:
{
  "humanIs": "A" or "B",
  "analysis": {
    "A": "your analysis of transcript A",
    "B": "your analysis of transcript B"
  },
  "summary": "a short reflection on your decision"
}
"#;
