//! Oracle HTTP client with retry, backoff, and rate limiting
//!
//! Sync HTTP via ureq — the pipeline is sequential, so no async runtime is
//! needed. Both supported backends speak the OpenAI chat-completion wire
//! format.

use crate::config::OracleConfig;
use crate::oracle::{OracleError, OracleResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Minimum spacing between request starts, regardless of configuration.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

/// Base delay for the dedicated rate-limit backoff.
const RATE_LIMIT_BASE_DELAY: Duration = Duration::from_secs(5);

const SYSTEM_PROMPT: &str =
    "You are an expert code reviewer specializing in code quality and engineering productivity.";

/// Supported oracle backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    OpenRouter,
    OpenAi,
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::OpenRouter => "OPENROUTER_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }
}

/// Compute the backoff delay before retry `attempt` (0-indexed).
///
/// Rate-limit responses get a dedicated longer schedule (base 5s); everything
/// else doubles from the configured base delay.
pub fn backoff_delay(attempt: u32, base_delay: Duration, rate_limited: bool) -> Duration {
    let base = if rate_limited {
        RATE_LIMIT_BASE_DELAY
    } else {
        base_delay
    };
    base * 2u32.saturating_pow(attempt)
}

/// Oracle client — one instance enforces the global request spacing.
pub struct OracleClient {
    backend: LlmBackend,
    model: String,
    api_key: String,
    extra_headers: Vec<(String, String)>,
    max_retries: u32,
    base_delay: Duration,
    request_interval: Duration,
    agent: ureq::Agent,
    last_request: Option<Instant>,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // status codes handled explicitly below
        .timeout_global(Some(Duration::from_secs(120))) // LLM calls can be slow
        .build()
        .new_agent()
}

impl OracleClient {
    /// Build a client from the environment.
    ///
    /// `OPENROUTER_API_KEY` selects the OpenRouter backend (with optional
    /// `OPENROUTER_MODEL` / `OPENROUTER_REFERER` / `OPENROUTER_TITLE`);
    /// otherwise `OPENAI_API_KEY` selects OpenAI.
    pub fn from_env(config: &OracleConfig) -> OracleResult<Self> {
        let (backend, api_key) = if let Ok(key) = env::var(LlmBackend::OpenRouter.env_key()) {
            (LlmBackend::OpenRouter, key)
        } else if let Ok(key) = env::var(LlmBackend::OpenAi.env_key()) {
            (LlmBackend::OpenAi, key)
        } else {
            return Err(OracleError::MissingApiKey {
                env_vars: "OPENROUTER_API_KEY or OPENAI_API_KEY".to_string(),
            });
        };

        let mut model = config.model.clone();
        let mut extra_headers = Vec::new();
        if backend == LlmBackend::OpenRouter {
            if let Ok(m) = env::var("OPENROUTER_MODEL") {
                model = m;
            }
            if let Ok(referer) = env::var("OPENROUTER_REFERER") {
                extra_headers.push(("HTTP-Referer".to_string(), referer));
            }
            if let Ok(title) = env::var("OPENROUTER_TITLE") {
                extra_headers.push(("X-Title".to_string(), title));
            }
        }

        info!("Using {:?} oracle backend, model: {model}", backend);

        Ok(Self {
            backend,
            model,
            api_key,
            extra_headers,
            max_retries: config.max_retries,
            base_delay: Duration::from_secs_f64(config.base_delay_secs.max(0.0)),
            request_interval: Duration::from_secs_f64(config.request_interval_secs.max(0.0)),
            agent: make_agent(),
            last_request: None,
        })
    }

    pub fn backend(&self) -> LlmBackend {
        self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt, retrying with backoff, and return the raw reply text.
    pub fn complete(&mut self, prompt: &str) -> OracleResult<String> {
        for attempt in 0..self.max_retries {
            self.wait_for_rate_limit();

            match self.send_once(prompt) {
                Ok(text) => return Ok(text),
                Err(OracleError::RateLimited) => {
                    let delay = backoff_delay(attempt, self.base_delay, true);
                    warn!(
                        "Oracle rate limited (attempt {}/{}), backing off {:?}",
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => {
                    warn!(
                        "Oracle call failed (attempt {}/{}): {e}",
                        attempt + 1,
                        self.max_retries
                    );
                    if attempt + 1 < self.max_retries {
                        std::thread::sleep(backoff_delay(attempt, self.base_delay, false));
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(OracleError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }

    /// Enforce the minimum spacing between request starts. Applies across
    /// all calls made through this client, including retries.
    fn wait_for_rate_limit(&mut self) {
        let min_interval = self.request_interval.max(MIN_REQUEST_INTERVAL);
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                debug!("Rate limit spacing: sleeping {:?}", wait);
                std::thread::sleep(wait);
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn send_once(&self, prompt: &str) -> OracleResult<String> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 1024,
        };

        let mut req = self
            .agent
            .post(self.backend.api_url())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key));
        for (name, value) in &self.extra_headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req
            .send_json(&body)
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(OracleError::RateLimited);
        }
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(OracleError::ApiError { status, message });
        }

        let reply: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|e| OracleError::ParseError(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::ParseError("No response choices".to_string()))
    }
}

// Chat completion wire types (OpenAI-compatible)
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_endpoints() {
        assert_eq!(LlmBackend::OpenRouter.env_key(), "OPENROUTER_API_KEY");
        assert_eq!(LlmBackend::OpenAi.env_key(), "OPENAI_API_KEY");
        assert!(LlmBackend::OpenRouter.api_url().contains("openrouter.ai"));
        assert!(LlmBackend::OpenAi.api_url().contains("api.openai.com"));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(0, base, false), Duration::from_secs(1));
        assert_eq!(backoff_delay(1, base, false), Duration::from_secs(2));
        assert_eq!(backoff_delay(2, base, false), Duration::from_secs(4));
    }

    #[test]
    fn rate_limit_backoff_uses_longer_base() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(0, base, true), Duration::from_secs(5));
        assert_eq!(backoff_delay(1, base, true), Duration::from_secs(10));
        assert_eq!(backoff_delay(3, base, true), Duration::from_secs(40));
    }
}
