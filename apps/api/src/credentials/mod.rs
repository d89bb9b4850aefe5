//! Startup API key handling: the environment first, then an interactive prompt, with every
//! candidate checked against the API before the listener is started.
//!
//! The prompt loops until a key passes the syntax checks and the model-list call, or the
//! operator gives up.

pub mod prompt;

use std::fmt;
use std::io;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::OPENAI_API_KEY_VAR;
use crate::llm_client::{LlmClient, LlmError};

const KEY_PREFIX: &str = "sk-";
const MIN_KEY_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Interactive,
}

/// A validated API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential {
    secret: String,
    source: CredentialSource,
}

impl Credential {
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Makes the key visible to the rest of this process through its environment.
    /// Nothing is written to disk.
    pub fn export_to_env(&self) {
        std::env::set_var(OPENAI_API_KEY_VAR, &self.secret);
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"sk-***")
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeySyntaxError {
    #[error("API ključ ne može biti prazan!")]
    Empty,
    #[error("API ključ mora počinjati s 'sk-'")]
    WrongPrefix,
    #[error("API ključ je prekratak!")]
    TooShort,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("operator declined to enter another API key")]
    Declined,
    #[error("terminal prompt failed: {0}")]
    Prompt(#[from] io::Error),
}

/// Checks a key without any network call.
pub fn check_key_syntax(key: &str) -> Result<(), KeySyntaxError> {
    if key.is_empty() {
        return Err(KeySyntaxError::Empty);
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(KeySyntaxError::WrongPrefix);
    }
    if key.chars().count() < MIN_KEY_LEN {
        return Err(KeySyntaxError::TooShort);
    }
    Ok(())
}

/// Whether an answer to the retry question means "try again".
pub fn wants_retry(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "d" | "da" | "y" | "yes"
    )
}

/// Checks that the remote API accepts a key.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, key: &str) -> Result<(), LlmError>;
}

/// Validates keys by listing models on the completion API.
pub struct ModelListValidator {
    base_url: String,
}

impl ModelListValidator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CredentialValidator for ModelListValidator {
    async fn validate(&self, key: &str) -> Result<(), LlmError> {
        LlmClient::new(key.to_string(), self.base_url.as_str())?
            .list_models()
            .await
    }
}

/// The operator-facing side of interactive acquisition.
pub trait OperatorPrompt {
    fn show_banner(&mut self) -> io::Result<()>;
    fn read_key(&mut self) -> io::Result<String>;
    fn read_retry_answer(&mut self) -> io::Result<String>;
    fn report_error(&mut self, message: &str) -> io::Result<()>;
    fn report_success(&mut self, message: &str) -> io::Result<()>;
}

/// Produces a validated credential, or a definite error that must stop startup.
pub async fn acquire_credential(
    env_key: Option<&str>,
    validator: &dyn CredentialValidator,
    prompt: &mut dyn OperatorPrompt,
) -> Result<Credential, CredentialError> {
    if let Some(key) = env_key.map(str::trim).filter(|k| !k.is_empty()) {
        match validator.validate(key).await {
            Ok(()) => {
                info!("OpenAI API konfiguriran iz varijable okruženja");
                return Ok(Credential {
                    secret: key.to_string(),
                    source: CredentialSource::Environment,
                });
            }
            Err(e) => warn!("Greška s API ključem iz okruženja: {e}"),
        }
    }

    prompt.show_banner()?;
    loop {
        let input = prompt.read_key()?;
        let key = input.trim();

        if let Err(e) = check_key_syntax(key) {
            prompt.report_error(&e.to_string())?;
            continue;
        }

        match validator.validate(key).await {
            Ok(()) => {
                prompt.report_success("API ključ je valjan!")?;
                info!("OpenAI API konfiguriran iz korisničkog unosa");
                return Ok(Credential {
                    secret: key.to_string(),
                    source: CredentialSource::Interactive,
                });
            }
            Err(e) => {
                prompt.report_error(&format!("API ključ nije valjan: {e}"))?;
                if !wants_retry(&prompt.read_retry_answer()?) {
                    return Err(CredentialError::Declined);
                }
            }
        }
    }
}
