use std::env;

use url::Url;

use crate::error::ConfigError;

/// Value shipped as the default source before anyone configures one; never auto-loaded.
pub const PLACEHOLDER_DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/user/repo/main/quiz.docx";

pub const DEFAULT_SHARE_BASE: &str = "http://localhost:8080/";

/// Runtime settings for the quiz flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    default_source: Option<String>,
    share_base: Url,
}

impl QuizConfig {
    #[must_use]
    pub fn new(share_base: Url) -> Self {
        Self {
            default_source: None,
            share_base,
        }
    }

    /// Read `QUIZ_SHARE_BASE` and `QUIZ_DEFAULT_SOURCE`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either value is present but not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let share_base = env::var("QUIZ_SHARE_BASE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHARE_BASE.into());
        Self::new(parse_share_base(&share_base)?)
            .with_default_source(env::var("QUIZ_DEFAULT_SOURCE").ok())
    }

    /// Set the auto-load source. Blank values and the placeholder disable auto-load.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDefaultSource` for a value that is not a URL.
    pub fn with_default_source(mut self, raw: Option<String>) -> Result<Self, ConfigError> {
        self.default_source = normalize_default_source(raw)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidShareBase` for a value that is not a URL.
    pub fn with_share_base(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.share_base = parse_share_base(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn default_source(&self) -> Option<&str> {
        self.default_source.as_deref()
    }

    #[must_use]
    pub fn share_base(&self) -> &Url {
        &self.share_base
    }
}

fn parse_share_base(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidShareBase {
        raw: raw.to_string(),
    })
}

fn normalize_default_source(raw: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(value) = raw
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Ok(None);
    };
    if value == PLACEHOLDER_DEFAULT_SOURCE {
        return Ok(None);
    }
    if Url::parse(&value).is_err() {
        return Err(ConfigError::InvalidDefaultSource { raw: value });
    }
    Ok(Some(value))
}
