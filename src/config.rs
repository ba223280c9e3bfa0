use url::Url;

use std::env;

const URL_VAR: &str = "FEEDBACK_URL";
const EMAIL_VAR: &str = "FEEDBACK_EMAIL";
const PASSWORD_VAR: &str = "FEEDBACK_PASSWORD";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server root, without the `/api` suffix.
    pub url: Url,
    pub credentials: Option<Credentials>,
}

impl Config {
    pub fn new(url: Url) -> Self {
        Config {
            url,
            credentials: None,
        }
    }

    /// Reads the process environment. Call `dotenv()` first to pick up a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
        let url = Url::parse(&url).map_err(|source| ConfigError::InvalidUrl {
            name: URL_VAR,
            source,
        })?;

        let credentials = match (lookup(EMAIL_VAR), lookup(PASSWORD_VAR)) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            (Some(_), None) => return Err(ConfigError::Missing(PASSWORD_VAR)),
            (None, _) => None,
        };

        Ok(Config { url, credentials })
    }
}
