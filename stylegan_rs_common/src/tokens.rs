use std::{env, fmt, fs, str::FromStr};
use thiserror::Error;

use anyhow::Result;

#[derive(Debug, Clone)]
/// The source of the Hugging Face token used for gated snapshot repositories.
pub enum TokenSource {
    Literal(String),
    EnvVar(String),
    Path(String),
    CacheToken,
    None,
}

impl FromStr for TokenSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(2, ':').collect();
        match parts[0] {
            "literal" => parts
                .get(1)
                .map(|&value| TokenSource::Literal(value.to_string()))
                .ok_or_else(|| "Expected a value for 'literal'".to_string()),
            "env" => Ok(TokenSource::EnvVar(
                parts
                    .get(1)
                    .unwrap_or(&"HUGGING_FACE_HUB_TOKEN")
                    .to_string(),
            )),
            "path" => parts
                .get(1)
                .map(|&value| TokenSource::Path(value.to_string()))
                .ok_or_else(|| "Expected a value for 'path'".to_string()),
            "cache" => Ok(TokenSource::CacheToken),
            "none" => Ok(TokenSource::None),
            _ => Err("Invalid token source format".to_string()),
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Literal(value) => write!(f, "literal:{}", value),
            TokenSource::EnvVar(value) => write!(f, "env:{}", value),
            TokenSource::Path(value) => write!(f, "path:{}", value),
            TokenSource::CacheToken => write!(f, "cache"),
            TokenSource::None => write!(f, "none"),
        }
    }
}

#[derive(Error, Debug)]
enum TokenRetrievalError {
    #[error("No home directory.")]
    HomeDirectoryMissing,
}

/// This reads a token with the following precedence based on the `TokenSource`:
/// - A literal token value
/// - An environment variable
/// - A file path
/// - The Hugging Face CLI cache (`~/.cache/huggingface/token`)
pub fn get_token(source: &TokenSource) -> Result<Option<String>> {
    Ok(match source {
        TokenSource::Literal(data) => Some(data.clone()),
        TokenSource::EnvVar(envvar) => env::var(envvar).ok(),
        TokenSource::Path(path) => fs::read_to_string(path).ok(),
        TokenSource::CacheToken => {
            let home = dirs::home_dir().ok_or(TokenRetrievalError::HomeDirectoryMissing)?;
            fs::read_to_string(home.join(".cache").join("huggingface").join("token")).ok()
        }
        TokenSource::None => None,
    }
    .map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_source_round_trips() {
        for source in ["literal:abc", "env:HF_TOKEN", "path:/tmp/token", "cache", "none"] {
            let parsed = TokenSource::from_str(source).unwrap();
            assert_eq!(parsed.to_string(), source);
        }
    }

    #[test]
    fn env_source_defaults_to_hub_variable() {
        let parsed = TokenSource::from_str("env").unwrap();
        assert_eq!(parsed.to_string(), "env:HUGGING_FACE_HUB_TOKEN");
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(TokenSource::from_str("keychain:foo").is_err());
    }

    #[test]
    fn literal_token_is_returned_verbatim() {
        let token = get_token(&TokenSource::Literal("hf_secret".to_string())).unwrap();
        assert_eq!(token.as_deref(), Some("hf_secret"));
    }

    #[test]
    fn none_source_yields_no_token() {
        assert_eq!(get_token(&TokenSource::None).unwrap(), None);
    }
}
