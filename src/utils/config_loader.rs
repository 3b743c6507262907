use async_trait::async_trait;
use dotenvy::dotenv;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use std::{env, fs};
use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
    #[error("Error loading config: {0}")]
    ConfigError(String),
}

#[async_trait]
pub trait ConfigLoader {
    type SectionType;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

pub trait ConfigLoaderSync {
    type SectionType;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError>;
}

pub async fn load_from_file<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = tokio::fs::read_to_string(file_name).await?;
    load_from_str(&contents)
}

pub fn load_from_file_sync<T: DeserializeOwned>(file_name: String) -> Result<T, LoadConfigError> {
    dotenv().ok();
    let contents = fs::read_to_string(file_name)?;
    load_from_str(&contents)
}

pub fn load_from_str<T: DeserializeOwned>(contents: &str) -> Result<T, LoadConfigError> {
    let contents = expand_vars(contents)?;
    let config: T = toml::from_str(&contents)?;
    Ok(config)
}

/// Replaces `${NAME}` with the value of the environment variable, leaving unknown names untouched.
fn expand_vars(raw_config: &str) -> Result<String, LoadConfigError> {
    let re = Regex::new(r"\$\{([a-zA-Z_][0-9a-zA-Z_]*)\}")?;
    Ok(re
        .replace_all(raw_config, |caps: &Captures| match env::var(&caps[1]) {
            Ok(val) => val,
            Err(_) => caps[0].to_string(),
        })
        .to_string())
}
