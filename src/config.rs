use std::path::Path;

use serde::Deserialize;

use crate::locale::Locale;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file could not be read")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Key the preferred locale is stored under.
    pub storage_key: String,

    /// Query parameter carrying the locale in page URLs.
    pub query_param: String,

    /// Used when neither the URL nor the store name a valid locale.
    pub default_locale: Locale,

    pub contact_email: String,

    pub scholar_url: String,

    /// One of sloggers' severities: trace, debug, info, warning, error, critical.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: "preferredLang".to_owned(),
            query_param: "lang".to_owned(),
            default_locale: Locale::English,
            contact_email: "contact@lovegrover.com".to_owned(),
            scholar_url: "https://scholar.google.com/citations?user=CdQaSogAAAAJ&hl=en".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn mailto(&self) -> String {
        format!("mailto:{}", self.contact_email)
    }
}
