use std::str::FromStr;

use serde::Deserialize;

#[derive(
    Deserialize,
    Debug,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
    strum::EnumIter,
)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    #[strum(serialize = "en")]
    English,
    #[serde(rename = "hi")]
    #[strum(serialize = "hi")]
    Hindi,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Exact match on the wire code, anything else is `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::from_str(code).ok()
    }

    pub fn toggled(&self) -> Self {
        match self {
            Locale::English => Locale::Hindi,
            Locale::Hindi => Locale::English,
        }
    }
}
