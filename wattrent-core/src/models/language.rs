use std::fmt;

use serde::{Deserialize, Serialize};

/// Display languages the app ships strings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[default]
    #[serde(rename = "en")]
    En,
}

impl Language {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::ZhTw => "zh-TW",
            Self::En => "en",
        }
    }

    /// Exact match against a supported tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "zh-TW" => Some(Self::ZhTw),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Maps an arbitrary system locale tag onto a supported language.
    ///
    /// Supported tags are taken as-is, any other Chinese variant (`zh`,
    /// `zh-CN`, `zh-Hant-HK`, ...) maps to [`Language::ZhTw`], and everything
    /// else falls back to English.
    pub fn from_system_locale(tag: &str) -> Self {
        if let Some(language) = Self::parse(tag) {
            return language;
        }
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("zh") {
            Self::ZhTw
        } else {
            Self::En
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Self::ZhTw => "繁體中文",
            Self::En => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
