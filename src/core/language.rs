//! Supported game languages

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A game language, one independent search session each
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum Language {
    #[value(name = "en")]
    #[serde(rename = "en")]
    English,
    #[value(name = "fr")]
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::English, Self::French];

    /// Short code used for file names (`en`, `fr`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }

    /// ISO 639-3 code used by WordNet lemma tables (`eng`, `fra`)
    #[must_use]
    pub const fn wordnet_code(self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::French => "fra",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::French => "French",
        }
    }

    /// Name of the game in this language
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::English => "Cemantle",
            Self::French => "Cémantix",
        }
    }

    /// Default oracle base URL
    #[must_use]
    pub const fn default_url(self) -> &'static str {
        match self {
            Self::English => "https://cemantle.certitudes.org",
            Self::French => "https://cemantix.certitudes.org",
        }
    }

    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::English => "🇬🇧",
            Self::French => "🇫🇷",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s) || lang.wordnet_code() == s)
            .ok_or_else(|| format!("unknown language '{s}' (expected en or fr)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
            assert_eq!(lang.wordnet_code().parse::<Language>().unwrap(), lang);
        }
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn serde_uses_short_code() {
        assert_eq!(serde_json::to_string(&Language::French).unwrap(), "\"fr\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
