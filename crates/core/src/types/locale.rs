//! Site language.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::i18n;

/// Languages the storefront is published in.
///
/// Spanish is the primary language of the store; English is offered as a
/// translation for every customer-facing string and product field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// All supported locales, primary first.
    pub const ALL: [Self; 2] = [Self::Es, Self::En];

    /// Two-letter language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// The other locale, used by the language toggle.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Es => Self::En,
            Self::En => Self::Es,
        }
    }

    /// Look up a UI message. Unknown keys render as the key itself.
    #[must_use]
    pub fn t(self, key: &str) -> &str {
        i18n::lookup(self, key).unwrap_or(key)
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Quality weights are honoured; ties keep header order. Falls back to
    /// Spanish when nothing matches.
    #[must_use]
    pub fn negotiate(accept_language: &str) -> Self {
        let mut best: Option<(Self, f32)> = None;

        for part in accept_language.split(',') {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next().unwrap_or("").trim();
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let primary = tag.split('-').next().unwrap_or("");
            let Ok(locale) = primary.parse::<Self>() else {
                continue;
            };

            if best.is_none_or(|(_, q)| quality > q) {
                best = Some((locale, quality));
            }
        }

        best.map_or_else(Self::default, |(locale, _)| locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            _ => Err(format!("unsupported locale: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_spanish() {
        assert_eq!(Locale::default(), Locale::Es);
    }

    #[test]
    fn test_parse() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_negotiate_prefers_highest_quality() {
        assert_eq!(Locale::negotiate("es-MX;q=0.5, en-US;q=0.9"), Locale::En);
        assert_eq!(Locale::negotiate("en;q=0.4,es"), Locale::Es);
    }

    #[test]
    fn test_negotiate_skips_unsupported() {
        assert_eq!(Locale::negotiate("fr-FR, en;q=0.8"), Locale::En);
        assert_eq!(Locale::negotiate("de, fr"), Locale::Es);
        assert_eq!(Locale::negotiate(""), Locale::Es);
    }

    #[test]
    fn test_translate_unknown_key_echoes() {
        assert_eq!(Locale::En.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_other() {
        assert_eq!(Locale::Es.other(), Locale::En);
        assert_eq!(Locale::En.other(), Locale::Es);
    }
}
