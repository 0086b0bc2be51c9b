//! Jewelry categories.

use serde::{Deserialize, Serialize};

use super::Locale;

/// Product category, stored by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Anillos,
    Collares,
    Aretes,
    Pulseras,
    Dijes,
    #[default]
    Otros,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Anillos,
        Self::Collares,
        Self::Aretes,
        Self::Pulseras,
        Self::Dijes,
        Self::Otros,
    ];

    /// Slug used in URLs and the backend column.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Anillos => "anillos",
            Self::Collares => "collares",
            Self::Aretes => "aretes",
            Self::Pulseras => "pulseras",
            Self::Dijes => "dijes",
            Self::Otros => "otros",
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        let key = match self {
            Self::Anillos => "category.anillos",
            Self::Collares => "category.collares",
            Self::Aretes => "category.aretes",
            Self::Pulseras => "category.pulseras",
            Self::Dijes => "category.dijes",
            Self::Otros => "category.otros",
        };
        crate::i18n::lookup(locale, key).unwrap_or_else(|| self.slug())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::Aretes.label(Locale::En), "Earrings");
        assert_eq!(Category::Aretes.label(Locale::Es), "Aretes");
    }
}
