//! Blog post records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Locale, PostId};

/// A row of the `blog_posts` table. Content is Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub slug: String,
    pub title_es: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub excerpt_es: String,
    #[serde(default)]
    pub excerpt_en: String,
    #[serde(default)]
    pub content_es: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn pick<'a>(locale: Locale, es: &'a str, en: &'a str) -> &'a str {
    match locale {
        Locale::En if !en.trim().is_empty() => en,
        _ => es,
    }
}

impl BlogPost {
    #[must_use]
    pub fn title(&self, locale: Locale) -> &str {
        pick(locale, &self.title_es, &self.title_en)
    }

    #[must_use]
    pub fn excerpt(&self, locale: Locale) -> &str {
        pick(locale, &self.excerpt_es, &self.excerpt_en)
    }

    #[must_use]
    pub fn content(&self, locale: Locale) -> &str {
        pick(locale, &self.content_es, &self.content_en)
    }

    /// Publication date, or creation date for posts published before the
    /// column was filled.
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// Insert/update payload for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostInput {
    pub slug: String,
    pub title_es: String,
    pub title_en: String,
    pub excerpt_es: String,
    pub excerpt_en: String,
    pub content_es: String,
    pub content_en: String,
    pub cover_image_url: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
}
