//! Visitor language.
//!
//! The language picked with the toggle is kept in the session; until then
//! it is negotiated from `Accept-Language`, defaulting to Spanish.

use aurelia_core::Locale;
use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use tower_sessions::Session;

use crate::models::session_keys;

/// Extractor for the visitor's language.
#[derive(Debug, Clone, Copy)]
pub struct Lang(pub Locale);

impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>()
            && let Ok(Some(locale)) = session.get::<Locale>(session_keys::LOCALE).await
        {
            return Ok(Self(locale));
        }

        Ok(Self(negotiated(parts)))
    }
}

fn negotiated(parts: &Parts) -> Locale {
    parts
        .headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map_or_else(Locale::default, Locale::negotiate)
}

/// Remember the visitor's language choice.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_locale(
    session: &Session,
    locale: Locale,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::LOCALE, locale).await
}
