//! Shared page chrome.
//!
//! Every full-page template embeds a [`PageContext`]: language, CSP nonce,
//! signed-in customer, cart badge, the store announcement and any banner
//! passed back through `?error=` / `?notice=`.

use aurelia_core::{Locale, i18n};
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::middleware::auth::request_uri;
use crate::middleware::{CspNonce, Lang, OptionalAuth};
use crate::models::CurrentUser;
use crate::routes::cart::load_cart;
use crate::state::AppState;

/// Template context shared by every page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub locale: Locale,
    pub nonce: String,
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub error: Option<&'static str>,
    pub notice: Option<&'static str>,
    /// Path and query of the current request.
    pub path: String,
    pub store_name: String,
    pub announcement: Option<String>,
}

impl PageContext {
    /// Translate a message key.
    #[must_use]
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        i18n::lookup(self.locale, key).unwrap_or(key)
    }

    #[must_use]
    pub const fn lang(&self) -> &'static str {
        self.locale.code()
    }

    /// Code of the language the toggle switches to.
    #[must_use]
    pub const fn other_lang(&self) -> &'static str {
        self.locale.other().code()
    }

    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user.as_ref().map_or("", CurrentUser::display_name)
    }

    /// Login URL that returns here afterwards.
    #[must_use]
    pub fn login_href(&self) -> String {
        format!("/auth/login?next={}", urlencoding::encode(&self.path))
    }

    /// Replace the banner with an error code raised while handling the
    /// current request.
    #[must_use]
    pub fn with_error(mut self, code: &str) -> Self {
        self.error = Some(error_message(self.locale, code));
        self
    }
}

#[cfg(test)]
impl PageContext {
    /// Anonymous visitor context for rendering templates in tests.
    pub(crate) fn anonymous(locale: Locale) -> Self {
        Self {
            locale,
            nonce: "test-nonce".to_string(),
            user: None,
            cart_count: 0,
            error: None,
            notice: None,
            path: "/".to_string(),
            store_name: "Aurelia Joyería".to_string(),
            announcement: None,
        }
    }
}

/// Localized text for an error code; unknown codes get the generic message.
#[must_use]
pub fn error_message(locale: Locale, code: &str) -> &'static str {
    i18n::lookup(locale, &format!("error.{code}"))
        .or_else(|| i18n::lookup(locale, "error.generic"))
        .unwrap_or("Error")
}

/// Localized text for a notice code; unknown codes show nothing.
#[must_use]
pub fn notice_message(locale: Locale, code: &str) -> Option<&'static str> {
    i18n::lookup(locale, &format!("notice.{code}"))
}

/// `(error, notice)` codes from a query string.
fn banner_codes(query: Option<&str>) -> (Option<String>, Option<String>) {
    let mut error = None;
    let mut notice = None;
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
        match key.as_ref() {
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            "notice" if !value.is_empty() => notice = Some(value.into_owned()),
            _ => {}
        }
    }
    (error, notice)
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(Lang(locale)) = Lang::from_request_parts(parts, state).await;
        let Ok(CspNonce(nonce)) = CspNonce::from_request_parts(parts, state).await;
        let Ok(OptionalAuth(user)) = OptionalAuth::from_request_parts(parts, state).await;

        let cart_count = match parts.extensions.get::<Session>() {
            Some(session) => load_cart(session).await.item_count(),
            None => 0,
        };

        let uri = request_uri(parts).clone();
        let (error, notice) = banner_codes(uri.query());
        let settings = state.settings().await;

        Ok(Self {
            locale,
            nonce,
            user,
            cart_count,
            error: error.map(|code| error_message(locale, &code)),
            notice: notice.and_then(|code| notice_message(locale, &code)),
            path: uri
                .path_and_query()
                .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string()),
            announcement: settings.announcement(locale).map(String::from),
            store_name: settings.store_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_codes_from_query() {
        let (error, notice) = banner_codes(Some("page=2&error=invalid_email&notice=added_to_cart"));
        assert_eq!(error.as_deref(), Some("invalid_email"));
        assert_eq!(notice.as_deref(), Some("added_to_cart"));
        assert_eq!(banner_codes(None), (None, None));
        assert_eq!(banner_codes(Some("error=")), (None, None));
    }

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(
            error_message(Locale::Es, "no_such_code"),
            Locale::Es.t("error.generic")
        );
        assert_eq!(
            error_message(Locale::En, "invalid_email"),
            Locale::En.t("error.invalid_email")
        );
    }

    #[test]
    fn test_unknown_notice_is_hidden() {
        assert!(notice_message(Locale::Es, "<script>").is_none());
        assert!(notice_message(Locale::En, "message_sent").is_some());
    }
}
