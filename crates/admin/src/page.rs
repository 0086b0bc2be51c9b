//! Shared page chrome for the admin panel.
//!
//! The panel is Spanish only. Every page embeds an [`AdminPage`], which
//! also acts as the guard: extracting it fails unless an administrator is
//! signed in.

use aurelia_core::{Locale, i18n};
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::middleware::RequireAdmin;
use crate::middleware::auth::{AdminAuthRejection, request_uri};
use crate::models::CurrentAdmin;

/// Template context shared by every signed-in page.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub admin: CurrentAdmin,
    /// Path of the current request, for highlighting the active nav item.
    pub path: String,
    pub error: Option<&'static str>,
    pub notice: Option<&'static str>,
}

#[cfg(test)]
impl AdminPage {
    /// Signed-in administrator context for rendering templates in tests.
    pub(crate) fn signed_in(path: &str) -> Self {
        use aurelia_backend::AccessToken;
        use aurelia_core::{UserId, UserRole};

        Self {
            admin: CurrentAdmin {
                id: UserId::random(),
                email: "ana@aurelia.mx".to_string(),
                name: "Ana".to_string(),
                role: UserRole::Admin,
                access_token: AccessToken::new("token"),
            },
            path: path.to_string(),
            error: None,
            notice: None,
        }
    }
}

/// Panel-only notices.
const NOTICES: &[(&str, &str)] = &[
    ("product_saved", "Producto guardado."),
    ("product_deleted", "Producto eliminado."),
    ("image_uploaded", "Imagen actualizada."),
    ("status_updated", "Estado del pedido actualizado."),
    ("post_saved", "Entrada guardada."),
    ("post_deleted", "Entrada eliminada."),
    ("role_updated", "Rol actualizado."),
    ("message_read", "Mensaje marcado como leído."),
    ("message_deleted", "Mensaje eliminado."),
    ("settings_saved", "Configuración guardada."),
    ("logged_out", "Sesión cerrada."),
];

/// Panel-only errors. Anything else falls back to the shared catalog.
const ERRORS: &[(&str, &str)] = &[
    ("self_demote", "No puedes quitarte el rol de administrador."),
    ("image_type", "La imagen debe ser JPEG, PNG o WebP."),
    ("image_size", "La imagen no puede pesar más de 5 MB."),
    ("image_missing", "Selecciona una imagen."),
    ("upload", "No se pudo subir la imagen."),
    ("invalid_status", "Estado de pedido no válido."),
    ("invalid_role", "Rol no válido."),
];

/// Text for a notice code; unknown codes show nothing.
#[must_use]
pub fn notice_message(code: &str) -> Option<&'static str> {
    NOTICES.iter().find(|(c, _)| *c == code).map(|(_, m)| *m)
}

/// Text for an error code; unknown codes get the generic message.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    ERRORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, m)| *m)
        .or_else(|| i18n::lookup(Locale::Es, &format!("error.{code}")))
        .or_else(|| i18n::lookup(Locale::Es, "error.generic"))
        .unwrap_or("Error")
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

impl AdminPage {
    /// Translate a catalog key (field errors, status labels).
    #[must_use]
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        Locale::Es.t(key)
    }

    /// Whether the nav item for `prefix` is the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.path == "/"
        } else {
            self.path.starts_with(prefix)
        }
    }

    /// Replace the banner with an error raised while handling this request.
    #[must_use]
    pub fn with_error(mut self, code: &str) -> Self {
        self.error = Some(error_message(code));
        self
    }
}

impl<S> FromRequestParts<S> for AdminPage
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(parts, state).await?;
        let uri = request_uri(parts);
        let (error, notice) = banner_codes(uri.query());

        Ok(Self {
            admin,
            path: uri.path().to_string(),
            error: error.as_deref().map(error_message),
            notice: notice.as_deref().and_then(notice_message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_codes_take_precedence() {
        assert_eq!(
            error_message("self_demote"),
            "No puedes quitarte el rol de administrador."
        );
        assert_eq!(notice_message("settings_saved"), Some("Configuración guardada."));
    }

    #[test]
    fn test_shared_catalog_fallback() {
        assert_eq!(error_message("forbidden"), "No tienes permiso para esta acción.");
        assert_eq!(error_message("no-such-code"), "Algo salió mal. Intenta de nuevo.");
        assert_eq!(notice_message("no-such-code"), None);
    }

    #[test]
    fn test_banner_codes() {
        let (error, notice) = banner_codes(Some("status=paid&notice=status_updated"));
        assert_eq!(error, None);
        assert_eq!(notice.as_deref(), Some("status_updated"));
    }
}
