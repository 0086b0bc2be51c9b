//! Store settings editor.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::SettingsRepository;
use aurelia_core::models::StoreSettings;
use aurelia_core::validation::ValidationErrors;
use aurelia_core::{Email, Locale};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

/// Settings form as submitted. Amounts arrive as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    pub store_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    pub shipping_flat_rate: String,
    pub free_shipping_threshold: String,
    #[serde(default)]
    pub announcement_es: String,
    #[serde(default)]
    pub announcement_en: String,
}

fn amount(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> Decimal {
    match Decimal::from_str(raw.trim()) {
        Ok(value) if value >= Decimal::ZERO => value,
        _ => {
            errors.add(field, "error.amount_invalid");
            Decimal::ZERO
        }
    }
}

impl SettingsForm {
    /// Validate and convert.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn into_settings(self) -> std::result::Result<StoreSettings, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.store_name.trim().is_empty() {
            errors.add("store_name", "error.required");
        }
        let email = self.contact_email.trim();
        if !email.is_empty() && Email::parse(email).is_err() {
            errors.add("contact_email", "error.invalid_email");
        }

        let settings = StoreSettings {
            store_name: self.store_name.trim().to_string(),
            contact_email: email.to_string(),
            contact_phone: self.contact_phone.trim().to_string(),
            shipping_flat_rate: amount(&mut errors, "shipping_flat_rate", &self.shipping_flat_rate),
            free_shipping_threshold: amount(
                &mut errors,
                "free_shipping_threshold",
                &self.free_shipping_threshold,
            ),
            announcement_es: self.announcement_es.trim().to_string(),
            announcement_en: self.announcement_en.trim().to_string(),
        };

        errors.into_result(settings)
    }
}

impl From<&StoreSettings> for SettingsForm {
    fn from(settings: &StoreSettings) -> Self {
        Self {
            store_name: settings.store_name.clone(),
            contact_email: settings.contact_email.clone(),
            contact_phone: settings.contact_phone.clone(),
            shipping_flat_rate: settings.shipping_flat_rate.to_string(),
            free_shipping_threshold: settings.free_shipping_threshold.to_string(),
            announcement_es: settings.announcement_es.clone(),
            announcement_en: settings.announcement_en.clone(),
        }
    }
}

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub page: AdminPage,
    pub form: SettingsForm,
    pub errors: ValidationErrors,
}

impl SettingsTemplate {
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.errors.for_field(field).map(|key| Locale::Es.t(key))
    }
}

pub async fn show(State(state): State<AppState>, page: AdminPage) -> Result<SettingsTemplate> {
    let settings = SettingsRepository::new(state.backend())
        .get(Auth::Service)
        .await?;

    Ok(SettingsTemplate {
        page,
        form: SettingsForm::from(&settings),
        errors: ValidationErrors::new(),
    })
}

#[instrument(skip(state, page, form))]
pub async fn update(
    State(state): State<AppState>,
    page: AdminPage,
    Form(form): Form<SettingsForm>,
) -> Result<Response> {
    let settings = match form.clone().into_settings() {
        Ok(settings) => settings,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                SettingsTemplate {
                    page: page.with_error("required"),
                    form,
                    errors,
                },
            )
                .into_response());
        }
    };

    SettingsRepository::new(state.backend())
        .upsert(Auth::Service, &settings)
        .await?;
    info!(admin_id = %page.admin.id, "store settings updated");

    Ok(Redirect::to("/settings?notice=settings_saved").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> SettingsForm {
        SettingsForm {
            store_name: " Aurelia Joyería ".to_string(),
            contact_email: "hola@aurelia.mx".to_string(),
            contact_phone: String::new(),
            shipping_flat_rate: "150".to_string(),
            free_shipping_threshold: "2000.00".to_string(),
            announcement_es: "Envío gratis".to_string(),
            announcement_en: String::new(),
        }
    }

    #[test]
    fn test_valid_settings() {
        let settings = form().into_settings().unwrap();
        assert_eq!(settings.store_name, "Aurelia Joyería");
        assert_eq!(settings.shipping_flat_rate, Decimal::from(150));
        assert_eq!(settings.free_shipping_threshold, Decimal::from(2000));
    }

    #[test]
    fn test_zero_amounts_allowed() {
        let settings = SettingsForm {
            shipping_flat_rate: "0".to_string(),
            ..form()
        }
        .into_settings()
        .unwrap();
        assert!(settings.shipping_flat_rate.is_zero());
    }

    #[test]
    fn test_invalid_fields_collected() {
        let errors = SettingsForm {
            store_name: "  ".to_string(),
            contact_email: "no-es-correo".to_string(),
            shipping_flat_rate: "-5".to_string(),
            free_shipping_threshold: "mucho".to_string(),
            ..form()
        }
        .into_settings()
        .unwrap_err();

        assert_eq!(errors.for_field("store_name"), Some("error.required"));
        assert_eq!(errors.for_field("contact_email"), Some("error.invalid_email"));
        assert_eq!(errors.for_field("shipping_flat_rate"), Some("error.amount_invalid"));
        assert_eq!(
            errors.for_field("free_shipping_threshold"),
            Some("error.amount_invalid")
        );
    }
}
