//! Contact form.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::MessageRepository;
use aurelia_core::NewContactMessage;
use aurelia_core::validation::{ContactForm, ValidationErrors};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub form: ContactForm,
    pub errors: ValidationErrors,
}

/// Insert payload for a validated form.
fn to_message(form: &ContactForm) -> NewContactMessage {
    NewContactMessage {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        subject: form
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        body: form.message.trim().to_string(),
    }
}

/// Contact form, prefilled for signed-in customers.
pub async fn show(page: PageContext) -> impl IntoResponse {
    let form = ContactForm {
        name: page
            .user
            .as_ref()
            .and_then(|u| u.full_name.clone())
            .unwrap_or_default(),
        email: page.user.as_ref().map(|u| u.email.clone()).unwrap_or_default(),
        ..ContactForm::default()
    };

    ContactTemplate {
        page,
        form,
        errors: ValidationErrors::new(),
    }
}

/// Validate and store a message for the staff inbox.
#[instrument(skip(state, page, form))]
pub async fn submit(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    if let Err(errors) = form.validate() {
        let code = errors
            .first()
            .and_then(|(_, key)| key.strip_prefix("error."))
            .unwrap_or("generic");
        let page = page.with_error(code);
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            ContactTemplate { page, form, errors },
        )
            .into_response());
    }

    MessageRepository::new(state.backend())
        .create(Auth::Anon, &to_message(&form))
        .await?;
    info!("contact message received");

    Ok(Redirect::to("/contact?notice=message_sent").into_response())
}
