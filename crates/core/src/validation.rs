//! Form validation rules shared by the storefront and the admin panel.
//!
//! Validators collect every problem instead of stopping at the first one.
//! Messages are catalog keys (see [`crate::i18n`]) so each binary can render
//! them in the visitor's language.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{PostInput, ProductInput};
use crate::slug::{is_valid_slug, slugify};
use crate::types::{Category, Email};

/// A single field problem: `(field name, message key)`.
pub type FieldError = (&'static str, &'static str);

/// Accumulated validation problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, field: &'static str, message_key: &'static str) {
        self.errors.push((field, message_key));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First problem, used for single-banner forms.
    #[must_use]
    pub fn first(&self) -> Option<FieldError> {
        self.errors.first().copied()
    }

    /// Message key for a field, if it failed.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, key)| *key)
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// `Ok(value)` when no problems were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn require(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "error.required");
    }
}

fn check_email(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "error.required");
    } else if Email::parse(value).is_err() {
        errors.add(field, "error.invalid_email");
    }
}

/// Strip spaces, dashes, dots and parentheses, then a leading `+52` / `52`
/// country code when what remains is longer than ten digits.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let mut digits: String = raw
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if digits.len() == 12 && digits.starts_with("52") {
        digits.drain(..2);
    }
    digits
}

/// Mexican phone numbers have ten digits once the country code is removed.
#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    let digits = normalize_phone(raw);
    digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit())
}

/// Mexican postal codes are exactly five digits.
#[must_use]
pub fn is_valid_postal_code(raw: &str) -> bool {
    let code = raw.trim();
    code.len() == 5 && code.chars().all(|c| c.is_ascii_digit())
}

/// Checkout shipping details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.add("name", "error.required");
        } else if !(2..=100).contains(&name_len) {
            errors.add("name", "error.name_length");
        }

        check_email(&mut errors, "email", &self.email);

        if self.phone.trim().is_empty() {
            errors.add("phone", "error.required");
        } else if !is_valid_phone(&self.phone) {
            errors.add("phone", "error.invalid_phone");
        }

        require(&mut errors, "address", &self.address);
        require(&mut errors, "city", &self.city);
        require(&mut errors, "state", &self.state);

        if self.postal_code.trim().is_empty() {
            errors.add("postal_code", "error.required");
        } else if !is_valid_postal_code(&self.postal_code) {
            errors.add("postal_code", "error.invalid_postal_code");
        }

        errors.into_result(())
    }

    /// Notes with surrounding whitespace removed, `None` when blank.
    #[must_use]
    pub fn trimmed_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 8;

impl RegistrationForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require(&mut errors, "full_name", &self.full_name);
        check_email(&mut errors, "email", &self.email);

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "error.password_short");
        } else if !(self.password.chars().any(char::is_alphabetic)
            && self.password.chars().any(|c| c.is_ascii_digit()))
        {
            errors.add("password", "error.password_weak");
        }

        if self.password != self.password_confirm {
            errors.add("password_confirm", "error.password_mismatch");
        }

        errors.into_result(())
    }
}

/// Contact page form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require(&mut errors, "name", &self.name);
        check_email(&mut errors, "email", &self.email);

        let len = self.message.trim().chars().count();
        if len == 0 {
            errors.add("message", "error.required");
        } else if !(10..=5000).contains(&len) {
            errors.add("message", "error.message_length");
        }

        errors.into_result(())
    }
}

/// Admin product editor. Numbers arrive as text from the HTML form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub name_es: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description_es: String,
    #[serde(default)]
    pub description_en: String,
    pub price: String,
    pub category: String,
    #[serde(default)]
    pub material: String,
    pub stock: String,
    /// Checkbox: present ("on") when ticked.
    #[serde(default)]
    pub featured: Option<String>,
    #[serde(default)]
    pub active: Option<String>,
}

impl ProductForm {
    /// Validate and convert into a backend payload.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn into_input(self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require(&mut errors, "name_es", &self.name_es);

        let price = Decimal::from_str(self.price.trim()).ok();
        if price.is_none_or(|p| p <= Decimal::ZERO) {
            errors.add("price", "error.price_invalid");
        }

        let stock = self.stock.trim().parse::<i32>().ok();
        if stock.is_none_or(|s| s < 0) {
            errors.add("stock", "error.stock_invalid");
        }

        let category = Category::from_str(self.category.trim()).ok();
        if category.is_none() {
            errors.add("category", "error.category_invalid");
        }

        let material = self.material.trim();
        let input = ProductInput {
            name_es: self.name_es.trim().to_string(),
            name_en: self.name_en.trim().to_string(),
            description_es: self.description_es.trim().to_string(),
            description_en: self.description_en.trim().to_string(),
            price: price.unwrap_or_default(),
            category: category.unwrap_or_default(),
            material: (!material.is_empty()).then(|| material.to_string()),
            stock: stock.unwrap_or_default(),
            image_url: None,
            featured: self.featured.is_some(),
            active: self.active.is_some(),
        };

        errors.into_result(input)
    }
}

/// Admin blog editor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub slug: String,
    pub title_es: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub excerpt_es: String,
    #[serde(default)]
    pub excerpt_en: String,
    pub content_es: String,
    #[serde(default)]
    pub content_en: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub published: Option<String>,
}

impl PostForm {
    /// Validate and convert into a backend payload.
    ///
    /// A blank slug is derived from the Spanish title. `published_at` keeps
    /// the earlier publication date when re-saving a published post, and is
    /// set to `now` on first publication.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn into_input(
        self,
        previous_published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PostInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require(&mut errors, "title_es", &self.title_es);
        require(&mut errors, "content_es", &self.content_es);

        let slug = if self.slug.trim().is_empty() {
            slugify(&self.title_es)
        } else {
            slugify(&self.slug)
        };
        if !is_valid_slug(&slug) && !self.title_es.trim().is_empty() {
            errors.add("slug", "error.required");
        }

        let published = self.published.is_some();
        let published_at = if published {
            Some(previous_published_at.unwrap_or(now))
        } else {
            None
        };

        let cover = self.cover_image_url.trim();
        let input = PostInput {
            slug,
            title_es: self.title_es.trim().to_string(),
            title_en: self.title_en.trim().to_string(),
            excerpt_es: self.excerpt_es.trim().to_string(),
            excerpt_en: self.excerpt_en.trim().to_string(),
            content_es: self.content_es,
            content_en: self.content_en,
            cover_image_url: (!cover.is_empty()).then(|| cover.to_string()),
            published,
            published_at,
        };

        errors.into_result(input)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checkout() -> CheckoutForm {
        CheckoutForm {
            name: "Ana López".to_string(),
            email: "ana@example.mx".to_string(),
            phone: "+52 55 1234-5678".to_string(),
            address: "Av. Juárez 10".to_string(),
            city: "Guadalajara".to_string(),
            state: "Jalisco".to_string(),
            postal_code: "44100".to_string(),
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_checkout_valid() {
        assert!(checkout().validate().is_ok());
        assert_eq!(checkout().trimmed_notes(), None);
    }

    #[test]
    fn test_checkout_collects_every_error() {
        let form = CheckoutForm {
            name: "A".to_string(),
            email: "ana".to_string(),
            phone: "12345".to_string(),
            postal_code: "4410".to_string(),
            ..CheckoutForm::default()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.for_field("name"), Some("error.name_length"));
        assert_eq!(errors.for_field("email"), Some("error.invalid_email"));
        assert_eq!(errors.for_field("phone"), Some("error.invalid_phone"));
        assert_eq!(errors.for_field("address"), Some("error.required"));
        assert_eq!(errors.for_field("city"), Some("error.required"));
        assert_eq!(errors.for_field("state"), Some("error.required"));
        assert_eq!(
            errors.for_field("postal_code"),
            Some("error.invalid_postal_code")
        );
        assert_eq!(errors.first(), Some(("name", "error.name_length")));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+52 (33) 1234 5678"), "3312345678");
        assert_eq!(normalize_phone("33.1234.5678"), "3312345678");
        assert!(is_valid_phone("3312345678"));
        assert!(!is_valid_phone("33123456ab"));
    }

    #[test]
    fn test_registration_password_rules() {
        let mut form = RegistrationForm {
            full_name: "Luis".to_string(),
            email: "luis@example.mx".to_string(),
            password: "short1".to_string(),
            password_confirm: "short1".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().for_field("password"),
            Some("error.password_short")
        );

        form.password = "onlyletters".to_string();
        form.password_confirm = "onlyletters".to_string();
        assert_eq!(
            form.validate().unwrap_err().for_field("password"),
            Some("error.password_weak")
        );

        form.password = "plata925ok".to_string();
        assert_eq!(
            form.validate().unwrap_err().for_field("password_confirm"),
            Some("error.password_mismatch")
        );

        form.password_confirm = "plata925ok".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_contact_message_length() {
        let form = ContactForm {
            name: "Sofía".to_string(),
            email: "sofia@example.mx".to_string(),
            subject: None,
            message: "Hola".to_string(),
        };
        assert_eq!(
            form.validate().unwrap_err().for_field("message"),
            Some("error.message_length")
        );
    }

    #[test]
    fn test_product_form_converts() {
        let form = ProductForm {
            name_es: " Pulsera Mar ".to_string(),
            price: "1299.90".to_string(),
            category: "pulseras".to_string(),
            stock: "3".to_string(),
            active: Some("on".to_string()),
            ..ProductForm::default()
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.name_es, "Pulsera Mar");
        assert_eq!(input.category, Category::Pulseras);
        assert_eq!(input.stock, 3);
        assert!(input.active);
        assert!(!input.featured);
        assert_eq!(input.material, None);
    }

    #[test]
    fn test_product_form_rejects_bad_numbers() {
        let form = ProductForm {
            name_es: "Dije".to_string(),
            price: "0".to_string(),
            category: "relojes".to_string(),
            stock: "-1".to_string(),
            ..ProductForm::default()
        };
        let errors = form.into_input().unwrap_err();
        assert_eq!(errors.for_field("price"), Some("error.price_invalid"));
        assert_eq!(errors.for_field("stock"), Some("error.stock_invalid"));
        assert_eq!(errors.for_field("category"), Some("error.category_invalid"));
    }

    #[test]
    fn test_post_form_derives_slug_and_keeps_publication_date() {
        let earlier = DateTime::<Utc>::UNIX_EPOCH;
        let now = Utc::now();
        let form = PostForm {
            title_es: "Guía de quilates".to_string(),
            content_es: "# Oro".to_string(),
            published: Some("on".to_string()),
            ..PostForm::default()
        };

        let input = form.clone().into_input(Some(earlier), now).unwrap();
        assert_eq!(input.slug, "guia-de-quilates");
        assert_eq!(input.published_at, Some(earlier));

        let first = form.into_input(None, now).unwrap();
        assert_eq!(first.published_at, Some(now));
    }

    #[test]
    fn test_post_form_unpublished_clears_date() {
        let form = PostForm {
            title_es: "Borrador".to_string(),
            content_es: "texto".to_string(),
            ..PostForm::default()
        };
        let input = form.into_input(Some(Utc::now()), Utc::now()).unwrap();
        assert!(!input.published);
        assert_eq!(input.published_at, None);
    }
}
