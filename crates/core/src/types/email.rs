//! Customer and staff email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    #[error("email domain cannot be empty")]
    EmptyDomain,
    #[error("email domain is malformed")]
    MalformedDomain,
}

/// A trimmed, lower-cased address of the form `local@domain.tld`.
///
/// Lower-casing keeps sign-in and registration pointing at one backend
/// account regardless of how the visitor typed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub const MAX_LENGTH: usize = 254;

    /// # Errors
    ///
    /// Returns the first [`EmailError`] the trimmed input violates.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(EmailError::Empty);
        }
        if candidate.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = candidate
            .split_once('@')
            .ok_or(EmailError::MissingAtSymbol)?;
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }
        // Needs a dot past the first label; a second @ never passes.
        if domain.contains('@') || domain.starts_with('.') || !domain.contains('.') {
            return Err(EmailError::MalformedDomain);
        }

        Ok(Self(candidate.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_account_regardless_of_typing() {
        let typed = Email::parse("  Ana.Lopez@Aurelia.MX\n").unwrap();
        let stored = Email::parse("ana.lopez@aurelia.mx").unwrap();
        assert_eq!(typed, stored);
        assert_eq!(typed.to_string(), "ana.lopez@aurelia.mx");
    }

    #[test]
    fn test_domain_needs_a_dot_after_its_first_label() {
        assert!(Email::parse("ventas@tienda.com.mx").is_ok());
        assert_eq!(
            Email::parse("ventas@localhost"),
            Err(EmailError::MalformedDomain)
        );
        assert_eq!(
            Email::parse("ventas@.mx"),
            Err(EmailError::MalformedDomain)
        );
        assert_eq!(
            Email::parse("ventas@aurelia@mx.com"),
            Err(EmailError::MalformedDomain)
        );
    }

    #[test]
    fn test_rejects_missing_pieces() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(
            Email::parse("ana.aurelia.mx"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(
            Email::parse("@aurelia.mx"),
            Err(EmailError::EmptyLocalPart)
        );
        assert_eq!(Email::parse("ana@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_length_counts_after_trimming() {
        let local = "a".repeat(Email::MAX_LENGTH - "@aurelia.mx".len());
        let at_limit = format!("  {local}@aurelia.mx  ");
        assert!(Email::parse(&at_limit).is_ok());

        let over = format!("a{local}@aurelia.mx");
        assert_eq!(
            Email::parse(&over),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_deserialize_applies_the_same_rules() {
        let email: Email = serde_json::from_str("\"Cliente@Aurelia.MX\"").unwrap();
        assert_eq!(email.as_str(), "cliente@aurelia.mx");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"cliente@aurelia.mx\"");
        assert!(serde_json::from_str::<Email>("\"cliente@localhost\"").is_err());
    }
}
