//! User profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

/// A row of the `profiles` table, one per auth user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Name to greet the user with: full name, else the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Fields a customer may change on their own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut profile = Profile {
            id: UserId::random(),
            email: "ana@example.mx".to_string(),
            full_name: Some("  ".to_string()),
            phone: None,
            role: UserRole::Customer,
            created_at: None,
        };
        assert_eq!(profile.display_name(), "ana");
        profile.full_name = Some("Ana López".to_string());
        assert_eq!(profile.display_name(), "Ana López");
    }
}
