//! Status and role enums stored by the backend.

use serde::{Deserialize, Serialize};

use super::Locale;

/// Order status label.
///
/// The backend stores the Spanish label verbatim. This is a plain label set:
/// staff may move an order from any status to any other, there is no
/// transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pendiente,
    Procesando,
    Enviado,
    Entregado,
    Cancelado,
}

impl OrderStatus {
    /// Every status, in dropdown order.
    pub const ALL: [Self; 5] = [
        Self::Pendiente,
        Self::Procesando,
        Self::Enviado,
        Self::Entregado,
        Self::Cancelado,
    ];

    /// The label stored in the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::Procesando => "Procesando",
            Self::Enviado => "Enviado",
            Self::Entregado => "Entregado",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Translated label for display.
    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        let key = match self {
            Self::Pendiente => "status.pendiente",
            Self::Procesando => "status.procesando",
            Self::Enviado => "status.enviado",
            Self::Entregado => "status.entregado",
            Self::Cancelado => "status.cancelado",
        };
        crate::i18n::lookup(locale, key).unwrap_or_else(|| self.as_str())
    }

    /// Whether the order counts toward revenue.
    #[must_use]
    pub const fn counts_as_sale(self) -> bool {
        !matches!(self, Self::Cancelado)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Account role kept on the user's profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_as_spanish_label() {
        let json = serde_json::to_string(&OrderStatus::Procesando).unwrap();
        assert_eq!(json, "\"Procesando\"");
        let parsed: OrderStatus = serde_json::from_str("\"Entregado\"").unwrap();
        assert_eq!(parsed, OrderStatus::Entregado);
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("enviado".parse::<OrderStatus>(), Ok(OrderStatus::Enviado));
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(OrderStatus::Enviado.label(Locale::En), "Shipped");
        assert_eq!(OrderStatus::Enviado.label(Locale::Es), "Enviado");
    }

    #[test]
    fn test_cancelled_is_not_a_sale() {
        assert!(!OrderStatus::Cancelado.counts_as_sale());
        assert!(OrderStatus::Pendiente.counts_as_sale());
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert!("root".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
    }
}
