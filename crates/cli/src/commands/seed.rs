//! Catalog seeding from YAML.
//!
//! # File format
//!
//! ```yaml
//! products:
//!   - name_es: Anillo Solitario Oro 14k
//!     name_en: 14k Gold Solitaire Ring
//!     price: "8990.00"
//!     category: anillos
//!     material: Oro 14k
//!     stock: 3
//!     featured: true
//! ```
//!
//! Omitted fields take the same defaults as the admin product form.

use std::path::Path;

use aurelia_backend::repos::ProductRepository;
use aurelia_backend::{Auth, BackendError};
use aurelia_core::ProductInput;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::{ClientError, service_client};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Product #{index} ({name}): {reason}")]
    Invalid {
        index: usize,
        name: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<ProductInput>,
}

/// Parse and check a seed document without touching the backend.
///
/// # Errors
///
/// Returns the first YAML or validation error.
pub fn parse_products(yaml: &str) -> Result<Vec<ProductInput>, SeedError> {
    let file: SeedFile = serde_yaml::from_str(yaml)?;
    for (index, product) in file.products.iter().enumerate() {
        check(product).map_err(|reason| SeedError::Invalid {
            index: index + 1,
            name: product.name_es.clone(),
            reason,
        })?;
    }
    Ok(file.products)
}

fn check(product: &ProductInput) -> Result<(), &'static str> {
    if product.name_es.trim().is_empty() {
        return Err("name_es is required");
    }
    if product.price <= Decimal::ZERO {
        return Err("price must be greater than zero");
    }
    if product.stock < 0 {
        return Err("stock cannot be negative");
    }
    Ok(())
}

/// Insert every product in `path`. Returns how many were created.
///
/// Nothing is inserted if any entry fails validation. Backend failures stop
/// the run; products created before the failure stay.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an insert fails.
pub async fn products(path: &str) -> Result<usize, SeedError> {
    let yaml = std::fs::read_to_string(Path::new(path)).map_err(|source| SeedError::Io {
        path: path.to_owned(),
        source,
    })?;
    let inputs = parse_products(&yaml)?;
    tracing::info!(count = inputs.len(), file = %path, "Seeding products");

    let client = service_client()?;
    let repo = ProductRepository::new(&client);
    for input in &inputs {
        let product = repo.create(Auth::Service, input).await?;
        tracing::info!(id = %product.id, name = %product.name_es, "Created product");
    }

    tracing::info!(count = inputs.len(), "Seed complete");
    Ok(inputs.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::Category;

    use super::*;

    #[test]
    fn test_bundled_seed_file_parses() {
        let products = parse_products(include_str!("../../seed/products.yaml")).unwrap();
        assert!(!products.is_empty());
        assert!(products.iter().all(|p| p.active));
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
products:
  - name_es: Arracadas de Plata
    price: "650.00"
    category: aretes
"#;
        let products = parse_products(yaml).unwrap();
        let product = products.first().unwrap();
        assert_eq!(product.category, Category::Aretes);
        assert_eq!(product.stock, 0);
        assert!(product.active);
        assert!(!product.featured);
        assert_eq!(product.material, None);
    }

    #[test]
    fn test_invalid_entry_reports_position() {
        let yaml = r#"
products:
  - name_es: Dije Corazón
    price: "420.00"
    category: dijes
  - name_es: Pulsera
    price: "0"
    category: pulseras
"#;
        let err = parse_products(yaml).unwrap_err();
        assert!(matches!(err, SeedError::Invalid { index: 2, .. }));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let yaml = r#"
products:
  - name_es: Reloj
    price: "100"
    category: relojes
"#;
        assert!(matches!(parse_products(yaml), Err(SeedError::Yaml(_))));
    }
}
