//! Core types for Aurelia.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod locale;
pub mod money;
pub mod status;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use locale::Locale;
pub use money::{Currency, Money};
pub use status::*;
