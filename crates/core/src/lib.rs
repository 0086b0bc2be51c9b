//! Aurelia Core - Shared types library.
//!
//! This crate provides the domain types used across all Aurelia components:
//! - `storefront` - Public bilingual jewelry store
//! - `admin` - Back-office for products, orders, blog, users and settings
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Persisted entities are owned by the hosted backend; the records in
//! [`models`] only mirror its payloads.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, statuses, categories, locales
//! - [`models`] - Entity records exchanged with the backend
//! - [`cart`] - Cart lines and total arithmetic
//! - [`validation`] - Form validation rules
//! - [`i18n`] - Spanish/English message catalog
//! - [`slug`] - URL slug generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod i18n;
pub mod models;
pub mod slug;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartTotals, ShippingPolicy};
pub use models::{
    BlogPost, ContactMessage, MarketPrices, MarketQuote, NewContactMessage, NewOrder,
    NewOrderItem, Order, OrderItem, PostInput, Product, ProductInput, Profile, ProfileUpdate,
    StoreSettings,
};
pub use types::*;
