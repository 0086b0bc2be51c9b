//! Entity records exchanged with the hosted backend.
//!
//! The backend owns the schema and its row-level security policies. These
//! structs only shape the JSON payloads its REST interface returns and
//! accepts; `New*` variants are insert payloads without server-assigned
//! columns.

pub mod market;
pub mod message;
pub mod order;
pub mod post;
pub mod product;
pub mod profile;
pub mod settings;

pub use market::{MarketPrices, MarketQuote};
pub use message::{ContactMessage, NewContactMessage};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use post::{BlogPost, PostInput};
pub use product::{Product, ProductInput};
pub use profile::{Profile, ProfileUpdate};
pub use settings::StoreSettings;
