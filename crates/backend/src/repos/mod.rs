//! Typed repositories over the backend's REST tables.
//!
//! Each repository borrows a [`BackendClient`](crate::BackendClient) and
//! takes the request identity per call, so the same code serves anonymous
//! visitors, signed-in customers and the service-role admin.

pub mod favorites;
pub mod messages;
pub mod orders;
pub mod posts;
pub mod products;
pub mod profiles;
pub mod settings;

pub use favorites::FavoriteRepository;
pub use messages::MessageRepository;
pub use orders::{OrderRepository, StatusCounts};
pub use posts::PostRepository;
pub use products::{ProductFilter, ProductRepository, ProductSort};
pub use profiles::ProfileRepository;
pub use settings::SettingsRepository;

/// One page of rows plus the total across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}
