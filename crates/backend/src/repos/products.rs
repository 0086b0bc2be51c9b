//! Product catalog.

use aurelia_core::{Category, Product, ProductId, ProductInput};
use tracing::instrument;

use super::Page;
use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "products";

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    pub const ALL: [Self; 4] = [Self::Newest, Self::PriceAsc, Self::PriceDesc, Self::Name];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    /// Message key for the sort dropdown.
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Newest => "catalog.sort.newest",
            Self::PriceAsc => "catalog.sort.price_asc",
            Self::PriceDesc => "catalog.sort.price_desc",
            Self::Name => "catalog.sort.name",
        }
    }

    fn apply(self, query: Query) -> Query {
        match self {
            Self::Newest => query.order("created_at", false),
            Self::PriceAsc => query.order("price", true),
            Self::PriceDesc => query.order("price", false),
            Self::Name => query.order("name_es", true),
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| format!("invalid sort: {s}"))
    }
}

/// Catalog filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub sort: ProductSort,
    pub active_only: bool,
    pub featured_only: bool,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            sort: ProductSort::Newest,
            active_only: true,
            featured_only: false,
            page: 1,
            per_page: 12,
        }
    }
}

impl ProductFilter {
    fn to_query(&self) -> Query {
        let mut query = Query::table(TABLE).select("*");
        if self.active_only {
            query = query.eq("active", true);
        }
        if self.featured_only {
            query = query.eq("featured", true);
        }
        if let Some(category) = self.category {
            query = query.eq("category", category);
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.ilike_any(&["name_es", "name_en", "description_es", "description_en"], term);
        }
        self.sort.apply(query).page(self.page, self.per_page)
    }
}

/// Repository for products.
pub struct ProductRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// List products matching `filter`, with the total for paging.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        auth: Auth<'_>,
        filter: &ProductFilter,
    ) -> Result<Page<Product>, BackendError> {
        let (items, total) = self
            .client
            .select_with_count(auth, &filter.to_query())
            .await?;
        Ok(Page {
            items,
            page: filter.page.max(1),
            per_page: filter.per_page,
            total,
        })
    }

    /// Active featured products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn featured(&self, auth: Auth<'_>, limit: u32) -> Result<Vec<Product>, BackendError> {
        let filter = ProductFilter {
            featured_only: true,
            per_page: limit,
            ..ProductFilter::default()
        };
        Ok(self.list(auth, &filter).await?.items)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get(&self, auth: Auth<'_>, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.client
            .select_one(auth, &Query::table(TABLE).eq("id", id))
            .await
    }

    /// Get several products at once. Missing IDs are simply absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get_many(
        &self,
        auth: Auth<'_>,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .select(auth, &Query::table(TABLE).is_in("id", ids.iter()))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the insert.
    #[instrument(skip(self, input), fields(name = %input.name_es))]
    pub async fn create(&self, auth: Auth<'_>, input: &ProductInput) -> Result<Product, BackendError> {
        self.client.insert_one(auth, TABLE, input).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        auth: Auth<'_>,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        self.client
            .update::<_, Product>(auth, &Query::table(TABLE).eq("id", id), input)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    /// Point a product at a new image.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated.
    pub async fn set_image(
        &self,
        auth: Auth<'_>,
        id: ProductId,
        image_url: &str,
    ) -> Result<Product, BackendError> {
        self.client
            .update::<_, Product>(
                auth,
                &Query::table(TABLE).eq("id", id),
                &serde_json::json!({ "image_url": image_url }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, auth: Auth<'_>, id: ProductId) -> Result<(), BackendError> {
        self.client
            .delete(auth, &Query::table(TABLE).eq("id", id))
            .await
    }

    /// Count all products, including inactive ones the identity can see.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn count(&self, auth: Auth<'_>) -> Result<u64, BackendError> {
        self.client.count(auth, &Query::table(TABLE)).await
    }
}
