//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{FavoriteRepository, Page, ProductFilter, ProductRepository, ProductSort};
use aurelia_core::{Category, Product, ProductId};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;

/// Products per catalog page.
const PER_PAGE: u32 = 12;

/// Catalog query string. Unknown values are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

impl CatalogQuery {
    /// Turn the query string into a listing filter for visible products.
    #[must_use]
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.as_deref().and_then(|c| c.parse().ok()),
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
            sort: self
                .sort
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            active_only: true,
            featured_only: false,
            page: self.page.unwrap_or(1).max(1),
            per_page: PER_PAGE,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Page<Product>,
    pub filter: ProductFilter,
    pub categories: [Category; 6],
    pub sorts: [ProductSort; 4],
}

impl ProductsIndexTemplate {
    /// Link to another page of the same listing.
    #[must_use]
    pub fn page_href(&self, page: u32) -> String {
        let mut params = vec![("page", page.to_string())];
        if let Some(category) = self.filter.category {
            params.push(("category", category.slug().to_string()));
        }
        if let Some(q) = &self.filter.search {
            params.push(("q", q.clone()));
        }
        if self.filter.sort != ProductSort::default() {
            params.push(("sort", self.filter.sort.as_str().to_string()));
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("/products?{query}")
    }

    #[must_use]
    pub fn is_category(&self, category: &Category) -> bool {
        self.filter.category == Some(*category)
    }

    #[must_use]
    pub fn is_sort(&self, sort: &ProductSort) -> bool {
        self.filter.sort == *sort
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.filter.search.as_deref().unwrap_or("")
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: Product,
    pub related: Vec<Product>,
    pub is_favorite: bool,
}

/// Catalog listing with category, search, sort and paging.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let filter = query.to_filter();
    let products = ProductRepository::new(state.backend())
        .list(Auth::Anon, &filter)
        .await?;

    Ok(ProductsIndexTemplate {
        page,
        products,
        filter,
        categories: Category::ALL,
        sorts: ProductSort::ALL,
    })
}

/// Product detail. Missing and inactive products are not found.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.backend());
    let product = repo
        .get(Auth::Anon, id)
        .await?
        .filter(Product::is_listed)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let related_filter = ProductFilter {
        category: Some(product.category),
        per_page: 5,
        ..ProductFilter::default()
    };
    let related = match repo.list(Auth::Anon, &related_filter).await {
        Ok(listing) => listing
            .items
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(4)
            .collect(),
        Err(e) => {
            warn!(error = %e, "failed to load related products");
            Vec::new()
        }
    };

    let is_favorite = match &page.user {
        Some(user) => FavoriteRepository::new(state.backend())
            .contains(Auth::User(&user.access_token), user.id, product.id)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to read favorite state");
                false
            }),
        None => false,
    };

    Ok(ProductShowTemplate {
        page,
        product,
        related,
        is_favorite,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::Locale;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn ring() -> Product {
        Product {
            id: ProductId::random(),
            name_es: "Anillo de Oro".to_string(),
            name_en: "Gold Ring".to_string(),
            description_es: "Oro amarillo de 14 quilates".to_string(),
            description_en: "Yellow gold, 14 karat".to_string(),
            price: Decimal::from(4500),
            category: Category::Anillos,
            material: Some("Oro 14k".to_string()),
            stock: 3,
            image_url: None,
            featured: false,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_detail_renders_in_visitor_language() {
        let html = ProductShowTemplate {
            page: PageContext::anonymous(Locale::En),
            product: ring(),
            related: vec![],
            is_favorite: false,
        }
        .render()
        .unwrap();
        assert!(html.contains("Gold Ring"));
        assert!(html.contains("Yellow gold, 14 karat"));
        assert!(html.contains(Category::Anillos.label(Locale::En)));
        assert!(!html.contains("Anillo de Oro"));
    }

    #[test]
    fn test_listing_renders_category_links() {
        let html = ProductsIndexTemplate {
            page: PageContext::anonymous(Locale::Es),
            products: Page {
                items: vec![ring()],
                page: 1,
                per_page: PER_PAGE,
                total: 1,
            },
            filter: ProductFilter {
                category: Some(Category::Aretes),
                ..ProductFilter::default()
            },
            categories: Category::ALL,
            sorts: ProductSort::ALL,
        }
        .render()
        .unwrap();
        assert!(html.contains("Anillo de Oro"));
        for category in Category::ALL {
            assert!(html.contains(category.label(Locale::Es)));
        }
    }

    #[test]
    fn test_query_to_filter_ignores_bad_values() {
        let query = CatalogQuery {
            category: Some("sombreros".to_string()),
            q: Some("   ".to_string()),
            sort: Some("random".to_string()),
            page: Some(0),
        };
        let filter = query.to_filter();
        assert_eq!(filter.category, None);
        assert_eq!(filter.search, None);
        assert_eq!(filter.sort, ProductSort::Newest);
        assert_eq!(filter.page, 1);
        assert!(filter.active_only);
    }

    #[test]
    fn test_query_to_filter_parses_values() {
        let query = CatalogQuery {
            category: Some("aretes".to_string()),
            q: Some(" perla ".to_string()),
            sort: Some("price_desc".to_string()),
            page: Some(3),
        };
        let filter = query.to_filter();
        assert_eq!(filter.category, Some(Category::Aretes));
        assert_eq!(filter.search.as_deref(), Some("perla"));
        assert_eq!(filter.sort, ProductSort::PriceDesc);
        assert_eq!(filter.page, 3);
        assert_eq!(filter.per_page, PER_PAGE);
    }
}
