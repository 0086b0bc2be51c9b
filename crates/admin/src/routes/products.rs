//! Product management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{ProductFilter, ProductRepository, ProductSort};
use aurelia_core::models::{Product, ProductInput};
use aurelia_core::validation::{ProductForm, ValidationErrors};
use aurelia_core::{Category, Locale, ProductId};
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

/// Rows per page in the product table.
const PER_PAGE: u32 = 50;

/// Largest accepted product image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}

impl ProductListQuery {
    /// Admin listing includes inactive products.
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
            sort: ProductSort::Newest,
            active_only: false,
            featured_only: false,
            page: self.page.unwrap_or(1).max(1),
            per_page: PER_PAGE,
        }
    }
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: AdminPage,
    pub products: Vec<Product>,
    pub total: u64,
    pub filter: ProductFilter,
    pub categories: [Category; 6],
    pub current_page: u32,
    pub total_pages: u32,
}

impl ProductsIndexTemplate {
    #[must_use]
    pub fn category_label(&self, category: &Category) -> &'static str {
        category.label(Locale::Es)
    }

    #[must_use]
    pub fn is_category(&self, category: &Category) -> bool {
        self.filter.category == Some(*category)
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        self.filter.search.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn page_href(&self, page: u32) -> String {
        let mut params = vec![("page", page.to_string())];
        if let Some(category) = self.filter.category {
            params.push(("category", category.slug().to_string()));
        }
        if let Some(q) = &self.filter.search {
            params.push(("q", q.clone()));
        }
        let query: Vec<String> = params
            .into_iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(&v)))
            .collect();
        format!("/products?{}", query.join("&"))
    }
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: AdminPage,
    /// `None` when creating.
    pub product: Option<Product>,
    pub form: ProductForm,
    pub errors: ValidationErrors,
    pub categories: [Category; 6],
}

impl ProductFormTemplate {
    fn new(page: AdminPage, product: Option<Product>, form: ProductForm, errors: ValidationErrors) -> Self {
        Self {
            page,
            product,
            form,
            errors,
            categories: Category::ALL,
        }
    }

    #[must_use]
    pub fn category_label(&self, category: &Category) -> &'static str {
        category.label(Locale::Es)
    }

    #[must_use]
    pub fn is_category(&self, category: &Category) -> bool {
        self.form.category == category.slug()
    }

    /// Translated error for a field, if it failed.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.errors.for_field(field).map(|key| Locale::Es.t(key))
    }

    #[must_use]
    pub fn action(&self) -> String {
        self.product
            .as_ref()
            .map_or_else(|| "/products".to_string(), |p| format!("/products/{}", p.id))
    }
}

/// Pre-fill the editor from a stored product.
#[must_use]
pub fn form_from(product: &Product) -> ProductForm {
    ProductForm {
        name_es: product.name_es.clone(),
        name_en: product.name_en.clone(),
        description_es: product.description_es.clone(),
        description_en: product.description_en.clone(),
        price: product.price.to_string(),
        category: product.category.slug().to_string(),
        material: product.material.clone().unwrap_or_default(),
        stock: product.stock.to_string(),
        featured: product.featured.then(|| "on".to_string()),
        active: product.active.then(|| "on".to_string()),
    }
}

async fn load(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.backend())
        .get(Auth::Service, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Product table, including inactive products.
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsIndexTemplate> {
    let filter = query.to_filter();
    let result = ProductRepository::new(state.backend())
        .list(Auth::Service, &filter)
        .await?;

    Ok(ProductsIndexTemplate {
        page,
        total_pages: result.total_pages(),
        current_page: result.page,
        total: result.total,
        products: result.items,
        filter,
        categories: Category::ALL,
    })
}

/// Empty editor. New products default to active.
pub async fn new_page(page: AdminPage) -> ProductFormTemplate {
    let form = ProductForm {
        category: Category::Anillos.slug().to_string(),
        stock: "0".to_string(),
        active: Some("on".to_string()),
        ..ProductForm::default()
    };
    ProductFormTemplate::new(page, None, form, ValidationErrors::new())
}

#[instrument(skip(state, page, form))]
pub async fn create(
    State(state): State<AppState>,
    page: AdminPage,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(errors) => {
            let page = page.with_error("required");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ProductFormTemplate::new(page, None, form, errors),
            )
                .into_response());
        }
    };

    let product = ProductRepository::new(state.backend())
        .create(Auth::Service, &input)
        .await?;
    info!(product_id = %product.id, "product created");

    Ok(Redirect::to(&format!("/products/{}?notice=product_saved", product.id)).into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = load(&state, id).await?;
    let form = form_from(&product);
    Ok(ProductFormTemplate::new(page, Some(product), form, ValidationErrors::new()))
}

/// Save the editor. The image is managed separately and left untouched.
#[instrument(skip(state, page, form))]
pub async fn update(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = load(&state, id).await?;

    let input: ProductInput = match form.clone().into_input() {
        Ok(input) => input,
        Err(errors) => {
            let page = page.with_error("required");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ProductFormTemplate::new(page, Some(product), form, errors),
            )
                .into_response());
        }
    };

    ProductRepository::new(state.backend())
        .update(Auth::Service, id, &input)
        .await?;
    info!(product_id = %id, "product updated");

    Ok(Redirect::to(&format!("/products/{id}?notice=product_saved")).into_response())
}

/// Remove a stored image object, logging instead of failing.
async fn remove_image(state: &AppState, image_url: Option<&str>) {
    let bucket = &state.config().storage_bucket;
    let Some(path) = image_url.and_then(|url| state.backend().object_path(bucket, url)) else {
        return;
    };
    if let Err(e) = state.backend().remove(Auth::Service, bucket, &[path]).await {
        warn!(error = %e, path, "failed to remove product image");
    }
}

#[instrument(skip(state, _page))]
pub async fn delete(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let product = load(&state, id).await?;

    ProductRepository::new(state.backend())
        .delete(Auth::Service, id)
        .await?;
    remove_image(&state, product.image_url.as_deref()).await;
    info!(product_id = %id, "product deleted");

    Ok(Redirect::to("/products?notice=product_deleted"))
}

/// Accepted image types and the extension stored objects get.
#[must_use]
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Check an upload, returning the error code to show on failure.
///
/// # Errors
///
/// Returns `image_missing`, `image_type` or `image_size`.
pub fn check_image(content_type: &str, size: usize) -> std::result::Result<&'static str, &'static str> {
    if size == 0 {
        return Err("image_missing");
    }
    let extension = image_extension(content_type).ok_or("image_type")?;
    if size > MAX_IMAGE_BYTES {
        return Err("image_size");
    }
    Ok(extension)
}

/// Storage path for a new product image. A fresh name per upload keeps
/// cached copies of the previous image from being served.
#[must_use]
pub fn image_path(id: ProductId, extension: &str) -> String {
    format!("products/{id}/{}.{extension}", Uuid::new_v4())
}

/// Upload a product image from the `image` field of a multipart form.
#[instrument(skip(state, _page, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let product = load(&state, id).await?;
    let back = |code: &str| Redirect::to(&format!("/products/{id}?error={code}"));

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((content_type, bytes));
            break;
        }
    }

    let Some((content_type, bytes)) = upload else {
        return Ok(back("image_missing"));
    };
    let extension = match check_image(&content_type, bytes.len()) {
        Ok(extension) => extension,
        Err(code) => return Ok(back(code)),
    };

    let path = image_path(id, extension);
    let bucket = &state.config().storage_bucket;
    let url = match state
        .backend()
        .upload(Auth::Service, bucket, &path, bytes.to_vec(), &content_type)
        .await
    {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, product_id = %id, "image upload failed");
            return Ok(back("upload"));
        }
    };

    ProductRepository::new(state.backend())
        .set_image(Auth::Service, id, &url)
        .await?;
    remove_image(&state, product.image_url.as_deref()).await;
    info!(product_id = %id, path = %path, "product image replaced");

    Ok(Redirect::to(&format!("/products/{id}?notice=image_uploaded")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_form_preselects_category() {
        let form = ProductForm {
            category: "collares".to_string(),
            ..ProductForm::default()
        };
        let html = ProductFormTemplate::new(
            AdminPage::signed_in("/products/new"),
            None,
            form,
            ValidationErrors::new(),
        )
        .render()
        .unwrap();
        assert!(html.contains("<option value=\"collares\" selected>"));
        for category in Category::ALL {
            assert!(html.contains(category.label(Locale::Es)));
        }
    }

    #[test]
    fn test_check_image() {
        assert_eq!(check_image("image/png", 1024), Ok("png"));
        assert_eq!(check_image("image/jpeg", MAX_IMAGE_BYTES), Ok("jpg"));
        assert_eq!(check_image("image/gif", 1024), Err("image_type"));
        assert_eq!(check_image("image/webp", MAX_IMAGE_BYTES + 1), Err("image_size"));
        assert_eq!(check_image("image/png", 0), Err("image_missing"));
    }

    #[test]
    fn test_image_path_is_unique_per_upload() {
        let id = ProductId::random();
        let a = image_path(id, "png");
        let b = image_path(id, "png");
        assert!(a.starts_with(&format!("products/{id}/")));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_admin_listing_includes_inactive() {
        let filter = ProductListQuery {
            q: Some("  ".to_string()),
            category: Some("dijes".to_string()),
            page: Some(0),
        }
        .to_filter();
        assert!(!filter.active_only);
        assert_eq!(filter.search, None);
        assert_eq!(filter.category, Some(Category::Dijes));
        assert_eq!(filter.page, 1);
    }

    #[test]
    fn test_form_from_product_round_trips_through_validation() {
        let product = Product {
            id: ProductId::random(),
            name_es: "Anillo Sol".to_string(),
            name_en: "Sun Ring".to_string(),
            description_es: String::new(),
            description_en: String::new(),
            price: Decimal::new(125_000, 2),
            category: Category::Anillos,
            material: Some("Oro 14k".to_string()),
            stock: 3,
            image_url: Some("https://cdn.test/a.png".to_string()),
            featured: false,
            active: true,
            created_at: chrono::Utc::now(),
        };
        let input = form_from(&product).into_input().unwrap();
        assert_eq!(input.price, product.price);
        assert_eq!(input.material.as_deref(), Some("Oro 14k"));
        assert!(input.active);
        assert!(!input.featured);
        // The editor never touches the image
        assert_eq!(input.image_url, None);
    }
}
