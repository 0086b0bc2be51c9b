//! Favorites of signed-in customers.
//!
//! Guests are sent to the login page by [`RequireAuth`].

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{FavoriteRepository, ProductRepository};
use aurelia_core::{Product, ProductId};
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::middleware::auth::safe_next;
use crate::page::PageContext;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub page: PageContext,
    pub products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub next: Option<String>,
}

/// Keep the order of `ids` and drop products that are gone or unlisted.
fn in_saved_order(ids: &[ProductId], mut products: Vec<Product>) -> Vec<Product> {
    products.retain(Product::is_listed);
    products.sort_by_key(|p| ids.iter().position(|id| *id == p.id).unwrap_or(usize::MAX));
    products
}

/// Saved products, most recently saved first.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let ids = FavoriteRepository::new(state.backend())
        .list_product_ids(Auth::User(&user.access_token), user.id)
        .await?;
    let products = ProductRepository::new(state.backend())
        .get_many(Auth::Anon, &ids)
        .await?;

    Ok(FavoritesTemplate {
        page,
        products: in_saved_order(&ids, products),
    })
}

/// Save or unsave a product, then go back.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect> {
    let repo = FavoriteRepository::new(state.backend());
    let auth = Auth::User(&user.access_token);

    if repo.contains(auth, user.id, product_id).await? {
        repo.remove(auth, user.id, product_id).await?;
        info!(%product_id, "favorite removed");
    } else {
        repo.add(auth, user.id, product_id).await?;
        info!(%product_id, "favorite added");
    }

    let back = match form.next.as_deref() {
        Some(next) => safe_next(Some(next)),
        None => "/favorites",
    };
    Ok(Redirect::to(back))
}

#[cfg(test)]
mod tests {
    use aurelia_core::Category;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn product(active: bool) -> Product {
        Product {
            id: ProductId::random(),
            name_es: "Dije Corazón".to_string(),
            name_en: String::new(),
            description_es: String::new(),
            description_en: String::new(),
            price: Decimal::from(850),
            category: Category::Dijes,
            material: None,
            stock: 2,
            image_url: None,
            featured: false,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_saved_order() {
        let a = product(true);
        let b = product(true);
        let hidden = product(false);
        let ids = vec![b.id, hidden.id, a.id];

        let ordered = in_saved_order(&ids, vec![a.clone(), hidden, b.clone()]);
        let got: Vec<_> = ordered.iter().map(|p| p.id).collect();
        assert_eq!(got, vec![b.id, a.id]);
    }
}
