//! Home page and language switch.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::{PostRepository, ProductRepository};
use aurelia_core::{BlogPost, Locale, Product};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, header::REFERER},
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::filters;
use crate::middleware::set_locale;
use crate::page::PageContext;
use crate::state::AppState;

const FEATURED_LIMIT: u32 = 8;
const LATEST_POSTS_LIMIT: u32 = 3;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<Product>,
    pub posts: Vec<BlogPost>,
}

/// Home page: featured pieces and the latest posts.
///
/// Either section may fail independently; the page still renders.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let products = ProductRepository::new(state.backend());
    let posts = PostRepository::new(state.backend());

    let (featured, latest) = tokio::join!(
        products.featured(Auth::Anon, FEATURED_LIMIT),
        posts.list_published(Auth::Anon, LATEST_POSTS_LIMIT),
    );

    let featured = featured.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load featured products");
        Vec::new()
    });
    let posts = latest.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load latest posts");
        Vec::new()
    });

    HomeTemplate {
        page,
        featured,
        posts,
    }
}

/// Path to return to after switching language: the same-site referer's
/// path and query, or the home page.
fn return_path(headers: &HeaderMap, base_url: &str) -> String {
    let Some(referer) = headers.get(REFERER).and_then(|v| v.to_str().ok()) else {
        return "/".to_string();
    };
    let (Ok(referer), Ok(base)) = (url::Url::parse(referer), url::Url::parse(base_url)) else {
        return "/".to_string();
    };
    if referer.origin() != base.origin() {
        return "/".to_string();
    }

    match referer.query() {
        Some(query) => format!("{}?{query}", referer.path()),
        None => referer.path().to_string(),
    }
}

/// Set the session language and go back.
#[instrument(skip(state, session, headers))]
pub async fn set_language(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Result<Redirect> {
    let back = return_path(&headers, &state.config().base_url);
    match code.parse::<Locale>() {
        Ok(locale) => set_locale(&session, locale).await?,
        Err(e) => warn!(error = %e, "ignoring language switch"),
    }
    Ok(Redirect::to(&back))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const BASE: &str = "https://aurelia.example";

    fn headers(referer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(referer).unwrap());
        headers
    }

    #[test]
    fn test_return_path_same_site() {
        let headers = headers("https://aurelia.example/products?category=anillos");
        assert_eq!(return_path(&headers, BASE), "/products?category=anillos");
    }

    #[test]
    fn test_return_path_rejects_other_sites() {
        let headers = headers("https://evil.example/phish");
        assert_eq!(return_path(&headers, BASE), "/");
    }

    #[test]
    fn test_return_path_without_referer() {
        assert_eq!(return_path(&HeaderMap::new(), BASE), "/");
    }
}
