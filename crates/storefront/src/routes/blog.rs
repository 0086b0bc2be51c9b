//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::PostRepository;
use aurelia_core::BlogPost;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::markdown::render_markdown;
use crate::page::PageContext;
use crate::state::AppState;

const POSTS_LIMIT: u32 = 50;

#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: PageContext,
    pub posts: Vec<BlogPost>,
}

#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogPostTemplate {
    pub page: PageContext,
    pub post: BlogPost,
    /// Rendered Markdown body for the visitor's language.
    pub content_html: String,
}

/// Published posts, newest first.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> Result<impl IntoResponse> {
    let posts = PostRepository::new(state.backend())
        .list_published(Auth::Anon, POSTS_LIMIT)
        .await?;

    Ok(BlogIndexTemplate { page, posts })
}

/// A published post. Drafts are not found.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let post = PostRepository::new(state.backend())
        .get_published_by_slug(Auth::Anon, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    let content_html = render_markdown(post.content(page.locale));

    Ok(BlogPostTemplate {
        page,
        post,
        content_html,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::{Locale, PostId};
    use chrono::Utc;

    use super::*;

    fn post() -> BlogPost {
        BlogPost {
            id: PostId::random(),
            slug: "cuidado-de-la-plata".to_string(),
            title_es: "Cuidado de la plata".to_string(),
            title_en: "Silver care".to_string(),
            excerpt_es: "Consejos para tus piezas".to_string(),
            excerpt_en: "Tips for your pieces".to_string(),
            content_es: "Guarda tus piezas en seco.".to_string(),
            content_en: "Keep your pieces dry.".to_string(),
            cover_image_url: None,
            published: true,
            published_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_index_uses_visitor_language() {
        let html = BlogIndexTemplate {
            page: PageContext::anonymous(Locale::En),
            posts: vec![post()],
        }
        .render()
        .unwrap();
        assert!(html.contains("Silver care"));
        assert!(html.contains("Tips for your pieces"));
        assert!(html.contains("/blog/cuidado-de-la-plata"));
    }

    #[test]
    fn test_post_renders_markdown_body() {
        let post = post();
        let content_html = render_markdown(post.content(Locale::Es));
        let html = BlogPostTemplate {
            page: PageContext::anonymous(Locale::Es),
            post,
            content_html,
        }
        .render()
        .unwrap();
        assert!(html.contains("Cuidado de la plata"));
        assert!(html.contains("<p>Guarda tus piezas en seco.</p>"));
    }
}
