//! Blog management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::repos::PostRepository;
use aurelia_backend::{Auth, BackendError};
use aurelia_core::models::{BlogPost, PostInput};
use aurelia_core::validation::{PostForm, ValidationErrors};
use aurelia_core::{Locale, PostId};
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

/// Post list template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: AdminPage,
    pub posts: Vec<BlogPost>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/form.html")]
pub struct PostFormTemplate {
    pub page: AdminPage,
    /// `None` when creating.
    pub post: Option<BlogPost>,
    pub form: PostForm,
    pub errors: ValidationErrors,
}

impl PostFormTemplate {
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&'static str> {
        self.errors.for_field(field).map(|key| Locale::Es.t(key))
    }

    #[must_use]
    pub fn action(&self) -> String {
        self.post
            .as_ref()
            .map_or_else(|| "/blog".to_string(), |p| format!("/blog/{}", p.id))
    }
}

/// Pre-fill the editor from a stored post.
#[must_use]
pub fn form_from(post: &BlogPost) -> PostForm {
    PostForm {
        slug: post.slug.clone(),
        title_es: post.title_es.clone(),
        title_en: post.title_en.clone(),
        excerpt_es: post.excerpt_es.clone(),
        excerpt_en: post.excerpt_en.clone(),
        content_es: post.content_es.clone(),
        content_en: post.content_en.clone(),
        cover_image_url: post.cover_image_url.clone().unwrap_or_default(),
        published: post.published.then(|| "on".to_string()),
    }
}

/// The same post with publication flipped. Publishing keeps an earlier
/// publication date; unpublishing clears it.
#[must_use]
pub fn toggled(post: &BlogPost, now: DateTime<Utc>) -> PostInput {
    let published = !post.published;
    PostInput {
        slug: post.slug.clone(),
        title_es: post.title_es.clone(),
        title_en: post.title_en.clone(),
        excerpt_es: post.excerpt_es.clone(),
        excerpt_en: post.excerpt_en.clone(),
        content_es: post.content_es.clone(),
        content_en: post.content_en.clone(),
        cover_image_url: post.cover_image_url.clone(),
        published,
        published_at: published.then(|| post.published_at.unwrap_or(now)),
    }
}

async fn load(state: &AppState, id: PostId) -> Result<BlogPost> {
    PostRepository::new(state.backend())
        .get(Auth::Service, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {id}")))
}

fn rerender(
    page: AdminPage,
    post: Option<BlogPost>,
    form: PostForm,
    errors: ValidationErrors,
) -> Response {
    let page = page.with_error(
        errors
            .first()
            .and_then(|(_, key)| key.strip_prefix("error."))
            .unwrap_or("generic"),
    );
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        PostFormTemplate {
            page,
            post,
            form,
            errors,
        },
    )
        .into_response()
}

fn slug_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("slug", "error.slug_taken");
    errors
}

/// All posts, drafts included.
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<BlogIndexTemplate> {
    let posts = PostRepository::new(state.backend())
        .list_all(Auth::Service)
        .await?;
    Ok(BlogIndexTemplate { page, posts })
}

pub async fn new_page(page: AdminPage) -> PostFormTemplate {
    PostFormTemplate {
        page,
        post: None,
        form: PostForm::default(),
        errors: ValidationErrors::new(),
    }
}

#[instrument(skip(state, page, form))]
pub async fn create(
    State(state): State<AppState>,
    page: AdminPage,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let input = match form.clone().into_input(None, Utc::now()) {
        Ok(input) => input,
        Err(errors) => return Ok(rerender(page, None, form, errors)),
    };

    match PostRepository::new(state.backend())
        .create(Auth::Service, &input)
        .await
    {
        Ok(post) => {
            info!(post_id = %post.id, slug = %post.slug, "post created");
            Ok(Redirect::to(&format!("/blog/{}?notice=post_saved", post.id)).into_response())
        }
        Err(BackendError::Conflict(_)) => Ok(rerender(page, None, form, slug_taken())),
        Err(e) => Err(e.into()),
    }
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<PostId>,
) -> Result<PostFormTemplate> {
    let post = load(&state, id).await?;
    Ok(PostFormTemplate {
        page,
        form: form_from(&post),
        post: Some(post),
        errors: ValidationErrors::new(),
    })
}

#[instrument(skip(state, page, form))]
pub async fn update(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<PostId>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    let post = load(&state, id).await?;

    let input = match form.clone().into_input(post.published_at, Utc::now()) {
        Ok(input) => input,
        Err(errors) => return Ok(rerender(page, Some(post), form, errors)),
    };

    match PostRepository::new(state.backend())
        .update(Auth::Service, id, &input)
        .await
    {
        Ok(_) => {
            info!(post_id = %id, "post updated");
            Ok(Redirect::to(&format!("/blog/{id}?notice=post_saved")).into_response())
        }
        Err(BackendError::Conflict(_)) => Ok(rerender(page, Some(post), form, slug_taken())),
        Err(e) => Err(e.into()),
    }
}

/// Publish a draft or unpublish a live post.
#[instrument(skip(state, _page))]
pub async fn toggle_published(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<PostId>,
) -> Result<Redirect> {
    let post = load(&state, id).await?;
    let input = toggled(&post, Utc::now());

    PostRepository::new(state.backend())
        .update(Auth::Service, id, &input)
        .await?;
    info!(post_id = %id, published = input.published, "post publication toggled");

    Ok(Redirect::to("/blog?notice=post_saved"))
}

#[instrument(skip(state, _page))]
pub async fn delete(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<PostId>,
) -> Result<Redirect> {
    PostRepository::new(state.backend())
        .delete(Auth::Service, id)
        .await?;
    info!(post_id = %id, "post deleted");
    Ok(Redirect::to("/blog?notice=post_deleted"))
}
