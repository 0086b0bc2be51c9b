//! Blog posts.

use aurelia_core::{BlogPost, PostId, PostInput};
use tracing::instrument;

use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const TABLE: &str = "blog_posts";

/// Repository for blog posts.
pub struct PostRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> PostRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Published posts, most recently published first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list_published(
        &self,
        auth: Auth<'_>,
        limit: u32,
    ) -> Result<Vec<BlogPost>, BackendError> {
        let query = Query::table(TABLE)
            .eq("published", true)
            .order("published_at", false)
            .order("created_at", false)
            .limit(limit);
        self.client.select(auth, &query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get_published_by_slug(
        &self,
        auth: Auth<'_>,
        slug: &str,
    ) -> Result<Option<BlogPost>, BackendError> {
        let query = Query::table(TABLE)
            .eq("slug", slug)
            .eq("published", true);
        self.client.select_one(auth, &query).await
    }

    /// Every post, drafts included.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list_all(&self, auth: Auth<'_>) -> Result<Vec<BlogPost>, BackendError> {
        self.client
            .select(auth, &Query::table(TABLE).order("created_at", false))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get(&self, auth: Auth<'_>, id: PostId) -> Result<Option<BlogPost>, BackendError> {
        self.client
            .select_one(auth, &Query::table(TABLE).eq("id", id))
            .await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::Conflict`] when the slug is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, auth: Auth<'_>, input: &PostInput) -> Result<BlogPost, BackendError> {
        self.client.insert_one(auth, TABLE, input).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no row was updated, or
    /// [`BackendError::Conflict`] when the slug is taken.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn update(
        &self,
        auth: Auth<'_>,
        id: PostId,
        input: &PostInput,
    ) -> Result<BlogPost, BackendError> {
        self.client
            .update::<_, BlogPost>(auth, &Query::table(TABLE).eq("id", id), input)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("post {id}")))
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete(&self, auth: Auth<'_>, id: PostId) -> Result<(), BackendError> {
        self.client
            .delete(auth, &Query::table(TABLE).eq("id", id))
            .await
    }
}
