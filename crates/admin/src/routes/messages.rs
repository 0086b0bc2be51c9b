//! Contact form inbox.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::MessageRepository;
use aurelia_core::MessageId;
use aurelia_core::models::ContactMessage;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MessageListQuery {
    /// `1` or `true` shows unread messages only.
    pub unread: Option<String>,
}

impl MessageListQuery {
    #[must_use]
    pub fn unread_only(&self) -> bool {
        matches!(self.unread.as_deref(), Some("1" | "true" | "on"))
    }
}

/// Inbox template.
#[derive(Template, WebTemplate)]
#[template(path = "messages/index.html")]
pub struct MessagesIndexTemplate {
    pub page: AdminPage,
    pub messages: Vec<ContactMessage>,
    pub unread_only: bool,
}

pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<MessageListQuery>,
) -> Result<MessagesIndexTemplate> {
    let unread_only = query.unread_only();
    let messages = MessageRepository::new(state.backend())
        .list(Auth::Service, unread_only)
        .await?;

    Ok(MessagesIndexTemplate {
        page,
        messages,
        unread_only,
    })
}

#[instrument(skip(state, _page))]
pub async fn mark_read(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<MessageId>,
) -> Result<Redirect> {
    MessageRepository::new(state.backend())
        .mark_read(Auth::Service, id)
        .await?;
    Ok(Redirect::to("/messages?notice=message_read"))
}

#[instrument(skip(state, _page))]
pub async fn delete(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<MessageId>,
) -> Result<Redirect> {
    MessageRepository::new(state.backend())
        .delete(Auth::Service, id)
        .await?;
    Ok(Redirect::to("/messages?notice=message_deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_flag() {
        let query = |v: Option<&str>| MessageListQuery {
            unread: v.map(String::from),
        };
        assert!(query(Some("1")).unread_only());
        assert!(query(Some("true")).unread_only());
        assert!(!query(Some("0")).unread_only());
        assert!(!query(None).unread_only());
    }
}
