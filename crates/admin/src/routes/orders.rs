//! Order management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::Auth;
use aurelia_backend::repos::OrderRepository;
use aurelia_core::models::Order;
use aurelia_core::{Locale, OrderId, OrderStatus};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

/// Rows per page in the order table.
const PER_PAGE: u32 = 25;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
}

impl OrderListQuery {
    /// Unknown status values list every order.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: AdminPage,
    pub orders: Vec<Order>,
    pub status: Option<OrderStatus>,
    pub statuses: [OrderStatus; 5],
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl OrdersIndexTemplate {
    #[must_use]
    pub fn status_label(&self, status: &OrderStatus) -> &'static str {
        status.label(Locale::Es)
    }

    #[must_use]
    pub fn is_status(&self, status: &OrderStatus) -> bool {
        self.status == Some(*status)
    }

    #[must_use]
    pub fn page_href(&self, page: u32) -> String {
        self.status.map_or_else(
            || format!("/orders?page={page}"),
            |status| format!("/orders?status={}&page={page}", status.as_str()),
        )
    }
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub page: AdminPage,
    pub order: Order,
    pub statuses: [OrderStatus; 5],
}

impl OrderShowTemplate {
    #[must_use]
    pub fn status_label(&self, status: &OrderStatus) -> &'static str {
        status.label(Locale::Es)
    }

    #[must_use]
    pub fn is_current(&self, status: &OrderStatus) -> bool {
        self.order.status == *status
    }
}

pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<OrderListQuery>,
) -> Result<OrdersIndexTemplate> {
    let status = query.status();
    let result = OrderRepository::new(state.backend())
        .list(Auth::Service, status, query.page.unwrap_or(1).max(1), PER_PAGE)
        .await?;

    Ok(OrdersIndexTemplate {
        page,
        status,
        statuses: OrderStatus::ALL,
        total_pages: result.total_pages(),
        current_page: result.page,
        total: result.total,
        orders: result.items,
    })
}

pub async fn show(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<OrderId>,
) -> Result<OrderShowTemplate> {
    let order = OrderRepository::new(state.backend())
        .get_with_items(Auth::Service, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderShowTemplate {
        page,
        order,
        statuses: OrderStatus::ALL,
    })
}

/// Move an order to any status.
#[instrument(skip(state, _page, form))]
pub async fn update_status(
    State(state): State<AppState>,
    _page: AdminPage,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return Ok(Redirect::to(&format!("/orders/{id}?error=invalid_status")));
    };

    OrderRepository::new(state.backend())
        .update_status(Auth::Service, id, status)
        .await?;

    Ok(Redirect::to(&format!("/orders/{id}?notice=status_updated")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::random(),
            user_id: None,
            status,
            subtotal: Decimal::from(1250),
            shipping: Decimal::from(150),
            total: Decimal::from(1400),
            shipping_name: "Lucía Pérez".to_string(),
            shipping_email: "lucia@example.mx".to_string(),
            shipping_phone: "5512345678".to_string(),
            shipping_address: "Av. Juárez 10".to_string(),
            shipping_city: "Guadalajara".to_string(),
            shipping_state: "Jalisco".to_string(),
            shipping_postal_code: "44100".to_string(),
            notes: None,
            created_at: Utc::now(),
            items: vec![],
        }
    }

    #[test]
    fn test_index_renders_status_filters() {
        let html = OrdersIndexTemplate {
            page: AdminPage::signed_in("/orders"),
            orders: vec![order(OrderStatus::Enviado)],
            status: Some(OrderStatus::Enviado),
            statuses: OrderStatus::ALL,
            current_page: 1,
            total_pages: 1,
            total: 1,
        }
        .render()
        .unwrap();
        for status in OrderStatus::ALL {
            assert!(html.contains(&format!("/orders?status={}", status.as_str())));
            assert!(html.contains(status.label(Locale::Es)));
        }
    }

    #[test]
    fn test_show_selects_current_status() {
        let html = OrderShowTemplate {
            page: AdminPage::signed_in("/orders"),
            order: order(OrderStatus::Procesando),
            statuses: OrderStatus::ALL,
        }
        .render()
        .unwrap();
        let selected = format!("value=\"{}\" selected", OrderStatus::Procesando.as_str());
        assert!(html.contains(&selected));
        assert_eq!(html.matches(" selected").count(), 1);
    }

    #[test]
    fn test_status_query_parsing() {
        let query = OrderListQuery {
            status: Some("enviado".to_string()),
            page: None,
        };
        assert_eq!(query.status(), Some(OrderStatus::Enviado));

        let query = OrderListQuery {
            status: Some("perdido".to_string()),
            page: None,
        };
        assert_eq!(query.status(), None);
    }
}
