//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use aurelia_backend::repos::{MessageRepository, OrderRepository, ProductRepository, StatusCounts};
use aurelia_backend::{Auth, BackendError};
use aurelia_core::{Locale, OrderStatus};
use aurelia_core::models::Order;
use axum::extract::State;
use rust_decimal::Decimal;
use tracing::warn;

use crate::filters;
use crate::page::AdminPage;
use crate::state::AppState;

/// Orders shown in the "recent" table.
const RECENT_ORDERS: u32 = 5;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub product_count: u64,
    pub order_count: u64,
    pub revenue: Decimal,
    pub unread_messages: u64,
    pub status_counts: StatusCounts,
    pub statuses: [OrderStatus; 5],
    pub recent_orders: Vec<Order>,
}

impl DashboardTemplate {
    /// Order count for one status, for the breakdown table.
    #[must_use]
    pub fn count_for(&self, status: &OrderStatus) -> u64 {
        self.status_counts.get(*status)
    }

    #[must_use]
    pub fn status_label(&self, status: &OrderStatus) -> &'static str {
        status.label(Locale::Es)
    }
}

fn or_default<T: Default>(what: &str, result: Result<T, BackendError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "dashboard: failed to load {what}");
        T::default()
    })
}

/// Dashboard: store totals and the latest orders.
///
/// Each figure loads independently; a failing one shows as zero instead of
/// failing the page.
pub async fn dashboard(State(state): State<AppState>, page: AdminPage) -> DashboardTemplate {
    let backend = state.backend();
    let products = ProductRepository::new(backend);
    let orders = OrderRepository::new(backend);
    let messages = MessageRepository::new(backend);

    let (product_count, status_counts, revenue, unread, recent) = tokio::join!(
        products.count(Auth::Service),
        orders.count_by_status(Auth::Service),
        orders.revenue(Auth::Service),
        messages.count_unread(Auth::Service),
        orders.recent(Auth::Service, RECENT_ORDERS),
    );

    let status_counts = or_default("order counts", status_counts);

    DashboardTemplate {
        page,
        product_count: or_default("product count", product_count),
        order_count: status_counts.total(),
        revenue: or_default("revenue", revenue),
        unread_messages: or_default("unread messages", unread),
        status_counts,
        statuses: OrderStatus::ALL,
        recent_orders: or_default("recent orders", recent),
    }
}
