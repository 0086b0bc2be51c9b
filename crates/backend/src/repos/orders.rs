//! Orders and their line items.
//!
//! An order is written as two inserts: the order row, then its items. The
//! backend offers no multi-statement transaction over REST, so when the
//! items insert fails the order row is deleted again on a best-effort basis.

use aurelia_core::{NewOrder, NewOrderItem, Order, OrderId, OrderStatus, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use super::Page;
use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::query::Query;

const ORDERS: &str = "orders";
const ITEMS: &str = "order_items";
const WITH_ITEMS: &str = "*,order_items(*)";

/// Order counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts(pub Vec<(OrderStatus, u64)>);

impl StatusCounts {
    #[must_use]
    pub fn get(&self, status: OrderStatus) -> u64 {
        self.0
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, count)| *count)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Serialize)]
struct ItemRow<'a> {
    order_id: OrderId,
    #[serde(flatten)]
    item: &'a NewOrderItem,
}

#[derive(Deserialize)]
struct TotalRow {
    total: Decimal,
    status: OrderStatus,
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    client: &'a BackendClient,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Insert an order and its items, returning the stored order with items.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever insert failed. When the items insert
    /// fails the order row is removed before returning.
    #[instrument(skip(self, order, items), fields(items = items.len()))]
    pub async fn create_with_items(
        &self,
        auth: Auth<'_>,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> Result<Order, BackendError> {
        let mut created: Order = self.client.insert_one(auth, ORDERS, order).await?;

        let rows = items
            .iter()
            .map(|item| ItemRow {
                order_id: created.id,
                item,
            })
            .collect::<Vec<_>>();

        match self.client.insert(auth, ITEMS, &rows).await {
            Ok(items) => {
                created.items = items;
                info!(order_id = %created.id, total = %created.total, "order created");
                Ok(created)
            }
            Err(e) => {
                error!(order_id = %created.id, error = %e, "failed to insert order items");
                if let Err(cleanup) = self
                    .client
                    .delete(auth, &Query::table(ORDERS).eq("id", created.id))
                    .await
                {
                    warn!(order_id = %created.id, error = %cleanup, "failed to remove orphaned order");
                }
                Err(e)
            }
        }
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list_for_user(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
    ) -> Result<Vec<Order>, BackendError> {
        let query = Query::table(ORDERS)
            .select(WITH_ITEMS)
            .eq("user_id", user_id)
            .order("created_at", false);
        self.client.select(auth, &query).await
    }

    /// One of a customer's orders. Orders of other customers are not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get_for_user(
        &self,
        auth: Auth<'_>,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, BackendError> {
        let query = Query::table(ORDERS)
            .select(WITH_ITEMS)
            .eq("id", id)
            .eq("user_id", user_id);
        self.client.select_one(auth, &query).await
    }

    /// All orders, newest first, optionally of one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn list(
        &self,
        auth: Auth<'_>,
        status: Option<OrderStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Order>, BackendError> {
        let mut query = Query::table(ORDERS).select("*");
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        let query = query.order("created_at", false).page(page, per_page);
        let (items, total) = self.client.select_with_count(auth, &query).await?;
        Ok(Page {
            items,
            page: page.max(1),
            per_page,
            total,
        })
    }

    /// Most recent orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn recent(&self, auth: Auth<'_>, limit: u32) -> Result<Vec<Order>, BackendError> {
        let query = Query::table(ORDERS)
            .order("created_at", false)
            .limit(limit);
        self.client.select(auth, &query).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn get_with_items(
        &self,
        auth: Auth<'_>,
        id: OrderId,
    ) -> Result<Option<Order>, BackendError> {
        let query = Query::table(ORDERS).select(WITH_ITEMS).eq("id", id);
        self.client.select_one(auth, &query).await
    }

    /// Set an order's status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] when no order has `id`.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        auth: Auth<'_>,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        let updated = self
            .client
            .update::<_, Order>(
                auth,
                &Query::table(ORDERS).eq("id", id),
                &serde_json::json!({ "status": status }),
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("order {id}")))?;
        info!(order_id = %id, status = %status, "order status updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns an error if any count request fails.
    pub async fn count_by_status(&self, auth: Auth<'_>) -> Result<StatusCounts, BackendError> {
        let mut counts = Vec::with_capacity(OrderStatus::ALL.len());
        for status in OrderStatus::ALL {
            let count = self
                .client
                .count(auth, &Query::table(ORDERS).eq("status", status))
                .await?;
            counts.push((status, count));
        }
        Ok(StatusCounts(counts))
    }

    /// Sum of totals over orders that count as sales.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    pub async fn revenue(&self, auth: Auth<'_>) -> Result<Decimal, BackendError> {
        let query = Query::table(ORDERS)
            .select("total,status")
            .neq("status", OrderStatus::Cancelado);
        let rows: Vec<TotalRow> = self.client.select(auth, &query).await?;
        Ok(sum_sales(&rows))
    }
}

fn sum_sales(rows: &[TotalRow]) -> Decimal {
    rows.iter()
        .filter(|row| row.status.counts_as_sale())
        .map(|row| row.total)
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelia_core::ProductId;

    use super::*;

    #[test]
    fn test_item_row_flattens_with_order_id() {
        let order_id = OrderId::random();
        let product_id = ProductId::random();
        let item = NewOrderItem {
            product_id,
            product_name: "Anillo Sol".to_string(),
            unit_price: Decimal::new(125_000, 2),
            quantity: 2,
        };
        let json = serde_json::to_value(ItemRow {
            order_id,
            item: &item,
        })
        .unwrap();

        assert_eq!(json["order_id"], order_id.to_string());
        assert_eq!(json["product_id"], product_id.to_string());
        assert_eq!(json["product_name"], "Anillo Sol");
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_sum_sales_skips_cancelled() {
        let rows: Vec<TotalRow> = serde_json::from_str(
            r#"[
                {"total": "1050.00", "status": "Entregado"},
                {"total": "300.50", "status": "Pendiente"},
                {"total": "999.00", "status": "Cancelado"}
            ]"#,
        )
        .unwrap();
        assert_eq!(sum_sales(&rows), Decimal::new(135_050, 2));
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts(vec![
            (OrderStatus::Pendiente, 3),
            (OrderStatus::Enviado, 2),
        ]);
        assert_eq!(counts.get(OrderStatus::Pendiente), 3);
        assert_eq!(counts.get(OrderStatus::Cancelado), 0);
        assert_eq!(counts.total(), 5);
    }
}
