pub mod addresses;
pub mod companies;
pub mod email;
pub mod inputs;
pub mod invoices;
pub mod offices;
pub mod orders;
pub mod paper_products;
pub mod payments;
pub mod quickbooks;
pub mod roles;
pub mod shipping;
pub mod status;
pub mod stocks;
pub mod typesetting;
pub mod uploads;
pub mod users;
pub mod work_orders;

use crate::errors::ServiceError;
use sea_orm::{sea_query::Expr, ConnectionTrait, EntityTrait, QuerySelect};
use serde::Serialize;

/// Upper bound on `limit` for list procedures.
pub const MAX_PAGE_SIZE: u64 = 100;

/// One page of a list procedure.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }
}

/// Normalizes 1-based paging input.
pub fn page_window(page: u64, limit: u64) -> (u64, u64) {
    (page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
}

/// Next value for a sequential business number: the current maximum plus one,
/// or `base` for an empty table. Run it inside the creating transaction.
pub(crate) async fn next_number<E, C>(
    conn: &C,
    column: E::Column,
    base: i32,
) -> Result<i32, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let current: Option<Option<i32>> = E::find()
        .select_only()
        .column_as(Expr::col(column).max(), "max_number")
        .into_tuple()
        .one(conn)
        .await?;

    Ok(match current.flatten() {
        Some(max) if max >= base => max + 1,
        _ => base,
    })
}

/// Trims an optional text field, turning blank input into `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_clamps_input() {
        assert_eq!(page_window(0, 0), (1, 1));
        assert_eq!(page_window(3, 500), (3, MAX_PAGE_SIZE));
        assert_eq!(page_window(2, 25), (2, 25));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::<u8> {
            items: vec![],
            total: 41,
            page: 1,
            limit: 20,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn clean_drops_blank_strings() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" PO-7 ".into())), Some("PO-7".into()));
        assert_eq!(clean(None), None);
    }
}
