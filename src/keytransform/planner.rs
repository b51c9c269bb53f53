//! Query planning under key transformation
//!
//! Splits a logical-space query into the part a child store can execute
//! natively on physical keys and the part that must be replayed afterwards
//! over inverted keys.
//!
//! ## Split
//! ```text
//!            ┌──────────────┐  physical keys  ┌──────────────┐ logical keys
//! query ───▶ │ child query  │ ──────────────▶ │ invert keys  │ ───────┐
//!            └──────────────┘                 └──────────────┘        ▼
//!                                                            ┌──────────────┐
//!                                                            │ naive query  │ ──▶ caller
//!                                                            └──────────────┘
//! ```
//!
//! Offset and limit are only correct in the child while the child sees
//! exactly the logical result set in exactly the logical order. Whenever
//! ordering, filtering or the range falls back to the naive pass, offset and
//! limit follow it.

use crate::key::Key;
use crate::query::{Filter, Order, Query, Range};

use super::KeyTransform;

/// A query split into its native and residual halves
#[derive(Debug, Clone, PartialEq)]
pub struct SplitQuery {
    /// Replayed in logical key space over the child's results
    pub naive: Query,

    /// Executed by the child store in physical key space
    pub child: Query,
}

/// Split `query` so the child store does as much of the work as possible
pub fn prepare_query(transform: &KeyTransform, query: &Query) -> SplitQuery {
    // Everything starts in the child; concerns move to the naive query only
    // when the child cannot answer them in physical key space.
    let mut naive = Query::default();
    let mut child = query.clone();

    // The child always handles the prefix.
    child.prefix = transform.convert(&Key::clean(&query.prefix));

    let order_preserving = transform.is_order_preserving();

    if !query.range.is_unbounded() {
        if order_preserving {
            child.range = Range {
                start: query.range.start.as_ref().map(|key| transform.convert(key)),
                end: query.range.end.as_ref().map(|key| transform.convert(key)),
            };
        } else {
            tracing::debug!(range = ?query.range, "range not delegable under key transform");
            naive.range = query.range.clone();
            child.range = Range::default();
            move_window_to_naive(&mut naive, &mut child, query);
        }
    }

    for (i, order) in query.orders.iter().enumerate() {
        match order {
            Order::ByValue | Order::ByValueDescending => continue,
            Order::ByKey | Order::ByKeyDescending if order_preserving => {
                // Keys are unique, so nothing after a key order can ever
                // break a tie.
                child.orders.truncate(i + 1);
                break;
            }
            _ => {
                tracing::debug!(order = ?order, "order not delegable under key transform");
                naive.orders = query.orders.clone();
                child.orders = Vec::new();
                move_window_to_naive(&mut naive, &mut child, query);
                break;
            }
        }
    }

    match convert_filters(transform, &query.filters) {
        Some(filters) => child.filters = filters,
        None => {
            tracing::debug!(filters = ?query.filters, "filters not delegable under key transform");
            naive.filters = query.filters.clone();
            child.filters = Vec::new();
            move_window_to_naive(&mut naive, &mut child, query);
        }
    }

    tracing::debug!(child = %child, naive = %naive, "split query");
    SplitQuery { naive, child }
}

/// Rewrite key operands into physical space
///
/// `None` when any filter cannot be expressed over physical keys.
fn convert_filters(transform: &KeyTransform, filters: &[Filter]) -> Option<Vec<Filter>> {
    filters
        .iter()
        .map(|filter| match filter {
            Filter::ValueCompare { .. } => Some(filter.clone()),
            Filter::KeyCompare { op, key } => Some(Filter::KeyCompare {
                op: *op,
                key: transform.convert(key),
            }),
            Filter::KeyPrefix { prefix } => Some(Filter::KeyPrefix {
                prefix: transform.convert(prefix),
            }),
            Filter::Custom(_) => None,
        })
        .collect()
}

fn move_window_to_naive(naive: &mut Query, child: &mut Query, original: &Query) {
    naive.offset = original.offset;
    child.offset = 0;
    naive.limit = original.limit;
    child.limit = 0;
}
