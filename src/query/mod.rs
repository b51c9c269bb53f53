//! Query Module
//!
//! Describes scans over a datastore and the lazy result streams they produce.
//!
//! ## Responsibilities
//! - Query description: prefix, range, filters, orders, offset, limit
//! - Lazy, cancellable result streams with chained close
//! - Generic ("naive") execution of any query over any result stream
//!
//! ## Evaluation Order
//! ```text
//! source ─▶ prefix ─▶ range ─▶ filters ─▶ orders ─▶ offset ─▶ limit ─▶ caller
//! ```
//! Filters and orders are applied in list order. The first order is the
//! primary sort key, later orders only break ties.

mod naive;
mod results;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;
use crate::key::Key;

pub use naive::{naive_filter, naive_limit, naive_offset, naive_order, naive_query_apply};
pub use results::{ResultSource, Results};

/// A single query result: an entry or the error that halted the stream
pub type QueryResult = Result<Entry>;

/// Caller-supplied predicate for [`Filter::Custom`]
pub type EntryPredicate = Arc<dyn Fn(&Entry) -> bool + Send + Sync>;

/// Caller-supplied comparator for [`Order::ByFunction`]
pub type EntryComparator = Arc<dyn Fn(&Entry, &Entry) -> Ordering + Send + Sync>;

// =============================================================================
// Entry
// =============================================================================

/// A key/value pair returned by a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,

    /// Empty when the query is keys-only
    pub value: Bytes,

    /// Value size, when the query asked for sizes
    pub size: Option<usize>,
}

impl Entry {
    pub fn new(key: Key, value: impl Into<Bytes>) -> Self {
        Self {
            key,
            value: value.into(),
            size: None,
        }
    }
}

// =============================================================================
// Range
// =============================================================================

/// Half-open key range `[start, end)`; a missing bound is unbounded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Range {
    pub start: Option<Key>,
    pub end: Option<Key>,
}

impl Range {
    pub fn new(start: Option<Key>, end: Option<Key>) -> Self {
        Self { start, end }
    }

    /// True when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, key: &Key) -> bool {
        if let Some(start) = &self.start {
            if key < start {
                return false;
            }
        }
        if let Some(end) = &self.end {
            if key >= end {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Comparison operator used by key and value filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareOp {
    /// Whether `lhs.cmp(rhs) == ordering` satisfies this operator
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::GreaterThanOrEqual => ordering != Ordering::Less,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEqual => "<=",
        }
    }
}

/// A predicate over query entries
#[derive(Clone)]
pub enum Filter {
    /// Compare the entry value against `value`
    ValueCompare { op: CompareOp, value: Bytes },

    /// Compare the entry key against `key`
    KeyCompare { op: CompareOp, key: Key },

    /// Keep entries whose key string starts with `prefix`
    KeyPrefix { prefix: Key },

    /// Arbitrary predicate; never delegated to a native store
    Custom(EntryPredicate),
}

impl Filter {
    pub fn custom(predicate: impl Fn(&Entry) -> bool + Send + Sync + 'static) -> Self {
        Filter::Custom(Arc::new(predicate))
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::ValueCompare { op, value } => op.matches(entry.value.cmp(value)),
            Filter::KeyCompare { op, key } => op.matches(entry.key.cmp(key)),
            Filter::KeyPrefix { prefix } => entry.key.has_prefix(prefix.as_str()),
            Filter::Custom(predicate) => predicate(entry),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::ValueCompare { op, value } => write!(f, "VALUE {} {:?}", op.symbol(), value),
            Filter::KeyCompare { op, key } => write!(f, "KEY {} {:?}", op.symbol(), key.as_str()),
            Filter::KeyPrefix { prefix } => write!(f, "PREFIX({:?})", prefix.as_str()),
            Filter::Custom(_) => f.write_str("CUSTOM"),
        }
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Filter::ValueCompare { op: a, value: va },
                Filter::ValueCompare { op: b, value: vb },
            ) => a == b && va == vb,
            (Filter::KeyCompare { op: a, key: ka }, Filter::KeyCompare { op: b, key: kb }) => {
                a == b && ka == kb
            }
            (Filter::KeyPrefix { prefix: a }, Filter::KeyPrefix { prefix: b }) => a == b,
            (Filter::Custom(a), Filter::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A sort criterion over query entries
#[derive(Clone)]
pub enum Order {
    ByKey,
    ByKeyDescending,
    ByValue,
    ByValueDescending,

    /// Arbitrary comparator; never delegated to a native store
    ByFunction(EntryComparator),
}

impl Order {
    pub fn by_function(
        compare: impl Fn(&Entry, &Entry) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Order::ByFunction(Arc::new(compare))
    }

    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Order::ByKey => a.key.cmp(&b.key),
            Order::ByKeyDescending => b.key.cmp(&a.key),
            Order::ByValue => a.value.cmp(&b.value),
            Order::ByValueDescending => b.value.cmp(&a.value),
            Order::ByFunction(compare) => compare(a, b),
        }
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::ByKey => f.write_str("KEY"),
            Order::ByKeyDescending => f.write_str("desc(KEY)"),
            Order::ByValue => f.write_str("VALUE"),
            Order::ByValueDescending => f.write_str("desc(VALUE)"),
            Order::ByFunction(_) => f.write_str("FN"),
        }
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Order::ByFunction(a), Order::ByFunction(b)) => Arc::ptr_eq(a, b),
            (Order::ByKey, Order::ByKey)
            | (Order::ByKeyDescending, Order::ByKeyDescending)
            | (Order::ByValue, Order::ByValue)
            | (Order::ByValueDescending, Order::ByValueDescending) => true,
            _ => false,
        }
    }
}

/// Compare two entries by a list of orders, first order first
pub fn compare_by_orders(orders: &[Order], a: &Entry, b: &Entry) -> Ordering {
    for order in orders {
        match order.compare(a, b) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }
    Ordering::Equal
}

// =============================================================================
// Query
// =============================================================================

/// A scan request against a datastore
///
/// A zero `offset` or `limit` means "none". A root `prefix` means "all keys".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Only return keys strictly beneath this key
    pub prefix: Key,

    pub range: Range,

    pub filters: Vec<Filter>,

    pub orders: Vec<Order>,

    /// Number of results to skip
    pub offset: usize,

    /// Maximum number of results
    pub limit: usize,

    /// Return keys only; values are left empty
    pub keys_only: bool,

    /// Populate `Entry::size`
    pub returns_sizes: bool,
}

impl Query {
    /// A query over everything beneath `prefix`
    pub fn with_prefix(prefix: impl Into<Key>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT keys")?;
        if !self.keys_only {
            f.write_str(",vals")?;
        }
        write!(f, " FROM {}", self.prefix)?;
        if let Some(start) = &self.range.start {
            write!(f, " FROM_KEY {start}")?;
        }
        if let Some(end) = &self.range.end {
            write!(f, " TO_KEY {end}")?;
        }
        if !self.filters.is_empty() {
            write!(f, " FILTER {:?}", self.filters)?;
        }
        if !self.orders.is_empty() {
            write!(f, " ORDER {:?}", self.orders)?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        if self.limit > 0 {
            write!(f, " LIMIT {}", self.limit)?;
        }
        Ok(())
    }
}
