//! Naive query execution
//!
//! Applies any query to any result stream in memory. Stores without a
//! native query engine run every query through here; wrappers use it to
//! replay whatever their child store could not execute.
//!
//! Every step is an adapter over the previous stream, so closing the final
//! stream closes the source. Error entries are never filtered, sorted or
//! skipped: they pass straight through and end the stream.

use std::collections::VecDeque;

use crate::error::Result;

use super::{compare_by_orders, Entry, Filter, Order, Query, QueryResult, ResultSource, Results};

/// Apply every concern of `query` to `results`
///
/// Order: prefix, range, filters, orders, offset, limit.
pub fn naive_query_apply(query: &Query, results: Results) -> Results {
    let mut results = results;

    // A prefix of /foo only matches /foo/..., never /foobar.
    if !query.prefix.is_root() {
        let prefix = crate::key::Key::clean(&query.prefix);
        results = filter_with(results, move |entry| prefix.is_ancestor_of(&entry.key));
    }

    if !query.range.is_unbounded() {
        let range = query.range.clone();
        results = filter_with(results, move |entry| range.contains(&entry.key));
    }

    for filter in &query.filters {
        results = naive_filter(results, filter.clone());
    }

    if !query.orders.is_empty() {
        results = naive_order(results, query.orders.clone());
    }

    if query.offset > 0 {
        results = naive_offset(results, query.offset);
    }

    if query.limit > 0 {
        results = naive_limit(results, query.limit);
    }

    results
}

/// Keep only entries matching `filter`
pub fn naive_filter(results: Results, filter: Filter) -> Results {
    filter_with(results, move |entry| filter.matches(entry))
}

/// Sort the whole stream by `orders`
///
/// The upstream is drained on the first call to `next`. If it yields an
/// error, that error is the only thing returned.
pub fn naive_order(results: Results, orders: Vec<Order>) -> Results {
    let query = results.query().clone();
    Results::new(
        query,
        NaiveOrder {
            inner: results,
            orders,
            sorted: None,
        },
    )
}

/// Skip the first `offset` entries
pub fn naive_offset(results: Results, offset: usize) -> Results {
    let query = results.query().clone();
    Results::new(
        query,
        NaiveOffset {
            inner: results,
            remaining: offset,
        },
    )
}

/// Stop after `limit` entries
pub fn naive_limit(results: Results, limit: usize) -> Results {
    let query = results.query().clone();
    Results::new(
        query,
        NaiveLimit {
            inner: results,
            remaining: limit,
        },
    )
}

fn filter_with(
    results: Results,
    predicate: impl Fn(&Entry) -> bool + Send + 'static,
) -> Results {
    let query = results.query().clone();
    Results::new(
        query,
        NaiveFilter {
            inner: results,
            predicate: Box::new(predicate),
        },
    )
}

// =============================================================================
// Adapters
// =============================================================================

struct NaiveFilter {
    inner: Results,
    predicate: Box<dyn Fn(&Entry) -> bool + Send>,
}

impl Iterator for NaiveFilter {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if !(self.predicate)(&entry) => continue,
                result => return Some(result),
            }
        }
    }
}

impl ResultSource for NaiveFilter {
    fn close(&mut self) -> Result<()> {
        self.inner.close_source()
    }
}

struct NaiveOrder {
    inner: Results,
    orders: Vec<Order>,
    sorted: Option<VecDeque<QueryResult>>,
}

impl NaiveOrder {
    fn drain_and_sort(&mut self) -> VecDeque<QueryResult> {
        let mut entries = Vec::new();
        for result in self.inner.by_ref() {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => return VecDeque::from([Err(e)]),
            }
        }
        // Stable, so equal entries keep their upstream order.
        entries.sort_by(|a, b| compare_by_orders(&self.orders, a, b));
        entries.into_iter().map(Ok).collect()
    }
}

impl Iterator for NaiveOrder {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sorted.is_none() {
            let sorted = self.drain_and_sort();
            self.sorted = Some(sorted);
        }
        self.sorted.as_mut()?.pop_front()
    }
}

impl ResultSource for NaiveOrder {
    fn close(&mut self) -> Result<()> {
        self.inner.close_source()
    }
}

struct NaiveOffset {
    inner: Results,
    remaining: usize,
}

impl Iterator for NaiveOffset {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.inner.next()?;
            if self.remaining > 0 && result.is_ok() {
                self.remaining -= 1;
                continue;
            }
            return Some(result);
        }
    }
}

impl ResultSource for NaiveOffset {
    fn close(&mut self) -> Result<()> {
        self.inner.close_source()
    }
}

struct NaiveLimit {
    inner: Results,
    remaining: usize,
}

impl Iterator for NaiveLimit {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.inner.next()?;
        if result.is_ok() {
            self.remaining -= 1;
        }
        Some(result)
    }
}

impl ResultSource for NaiveLimit {
    fn close(&mut self) -> Result<()> {
        self.inner.close_source()
    }
}
