//! Result streams
//!
//! Lazy sequences of query results that own whatever resource produces them
//! (a cursor, a snapshot, an upstream stream) and release it on close.

use crate::error::Result;

use super::{Entry, Query, QueryResult};

/// Something that yields query results and may hold a resource to release
///
/// Adapters that wrap another stream must forward `close` to it so that
/// closing the outermost stream reaches the innermost source.
pub trait ResultSource: Iterator<Item = QueryResult> + Send {
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A lazy, cancellable stream of query results
///
/// The stream halts after yielding an error. Dropping an unclosed stream
/// closes it; call [`Results::close`] to observe the close error instead.
pub struct Results {
    query: Query,
    source: Box<dyn ResultSource>,
    halted: bool,
    closed: bool,
}

impl Results {
    /// Wrap a result source
    pub fn new(query: Query, source: impl ResultSource + 'static) -> Self {
        Self {
            query,
            source: Box::new(source),
            halted: false,
            closed: false,
        }
    }

    /// Stream over an already materialized set of entries
    pub fn from_entries(query: Query, entries: Vec<Entry>) -> Self {
        Self::from_iter(query, entries.into_iter().map(Ok))
    }

    /// Stream over a plain iterator with nothing to release on close
    pub fn from_iter<I>(query: Query, iter: I) -> Self
    where
        I: Iterator<Item = QueryResult> + Send + 'static,
    {
        Self::new(query, IterSource { iter, closer: None })
    }

    /// Stream over an iterator, running `closer` exactly once on close
    pub fn with_closer<I, F>(query: Query, iter: I, closer: F) -> Self
    where
        I: Iterator<Item = QueryResult> + Send + 'static,
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self::new(
            query,
            IterSource {
                iter,
                closer: Some(Box::new(closer)),
            },
        )
    }

    /// The query this stream answers
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Drain every remaining entry and close the stream
    ///
    /// Returns the first error encountered; entries before it are discarded.
    pub fn rest(mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        while let Some(result) = self.next() {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    if let Err(close_err) = self.close_source() {
                        tracing::warn!(error = %close_err, "failed to close results after error");
                    }
                    return Err(e);
                }
            }
        }
        self.close_source()?;
        Ok(entries)
    }

    /// Close the stream, releasing the underlying source
    pub fn close(mut self) -> Result<()> {
        self.close_source()
    }

    /// Idempotent close shared by `close`, `rest` and `Drop`
    pub(crate) fn close_source(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.source.close()
    }
}

impl Iterator for Results {
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || self.halted {
            return None;
        }
        let result = self.source.next()?;
        if result.is_err() {
            self.halted = true;
        }
        Some(result)
    }
}

impl ResultSource for Results {
    fn close(&mut self) -> Result<()> {
        self.close_source()
    }
}

impl Drop for Results {
    fn drop(&mut self) {
        if let Err(e) = self.close_source() {
            tracing::warn!(error = %e, query = %self.query, "failed to close query results");
        }
    }
}

impl std::fmt::Debug for Results {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Results")
            .field("query", &self.query)
            .field("halted", &self.halted)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Iterator-backed Source
// =============================================================================

type Closer = Box<dyn FnOnce() -> Result<()> + Send>;

struct IterSource<I> {
    iter: I,
    closer: Option<Closer>,
}

impl<I> Iterator for IterSource<I>
where
    I: Iterator<Item = QueryResult>,
{
    type Item = QueryResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

impl<I> ResultSource for IterSource<I>
where
    I: Iterator<Item = QueryResult> + Send,
{
    fn close(&mut self) -> Result<()> {
        match self.closer.take() {
            Some(closer) => closer(),
            None => Ok(()),
        }
    }
}
