//! Result sets returned by backend reads.
//!
//! A streamed set yields rows one at a time and cannot go back; a fetched set
//! holds every row, knows its size, can be rewound and indexed. Streamed sets
//! become fetched ones through [`ResultSet::fetch_all`].

use std::fmt;

use crate::error::{Error, Result};
use crate::row::Row;

/// A source of rows for a streamed result set.
pub trait RowStream: Send {
    /// Produce the next row, `None` once exhausted.
    fn next_row(&mut self) -> Option<Result<Row>>;
}

impl<I> RowStream for I
where
    I: Iterator<Item = Result<Row>> + Send,
{
    fn next_row(&mut self) -> Option<Result<Row>> {
        self.next()
    }
}

enum Source {
    Streamed {
        stream: Box<dyn RowStream>,
        consumed: usize,
    },
    Fetched {
        rows: Vec<Row>,
        cursor: usize,
    },
}

/// Rows produced by a read.
pub struct ResultSet {
    table: &'static str,
    source: Source,
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ResultSet");
        s.field("table", &self.table);
        match &self.source {
            Source::Streamed { consumed, .. } => s
                .field("mode", &"streamed")
                .field("consumed", consumed),
            Source::Fetched { rows, cursor } => s
                .field("mode", &"fetched")
                .field("rows", &rows.len())
                .field("cursor", cursor),
        };
        s.finish()
    }
}

impl ResultSet {
    /// A streamed result set over `stream`.
    pub fn streamed(table: &'static str, stream: impl RowStream + 'static) -> Self {
        Self {
            table,
            source: Source::Streamed {
                stream: Box::new(stream),
                consumed: 0,
            },
        }
    }

    /// A fully materialised result set.
    #[must_use]
    pub fn fetched(table: &'static str, rows: Vec<Row>) -> Self {
        Self {
            table,
            source: Source::Fetched { rows, cursor: 0 },
        }
    }

    /// Table the rows belong to.
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// True once every row is held in memory.
    #[must_use]
    pub fn is_fetched(&self) -> bool {
        matches!(self.source, Source::Fetched { .. })
    }

    /// Rows handed out since the start (or the last rewind).
    #[must_use]
    pub fn position(&self) -> usize {
        match &self.source {
            Source::Streamed { consumed, .. } => *consumed,
            Source::Fetched { cursor, .. } => *cursor,
        }
    }

    /// Pull every remaining row into memory.
    ///
    /// Rows already consumed from a stream are gone; the fetched set starts
    /// with the first row not yet handed out. No-op on a fetched set.
    pub fn fetch_all(&mut self) -> Result<()> {
        let Source::Streamed { stream, .. } = &mut self.source else {
            return Ok(());
        };
        let mut rows = Vec::new();
        while let Some(row) = stream.next_row() {
            rows.push(row?);
        }
        tracing::trace!(table = self.table, rows = rows.len(), "fetched result set");
        self.source = Source::Fetched { rows, cursor: 0 };
        Ok(())
    }

    /// Number of rows, known only for fetched sets.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        match &self.source {
            Source::Streamed { .. } => None,
            Source::Fetched { rows, .. } => Some(rows.len()),
        }
    }

    /// Random access into a fetched set.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        match &self.source {
            Source::Streamed { .. } => None,
            Source::Fetched { rows, .. } => rows.get(index),
        }
    }

    /// Restart iteration.
    ///
    /// Always possible on fetched sets; on a streamed set only before the
    /// first row was taken.
    pub fn rewind(&mut self) -> Result<()> {
        match &mut self.source {
            Source::Fetched { cursor, .. } => {
                *cursor = 0;
                Ok(())
            }
            Source::Streamed { consumed: 0, .. } => Ok(()),
            Source::Streamed { .. } => Err(Error::precondition(format!(
                "cannot rewind a streamed {} result set",
                self.table
            ))),
        }
    }
}

impl Iterator for ResultSet {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Streamed { stream, consumed } => {
                let row = stream.next_row()?;
                *consumed += 1;
                Some(row)
            }
            Source::Fetched { rows, cursor } => {
                let row = rows.get(*cursor)?.clone();
                *cursor += 1;
                Some(Ok(row))
            }
        }
    }
}
