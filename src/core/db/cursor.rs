/// Cursor Module
///
/// Two layers sit on top of a native cursor:
/// - `RowFactoryCursor` runs every fetched row through temporal coercion
/// - `CursorWrapper` intercepts `execute`/`executemany`, records the query
///   text and re-types native errors into `AdapterError`
///
/// The wrapper composes rather than replaces: anything it does not define
/// itself is reached through `Deref` on the row-factory cursor.

use crate::core::db::coercion::{coerce_row, TimezonePolicy};
use crate::core::db::native::{ColumnDescription, NativeCursor, Row, Value};
use crate::core::{AdapterError, Result};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// Native cursor whose rows pass through temporal coercion
#[derive(Debug)]
pub struct RowFactoryCursor<C> {
    cursor: C,
    tz_policy: TimezonePolicy,
}

impl<C: NativeCursor> RowFactoryCursor<C> {
    pub fn new(cursor: C, tz_policy: TimezonePolicy) -> Self {
        RowFactoryCursor { cursor, tz_policy }
    }

    pub fn tz_policy(&self) -> TimezonePolicy {
        self.tz_policy
    }

    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.cursor.description()
    }

    pub fn rowcount(&self) -> i64 {
        self.cursor.rowcount()
    }

    /// Fetches the next row, coerced
    pub fn fetchone(&mut self) -> Result<Option<Row>> {
        match self.cursor.fetch_raw() {
            Some(raw) => self.row_factory(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Fetches up to `size` rows
    pub fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(size);
        while rows.len() < size {
            match self.fetchone()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Fetches every remaining row
    pub fn fetchall(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone()? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub fn close(&mut self) {
        self.cursor.close();
    }

    fn row_factory(&self, row: Row) -> Result<Row> {
        coerce_row(self.cursor.description(), row, self.tz_policy)
    }

    fn native_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: NativeCursor> Iterator for RowFactoryCursor<C> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetchone().transpose()
    }
}

/// Error-translating wrapper around a `RowFactoryCursor`
#[derive(Debug)]
pub struct CursorWrapper<C> {
    cursor: RowFactoryCursor<C>,
    query: Option<String>,
}

impl<C: NativeCursor> CursorWrapper<C> {
    pub fn new(cursor: RowFactoryCursor<C>) -> Self {
        CursorWrapper { cursor, query: None }
    }

    /// Text of the most recently executed statement
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn execute(&mut self, query: &str, args: &[Value]) -> Result<()> {
        self.query = Some(query.to_string());
        debug!(query, params = args.len(), "execute");
        self.cursor
            .native_mut()
            .execute(query, args)
            .map_err(AdapterError::translate)
    }

    pub fn executemany(&mut self, query: &str, seq_of_args: &[Vec<Value>]) -> Result<()> {
        self.query = Some(query.to_string());
        debug!(query, batches = seq_of_args.len(), "executemany");
        self.cursor
            .native_mut()
            .executemany(query, seq_of_args)
            .map_err(AdapterError::translate)
    }

    pub fn into_inner(self) -> RowFactoryCursor<C> {
        self.cursor
    }
}

impl<C> Deref for CursorWrapper<C> {
    type Target = RowFactoryCursor<C>;

    fn deref(&self) -> &Self::Target {
        &self.cursor
    }
}

impl<C> DerefMut for CursorWrapper<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cursor
    }
}

impl<C: NativeCursor> Iterator for CursorWrapper<C> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }
}
