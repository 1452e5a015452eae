/// # Test Utilities Module
///
/// A scripted, in-memory implementation of the native client traits so the
/// adapter can be exercised without a PostgreSQL server.
///
/// - `ScriptedDriver` records every connect call and hands out connections
///   sharing one script
/// - Responses are registered per statement text with `respond`; anything
///   unregistered succeeds with no result set
/// - `SELECT version()` answers with a configurable banner
/// - Commit, close and connect failures can be queued one at a time

use crate::core::db::native::{
    ColumnDescription, ConnectParams, NativeConnection, NativeCursor, NativeDriver, NativeError, Row,
    TypeCategory, Value,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_BANNER: &str = "PostgreSQL 9.1.3 on x86_64-unknown-linux-gnu, compiled by gcc 4.6.3, 64-bit";

/// Outcome of one scripted statement
#[derive(Debug, Clone, Default)]
pub struct ScriptedResult {
    pub description: Option<Vec<ColumnDescription>>,
    pub rows: Vec<Row>,
    pub error: Option<NativeError>,
}

impl ScriptedResult {
    /// Success without a result set
    pub fn empty() -> Self {
        ScriptedResult::default()
    }

    pub fn rows(description: Vec<ColumnDescription>, rows: Vec<Row>) -> Self {
        ScriptedResult {
            description: Some(description),
            rows,
            error: None,
        }
    }

    pub fn failing(error: NativeError) -> Self {
        ScriptedResult {
            error: Some(error),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    banner: String,
    responses: HashMap<String, ScriptedResult>,
    connects: Vec<(Option<String>, ConnectParams)>,
    executed: Vec<String>,
    commits: usize,
    rollbacks: usize,
    closes: usize,
    connect_error: Option<NativeError>,
    commit_error: Option<NativeError>,
    close_error: Option<NativeError>,
}

impl ScriptState {
    fn result_for(&mut self, query: &str) -> ScriptedResult {
        self.executed.push(query.to_string());
        if let Some(result) = self.responses.get(query) {
            return result.clone();
        }
        if query == "SELECT version()" {
            return ScriptedResult::rows(
                vec![ColumnDescription::new("version", "text", TypeCategory::String)],
                vec![vec![Value::Text(self.banner.clone())]],
            );
        }
        ScriptedResult::empty()
    }
}

type Shared = Arc<Mutex<ScriptState>>;

fn lock(state: &Shared) -> MutexGuard<'_, ScriptState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted native driver; clones share the same script and counters
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    state: Shared,
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        ScriptedDriver::new()
    }
}

impl ScriptedDriver {
    pub fn new() -> Self {
        ScriptedDriver {
            state: Arc::new(Mutex::new(ScriptState {
                banner: DEFAULT_BANNER.to_string(),
                ..Default::default()
            })),
        }
    }

    /// Registers the outcome for an exact statement text
    pub fn respond(&self, query: &str, result: ScriptedResult) {
        lock(&self.state).responses.insert(query.to_string(), result);
    }

    pub fn set_version_banner(&self, banner: &str) {
        lock(&self.state).banner = banner.to_string();
    }

    pub fn fail_connect(&self, error: NativeError) {
        lock(&self.state).connect_error = Some(error);
    }

    pub fn fail_commit(&self, error: NativeError) {
        lock(&self.state).commit_error = Some(error);
    }

    pub fn fail_close(&self, error: NativeError) {
        lock(&self.state).close_error = Some(error);
    }

    pub fn connect_count(&self) -> usize {
        lock(&self.state).connects.len()
    }

    /// DSN and parameters of every connect call, in order
    pub fn connect_calls(&self) -> Vec<(Option<String>, ConnectParams)> {
        lock(&self.state).connects.clone()
    }

    /// Every statement executed through any cursor, in order
    pub fn executed(&self) -> Vec<String> {
        lock(&self.state).executed.clone()
    }

    pub fn executed_count(&self, query: &str) -> usize {
        lock(&self.state).executed.iter().filter(|q| q.as_str() == query).count()
    }

    pub fn commit_count(&self) -> usize {
        lock(&self.state).commits
    }

    pub fn rollback_count(&self) -> usize {
        lock(&self.state).rollbacks
    }

    pub fn close_count(&self) -> usize {
        lock(&self.state).closes
    }
}

impl NativeDriver for ScriptedDriver {
    type Connection = ScriptedConnection;

    fn connect(&self, dsn: Option<&str>, params: &ConnectParams) -> Result<ScriptedConnection, NativeError> {
        let mut state = lock(&self.state);
        state.connects.push((dsn.map(str::to_string), params.clone()));
        if let Some(error) = state.connect_error.take() {
            return Err(error);
        }
        Ok(ScriptedConnection {
            state: Arc::clone(&self.state),
        })
    }
}

/// Connection handed out by `ScriptedDriver`
#[derive(Debug)]
pub struct ScriptedConnection {
    state: Shared,
}

impl NativeConnection for ScriptedConnection {
    type Cursor = ScriptedCursor;

    fn cursor(&self) -> ScriptedCursor {
        ScriptedCursor {
            source: CursorSource::Script(Arc::clone(&self.state)),
            description: None,
            pending: VecDeque::new(),
            rowcount: -1,
        }
    }

    fn commit(&mut self) -> Result<(), NativeError> {
        let mut state = lock(&self.state);
        state.commits += 1;
        state.commit_error.take().map_or(Ok(()), Err)
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        lock(&self.state).rollbacks += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), NativeError> {
        let mut state = lock(&self.state);
        state.closes += 1;
        state.close_error.take().map_or(Ok(()), Err)
    }
}

#[derive(Debug)]
enum CursorSource {
    Script(Shared),
    Fixed(ScriptedResult),
}

/// Cursor replaying scripted results
#[derive(Debug)]
pub struct ScriptedCursor {
    source: CursorSource,
    description: Option<Vec<ColumnDescription>>,
    pending: VecDeque<Row>,
    rowcount: i64,
}

impl ScriptedCursor {
    /// Standalone cursor answering every statement with `result`
    pub fn with_result(result: ScriptedResult) -> Self {
        ScriptedCursor {
            source: CursorSource::Fixed(result),
            description: None,
            pending: VecDeque::new(),
            rowcount: -1,
        }
    }

    fn run(&mut self, query: &str) -> Result<i64, NativeError> {
        let result = match &self.source {
            CursorSource::Script(state) => lock(state).result_for(query),
            CursorSource::Fixed(result) => result.clone(),
        };
        if let Some(error) = result.error {
            return Err(error);
        }
        let count = result.rows.len() as i64;
        self.description = result.description;
        self.pending = result.rows.into();
        Ok(count)
    }
}

impl NativeCursor for ScriptedCursor {
    fn execute(&mut self, query: &str, _args: &[Value]) -> Result<(), NativeError> {
        self.rowcount = self.run(query)?;
        Ok(())
    }

    fn executemany(&mut self, query: &str, seq_of_args: &[Vec<Value>]) -> Result<(), NativeError> {
        let mut total = 0;
        for _ in seq_of_args {
            total += self.run(query)?;
        }
        self.description = None;
        self.pending.clear();
        self.rowcount = total;
        Ok(())
    }

    fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref()
    }

    fn rowcount(&self) -> i64 {
        self.rowcount
    }

    fn fetch_raw(&mut self) -> Option<Row> {
        self.pending.pop_front()
    }
}
