/// Database Module
///
/// The adapter layer between an ORM-facing driver interface and a native
/// PostgreSQL client.
///
/// ## Architecture
///
/// - **Native seam** (`native.rs`): traits the native client implements
/// - **Row coercion** (`coercion.rs`): temporal text columns into chrono values
/// - **Cursors** (`cursor.rs`): coercing cursor and the error-translating wrapper
/// - **Capabilities** (`features.rs`): flags queried by the calling ORM
/// - **Connection management** (`connection.rs`): lazy connect, commit, close
/// - **PostgreSQL binding** (`pg.rs`): native client over the `postgres` crate
///
/// ## Error Handling
///
/// Native errors are re-typed into `AdapterError::Integrity` or
/// `AdapterError::Database` with the native error kept as the source.
pub mod coercion;
pub mod connection;
pub mod cursor;
pub mod features;
pub mod native;
pub mod pg;
pub mod version;

pub use coercion::{coerce_row, parse_temporal, utc_tzinfo_factory, TimezonePolicy};
pub use connection::{ConnectionCreated, Cursor, DatabaseWrapper, IsolationLevel, VENDOR};
pub use cursor::{CursorWrapper, RowFactoryCursor};
pub use features::DatabaseFeatures;
pub use native::{
    ColumnDescription, ConnectParams, NativeConnection, NativeCursor, NativeDriver, NativeError, NativeErrorKind,
    Row, TypeCategory, Value,
};
pub use pg::PgDriver;
