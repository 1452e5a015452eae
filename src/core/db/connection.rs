/// Connection Management Module
///
/// `DatabaseWrapper` owns at most one physical connection. It maps the
/// configured settings onto native connect parameters, opens the connection
/// lazily on the first cursor request, caches the server version, and
/// translates native failures on commit, rollback and close.

use crate::config::{Config, DatabaseSettings};
use crate::core::db::coercion::TimezonePolicy;
use crate::core::db::cursor::{CursorWrapper, RowFactoryCursor};
use crate::core::db::features::DatabaseFeatures;
use crate::core::db::native::{ConnectParams, NativeConnection, NativeDriver};
use crate::core::db::version;
use crate::core::{AdapterError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, ThreadId};
use tracing::{debug, info, warn};

pub const VENDOR: &str = "postgresql";

/// Transaction isolation levels understood by PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    Autocommit,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IsolationLevel::Autocommit => "AUTOCOMMIT",
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        };
        f.write_str(name)
    }
}

/// Payload of the connection-created notification
pub struct ConnectionCreated<'a, C> {
    /// Type name of the manager that opened the connection
    pub sender: &'static str,
    pub alias: &'a str,
    pub connection: &'a C,
    pub server_version: u32,
}

type Listener<C> = Box<dyn Fn(&ConnectionCreated<'_, C>) + Send + Sync>;

/// Cursor type handed out by a `DatabaseWrapper` over driver `D`
pub type Cursor<D> = CursorWrapper<<<D as NativeDriver>::Connection as NativeConnection>::Cursor>;

/// Connection manager for one database alias
pub struct DatabaseWrapper<D: NativeDriver> {
    driver: D,
    alias: String,
    settings: DatabaseSettings,
    tz_policy: TimezonePolicy,
    features: DatabaseFeatures,
    /// Active physical connection (None until first use or after close)
    connection: Option<D::Connection>,
    pg_version: Option<u32>,
    isolation_level: IsolationLevel,
    thread_ident: ThreadId,
    allow_thread_sharing: bool,
    listeners: Vec<Listener<D::Connection>>,
}

impl<D: NativeDriver> fmt::Debug for DatabaseWrapper<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseWrapper")
            .field("alias", &self.alias)
            .field("connected", &self.connection.is_some())
            .field("pg_version", &self.pg_version)
            .field("features", &self.features)
            .finish()
    }
}

impl<D: NativeDriver> DatabaseWrapper<D> {
    /// Creates a manager; no connection is opened until a cursor is requested.
    ///
    /// The `autocommit` option is removed from `settings.options` here and
    /// recorded on the capability descriptor instead.
    pub fn new(driver: D, alias: impl Into<String>, mut settings: DatabaseSettings, use_tz: bool) -> Self {
        let uses_autocommit = settings
            .options
            .remove("autocommit")
            .map(|value| option_flag("autocommit", &value))
            .unwrap_or(false);

        let mut wrapper = DatabaseWrapper {
            driver,
            alias: alias.into(),
            settings,
            tz_policy: TimezonePolicy::from_use_tz(use_tz),
            features: DatabaseFeatures::with_autocommit(uses_autocommit),
            connection: None,
            pg_version: None,
            isolation_level: IsolationLevel::ReadCommitted,
            thread_ident: thread::current().id(),
            allow_thread_sharing: false,
            listeners: Vec::new(),
        };
        wrapper.set_isolation_level(IsolationLevel::ReadCommitted);
        wrapper
    }

    /// Creates a manager for `alias` from loaded settings.
    pub fn from_config(driver: D, config: &Config, alias: &str) -> Result<Self> {
        let settings = config.database(alias)?.clone();
        Ok(DatabaseWrapper::new(driver, alias, settings, config.use_tz))
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn vendor(&self) -> &'static str {
        VENDOR
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    pub fn features(&self) -> &DatabaseFeatures {
        &self.features
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn allow_thread_sharing(&mut self, allow: bool) {
        self.allow_thread_sharing = allow;
    }

    /// Registers a listener for the connection-created notification.
    pub fn on_connection_created<F>(&mut self, listener: F)
    where
        F: Fn(&ConnectionCreated<'_, D::Connection>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Builds the DSN placeholder and discrete connect parameters.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Configuration` if `NAME` is empty or `PORT` is not numeric.
    pub fn connection_params(&self) -> Result<(Option<String>, ConnectParams)> {
        let settings = &self.settings;
        if settings.name.is_empty() {
            return Err(AdapterError::Configuration(
                "You need to specify NAME in your database settings".to_string(),
            ));
        }

        let dsn = if settings.options.is_empty() {
            None
        } else {
            Some(format!("::::{}:", format_options(&settings.options)))
        };

        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
        let mut params = ConnectParams {
            database: settings.name.clone(),
            user: non_empty(&settings.user),
            password: non_empty(&settings.password),
            host: non_empty(&settings.host),
        };

        if let Some(host) = params.host.as_mut() {
            let port = match &settings.port {
                Some(port) => port.resolve()?,
                None => None,
            };
            if let Some(port) = port.filter(|port| *port > 0) {
                host.push_str(&format!(":{}", port));
            }
        }

        Ok((dsn, params))
    }

    /// Returns a ready-to-use cursor, connecting first if needed.
    pub fn cursor(&mut self) -> Result<Cursor<D>> {
        let tz_policy = self.tz_policy;
        let connection = self.ensure_connection()?;
        Ok(CursorWrapper::new(RowFactoryCursor::new(connection.cursor(), tz_policy)))
    }

    /// Server version as `major * 10000 + minor * 100 + patch`, computed once per connection.
    pub fn pg_version(&mut self) -> Result<u32> {
        self.ensure_connection()?;
        if let Some(version) = self.pg_version {
            return Ok(version);
        }
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| AdapterError::Configuration("connection is not open".to_string()))?;
        let version = version::get_version(connection)?;
        self.pg_version = Some(version);
        Ok(version)
    }

    /// Commits the current transaction; a no-op without an open connection.
    pub fn commit(&mut self) -> Result<()> {
        match self.connection.as_mut() {
            Some(connection) => connection.commit().map_err(AdapterError::translate),
            None => Ok(()),
        }
    }

    /// Rolls the current transaction back; a no-op without an open connection.
    pub fn rollback(&mut self) -> Result<()> {
        match self.connection.as_mut() {
            Some(connection) => connection.rollback().map_err(AdapterError::translate),
            None => Ok(()),
        }
    }

    /// Closes the physical connection.
    ///
    /// The connection is dropped locally even when the native close fails, so
    /// a broken handle is never reused; the failure is logged and returned.
    pub fn close(&mut self) -> Result<()> {
        self.validate_thread_sharing()?;

        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };
        self.pg_version = None;

        match connection.close() {
            Ok(()) => {
                debug!(alias = %self.alias, "connection closed");
                Ok(())
            }
            Err(err) => {
                warn!(alias = %self.alias, error = %err, "native error while closing the connection");
                Err(AdapterError::translate(err))
            }
        }
    }

    /// Forces deferred constraints to be checked now, then restores deferred mode.
    ///
    /// Deferred mode is restored on every path; if the immediate check fails its
    /// error is returned after the restore was attempted.
    pub fn check_constraints(&mut self, table_names: Option<&[&str]>) -> Result<()> {
        debug!(alias = %self.alias, tables = ?table_names, "checking constraints");
        let mut cursor = self.cursor()?;
        let checked = cursor.execute("SET CONSTRAINTS ALL IMMEDIATE", &[]);
        let restored = cursor.execute("SET CONSTRAINTS ALL DEFERRED", &[]);
        checked.and(restored)
    }

    /// Fails if the calling thread is not allowed to use this connection.
    pub fn validate_thread_sharing(&self) -> Result<()> {
        let current = thread::current().id();
        if !self.allow_thread_sharing && current != self.thread_ident {
            return Err(AdapterError::ThreadSafety(format!(
                "Database objects created in a thread can only be used in that same thread. \
                 The object with alias '{}' was created in thread {:?} and this is thread {:?}.",
                self.alias, self.thread_ident, current
            )));
        }
        Ok(())
    }

    /// Hook for entering managed transactions; isolation stays READ COMMITTED.
    pub fn enter_transaction_management(&mut self, managed: bool) {
        debug!(alias = %self.alias, managed, level = %self.isolation_level, "enter transaction management");
    }

    /// Hook for leaving managed transactions; autocommit only follows configuration.
    pub fn leave_transaction_management(&mut self, managed: bool) {
        debug!(alias = %self.alias, managed, level = %self.isolation_level, "leave transaction management");
    }

    /// Isolation level changes are not applied; the session stays READ COMMITTED.
    pub fn set_isolation_level(&mut self, level: IsolationLevel) {
        if level != self.isolation_level {
            debug!(alias = %self.alias, requested = %level, current = %self.isolation_level, "isolation level change ignored");
        }
    }

    fn ensure_connection(&mut self) -> Result<&mut D::Connection> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => self.open_connection()?,
        };
        Ok(self.connection.insert(connection))
    }

    fn open_connection(&mut self) -> Result<D::Connection> {
        let (dsn, params) = self.connection_params()?;
        debug!(alias = %self.alias, database = %params.database, host = ?params.host, "opening connection");

        let mut connection = self
            .driver
            .connect(dsn.as_deref(), &params)
            .map_err(AdapterError::translate)?;

        let server_version = match version::get_version(&connection) {
            Ok(version) => version,
            Err(err) => {
                if let Err(close_err) = connection.close() {
                    warn!(alias = %self.alias, error = %close_err, "failed to close connection after version probe");
                }
                return Err(err);
            }
        };
        self.pg_version = Some(server_version);

        info!(alias = %self.alias, server_version, "connection created");
        let event = ConnectionCreated {
            sender: std::any::type_name::<Self>(),
            alias: &self.alias,
            connection: &connection,
            server_version,
        };
        for listener in &self.listeners {
            listener(&event);
        }

        Ok(connection)
    }
}

/// Reads a boolean-like option: booleans, integers and the usual on/off words.
/// Anything else is logged and read as false.
fn option_flag(key: &str, value: &toml::Value) -> bool {
    match value {
        toml::Value::Boolean(flag) => *flag,
        toml::Value::Integer(number) => *number != 0,
        toml::Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => true,
            "false" | "f" | "no" | "n" | "off" | "0" | "" => false,
            _ => {
                warn!(option = key, value = %text, "unrecognized boolean option, reading it as false");
                false
            }
        },
        other => {
            warn!(option = key, value = %other, "unrecognized boolean option, reading it as false");
            false
        }
    }
}

/// Renders the remaining options as `key=value` pairs separated by spaces.
fn format_options(options: &BTreeMap<String, toml::Value>) -> String {
    options
        .iter()
        .map(|(key, value)| match value {
            toml::Value::String(text) => format!("{}={}", key, text),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
