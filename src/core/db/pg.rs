/// PostgreSQL Native Binding
///
/// Implements the native client traits over the synchronous `postgres`
/// crate. It mirrors the behaviour the adapter expects from a classic
/// DB-API style client:
/// - parameters use `%s` placeholders, rewritten to `$n` and bound as typed
///   parameters
/// - a transaction is opened implicitly by the first statement and ended by
///   `commit`/`rollback`
/// - temporal columns are handed back as ISO text for the coercion layer
/// - SQLSTATE class 23 is reported as an integrity error
use crate::core::db::native::{
    ColumnDescription, ConnectParams, NativeConnection, NativeCursor, NativeDriver, NativeError, Row,
    TypeCategory, Value,
};
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{Format, FromSql, IsNull, ToSql, Type};
use postgres::{Client, Config, NoTls};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::error::Error;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// Native driver connecting through the `postgres` crate without TLS
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDriver;

impl NativeDriver for PgDriver {
    type Connection = PgConnection;

    fn connect(&self, dsn: Option<&str>, params: &ConnectParams) -> Result<PgConnection, NativeError> {
        let mut config = Config::new();
        config.dbname(params.database.as_str());

        let user = params
            .user
            .clone()
            .or_else(|| std::env::var("PGUSER").ok())
            .or_else(|| std::env::var("USER").ok());
        if let Some(user) = user {
            config.user(user.as_str());
        }
        if let Some(password) = &params.password {
            config.password(password.as_str());
        }
        match &params.host {
            Some(host) => {
                let (host, port) = split_host_port(host);
                config.host(host);
                if let Some(port) = port {
                    config.port(port);
                }
            }
            None => {
                config.host("localhost");
            }
        }
        if let Some(options) = dsn.and_then(dsn_options) {
            config.options(options.as_str());
        }

        debug!(database = %params.database, host = ?params.host, "connecting to PostgreSQL");
        let client = config.connect(NoTls).map_err(native_error)?;

        Ok(PgConnection {
            session: Arc::new(Mutex::new(Session {
                client: Some(client),
                in_transaction: false,
            })),
        })
    }
}

struct Session {
    client: Option<Client>,
    in_transaction: bool,
}

type SharedSession = Arc<Mutex<Session>>;

fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Session>, NativeError> {
    session
        .lock()
        .map_err(|_| NativeError::database(["connection lock poisoned"]))
}

fn closed() -> NativeError {
    NativeError::database(["connection already closed"])
}

/// Physical PostgreSQL session shared by its cursors
pub struct PgConnection {
    session: SharedSession,
}

impl PgConnection {
    fn end_transaction(&mut self, statement: &str) -> Result<(), NativeError> {
        let mut guard = lock(&self.session)?;
        let session = &mut *guard;
        let client = session.client.as_mut().ok_or_else(closed)?;
        if session.in_transaction {
            session.in_transaction = false;
            client.batch_execute(statement).map_err(native_error)?;
        }
        Ok(())
    }
}

impl NativeConnection for PgConnection {
    type Cursor = PgCursor;

    fn cursor(&self) -> PgCursor {
        PgCursor {
            session: Arc::clone(&self.session),
            description: None,
            rows: VecDeque::new(),
            rowcount: -1,
        }
    }

    fn commit(&mut self) -> Result<(), NativeError> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        self.end_transaction("ROLLBACK")
    }

    fn close(&mut self) -> Result<(), NativeError> {
        let client = lock(&self.session)?.client.take();
        match client {
            Some(client) => client.close().map_err(native_error),
            None => Ok(()),
        }
    }
}

/// Cursor buffering the full result of its last statement
pub struct PgCursor {
    session: SharedSession,
    description: Option<Vec<ColumnDescription>>,
    rows: VecDeque<Row>,
    rowcount: i64,
}

impl PgCursor {
    fn run(&mut self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<(), NativeError> {
        let mut guard = lock(&self.session)?;
        let session = &mut *guard;
        let client = session.client.as_mut().ok_or_else(closed)?;

        if !session.in_transaction {
            client.batch_execute("BEGIN").map_err(native_error)?;
            session.in_transaction = true;
        }

        let statement = client.prepare(sql).map_err(native_error)?;
        if statement.columns().is_empty() {
            let affected = client.execute(&statement, params).map_err(native_error)?;
            self.description = None;
            self.rows.clear();
            self.rowcount = affected as i64;
            return Ok(());
        }

        let description: Vec<ColumnDescription> = statement
            .columns()
            .iter()
            .map(|column| ColumnDescription::new(column.name(), column.type_().name(), category_for(column.type_())))
            .collect();
        let rows = client.query(&statement, params).map_err(native_error)?;

        let mut converted = VecDeque::with_capacity(rows.len());
        for row in &rows {
            let mut values = Vec::with_capacity(row.len());
            for (index, column) in row.columns().iter().enumerate() {
                values.push(read_value(row, index, column.type_())?);
            }
            converted.push_back(values);
        }

        self.rowcount = converted.len() as i64;
        self.description = Some(description);
        self.rows = converted;
        Ok(())
    }
}

impl NativeCursor for PgCursor {
    fn execute(&mut self, query: &str, args: &[Value]) -> Result<(), NativeError> {
        let sql = positional_placeholders(query, args.len())?;
        let params: Vec<&(dyn ToSql + Sync)> = args.iter().map(|arg| arg as &(dyn ToSql + Sync)).collect();
        self.run(&sql, &params)
    }

    fn executemany(&mut self, query: &str, seq_of_args: &[Vec<Value>]) -> Result<(), NativeError> {
        let mut total = 0;
        for args in seq_of_args {
            self.execute(query, args)?;
            total += self.rowcount.max(0);
        }
        self.description = None;
        self.rows.clear();
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
        self.rows.pop_front()
    }

    fn close(&mut self) {
        self.description = None;
        self.rows.clear();
    }
}

/// Maps a driver error onto the native taxonomy
fn native_error(err: postgres::Error) -> NativeError {
    match err.as_db_error() {
        Some(db) => {
            let code = db.code().code();
            let args = [db.message().to_string(), code.to_string()];
            if code.starts_with("23") {
                NativeError::integrity(args)
            } else {
                NativeError::database(args)
            }
        }
        None => NativeError::database([err.to_string()]),
    }
}

fn category_for(ty: &Type) -> TypeCategory {
    if *ty == Type::TIMESTAMP || *ty == Type::TIMESTAMPTZ {
        TypeCategory::Timestamp
    } else if *ty == Type::DATE {
        TypeCategory::Date
    } else if *ty == Type::TIME || *ty == Type::TIMETZ {
        TypeCategory::Time
    } else if *ty == Type::BOOL {
        TypeCategory::Bool
    } else if [Type::INT2, Type::INT4, Type::INT8, Type::OID, Type::FLOAT4, Type::FLOAT8, Type::NUMERIC].contains(ty) {
        TypeCategory::Number
    } else if <String as FromSql>::accepts(ty) {
        TypeCategory::String
    } else if *ty == Type::BYTEA {
        TypeCategory::Binary
    } else {
        TypeCategory::Other
    }
}

fn read_value(row: &postgres::Row, index: usize, ty: &Type) -> Result<Value, NativeError> {
    fn get<'a, T: FromSql<'a>>(row: &'a postgres::Row, index: usize) -> Result<Option<T>, NativeError> {
        row.try_get::<_, Option<T>>(index)
            .map_err(|e| NativeError::database([e.to_string()]))
    }

    let value: Value = if *ty == Type::BOOL {
        get::<bool>(row, index)?.into()
    } else if *ty == Type::INT2 {
        get::<i16>(row, index)?.map(|v| Value::Int(v.into())).unwrap_or(Value::Null)
    } else if *ty == Type::INT4 {
        get::<i32>(row, index)?.into()
    } else if *ty == Type::INT8 {
        get::<i64>(row, index)?.into()
    } else if *ty == Type::OID {
        get::<u32>(row, index)?.map(|v| Value::Int(v.into())).unwrap_or(Value::Null)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, index)?.map(|v| Value::Float(v.into())).unwrap_or(Value::Null)
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, index)?.into()
    } else if *ty == Type::NUMERIC {
        get::<NumericText>(row, index)?.map(|v| v.0).into()
    } else if *ty == Type::BYTEA {
        get::<Vec<u8>>(row, index)?.map(Value::Bytes).unwrap_or(Value::Null)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, index)?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            .into()
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, index)?
            .map(|v| v.format("%Y-%m-%d %H:%M:%S%.f+00").to_string())
            .into()
    } else if *ty == Type::DATE {
        get::<NaiveDate>(row, index)?.map(|v| v.format("%Y-%m-%d").to_string()).into()
    } else if *ty == Type::TIME {
        get::<NaiveTime>(row, index)?.map(|v| v.format("%H:%M:%S%.f").to_string()).into()
    } else if *ty == Type::TIMETZ {
        get::<TimeTzText>(row, index)?.map(|v| v.0).into()
    } else if *ty == Type::INTERVAL {
        get::<IntervalText>(row, index)?.map(|v| v.0).into()
    } else if *ty == Type::UUID {
        get::<Uuid>(row, index)?.map(|v| v.to_string()).into()
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get::<serde_json::Value>(row, index)?.map(|v| v.to_string()).into()
    } else if *ty == Type::INET {
        get::<IpAddr>(row, index)?.map(|v| v.to_string()).into()
    } else if <String as FromSql>::accepts(ty) {
        get::<String>(row, index)?.into()
    } else {
        debug!(type_name = ty.name(), "reading column of unknown type as raw value");
        get::<RawValue>(row, index)?.map(|v| v.0).unwrap_or(Value::Null)
    };
    Ok(value)
}

/// NUMERIC as its decimal text
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        // Decimal has no NaN; the wire sign word 0xC000 marks it
        if raw.get(4..6) == Some(&[0xC0u8, 0x00][..]) {
            return Ok(NumericText("NaN".to_string()));
        }
        Decimal::from_sql(ty, raw).map(|d| NumericText(d.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        <Decimal as FromSql>::accepts(ty)
    }
}

/// TIMETZ rendered as `HH:MM:SS[.f]+hh[:mm]`
struct TimeTzText(String);

impl<'a> FromSql<'a> for TimeTzText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() != 12 {
            return Err("invalid timetz value".into());
        }
        let micros = i64::from_be_bytes(raw[0..8].try_into()?);
        // stored as seconds west of UTC
        let zone = i32::from_be_bytes(raw[8..12].try_into()?);
        Ok(TimeTzText(format_timetz(time_from_micros(micros)?, -zone)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::TIMETZ
    }
}

fn time_from_micros(micros: i64) -> Result<NaiveTime, BoxError> {
    let secs = u32::try_from(micros.div_euclid(1_000_000))?;
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).ok_or_else(|| "time out of range".into())
}

fn format_timetz(time: NaiveTime, offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let abs = offset_seconds.abs();
    let (hours, minutes) = (abs / 3600, abs % 3600 / 60);
    if minutes == 0 {
        format!("{}{}{:02}", time.format("%H:%M:%S%.f"), sign, hours)
    } else {
        format!("{}{}{:02}:{:02}", time.format("%H:%M:%S%.f"), sign, hours, minutes)
    }
}

/// INTERVAL rendered the way the server's default style prints it
struct IntervalText(String);

impl<'a> FromSql<'a> for IntervalText {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() != 16 {
            return Err("invalid interval value".into());
        }
        let micros = i64::from_be_bytes(raw[0..8].try_into()?);
        let days = i32::from_be_bytes(raw[8..12].try_into()?);
        let months = i32::from_be_bytes(raw[12..16].try_into()?);
        Ok(IntervalText(format_interval(months, days, micros)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

fn format_interval(months: i32, days: i32, micros: i64) -> String {
    let mut parts = Vec::new();
    for (count, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
        if count != 0 {
            let plural = if count.abs() == 1 { "" } else { "s" };
            parts.push(format!("{} {}{}", count, unit, plural));
        }
    }
    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let abs = micros.unsigned_abs();
        let (secs, fraction) = (abs / 1_000_000, abs % 1_000_000);
        let mut clock = format!("{}{:02}:{:02}:{:02}", sign, secs / 3600, secs % 3600 / 60, secs % 60);
        if fraction != 0 {
            clock.push_str(format!(".{:06}", fraction).trim_end_matches('0'));
        }
        parts.push(clock);
    }
    parts.join(" ")
}

/// Any other type: its wire bytes as text when they are UTF-8
struct RawValue(Value);

impl<'a> FromSql<'a> for RawValue {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(RawValue(match std::str::from_utf8(raw) {
            Ok(text) => Value::from(text),
            Err(_) => Value::Bytes(raw.to_vec()),
        }))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Whether `value` can go out in the binary form of `ty`; anything else is
/// sent as text and parsed by the server's input function for `ty`.
fn binds_binary(value: &Value, ty: &Type) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) => *ty == Type::BOOL,
        Value::Int(v) => {
            *ty == Type::INT8
                || *ty == Type::FLOAT8
                || (*ty == Type::INT4 && i32::try_from(*v).is_ok())
                || (*ty == Type::INT2 && i16::try_from(*v).is_ok())
        }
        Value::Float(_) => *ty == Type::FLOAT8 || *ty == Type::FLOAT4,
        Value::Text(_) => <String as ToSql>::accepts(ty),
        Value::Bytes(_) => *ty == Type::BYTEA,
        Value::Timestamp(_) => *ty == Type::TIMESTAMP,
        Value::TimestampTz(_) => *ty == Type::TIMESTAMPTZ,
        Value::Date(_) => *ty == Type::DATE,
        Value::Time(_) => *ty == Type::TIME,
    }
}

/// Text form of a parameter value
fn text_form(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) if v.is_nan() => "NaN".to_string(),
        Value::Float(v) if v.is_infinite() => {
            let text = if *v > 0.0 { "Infinity" } else { "-Infinity" };
            text.to_string()
        }
        Value::Float(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Bytes(v) => {
            let hex: String = v.iter().map(|byte| format!("{:02x}", byte)).collect();
            format!("\\x{}", hex)
        }
        Value::Timestamp(v) => v.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        Value::TimestampTz(v) => v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),
        Value::Date(v) => v.format("%Y-%m-%d").to_string(),
        Value::Time(v) => v.format("%H:%M:%S%.f").to_string(),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if !binds_binary(self, ty) {
            out.put_slice(text_form(self).as_bytes());
            return Ok(IsNull::No);
        }
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) if *ty == Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
            Value::Int(v) if *ty == Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
            Value::Int(v) if *ty == Type::FLOAT8 => (*v as f64).to_sql(ty, out),
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) if *ty == Type::FLOAT4 => (*v as f32).to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.as_slice().to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampTz(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, ty: &Type) -> Format {
        if binds_binary(self, ty) {
            Format::Binary
        } else {
            Format::Text
        }
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        self.to_sql(ty, out)
    }
}

/// Splits "host:port" when the suffix is a valid port number.
fn split_host_port(host: &str) -> (&str, Option<u16>) {
    match host.rsplit_once(':') {
        Some((name, port)) if !name.is_empty() => match port.parse::<u16>() {
            Ok(port) => (name, Some(port)),
            Err(_) => (host, None),
        },
        _ => (host, None),
    }
}

/// Extracts the option field of a `host:database:user:password:opt:tty` DSN
/// and renders each `key=value` pair as a server run-time parameter.
fn dsn_options(dsn: &str) -> Option<String> {
    let options = dsn.splitn(6, ':').nth(4)?.trim();
    if options.is_empty() {
        return None;
    }
    Some(
        options
            .split_whitespace()
            .map(|pair| format!("-c {}", pair))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Rewrites `%s` placeholders to `$1..$n`; `%%` yields `%`.
///
/// Without arguments the query is sent untouched.
pub fn positional_placeholders(query: &str, arg_count: usize) -> Result<String, NativeError> {
    if arg_count == 0 {
        return Ok(query.to_string());
    }

    let mut out = String::with_capacity(query.len() + arg_count * 2);
    let mut position = 0;
    let mut chars = query.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => {
                position += 1;
                if position > arg_count {
                    return Err(NativeError::database(["not enough arguments for query"]));
                }
                out.push('$');
                out.push_str(&position.to_string());
            }
            Some('%') => out.push('%'),
            other => {
                return Err(NativeError::database([format!(
                    "unsupported placeholder '%{}'",
                    other.map(String::from).unwrap_or_default()
                )]))
            }
        }
    }

    if position < arg_count {
        return Err(NativeError::database(["not all arguments converted"]));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_placeholders() {
        let sql = positional_placeholders("INSERT INTO t VALUES (%s, %s, %s)", 3).unwrap();
        assert_eq!(sql, "INSERT INTO t VALUES ($1, $2, $3)");
    }

    #[test]
    fn test_placeholders_without_args_is_verbatim() {
        let sql = positional_placeholders("SELECT '100%' LIKE '1%'", 0).unwrap();
        assert_eq!(sql, "SELECT '100%' LIKE '1%'");

        let sql = positional_placeholders("SELECT %s LIKE 'a%%'", 1).unwrap();
        assert_eq!(sql, "SELECT $1 LIKE 'a%'");
    }

    #[test]
    fn test_placeholder_argument_mismatch() {
        assert!(positional_placeholders("SELECT %s, %s", 1).is_err());
        assert!(positional_placeholders("SELECT %s", 2).is_err());
        assert!(positional_placeholders("SELECT %d", 1).is_err());
    }

    #[test]
    fn test_value_binds_typed() {
        let mut out = BytesMut::new();
        assert!(matches!(Value::Int(7).to_sql(&Type::INT4, &mut out).unwrap(), IsNull::No));
        assert_eq!(&out[..], &7i32.to_be_bytes());
        assert!(matches!(Value::Int(7).encode_format(&Type::INT4), Format::Binary));

        let mut out = BytesMut::new();
        assert!(matches!(Value::Null.to_sql(&Type::UUID, &mut out).unwrap(), IsNull::Yes));
        assert!(out.is_empty());
    }

    #[test]
    fn test_value_falls_back_to_text_form() {
        let text = Value::from("O'Brien");
        let mut out = BytesMut::new();
        text.to_sql(&Type::TEXT, &mut out).unwrap();
        assert_eq!(&out[..], b"O'Brien");

        let id = Value::from("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11");
        assert!(matches!(id.encode_format(&Type::UUID), Format::Text));
        let mut out = BytesMut::new();
        id.to_sql(&Type::UUID, &mut out).unwrap();
        assert_eq!(&out[..], b"a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11");

        // Out of range for int2: the server reports the overflow
        assert!(matches!(Value::Int(70_000).encode_format(&Type::INT2), Format::Text));
        assert_eq!(text_form(&Value::Bytes(vec![0xde, 0xad])), "\\xdead");
        assert_eq!(text_form(&Value::Float(f64::NEG_INFINITY)), "-Infinity");
        let date = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(text_form(&Value::Date(date)), "2020-02-29");
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("db.internal:5433"), ("db.internal", Some(5433)));
        assert_eq!(split_host_port("db.internal"), ("db.internal", None));
        assert_eq!(split_host_port("/var/run/postgresql"), ("/var/run/postgresql", None));
    }

    #[test]
    fn test_dsn_options() {
        assert_eq!(dsn_options("::::"), None);
        assert_eq!(
            dsn_options("::::search_path=app statement_timeout=5000:").as_deref(),
            Some("-c search_path=app -c statement_timeout=5000")
        );
    }

    #[test]
    fn test_numeric_nan() {
        let raw = [0u8, 0, 0, 0, 0xC0, 0x00, 0, 0];
        assert_eq!(NumericText::from_sql(&Type::NUMERIC, &raw).unwrap().0, "NaN");
    }

    #[test]
    fn test_timetz_text() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(10i64 * 3600 * 1_000_000 + 500_000).to_be_bytes());
        raw.extend_from_slice(&(-19_800i32).to_be_bytes());
        let text = TimeTzText::from_sql(&Type::TIMETZ, &raw).unwrap().0;
        assert_eq!(text, "10:00:00.500+05:30");

        let utc = format_timetz(NaiveTime::from_hms_opt(23, 59, 0).unwrap(), 0);
        assert_eq!(utc, "23:59:00+00");
        assert!(TimeTzText::from_sql(&Type::TIMETZ, &raw[..8]).is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0, 1, 7_200_000_000), "1 day 02:00:00");
        assert_eq!(format_interval(14, 3, 0), "1 year 2 mons 3 days");
        assert_eq!(format_interval(0, 0, 0), "00:00:00");
        assert_eq!(format_interval(0, 0, -1_500_000), "-00:00:01.5");
    }

    #[test]
    fn test_category_for() {
        assert_eq!(category_for(&Type::TIMESTAMPTZ), TypeCategory::Timestamp);
        assert_eq!(category_for(&Type::DATE), TypeCategory::Date);
        assert_eq!(category_for(&Type::TIME), TypeCategory::Time);
        assert_eq!(category_for(&Type::TIMETZ), TypeCategory::Time);
        assert_eq!(category_for(&Type::NUMERIC), TypeCategory::Number);
        assert_eq!(category_for(&Type::VARCHAR), TypeCategory::String);
        assert_eq!(category_for(&Type::JSONB), TypeCategory::Other);
        assert_eq!(category_for(&Type::UUID), TypeCategory::Other);
    }

    #[test]
    fn test_raw_value_fallback() {
        assert_eq!(RawValue::from_sql(&Type::INTERVAL, b"happy").unwrap().0, Value::from("happy"));
        assert_eq!(
            RawValue::from_sql(&Type::INTERVAL, &[0xff, 0xfe]).unwrap().0,
            Value::Bytes(vec![0xff, 0xfe])
        );
    }
}
