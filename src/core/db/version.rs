/// Server Version Module
///
/// Reads `SELECT version()` and turns the banner into a comparable integer:
/// "PostgreSQL 9.1.3 on x86_64..." becomes 90103.

use crate::core::db::native::{NativeConnection, NativeCursor, Value};
use crate::core::{AdapterError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+ (\d+)\.(\d+)(?:\.(\d+))?").expect("version pattern is valid"));

/// Parses a `version()` banner into `major * 10000 + minor * 100 + patch`.
pub fn parse_version(text: &str) -> Option<u32> {
    let caps = VERSION_RE.captures(text.trim())?;
    let major: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minor: u32 = caps.get(2)?.as_str().parse().ok()?;
    let patch: u32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(major * 10000 + minor * 100 + patch)
}

/// Queries the server version over `connection`.
pub fn get_version<C: NativeConnection>(connection: &C) -> Result<u32> {
    let mut cursor = connection.cursor();
    cursor
        .execute("SELECT version()", &[])
        .map_err(AdapterError::translate)?;
    let row = cursor.fetch_raw();
    cursor.close();

    let banner = match row.as_deref() {
        Some([Value::Text(banner), ..]) => banner.clone(),
        _ => {
            return Err(AdapterError::Configuration(
                "server returned no version banner".to_string(),
            ))
        }
    };

    parse_version(&banner).ok_or_else(|| {
        AdapterError::Configuration(format!("unable to determine PostgreSQL version from '{}'", banner))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("PostgreSQL 9.1.3 on x86_64-pc-linux-gnu"), Some(90103));
        assert_eq!(parse_version("PostgreSQL 8.4beta1"), Some(80400));
        assert_eq!(parse_version("EnterpriseDB 9.0.2.5 on i686"), Some(90002));
        assert_eq!(parse_version("PostgreSQL 16.2 (Debian 16.2-1.pgdg120+2)"), Some(160200));
        assert_eq!(parse_version("not a version"), None);
    }
}
