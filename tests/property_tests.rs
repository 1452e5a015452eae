//! Property-based tests for the connection manager and row coercion
//!
//! These tests drive `DatabaseWrapper` against the scripted native driver,
//! ensuring that:
//! - Connect parameters are derived from settings consistently
//! - Configuration errors happen before any connect attempt
//! - Temporal coercion agrees with direct parsing

#[cfg(test)]
mod tests {
    use pgbackend::config::{DatabaseSettings, PortSetting};
    use pgbackend::core::db::{
        coerce_row, parse_temporal, ColumnDescription, TimezonePolicy, TypeCategory, Value,
    };
    use pgbackend::test_utils::ScriptedDriver;
    use pgbackend::{AdapterError, DatabaseWrapper};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn arb_word() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}".prop_map(|s: String| s)
    }

    fn arb_settings() -> impl Strategy<Value = DatabaseSettings> {
        (
            arb_word(),
            prop_oneof![Just(String::new()), arb_word()],
            prop_oneof![Just(String::new()), arb_word()],
            prop_oneof![Just(String::new()), arb_word()],
            prop_oneof![Just(None), (-5i64..70000).prop_map(|p| Some(PortSetting::Number(p)))],
        )
            .prop_map(|(name, user, password, host, port)| DatabaseSettings {
                name,
                user,
                password,
                host,
                port,
                options: BTreeMap::new(),
            })
    }

    fn arb_timestamp() -> impl Strategy<Value = String> {
        (1900i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000).prop_map(
            |(y, mo, d, h, mi, s, us)| format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}", y, mo, d, h, mi, s, us),
        )
    }

    proptest! {
        /// An empty NAME always fails before the driver is touched
        #[test]
        fn prop_empty_name_never_connects(mut settings in arb_settings()) {
            settings.name = String::new();
            let driver = ScriptedDriver::new();
            let mut wrapper = DatabaseWrapper::new(driver.clone(), "default", settings, false);

            let result = wrapper.cursor();
            prop_assert!(matches!(result, Err(AdapterError::Configuration(_))));
            prop_assert_eq!(driver.connect_count(), 0);
        }

        /// Host carries ":port" exactly when a host is set and the port is positive
        #[test]
        fn prop_host_port_formatting(settings in arb_settings()) {
            let expected_host = if settings.host.is_empty() {
                None
            } else {
                match settings.port {
                    Some(PortSetting::Number(port)) if port > 0 => Some(format!("{}:{}", settings.host, port)),
                    _ => Some(settings.host.clone()),
                }
            };
            let expected_user = (!settings.user.is_empty()).then(|| settings.user.clone());
            let name = settings.name.clone();

            let driver = ScriptedDriver::new();
            let mut wrapper = DatabaseWrapper::new(driver.clone(), "default", settings, false);
            wrapper.cursor().unwrap();

            let calls = driver.connect_calls();
            prop_assert_eq!(calls.len(), 1);
            let (dsn, params) = &calls[0];
            prop_assert_eq!(dsn, &None);
            prop_assert_eq!(&params.database, &name);
            prop_assert_eq!(&params.user, &expected_user);
            prop_assert_eq!(&params.host, &expected_host);
        }

        /// An options map holding only autocommit produces no DSN
        #[test]
        fn prop_autocommit_only_options(mut settings in arb_settings(), autocommit in any::<bool>()) {
            settings.options.insert("autocommit".to_string(), toml::Value::Boolean(autocommit));
            let driver = ScriptedDriver::new();
            let mut wrapper = DatabaseWrapper::new(driver.clone(), "default", settings, false);

            prop_assert_eq!(wrapper.features().uses_autocommit, autocommit);
            prop_assert_eq!(wrapper.features().get("uses_autocommit"), Some(autocommit));
            wrapper.cursor().unwrap();
            prop_assert_eq!(&driver.connect_calls()[0].0, &None);
        }

        /// Coercing a TIMESTAMP column equals parsing the string directly
        #[test]
        fn prop_timestamp_coercion_matches_parse(raw in arb_timestamp(), label in arb_word()) {
            let description = vec![
                ColumnDescription::new("label", "text", TypeCategory::String),
                ColumnDescription::new("created", "timestamp", TypeCategory::Timestamp),
            ];
            let row = vec![Value::Text(label.clone()), Value::Text(raw.clone())];

            let coerced = coerce_row(Some(&description), row, TimezonePolicy::Unset).unwrap();
            let direct = parse_temporal(TypeCategory::Timestamp, &raw, TimezonePolicy::Unset).unwrap();

            prop_assert_eq!(coerced.len(), 2);
            prop_assert_eq!(&coerced[0], &Value::Text(label));
            prop_assert_eq!(&coerced[1], &direct);
            prop_assert!(matches!(direct, Value::Timestamp(_)));
        }

        /// Rows without temporal columns come back unchanged
        #[test]
        fn prop_non_temporal_rows_unchanged(values in prop::collection::vec(any::<i64>(), 1..8)) {
            let description: Vec<ColumnDescription> = (0..values.len())
                .map(|i| ColumnDescription::new(format!("c{}", i), "int8", TypeCategory::Number))
                .collect();
            let row: Vec<Value> = values.into_iter().map(Value::Int).collect();

            let coerced = coerce_row(Some(&description), row.clone(), TimezonePolicy::Utc).unwrap();
            prop_assert_eq!(coerced, row);
        }
    }
}
