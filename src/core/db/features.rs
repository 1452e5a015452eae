/// Capability Descriptor
///
/// Flags telling the calling ORM which optional SQL features this backend
/// can use. Everything is fixed at declaration time except
/// `uses_autocommit`, which comes from the `autocommit` entry of the
/// connection options.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseFeatures {
    pub needs_datetime_string_cast: bool,
    pub can_return_id_from_insert: bool,
    pub requires_rollback_on_dirty_transaction: bool,
    pub has_real_datatype: bool,
    pub can_defer_constraint_checks: bool,
    pub has_select_for_update: bool,
    pub has_select_for_update_nowait: bool,
    pub has_bulk_insert: bool,
    pub supports_tablespaces: bool,
    pub can_distinct_on_fields: bool,
    pub uses_autocommit: bool,
}

impl Default for DatabaseFeatures {
    fn default() -> Self {
        DatabaseFeatures {
            needs_datetime_string_cast: false,
            can_return_id_from_insert: true,
            requires_rollback_on_dirty_transaction: true,
            has_real_datatype: true,
            can_defer_constraint_checks: true,
            has_select_for_update: true,
            has_select_for_update_nowait: true,
            has_bulk_insert: true,
            supports_tablespaces: true,
            can_distinct_on_fields: true,
            uses_autocommit: false,
        }
    }
}

impl DatabaseFeatures {
    /// Declared flags with the autocommit flag taken from configuration
    pub fn with_autocommit(uses_autocommit: bool) -> Self {
        DatabaseFeatures {
            uses_autocommit,
            ..Default::default()
        }
    }

    /// Looks a capability up by name; `None` for names this backend does not declare.
    pub fn get(&self, name: &str) -> Option<bool> {
        let value = match name {
            "needs_datetime_string_cast" => self.needs_datetime_string_cast,
            "can_return_id_from_insert" => self.can_return_id_from_insert,
            "requires_rollback_on_dirty_transaction" => self.requires_rollback_on_dirty_transaction,
            "has_real_datatype" => self.has_real_datatype,
            "can_defer_constraint_checks" => self.can_defer_constraint_checks,
            "has_select_for_update" => self.has_select_for_update,
            "has_select_for_update_nowait" => self.has_select_for_update_nowait,
            "has_bulk_insert" => self.has_bulk_insert,
            "supports_tablespaces" => self.supports_tablespaces,
            "can_distinct_on_fields" => self.can_distinct_on_fields,
            "uses_autocommit" => self.uses_autocommit,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_flags() {
        let features = DatabaseFeatures::default();
        assert!(!features.needs_datetime_string_cast);
        assert!(features.can_return_id_from_insert);
        assert!(features.has_select_for_update_nowait);
        assert!(features.can_distinct_on_fields);
        assert!(!features.uses_autocommit);
    }

    #[test]
    fn test_lookup_by_name() {
        let features = DatabaseFeatures::with_autocommit(true);
        assert_eq!(features.get("uses_autocommit"), Some(true));
        assert_eq!(features.get("has_bulk_insert"), Some(true));
        assert_eq!(features.get("needs_datetime_string_cast"), Some(false));
        assert_eq!(features.get("supports_json_field"), None);
    }
}
