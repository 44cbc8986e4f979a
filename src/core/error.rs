//! Error taxonomy for the equipage store

use miette::Diagnostic;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T, E = EquipageError> = std::result::Result<T, E>;

/// Errors surfaced by equipage operations
///
/// Validation failures are reported before (or instead of) any committed
/// write. Nothing here is retried automatically.
#[derive(Debug, Error, Diagnostic)]
pub enum EquipageError {
    #[error("A system named '{name}' already exists")]
    #[diagnostic(
        code(lari::store::duplicate_name),
        help("system names are unique across the equipage; pick another name")
    )]
    DuplicateName { name: String },

    #[error("Component {id} already exists")]
    #[diagnostic(
        code(lari::store::duplicate_component),
        help("use `lari component show` to see where it is attached")
    )]
    DuplicateComponent { id: i64 },

    #[error("System '{name}' not found")]
    #[diagnostic(code(lari::store::system_not_found), help("list systems with `lari fleet`"))]
    SystemNotFound { name: String },

    #[error("Component {id} not found in {scope}")]
    #[diagnostic(code(lari::store::component_not_found))]
    ComponentNotFound { id: i64, scope: String },

    #[error("The Inventory system cannot be removed")]
    #[diagnostic(code(lari::store::inventory_protected))]
    InventoryProtected,

    #[error("Invalid component {id}: {message}")]
    #[diagnostic(code(lari::store::invalid_component))]
    InvalidComponent { id: i64, message: String },

    #[error("Equipage store unavailable at {location}: {message}")]
    #[diagnostic(
        code(lari::store::unavailable),
        help("check the database path (`lari config show`) and file permissions")
    )]
    StoreUnavailable { location: String, message: String },

    #[error("Schema integrity error: {message}")]
    #[diagnostic(code(lari::store::schema_integrity))]
    SchemaIntegrity { message: String },

    #[error("Legacy equipage file error: {message}")]
    #[diagnostic(code(lari::legacy::format))]
    Legacy { message: String },

    #[error("Database error: {0}")]
    #[diagnostic(code(lari::store::database))]
    Database(#[source] rusqlite::Error),
}

impl EquipageError {
    /// Component missing anywhere in the equipage
    pub(crate) fn component_not_found(id: i64) -> Self {
        EquipageError::ComponentNotFound {
            id,
            scope: "the equipage".to_string(),
        }
    }

    /// Component missing from one particular system
    pub(crate) fn component_not_on(id: i64, system: &str) -> Self {
        EquipageError::ComponentNotFound {
            id,
            scope: format!("system '{}'", system),
        }
    }

    pub(crate) fn unavailable(location: impl Into<String>, message: impl ToString) -> Self {
        EquipageError::StoreUnavailable {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Failure while opening a database file; a file SQLite cannot read at
    /// all is a foreign file, not an outage
    pub(crate) fn on_open(location: &str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::NotADatabase => {
                EquipageError::SchemaIntegrity {
                    message: format!("{} is not an equipage database: {}", location, err),
                }
            }
            err => EquipageError::unavailable(location, err),
        }
    }
}

impl From<rusqlite::Error> for EquipageError {
    fn from(err: rusqlite::Error) -> Self {
        let row_shape = matches!(
            err,
            rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::InvalidColumnIndex(_)
                | rusqlite::Error::InvalidColumnName(_)
                | rusqlite::Error::IntegralValueOutOfRange(..)
        );
        if row_shape {
            return EquipageError::SchemaIntegrity {
                message: format!("unexpected row shape: {}", err),
            };
        }

        if matches!(err, rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::NotADatabase)
        {
            return EquipageError::SchemaIntegrity {
                message: format!("not an equipage database: {}", err),
            };
        }

        let unavailable = matches!(
            err,
            rusqlite::Error::SqliteFailure(ref e, _) if matches!(
                e.code,
                ErrorCode::CannotOpen
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::ReadOnly
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::PermissionDenied
                    | ErrorCode::DiskFull
            )
        );
        if unavailable {
            return EquipageError::unavailable("database", &err);
        }

        EquipageError::Database(err)
    }
}

/// Primary key or unique constraint violation
pub(crate) fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        || has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

/// Foreign key constraint violation
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// CHECK constraint violation
pub(crate) fn is_check_violation(err: &rusqlite::Error) -> bool {
    has_extended_code(err, rusqlite::ffi::SQLITE_CONSTRAINT_CHECK)
}

fn has_extended_code(err: &rusqlite::Error, code: std::os::raw::c_int) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation && e.extended_code == code
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_duplicate_key_detection() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT UNIQUE);")
            .unwrap();
        conn.execute("INSERT INTO t (id, name) VALUES (1, 'a')", [])
            .unwrap();

        let pk = conn
            .execute("INSERT INTO t (id, name) VALUES (1, 'b')", [])
            .unwrap_err();
        assert!(is_duplicate_key(&pk));
        assert!(!is_foreign_key_violation(&pk));

        let unique = conn
            .execute("INSERT INTO t (id, name) VALUES (2, 'a')", [])
            .unwrap_err();
        assert!(is_duplicate_key(&unique));
    }

    #[test]
    fn test_conversion_failure_maps_to_schema_integrity() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .query_row("SELECT 'not a number'", [], |row| row.get::<_, i64>(0))
            .unwrap_err();

        assert!(matches!(
            EquipageError::from(err),
            EquipageError::SchemaIntegrity { .. }
        ));
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            EquipageError::component_not_on(7, "CONDOR").to_string(),
            "Component 7 not found in system 'CONDOR'"
        );
        assert_eq!(
            EquipageError::component_not_found(7).to_string(),
            "Component 7 not found in the equipage"
        );
    }
}
