use sqlx::error::ErrorKind;
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

/// Имя условия для нарушения уникальности.
pub const UNIQUE_VIOLATION: &str = "unique_violation";
/// Имя условия для нарушения NOT NULL.
pub const NOT_NULL_VIOLATION: &str = "not_null_violation";
/// Имя условия для нарушения check-ограничения.
pub const CHECK_VIOLATION: &str = "check_violation";

/// Структурированная ошибка драйвера хранилища.
///
/// Конвертер не зависит от конкретного драйвера: достаточно, чтобы адаптер
/// отдавал имя условия (`unique_violation`, `not_null_violation`, ...) и
/// текстовые поля, из которых собирается сообщение.
pub trait StorageError {
    /// Имя условия в терминах PostgreSQL, например `unique_violation`.
    fn code_name(&self) -> Option<&str>;
    /// Подробности от драйвера.
    fn detail(&self) -> Option<&str>;
    /// Колонка, к которой относится ошибка.
    fn column(&self) -> Option<&str>;
    /// Имя нарушенного ограничения.
    fn constraint(&self) -> Option<&str>;
}

/// Имя условия PostgreSQL для кода SQLSTATE.
pub fn condition_name(sqlstate: &str) -> Option<&'static str> {
    let name = match sqlstate {
        "22001" => "string_data_right_truncation",
        "22P02" => "invalid_text_representation",
        "23000" => "integrity_constraint_violation",
        "23001" => "restrict_violation",
        "23502" => NOT_NULL_VIOLATION,
        "23503" => "foreign_key_violation",
        "23505" => UNIQUE_VIOLATION,
        "23514" => CHECK_VIOLATION,
        "23P01" => "exclusion_violation",
        "40001" => "serialization_failure",
        "40P01" => "deadlock_detected",
        "42703" => "undefined_column",
        "42P01" => "undefined_table",
        _ => return None,
    };
    Some(name)
}

/// Ошибка драйвера без привязки к конкретной библиотеке.
///
/// Подходит для драйверов без собственного адаптера и для синтетических ошибок.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{code_name}: {message}")]
pub struct DriverError {
    code_name: String,
    message: String,
    detail: Option<String>,
    column: Option<String>,
    constraint: Option<String>,
}

impl DriverError {
    /// Ошибка с именем условия и текстом драйвера.
    pub fn new(code_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code_name: code_name.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Ошибка по коду SQLSTATE. Неизвестный код сохраняется как есть и
    /// конвертером не распознаётся.
    pub fn from_sqlstate(sqlstate: &str, message: impl Into<String>) -> Self {
        let code_name = condition_name(sqlstate).unwrap_or(sqlstate);
        Self::new(code_name, message)
    }

    /// Подробности.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Колонка.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Ограничение.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Текст драйвера.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl StorageError for DriverError {
    fn code_name(&self) -> Option<&str> {
        Some(self.code_name.as_str()).filter(|name| !name.is_empty())
    }

    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

impl StorageError for PgDatabaseError {
    fn code_name(&self) -> Option<&str> {
        condition_name(PgDatabaseError::code(self))
    }

    fn detail(&self) -> Option<&str> {
        PgDatabaseError::detail(self)
    }

    fn column(&self) -> Option<&str> {
        PgDatabaseError::column(self)
    }

    fn constraint(&self) -> Option<&str> {
        PgDatabaseError::constraint(self)
    }
}

// Для драйверов кроме Postgres доступны только SQLSTATE, ErrorKind и текст.
impl StorageError for sqlx::Error {
    fn code_name(&self) -> Option<&str> {
        let sqlx::Error::Database(db_err) = self else {
            return None;
        };
        if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
            return StorageError::code_name(pg_err);
        }
        if let Some(name) = db_err.code().as_deref().and_then(condition_name) {
            return Some(name);
        }
        match db_err.kind() {
            ErrorKind::UniqueViolation => Some(UNIQUE_VIOLATION),
            ErrorKind::NotNullViolation => Some(NOT_NULL_VIOLATION),
            ErrorKind::CheckViolation => Some(CHECK_VIOLATION),
            ErrorKind::ForeignKeyViolation => Some("foreign_key_violation"),
            _ => None,
        }
    }

    fn detail(&self) -> Option<&str> {
        let sqlx::Error::Database(db_err) = self else {
            return None;
        };
        match db_err.try_downcast_ref::<PgDatabaseError>() {
            Some(pg_err) => PgDatabaseError::detail(pg_err),
            None => Some(db_err.message()),
        }
    }

    fn column(&self) -> Option<&str> {
        let sqlx::Error::Database(db_err) = self else {
            return None;
        };
        db_err
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(PgDatabaseError::column)
    }

    fn constraint(&self) -> Option<&str> {
        let sqlx::Error::Database(db_err) = self else {
            return None;
        };
        db_err.constraint()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::{DriverError, StorageError, condition_name};
    use crate::code::Code;
    use crate::convert::convert_sqlx;
    use crate::err::Err;

    #[derive(Debug)]
    struct FakeDbError {
        code: Option<&'static str>,
        kind: ErrorKind,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("fake database error")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            match &self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn sqlx_error(
        code: Option<&'static str>,
        kind: ErrorKind,
        constraint: Option<&'static str>,
    ) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError {
            code,
            kind,
            constraint,
        }))
    }

    #[test]
    fn condition_name_covers_integrity_class() {
        assert_eq!(condition_name("23505"), Some("unique_violation"));
        assert_eq!(condition_name("23502"), Some("not_null_violation"));
        assert_eq!(condition_name("23514"), Some("check_violation"));
        assert_eq!(condition_name("99999"), None);
    }

    #[test]
    fn driver_error_from_sqlstate_resolves_name() {
        let err = DriverError::from_sqlstate("23514", "new row violates check constraint")
            .with_constraint("age_positive");

        assert_eq!(err.code_name(), Some("check_violation"));
        assert_eq!(err.constraint(), Some("age_positive"));
        assert_eq!(err.detail(), None);
        assert_eq!(
            err.to_string(),
            "check_violation: new row violates check constraint"
        );
    }

    #[test]
    fn driver_error_keeps_unknown_sqlstate() {
        let err = DriverError::from_sqlstate("XX000", "internal");
        assert_eq!(err.code_name(), Some("XX000"));
    }

    #[test]
    fn sqlx_error_uses_sqlstate_first() {
        let err = sqlx_error(Some("23505"), ErrorKind::Other, Some("users_email_key"));

        assert_eq!(StorageError::code_name(&err), Some("unique_violation"));
        assert_eq!(StorageError::constraint(&err), Some("users_email_key"));
        assert_eq!(StorageError::detail(&err), Some("fake database error"));
        assert_eq!(StorageError::column(&err), None);
    }

    #[test]
    fn sqlx_error_falls_back_to_kind() {
        let err = sqlx_error(None, ErrorKind::NotNullViolation, None);
        assert_eq!(StorageError::code_name(&err), Some("not_null_violation"));

        let err = sqlx_error(None, ErrorKind::Other, None);
        assert_eq!(StorageError::code_name(&err), None);
    }

    #[test]
    fn non_database_sqlx_error_is_not_a_storage_error() {
        let err = sqlx::Error::RowNotFound;
        assert_eq!(StorageError::code_name(&err), None);
        assert_eq!(StorageError::detail(&err), None);
    }

    #[test]
    fn convert_sqlx_maps_unique_sqlstate() {
        let converted = convert_sqlx(sqlx_error(Some("23505"), ErrorKind::Other, None));

        let err = converted
            .downcast_ref::<Err>()
            .expect("unique violation must be converted");
        assert_eq!(err.code(), Code::NOT_UNIQUE);
        assert_eq!(
            converted.to_string(),
            "fake database error: Conflict: error #1002: \n\
             unique constraint violation: Conflict: error #1002"
        );
    }

    #[test]
    fn convert_sqlx_maps_check_kind_with_constraint() {
        let converted = convert_sqlx(sqlx_error(
            None,
            ErrorKind::CheckViolation,
            Some("age_positive"),
        ));

        let err = converted
            .downcast_ref::<Err>()
            .expect("check violation must be converted");
        assert_eq!(err.code(), Code::CHECK_CONSTRAINT);
        assert_eq!(err.msg(), Some("age_positive constraint failed"));
    }
}
