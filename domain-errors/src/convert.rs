use std::error::Error as StdError;

use sqlx::postgres::PgDatabaseError;
use tracing::{debug, trace};

use crate::chain::{chain, find};
use crate::code::Code;
use crate::err::{BoxError, Err, Options};
use crate::sentinel::Sentinel;
use crate::storage::{
    CHECK_VIOLATION, DriverError, NOT_NULL_VIOLATION, StorageError, UNIQUE_VIOLATION,
};

/// Переводит ошибку хранилища в доменную [`Err`].
///
/// - если в цепочке уже есть [`Err`], ошибка возвращается без изменений;
/// - если в цепочке есть распознанное нарушение ограничения, возвращается
///   новая [`Err`], оборачивающая соответствующий [`Sentinel`];
/// - иначе возвращается исходная ошибка.
pub fn convert(err: BoxError) -> BoxError {
    if find::<Err>(&*err).is_some() {
        trace!("error is already converted");
        return err;
    }

    let converted = chain(&*err).find_map(as_storage_error).and_then(classify);
    match converted {
        Some(converted) => {
            debug!(code = %converted.code(), cause = %err, "converted storage error");
            Box::new(converted)
        }
        None => {
            trace!(error = %err, "error is not a storage constraint violation");
            err
        }
    }
}

/// [`convert`] для необязательной ошибки: `None` остаётся `None`.
pub fn convert_opt(err: Option<BoxError>) -> Option<BoxError> {
    err.map(convert)
}

/// Вариант [`convert`] для репозиториев на `sqlx`.
pub fn convert_sqlx(err: sqlx::Error) -> BoxError {
    convert(Box::new(err))
}

/// Сопоставляет нарушение ограничения с доменной ошибкой.
///
/// Если драйвер не сообщил колонку, ограничение или подробности, сообщение не
/// задаётся и при рендеринге используется сообщение кода по умолчанию.
pub fn classify(err: &dyn StorageError) -> Option<Err> {
    let (code, msg, sentinel) = match err.code_name()? {
        UNIQUE_VIOLATION => (
            Code::NOT_UNIQUE,
            non_empty(err.detail()).map(str::to_string),
            Sentinel::NotUnique,
        ),
        NOT_NULL_VIOLATION => (
            Code::NOT_NULL,
            non_empty(err.column()).map(|column| format!("{column} must not be empty")),
            Sentinel::NotNull,
        ),
        CHECK_VIOLATION => (
            Code::CHECK_CONSTRAINT,
            non_empty(err.constraint())
                .map(|constraint| format!("{constraint} constraint failed")),
            Sentinel::CheckConstraint,
        ),
        _ => return None,
    };

    Some(Err::new(
        code,
        Options {
            msg,
            op: None,
            wrapped: Some(Box::new(sentinel)),
        },
    ))
}

fn as_storage_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn StorageError> {
    if let Some(driver_err) = err.downcast_ref::<DriverError>() {
        return Some(driver_err);
    }
    if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
        return Some(sqlx_err);
    }
    if let Some(pg_err) = err.downcast_ref::<PgDatabaseError>() {
        return Some(pg_err);
    }
    None
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
