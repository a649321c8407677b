use std::fmt;

use thiserror::Error;

use crate::code::Code;
use crate::err::{Err, Options, render};

/// Базовые ошибки, которые оборачивает конвертер и которые можно искать в
/// цепочке через [`crate::is_sentinel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Sentinel {
    /// Нарушено ограничение уникальности.
    #[error("{}", Rendered(Sentinel::NotUnique))]
    NotUnique,
    /// Нарушено ограничение NOT NULL.
    #[error("{}", Rendered(Sentinel::NotNull))]
    NotNull,
    /// Нарушено check-ограничение.
    #[error("{}", Rendered(Sentinel::CheckConstraint))]
    CheckConstraint,
    /// Запись не найдена.
    #[error("{}", Rendered(Sentinel::RecordNotFound))]
    RecordNotFound,
    /// Некорректная маска полей.
    #[error("{}", Rendered(Sentinel::InvalidFieldMask))]
    InvalidFieldMask,
    /// Пустая маска полей.
    #[error("{}", Rendered(Sentinel::EmptyFieldMask))]
    EmptyFieldMask,
}

impl Sentinel {
    /// Код, под которым регистрируется базовая ошибка.
    pub fn code(self) -> Code {
        match self {
            Sentinel::NotUnique => Code::NOT_UNIQUE,
            Sentinel::NotNull => Code::NOT_NULL,
            Sentinel::CheckConstraint => Code::CHECK_CONSTRAINT,
            Sentinel::RecordNotFound => Code::RECORD_NOT_FOUND,
            Sentinel::InvalidFieldMask => Code::INVALID_FIELD_MASK,
            Sentinel::EmptyFieldMask => Code::EMPTY_FIELD_MASK,
        }
    }

    /// Фиксированное сообщение базовой ошибки.
    pub fn message(self) -> &'static str {
        match self {
            Sentinel::NotUnique => "unique constraint violation",
            Sentinel::NotNull => "must not be empty",
            Sentinel::CheckConstraint => "check constraint violated",
            Sentinel::RecordNotFound => "record not found",
            Sentinel::InvalidFieldMask => "invalid field mask",
            Sentinel::EmptyFieldMask => "empty field mask",
        }
    }

    /// Эквивалентная [`Err`] с тем же кодом и сообщением, без причины.
    pub fn into_err(self) -> Err {
        Err::new(self.code(), Options::default().with_msg(self.message()))
    }
}

struct Rendered(Sentinel);

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, None, Some(self.0.message()), self.0.code(), None)
    }
}
