use std::fmt;

use serde::Serialize;

/// Стабильный числовой идентификатор категории ошибки.
///
/// Значения не переиспользуются: код, однажды попавший в реестр, навсегда
/// закреплён за своей категорией.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Code(pub u32);

impl Code {
    /// Неизвестная ошибка; также используется для незарегистрированных кодов.
    pub const UNKNOWN: Code = Code(0);

    /// Некорректный параметр.
    pub const INVALID_PARAMETER: Code = Code(100);
    /// Некорректный адрес.
    pub const INVALID_ADDRESS: Code = Code(101);
    /// Некорректный публичный идентификатор.
    pub const INVALID_PUBLIC_ID: Code = Code(102);
    /// Некорректная маска полей.
    pub const INVALID_FIELD_MASK: Code = Code(103);
    /// Пустая маска полей.
    pub const EMPTY_FIELD_MASK: Code = Code(104);

    /// Нарушено check-ограничение хранилища.
    pub const CHECK_CONSTRAINT: Code = Code(1000);
    /// Нарушено ограничение NOT NULL.
    pub const NOT_NULL: Code = Code(1001);
    /// Нарушено ограничение уникальности.
    pub const NOT_UNIQUE: Code = Code(1002);
    /// Нарушение целостности без уточнения.
    pub const NOT_SPECIFIC_INTEGRITY: Code = Code(1003);
    /// Таблица отсутствует.
    pub const MISSING_TABLE: Code = Code(1004);

    /// Запись не найдена.
    pub const RECORD_NOT_FOUND: Code = Code(1100);
    /// Найдено больше одной записи там, где ожидалась одна.
    pub const MULTIPLE_RECORDS: Code = Code(1101);
    /// Колонка не найдена.
    pub const COLUMN_NOT_FOUND: Code = Code(1102);

    /// Метаданные кода. Для незарегистрированного кода возвращается запись
    /// [`Code::UNKNOWN`]; поиск никогда не завершается ошибкой.
    pub fn info(self) -> Info {
        lookup(self).unwrap_or(UNKNOWN_INFO)
    }

    /// Зарегистрирован ли код в реестре.
    pub fn is_registered(self) -> bool {
        lookup(self).is_some()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u32> for Code {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Грубая классификация кода.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    /// Неизвестная категория.
    Unknown,
    /// Входные данные не прошли проверку.
    Validation,
    /// Конфликт с уже существующим состоянием.
    Conflict,
    /// Искомый объект отсутствует.
    NotFound,
    /// Внутренняя ошибка сервиса или хранилища.
    Internal,
}

impl Kind {
    /// Строковое представление, используемое при рендеринге ошибки.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Unknown => "Unknown",
            Kind::Validation => "Validation",
            Kind::Conflict => "Conflict",
            Kind::NotFound => "NotFound",
            Kind::Internal => "Internal",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Статические метаданные кода: категория и сообщение по умолчанию.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Info {
    /// Категория.
    pub kind: Kind,
    /// Сообщение по умолчанию, если явное сообщение не задано.
    pub message: &'static str,
}

const fn info(kind: Kind, message: &'static str) -> Info {
    Info { kind, message }
}

const UNKNOWN_INFO: Info = info(Kind::Unknown, "unknown");

static REGISTRY: &[(Code, Info)] = &[
    (Code::UNKNOWN, UNKNOWN_INFO),
    (Code::INVALID_PARAMETER, info(Kind::Validation, "invalid parameter")),
    (Code::INVALID_ADDRESS, info(Kind::Validation, "invalid address")),
    (Code::INVALID_PUBLIC_ID, info(Kind::Validation, "invalid public id")),
    (Code::INVALID_FIELD_MASK, info(Kind::Validation, "invalid field mask")),
    (Code::EMPTY_FIELD_MASK, info(Kind::Validation, "empty field mask")),
    (Code::CHECK_CONSTRAINT, info(Kind::Validation, "constraint check failed")),
    (Code::NOT_NULL, info(Kind::Validation, "must not be empty")),
    (Code::NOT_UNIQUE, info(Kind::Conflict, "must be unique")),
    (
        Code::NOT_SPECIFIC_INTEGRITY,
        info(Kind::Internal, "integrity violation without specific details"),
    ),
    (Code::MISSING_TABLE, info(Kind::Internal, "missing table")),
    (Code::RECORD_NOT_FOUND, info(Kind::NotFound, "record not found")),
    (Code::MULTIPLE_RECORDS, info(Kind::Conflict, "multiple records")),
    (Code::COLUMN_NOT_FOUND, info(Kind::NotFound, "column not found")),
];

/// Весь реестр в порядке возрастания кодов.
pub fn registry() -> &'static [(Code, Info)] {
    REGISTRY
}

fn lookup(code: Code) -> Option<Info> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == code)
        .map(|(_, info)| *info)
}
