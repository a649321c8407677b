//! Доменная модель ошибок сервиса.
//!
//! Каждая ошибка получает стабильный числовой [`Code`], категорию и сообщение
//! из реестра, необязательную метку операции и необязательную причину.
//! Ошибки драйвера хранилища (нарушения уникальности, NOT NULL и
//! check-ограничений) переводятся в ту же таксономию через [`convert`].
//!
//! ```
//! use domain_errors::{Code, Err, Options};
//!
//! let err = Err::new(Code::NOT_UNIQUE, Options::default().with_op("scope.Create"));
//! assert_eq!(err.to_string(), "scope.Create: must be unique, Conflict: error #1002");
//! ```
//!
//! Тип [`Err`] перекрывает `Result::Err` из прелюдии, поэтому крейт не стоит
//! импортировать через `*`. Удобнее обращаться к нему по пути:
//!
//! ```
//! use domain_errors as errors;
//!
//! fn lookup(found: bool) -> Result<(), errors::Err> {
//!     if !found {
//!         return Err(errors::Err::from_code(errors::Code::RECORD_NOT_FOUND));
//!     }
//!     Ok(())
//! }
//!
//! assert!(lookup(false).is_err());
//! ```
#![warn(missing_docs)]

mod chain;
mod code;
mod convert;
mod err;
mod sentinel;
mod storage;

pub use chain::{Chain, chain, code_of, find, is_sentinel};
pub use code::{Code, Info, Kind, registry};
pub use convert::{classify, convert, convert_opt, convert_sqlx};
pub use err::{BoxError, Err, Op, Options};
pub use sentinel::Sentinel;
pub use storage::{
    CHECK_VIOLATION, DriverError, NOT_NULL_VIOLATION, StorageError, UNIQUE_VIOLATION,
    condition_name,
};
