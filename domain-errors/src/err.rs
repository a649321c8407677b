use std::error::Error as StdError;
use std::fmt;

use crate::code::{Code, Info, Kind};

/// Любая ошибка, которую можно обернуть в [`Err`] и передать между потоками.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Метка операции, которая породила или пробросила ошибку, например `scope.Create`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Op(String);

impl Op {
    /// Создаёт метку операции.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Метка как строка.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Op {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Op {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Необязательные параметры [`Err::new`].
///
/// Все поля задаются один раз при построении ошибки и больше не меняются.
#[derive(Debug, Default)]
pub struct Options {
    /// Явное сообщение; подавляет сообщение кода по умолчанию.
    pub msg: Option<String>,
    /// Метка операции.
    pub op: Option<Op>,
    /// Причина ошибки.
    pub wrapped: Option<BoxError>,
}

impl Options {
    /// Задаёт явное сообщение.
    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Задаёт метку операции.
    pub fn with_op(mut self, op: impl Into<Op>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Задаёт причину ошибки.
    pub fn with_wrap(mut self, err: impl Into<BoxError>) -> Self {
        self.wrapped = Some(err.into());
        self
    }
}

/// Доменная ошибка: обязательный код плюс необязательные сообщение,
/// операция и причина.
///
/// Причины образуют односвязную цепочку, доступную через
/// [`std::error::Error::source`]. Каждая `Err` владеет своей причиной,
/// поэтому цепочка всегда конечна.
#[derive(Debug)]
pub struct Err {
    code: Code,
    msg: Option<String>,
    op: Option<Op>,
    wrapped: Option<BoxError>,
}

impl Err {
    /// Строит ошибку из кода и параметров. Построение не может завершиться
    /// неудачей: незарегистрированный код отображается как `Unknown`.
    pub fn new(code: impl Into<Code>, opts: Options) -> Self {
        Self {
            code: code.into(),
            msg: opts.msg,
            op: opts.op,
            wrapped: opts.wrapped,
        }
    }

    /// Ошибка только с кодом.
    pub fn from_code(code: impl Into<Code>) -> Self {
        Self::new(code, Options::default())
    }

    /// Код ошибки.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Явное сообщение, если задано.
    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// Метка операции, если задана.
    pub fn op(&self) -> Option<&Op> {
        self.op.as_ref()
    }

    /// Метаданные кода (с откатом на `Unknown`).
    pub fn info(&self) -> Info {
        self.code.info()
    }

    /// Категория кода.
    pub fn kind(&self) -> Kind {
        self.info().kind
    }

    /// Причина ошибки (`Unwrap`).
    pub fn wrapped(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.wrapped.as_deref()
    }
}

impl fmt::Display for Err {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(
            f,
            self.op.as_ref().map(Op::as_str),
            self.msg.as_deref(),
            self.code,
            self.wrapped.as_deref().map(|err| err as &dyn StdError),
        )
    }
}

impl StdError for Err {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.wrapped
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

/// Склеивает части сообщения: `op: msg: kind: error #N: \n<причина>`.
///
/// Без явного сообщения вместо него выводится сообщение кода по умолчанию,
/// а категория присоединяется через `", "`.
pub(crate) fn render(
    f: &mut fmt::Formatter<'_>,
    op: Option<&str>,
    msg: Option<&str>,
    code: Code,
    wrapped: Option<&dyn StdError>,
) -> fmt::Result {
    let mut out = Joiner { f, empty: true };
    let info = code.info();

    if let Some(op) = op.filter(|op| !op.is_empty()) {
        out.join(": ", op)?;
    }
    match msg.filter(|msg| !msg.is_empty()) {
        Some(msg) => {
            out.join(": ", msg)?;
            out.join(": ", info.kind.as_str())?;
        }
        None => {
            out.join(": ", info.message)?;
            out.join(", ", info.kind.as_str())?;
        }
    }
    out.join(": ", format_args!("error #{code}"))?;

    if let Some(wrapped) = wrapped {
        out.join(": \n", wrapped)?;
    }
    Ok(())
}

struct Joiner<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    empty: bool,
}

impl Joiner<'_, '_> {
    fn join(&mut self, delim: &str, piece: impl fmt::Display) -> fmt::Result {
        if !self.empty {
            self.f.write_str(delim)?;
        }
        self.empty = false;
        write!(self.f, "{piece}")
    }
}
