use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use domain_errors::{self as errors, BoxError, Code, DriverError, Kind, Options};
use serde::Serialize;
use tracing::debug;

mod logging;
mod settings;

use logging::init_logging;
use settings::{OutputFormat, Settings};

const DEFAULT_DRIVER_MESSAGE: &str = "synthetic driver error";

#[derive(Debug, Parser)]
#[command(name = "errcode", version, about = "Инспектор доменных кодов ошибок")]
struct Cli {
    /// Выводить результат в JSON (перекрывает ERRCODE_FORMAT).
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Список зарегистрированных кодов.
    List,
    /// Информация о коде. Для незарегистрированного кода завершается с ошибкой.
    Lookup { code: u32 },
    /// Рендеринг доменной ошибки.
    Render {
        #[arg(long)]
        code: u32,
        #[arg(long)]
        op: Option<String>,
        #[arg(long)]
        msg: Option<String>,
        /// Текст причины, которая будет обёрнута.
        #[arg(long)]
        wrap: Option<String>,
    },
    /// Конвертация синтетической ошибки драйвера в доменную.
    ///
    /// Завершается с ошибкой, если конвертер ошибку не распознал.
    Convert {
        #[arg(long, conflicts_with = "condition", required_unless_present = "condition")]
        sqlstate: Option<String>,
        /// Имя условия, например `unique_violation`.
        #[arg(long)]
        condition: Option<String>,
        #[arg(long)]
        detail: Option<String>,
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        constraint: Option<String>,
        #[arg(long, default_value = DEFAULT_DRIVER_MESSAGE)]
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct CodeEntry {
    code: Code,
    kind: Kind,
    message: &'static str,
}

impl CodeEntry {
    fn new(code: Code) -> Self {
        let info = code.info();
        Self {
            code,
            kind: info.kind,
            message: info.message,
        }
    }
}

#[derive(Debug, Serialize)]
struct Rendered {
    code: Code,
    kind: Kind,
    rendered: String,
}

impl Rendered {
    fn new(err: &errors::Err) -> Self {
        Self {
            code: err.code(),
            kind: err.kind(),
            rendered: err.to_string(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print().ok();
            process::exit(parse_exit_code(&err));
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

// clap по умолчанию выходит с кодом 2; наружу отдаём только 0 и 1.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

fn run(cli: Cli) -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_logging(&settings)?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        settings.format
    };
    debug!(command = ?cli.command, ?format, "running command");

    match cli.command {
        Command::List => {
            let entries: Vec<CodeEntry> = errors::registry()
                .iter()
                .map(|(code, _)| CodeEntry::new(*code))
                .collect();
            match format {
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Text => entries.iter().for_each(print_entry),
            }
        }
        Command::Lookup { code } => {
            let code = Code(code);
            if !code.is_registered() {
                bail!("код {code} не зарегистрирован");
            }
            let entry = CodeEntry::new(code);
            match format {
                OutputFormat::Json => print_json(&entry)?,
                OutputFormat::Text => print_entry(&entry),
            }
        }
        Command::Render {
            code,
            op,
            msg,
            wrap,
        } => {
            let err = build_err(Code(code), op, msg, wrap);
            print_rendered(format, &err)?;
        }
        Command::Convert {
            sqlstate,
            condition,
            detail,
            column,
            constraint,
            message,
        } => {
            let driver_err = build_driver_error(
                sqlstate.as_deref(),
                condition.as_deref(),
                message,
                detail,
                column,
                constraint,
            )?;
            let converted = errors::convert(Box::new(driver_err));
            let Some(err) = converted.downcast_ref::<errors::Err>() else {
                bail!("ошибка драйвера не распознана: {converted}");
            };
            print_rendered(format, err)?;
        }
    }

    Ok(())
}

fn build_err(
    code: Code,
    op: Option<String>,
    msg: Option<String>,
    wrap: Option<String>,
) -> errors::Err {
    errors::Err::new(
        code,
        Options {
            msg,
            op: op.map(Into::into),
            wrapped: wrap.map(BoxError::from),
        },
    )
}

fn build_driver_error(
    sqlstate: Option<&str>,
    condition: Option<&str>,
    message: String,
    detail: Option<String>,
    column: Option<String>,
    constraint: Option<String>,
) -> Result<DriverError> {
    let mut driver_err = match (sqlstate, condition) {
        (Some(sqlstate), _) => DriverError::from_sqlstate(sqlstate, message),
        (None, Some(condition)) => DriverError::new(condition, message),
        (None, None) => bail!("нужно указать --sqlstate или --condition"),
    };
    if let Some(detail) = detail {
        driver_err = driver_err.with_detail(detail);
    }
    if let Some(column) = column {
        driver_err = driver_err.with_column(column);
    }
    if let Some(constraint) = constraint {
        driver_err = driver_err.with_constraint(constraint);
    }
    Ok(driver_err)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("не удалось сериализовать JSON")?;
    println!("{json}");
    Ok(())
}

fn print_entry(entry: &CodeEntry) {
    println!("{:>5}  {:<10}  {}", entry.code, entry.kind, entry.message);
}

fn print_rendered(format: OutputFormat, err: &errors::Err) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&Rendered::new(err)),
        OutputFormat::Text => {
            println!("{err}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn bad_arguments_exit_with_one() {
        for args in [
            &["errcode", "lookup", "notanumber"][..],
            &["errcode", "convert", "--column", "name"][..],
            &["errcode", "unknown-command"][..],
        ] {
            let err = Cli::try_parse_from(args).expect_err("arguments must be rejected");
            assert_eq!(parse_exit_code(&err), 1, "{args:?}");
        }
    }

    #[test]
    fn help_and_version_exit_with_zero() {
        for args in [&["errcode", "--help"][..], &["errcode", "--version"][..]] {
            let err = Cli::try_parse_from(args).expect_err("clap reports help as an error");
            assert_eq!(parse_exit_code(&err), 0, "{args:?}");
        }
    }

    #[test]
    fn convert_requires_sqlstate_or_condition() {
        let parsed = Cli::try_parse_from(["errcode", "convert", "--column", "name"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "errcode",
            "convert",
            "--sqlstate",
            "23502",
            "--condition",
            "not_null_violation",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn build_err_wraps_text_cause() {
        let err = build_err(
            Code::MISSING_TABLE,
            Some("db.Migrate".to_string()),
            None,
            Some("relation \"users\" does not exist".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "db.Migrate: missing table, Internal: error #1004: \nrelation \"users\" does not exist"
        );
    }

    #[test]
    fn build_driver_error_prefers_sqlstate() {
        let driver_err = build_driver_error(
            Some("23514"),
            None,
            DEFAULT_DRIVER_MESSAGE.to_string(),
            None,
            None,
            Some("age_positive".to_string()),
        )
        .expect("driver error must be built");

        let converted = errors::convert(Box::new(driver_err));
        let err = converted
            .downcast_ref::<errors::Err>()
            .expect("check violation must be converted");
        assert_eq!(err.msg(), Some("age_positive constraint failed"));
    }

    #[test]
    fn build_driver_error_requires_a_code() {
        let result = build_driver_error(
            None,
            None,
            DEFAULT_DRIVER_MESSAGE.to_string(),
            None,
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn code_entry_serializes_flat() {
        let json = serde_json::to_value(CodeEntry::new(Code::NOT_UNIQUE)).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"code": 1002, "kind": "Conflict", "message": "must be unique"})
        );
    }
}
