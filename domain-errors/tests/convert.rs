use std::error::Error as _;
use std::io;

use domain_errors::{
    BoxError, Code, DriverError, Err, Kind, Options, Sentinel, code_of, convert, convert_opt,
    find, is_sentinel, registry,
};

fn unique_violation() -> BoxError {
    Box::new(
        DriverError::from_sqlstate("23505", "duplicate key value violates unique constraint")
            .with_detail("key already exists")
            .with_constraint("scopes_name_key"),
    )
}

#[test]
fn registry_lookup_is_total() {
    for (code, info) in registry() {
        assert_eq!(code.info(), *info);
    }
    assert_eq!(Code(31337).info(), Code::UNKNOWN.info());
    assert_eq!(Code(31337).info().kind, Kind::Unknown);
}

#[test]
fn repository_flow_converts_and_annotates() {
    let converted = convert(unique_violation());
    let err = Err::new(
        Code::INVALID_PARAMETER,
        Options::default()
            .with_op("scope.Create")
            .with_msg("scope name is taken")
            .with_wrap(converted),
    );

    assert_eq!(
        err.to_string(),
        "scope.Create: scope name is taken: Validation: error #100: \n\
         key already exists: Conflict: error #1002: \n\
         unique constraint violation: Conflict: error #1002"
    );
    assert!(is_sentinel(&err, Sentinel::NotUnique));
    assert_eq!(code_of(&err), Some(Code::INVALID_PARAMETER));
}

#[test]
fn convert_is_idempotent() {
    let once = convert(unique_violation());
    let once_rendered = once.to_string();
    let twice = convert(once);

    assert_eq!(twice.to_string(), once_rendered);
    assert_eq!(
        find::<Err>(&*twice).map(Err::code),
        Some(Code::NOT_UNIQUE)
    );
}

#[test]
fn convert_nil_is_nil() {
    assert!(convert_opt(None).is_none());
    assert!(convert_opt(Some(unique_violation())).is_some());
}

#[test]
fn converted_chain_terminates_at_sentinel() {
    let converted = convert(Box::new(
        DriverError::from_sqlstate("23502", "null value in column").with_column("name"),
    ));

    let sentinel = converted.source().expect("sentinel must be wrapped");
    assert_eq!(sentinel.downcast_ref::<Sentinel>(), Some(&Sentinel::NotNull));
    assert!(sentinel.source().is_none());
}

#[test]
fn foreign_errors_are_untouched() {
    let converted = convert(Box::new(io::Error::new(
        io::ErrorKind::TimedOut,
        "statement timeout",
    )));

    let io_err = converted
        .downcast_ref::<io::Error>()
        .expect("io error must pass through");
    assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);
    assert_eq!(code_of(&*converted), None);
}

#[test]
fn message_override_hides_default_message() {
    for (code, info) in registry() {
        let rendered = Err::new(*code, Options::default().with_msg("custom")).to_string();
        assert!(rendered.contains("custom"));
        assert!(!rendered.contains(info.message), "{rendered}");
        assert!(rendered.contains(&format!("error #{code}")));
    }
}
