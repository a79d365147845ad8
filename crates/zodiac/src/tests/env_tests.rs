//! Environment loading: fail-fast validation of process configuration.

use crate::env::{EnvError, EnvSchema};
use crate::SchemaError;
use crate::prelude::*;
use serde::Deserialize;

fn server_env() -> EnvSchema {
    EnvSchema::new()
        .var("DATABASE_URL", crate::url())
        .var("AUTH_SECRET", crate::string().min(1))
        .var("AUTH_URL", crate::url())
        .var(
            "NODE_ENV",
            crate::enumeration(["development", "production"]).default("development"),
        )
        .client_var("PUBLIC_APP_URL", crate::url().optional())
        .empty_string_as_absent(true)
}

#[test]
fn valid_environment_loads() {
    let env = server_env()
        .load_from([
            ("DATABASE_URL", "postgres://db.internal:5432/app"),
            ("AUTH_SECRET", "s3cret"),
            ("AUTH_URL", "https://auth.example.com"),
            ("NODE_ENV", "production"),
            ("PATH", "/usr/bin"),
        ])
        .unwrap();

    assert_eq!(env.get_str("NODE_ENV"), Some("production"));
    assert_eq!(env.get_str("AUTH_SECRET"), Some("s3cret"));
    assert!(env.get("PUBLIC_APP_URL").is_absent());
    assert!(env.get("PATH").is_absent());
    assert_eq!(env.values().len(), 4);
}

#[test]
fn every_problem_is_reported_at_once() {
    let err = server_env()
        .load_from([("DATABASE_URL", "not a url"), ("NODE_ENV", "staging")])
        .unwrap_err();

    let paths: Vec<String> = err.issues().iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["DATABASE_URL", "AUTH_SECRET", "AUTH_URL", "NODE_ENV"]);
    assert!(matches!(err, EnvError::Invalid(_)));
    assert!(err.to_string().starts_with("invalid environment variables: DATABASE_URL (Invalid url)"));
}

#[test]
fn empty_strings_fall_back_to_defaults() {
    let env = server_env()
        .load_from([
            ("DATABASE_URL", "postgres://localhost/app"),
            ("AUTH_SECRET", "x"),
            ("AUTH_URL", "http://localhost:3000"),
            ("NODE_ENV", ""),
            ("PUBLIC_APP_URL", ""),
        ])
        .unwrap();

    assert_eq!(env.get_str("NODE_ENV"), Some("development"));
    assert!(env.get("PUBLIC_APP_URL").is_absent());
}

#[test]
fn empty_required_variable_is_missing() {
    let err = server_env()
        .load_from([
            ("DATABASE_URL", "postgres://localhost/app"),
            ("AUTH_SECRET", ""),
            ("AUTH_URL", "http://localhost:3000"),
        ])
        .unwrap_err();

    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].code, IssueCode::Required);
}

#[test]
fn coerced_variables() {
    let env = EnvSchema::new()
        .var("PORT", crate::coerce::number().int().min(1).max(65535))
        .var("DEBUG", crate::coerce::boolean().default(false))
        .load_from([("PORT", "8080")])
        .unwrap();

    assert_eq!(env.get_f64("PORT"), Some(8080.0));
    assert_eq!(env.get_bool("DEBUG"), Some(false));
}

#[test]
fn deserialize_into_typed_config() {
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    struct Config {
        port: u16,
        node_env: String,
    }

    let env = EnvSchema::new()
        .var("PORT", crate::coerce::number().int())
        .var("NODE_ENV", crate::string().default("development"))
        .load_from([("PORT", "3000")])
        .unwrap();
    let config: Config = env.deserialize().unwrap();
    assert_eq!(config.port, 3000);
    assert_eq!(config.node_env, "development");

    let err = env.deserialize::<std::collections::HashMap<String, bool>>().unwrap_err();
    assert!(matches!(err, EnvError::Deserialize { .. }));
}

#[test]
#[should_panic(expected = "duplicate object field `PORT`")]
fn duplicate_variable_panics() {
    let _ = EnvSchema::new()
        .var("PORT", crate::string())
        .var("PORT", crate::string());
}

#[test]
fn names_keep_declaration_order() {
    let env = server_env();
    let names: Vec<&str> = env.names().collect();
    assert_eq!(
        names,
        vec!["DATABASE_URL", "AUTH_SECRET", "AUTH_URL", "NODE_ENV", "PUBLIC_APP_URL"]
    );
}

#[test]
fn client_variables_are_exposed_separately() {
    let env = server_env()
        .load_from([
            ("DATABASE_URL", "postgres://localhost/app"),
            ("AUTH_SECRET", "x"),
            ("AUTH_URL", "http://localhost:3000"),
            ("PUBLIC_APP_URL", "https://app.example.com"),
        ])
        .unwrap();

    assert!(env.is_client("PUBLIC_APP_URL"));
    assert!(!env.is_client("AUTH_SECRET"));
    assert_eq!(
        env.client(),
        [("PUBLIC_APP_URL".to_string(), Value::from("https://app.example.com"))]
            .into_iter()
            .collect::<crate::Map>()
    );
    assert_eq!(server_env().client_names().collect::<Vec<_>>(), vec!["PUBLIC_APP_URL"]);
}

#[test]
#[should_panic(expected = "client variable `APP_URL` must start with `PUBLIC_`")]
fn client_variable_without_prefix_panics() {
    let _ = EnvSchema::new().client_var("APP_URL", crate::url());
}

#[test]
fn custom_client_prefix() {
    let schema = EnvSchema::new()
        .client_prefix("NEXT_PUBLIC_")
        .client_var("NEXT_PUBLIC_APP_URL", crate::url().optional());
    assert_eq!(schema.names().collect::<Vec<_>>(), vec!["NEXT_PUBLIC_APP_URL"]);

    let err = schema
        .try_client_var("PUBLIC_APP_URL", crate::url())
        .unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingClientPrefix {
            name: "PUBLIC_APP_URL".into(),
            prefix: "NEXT_PUBLIC_".into(),
        }
    );
}

#[test]
#[should_panic(expected = "client variable `PUBLIC_APP_URL` must start with `NEXT_PUBLIC_`")]
fn changing_prefix_rechecks_declared_client_variables() {
    let _ = EnvSchema::new()
        .client_var("PUBLIC_APP_URL", crate::url())
        .client_prefix("NEXT_PUBLIC_");
}
