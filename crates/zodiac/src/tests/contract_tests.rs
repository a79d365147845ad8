//! Procedure contracts: input is checked before the handler runs, output
//! after it returns.

use crate::contract::{ContractError, HandlerError, Method, ProcedureContract, RouteMeta};
use crate::prelude::*;
use futures::executor::block_on;
use serde_json::json;
use std::cell::Cell;

fn create_post() -> ProcedureContract {
    ProcedureContract::new("post.create")
        .meta(
            RouteMeta::new(Method::Post, "/posts")
                .summary("Create a post")
                .tag("posts"),
        )
        .input(
            crate::object()
                .field("title", crate::string().min(3))
                .field("tags", crate::array(crate::string()).default(Vec::<Value>::new())),
        )
        .output(
            crate::object()
                .field("id", crate::int().positive())
                .field("title", crate::string()),
        )
}

#[test]
fn valid_call_runs_handler_with_validated_input() {
    let contract = create_post();
    let output = contract
        .call(&Value::from(json!({"title": "Hello", "extra": 1})), |input| {
            assert_eq!(input, Value::from(json!({"title": "Hello", "tags": []})));
            Ok::<_, HandlerError>(Value::from(json!({"id": 1, "title": "Hello"})))
        })
        .unwrap();
    assert_eq!(output, Value::from(json!({"id": 1, "title": "Hello"})));
}

#[test]
fn invalid_input_never_reaches_handler() {
    let contract = create_post();
    let ran = Cell::new(false);
    let err = contract
        .call(&Value::from(json!({"title": "Hi"})), |_| {
            ran.set(true);
            Ok::<_, HandlerError>(Value::Null)
        })
        .unwrap_err();

    assert!(!ran.get());
    assert!(matches!(err, ContractError::Input { .. }));
    assert_eq!(err.code(), "BAD_REQUEST");
    assert_eq!(err.issues()[0].path.to_string(), "title");
}

#[test]
fn invalid_output_is_rejected() {
    let contract = create_post();
    let err = contract
        .call(&Value::from(json!({"title": "Hello"})), |_| {
            Ok::<_, HandlerError>(Value::from(json!({"id": -1, "title": "Hello"})))
        })
        .unwrap_err();

    assert!(matches!(err, ContractError::Output { .. }));
    assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
    assert_eq!(err.issues()[0].code, IssueCode::TooSmall);
}

#[test]
fn handler_errors_are_wrapped() {
    let contract = create_post();
    let err = contract
        .call(&Value::from(json!({"title": "Hello"})), |_| {
            Err(std::io::Error::other("database unavailable"))
        })
        .unwrap_err();

    assert!(matches!(err, ContractError::Handler { .. }));
    assert!(err.issues().is_empty());
    assert_eq!(
        err.to_string(),
        "handler for `post.create` failed: database unavailable"
    );
}

#[test]
fn void_contract() {
    let get_posts = ProcedureContract::new("post.getPosts")
        .meta(RouteMeta::new(Method::Get, "/posts").summary("Get all posts").tag("posts"))
        .input(Schema::void())
        .output(Schema::void());

    assert!(get_posts.validate_input(&Value::Absent).is_ok());
    assert!(get_posts.validate_input(&Value::from(json!({}))).is_err());
    assert!(get_posts.validate_output(Value::Null).is_err());
    assert_eq!(get_posts.route().method.as_str(), "GET");
    assert_eq!(get_posts.route().tags, vec!["posts"]);
}

#[test]
fn contract_without_output_schema_passes_output_through() {
    let echo = ProcedureContract::new("echo");
    let output = echo.validate_output(Value::from("anything")).unwrap();
    assert_eq!(output, Value::from("anything"));
    assert_eq!(echo.name(), "echo");
}

#[test]
fn async_call() {
    let contract = create_post();
    let output = block_on(contract.call_async(
        &Value::from(json!({"title": "Async"})),
        |input| async move {
            let title = input.get("title").clone();
            Ok::<_, HandlerError>(Value::object([("id", Value::from(7)), ("title", title)]))
        },
    ))
    .unwrap();
    assert_eq!(output.get("id"), &Value::Number(7.0));

    let err = block_on(contract.call_async(&Value::from(json!({})), |_| async {
        Ok::<_, HandlerError>(Value::Null)
    }))
    .unwrap_err();
    assert!(matches!(err, ContractError::Input { .. }));
}

#[test]
fn route_meta_serializes() {
    let meta = RouteMeta::new(Method::Get, "/posts").summary("Get all posts").tag("posts");
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(
        json,
        json!({
            "method": "GET",
            "path": "/posts",
            "summary": "Get all posts",
            "tags": ["posts"],
            "deprecated": false
        })
    );
}
