//! Property-based tests for the validator
//!
//! These tests check the invariants every schema must satisfy:
//! - valid input succeeds and re-validating the output is a fixed point
//! - a wrong primitive type yields exactly one `type_mismatch`
//! - unknown object keys are stripped
//! - defaults, unions and tuple arity behave uniformly over their inputs

use crate::prelude::*;
use crate::{coerce, flatten, Map};
use proptest::prelude::*;

fn user_schema() -> Schema {
    crate::object()
        .field("name", crate::string().min(2).max(20))
        .field("age", crate::int().nonnegative())
        .field("theme", crate::string().default("light"))
        .field("tags", crate::array(crate::string()))
        .field("nickname", crate::string().nullish())
        .into()
}

fn non_string_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1e9..1e9f64).prop_map(Value::Number),
        prop::collection::vec(any::<i32>(), 0..4)
            .prop_map(|items| Value::Array(items.into_iter().map(Value::from).collect())),
        Just(Value::Object(Map::new())),
    ]
}

fn user_input() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z]{2,20}",
        0u32..150,
        prop::option::of("[a-z]{1,8}"),
        prop::collection::vec("[a-z]{0,6}", 0..4),
        prop::option::of(prop::option::of("[a-z]{1,8}")),
    )
        .prop_map(|(name, age, theme, tags, nickname)| {
            let mut map = Map::new();
            map.insert("name".into(), Value::from(name));
            map.insert("age".into(), Value::from(age));
            if let Some(theme) = theme {
                map.insert("theme".into(), Value::from(theme));
            }
            map.insert("tags".into(), Value::from(tags));
            match nickname {
                None => {}
                Some(None) => {
                    map.insert("nickname".into(), Value::Null);
                }
                Some(Some(nick)) => {
                    map.insert("nickname".into(), Value::from(nick));
                }
            }
            Value::Object(map)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Valid input succeeds, and validating the output again yields the
    /// same output.
    #[test]
    fn prop_validation_is_a_fixed_point(input in user_input()) {
        let schema = user_schema();
        let first = schema.parse(&input);
        prop_assert!(first.is_ok(), "valid input rejected: {:?}", first);
        let output = first.unwrap();

        let second = schema.parse(&output);
        prop_assert_eq!(second.ok(), Some(output));
    }

    /// Defaults fill only absent values.
    #[test]
    fn prop_default_only_fills_absent(input in user_input()) {
        let output = user_schema().parse(&input).unwrap();
        match input.get("theme") {
            Value::Absent => prop_assert_eq!(output.get("theme"), &Value::from("light")),
            theme => prop_assert_eq!(output.get("theme"), theme),
        }
    }

    /// Undeclared keys never reach the output.
    #[test]
    fn prop_unknown_keys_are_stripped(
        name in "[a-z]{1,10}",
        extra_key in "[a-z]{1,10}",
        extra in non_string_value(),
    ) {
        prop_assume!(extra_key != "name");
        let schema: Schema = crate::object().field("name", crate::string()).into();
        let input = Value::object([("name", Value::from(name.clone())), (extra_key.as_str(), extra)]);

        let output = schema.parse(&input).unwrap();
        prop_assert_eq!(output, Value::object([("name", name)]));
    }

    /// A wrong primitive type is one issue, never accompanied by
    /// refinement issues.
    #[test]
    fn prop_type_mismatch_is_a_single_issue(value in non_string_value()) {
        let schema = Schema::from(crate::string().min(3).email().regex("^x"));
        let result = schema.safe_parse(&value);
        prop_assert_eq!(result.issues().len(), 1);
        prop_assert_eq!(result.issues()[0].code, IssueCode::TypeMismatch);
    }

    /// Every string outside the literal set fails with one invalid_union.
    #[test]
    fn prop_union_of_literals(s in "[a-z]{0,3}") {
        let schema = crate::literal("a").or(crate::literal("b"));
        let result = schema.safe_parse(&Value::from(s.clone()));
        if s == "a" || s == "b" {
            prop_assert_eq!(result.value(), Some(&Value::from(s)));
        } else {
            prop_assert_eq!(result.issues().len(), 1);
            prop_assert_eq!(result.issues()[0].code, IssueCode::InvalidUnion);
        }
    }

    /// Wrong tuple arity is one type_mismatch and elements are not checked.
    #[test]
    fn prop_tuple_arity(items in prop::collection::vec(non_string_value(), 0..6)) {
        prop_assume!(items.len() != 2);
        let schema = crate::tuple([crate::number(), crate::number()]);
        let result = schema.safe_parse(&Value::Array(items));
        prop_assert_eq!(result.issues().len(), 1);
        prop_assert_eq!(result.issues()[0].code, IssueCode::TypeMismatch);
        prop_assert!(result.issues()[0].path.is_root());
    }

    /// Coerced numbers accept any integer rendered as a string.
    #[test]
    fn prop_coerced_integers(n in any::<i32>()) {
        let schema = Schema::from(coerce::number().int());
        prop_assert_eq!(schema.parse(&Value::from(n.to_string())).ok(), Some(Value::from(n)));
    }

    /// Flattening keeps every message.
    #[test]
    fn prop_flatten_keeps_every_message(
        name in "[a-z]{0,3}",
        age in -50i32..50,
        tags in prop::collection::vec(non_string_value(), 0..4),
    ) {
        let input = Value::object([
            ("name", Value::from(name)),
            ("age", Value::from(age)),
            ("tags", Value::Array(tags)),
        ]);
        let result = user_schema().safe_parse(&input);
        let flattened = flatten(result.issues());
        let total = flattened.form_errors.len()
            + flattened.field_errors.values().map(Vec::len).sum::<usize>();
        prop_assert_eq!(total, result.issues().len());
    }
}
