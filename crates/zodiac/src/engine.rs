//! The recursive validator.
//!
//! [`run`] walks a schema tree depth-first against an input value. Every
//! node either returns its output or records issues at the current path;
//! the walk never stops early, so one call reports every problem.

use crate::issue::{Issue, IssueCode, Path, PathSegment};
use crate::options::{ParseOptions, UnknownKeys};
use crate::schema::checks::Refinement;
use crate::schema::{
    ArrayCheck, ArraySchema, DateCheck, DateSchema, Node, NumberCheck, NumberKind, NumberSchema,
    ObjectSchema, Schema, StringCheck, StringSchema,
};
use crate::value::{ABSENT, Map, Value};
use chrono::SecondsFormat;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

// =============================================================================
// Formats
// =============================================================================

static EMAIL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .ok()
});

static URL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").ok());

fn matches(pattern: &Lazy<Option<Regex>>, s: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(s))
}

fn is_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && matches(&EMAIL, s)
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::parse_str(s).is_ok()
}

fn is_datetime(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_multiple(n: f64, step: f64) -> bool {
    let nearest = (n / step).round() * step;
    (n - nearest).abs() <= f64::EPSILON * 4.0 * n.abs().max(step)
}

// =============================================================================
// Context
// =============================================================================

/// Call-local state: the current path and the issues found so far.
struct Context<'o> {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
    options: &'o ParseOptions,
}

impl<'o> Context<'o> {
    fn new(options: &'o ParseOptions, path: Vec<PathSegment>) -> Self {
        Self {
            path,
            issues: Vec::new(),
            options,
        }
    }

    fn push(&mut self, issue: Issue) {
        let issue = issue.at(Path::from(self.path.clone()));
        trace!(path = %issue.path, code = %issue.code, "Validation issue recorded");
        self.issues.push(issue);
    }

    fn report(&mut self, code: IssueCode, message: impl Into<String>) {
        self.push(Issue::new(code, message));
    }

    fn refinement<C>(
        &mut self,
        refinement: &Refinement<C>,
        code: IssueCode,
        default: impl FnOnce() -> String,
    ) {
        let message = refinement.message_or_else(default);
        self.report(code, message);
    }

    fn mismatch(&mut self, expected: &str, type_message: Option<&String>, value: &Value) {
        match type_message {
            Some(message) => self.report(IssueCode::TypeMismatch, message.clone()),
            None => self.report(
                IssueCode::TypeMismatch,
                format!("Expected {expected}, received {}", value.kind()),
            ),
        }
    }

    fn required(&mut self, type_message: Option<&String>) {
        let message = type_message.map_or("Required", String::as_str).to_string();
        self.report(IssueCode::Required, message);
    }

    fn nested<T>(
        &mut self,
        segment: impl Into<PathSegment>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.path.push(segment.into());
        let out = f(self);
        self.path.pop();
        out
    }

    fn mark(&self) -> usize {
        self.issues.len()
    }

    fn clean_since(&self, mark: usize) -> bool {
        self.issues.len() == mark
    }
}

/// Validate `input` against `schema`. Returns the output value, or every
/// issue found.
pub(crate) fn run(
    schema: &Schema,
    input: &Value,
    options: &ParseOptions,
) -> Result<Value, Vec<Issue>> {
    let mut cx = Context::new(options, Vec::new());
    match validate(schema, input, &mut cx) {
        Some(output) if cx.issues.is_empty() => Ok(output),
        _ => Err(cx.issues),
    }
}

/// Returns `Some` exactly when no issue was recorded for this subtree.
fn validate(schema: &Schema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    match schema.node() {
        Node::Optional(inner) => match value {
            Value::Absent => Some(Value::Absent),
            _ => validate(inner, value, cx),
        },
        Node::Nullable(inner) => match value {
            Value::Null => Some(Value::Null),
            _ => validate(inner, value, cx),
        },
        Node::Nullish(inner) => match value {
            Value::Absent | Value::Null => Some(value.clone()),
            _ => validate(inner, value, cx),
        },
        Node::Default(inner, default) => match value {
            Value::Absent => validate(inner, default, cx),
            _ => validate(inner, value, cx),
        },
        Node::Coerced(inner, coercion) => {
            if value.is_absent() {
                return validate(inner, value, cx);
            }
            match coercion.apply(value) {
                Some(coerced) => validate(inner, &coerced, cx),
                None => {
                    let (expected, type_message) = expectation(inner);
                    trace!(coercion = coercion.name(), "Coercion failed");
                    cx.mismatch(expected, type_message, value);
                    None
                }
            }
        }
        Node::Refined(inner, refine) => {
            let output = validate(inner, value, cx)?;
            if (refine.predicate)(&output) {
                Some(output)
            } else {
                cx.report(IssueCode::Custom, refine.message.clone());
                None
            }
        }
        Node::Unknown => Some(value.clone()),
        Node::Void => match value {
            Value::Absent => Some(Value::Absent),
            _ => {
                cx.mismatch("void", None, value);
                None
            }
        },
        Node::Union(alternatives) => validate_union(alternatives, value, cx),
        _ if value.is_absent() => {
            cx.required(expectation(schema).1);
            None
        }
        Node::String(s) => validate_string(s, value, cx),
        Node::Number(n) => validate_number(n, value, cx),
        Node::Boolean(b) => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => {
                cx.mismatch("boolean", b.type_message.as_ref(), value);
                None
            }
        },
        Node::Date(d) => validate_date(d, value, cx),
        Node::Literal(expected) => {
            if value == expected {
                Some(value.clone())
            } else {
                cx.report(
                    IssueCode::InvalidLiteral,
                    format!("Invalid literal value, expected {expected}"),
                );
                None
            }
        }
        Node::Enum(options) => match value {
            Value::String(s) if options.contains(s) => Some(value.clone()),
            _ => {
                let expected = options
                    .iter()
                    .map(|o| format!("'{o}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                let received = match value {
                    Value::String(s) => format!("'{s}'"),
                    other => other.to_string(),
                };
                cx.report(
                    IssueCode::InvalidEnumValue,
                    format!("Invalid enum value. Expected {expected}, received {received}"),
                );
                None
            }
        },
        Node::Object(object) => validate_object(object, value, cx),
        Node::Array(array) => validate_array(array, value, cx),
        Node::Tuple(items) => validate_tuple(items, value, cx),
        Node::Record(key, item) => validate_record(key, item, value, cx),
    }
}

/// What a schema expects, for type-mismatch and required messages.
fn expectation(schema: &Schema) -> (&'static str, Option<&String>) {
    match schema.node() {
        Node::String(s) => ("string", s.type_message.as_ref()),
        Node::Number(n) => match n.kind {
            NumberKind::Integer => ("integer", n.type_message.as_ref()),
            NumberKind::Float => ("number", n.type_message.as_ref()),
        },
        Node::Boolean(b) => ("boolean", b.type_message.as_ref()),
        Node::Date(d) => ("date", d.type_message.as_ref()),
        Node::Object(o) => ("object", o.type_message.as_ref()),
        Node::Array(a) => ("array", a.type_message.as_ref()),
        Node::Tuple(_) => ("array", None),
        Node::Record(..) => ("object", None),
        Node::Enum(_) => ("string", None),
        Node::Literal(_) => ("literal", None),
        Node::Union(_) => ("union", None),
        Node::Unknown => ("unknown", None),
        Node::Void => ("void", None),
        Node::Optional(inner)
        | Node::Nullable(inner)
        | Node::Nullish(inner)
        | Node::Default(inner, _)
        | Node::Coerced(inner, _)
        | Node::Refined(inner, _) => expectation(inner),
    }
}

// =============================================================================
// Primitives
// =============================================================================

fn validate_string(schema: &StringSchema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let Value::String(s) = value else {
        cx.mismatch("string", schema.type_message.as_ref(), value);
        return None;
    };
    let mark = cx.mark();
    let len = s.chars().count();

    for r in &schema.checks {
        match &r.check {
            StringCheck::Min(min) if len < *min => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    format!("String must contain at least {min} character(s)")
                });
            }
            StringCheck::Max(max) if len > *max => {
                cx.refinement(r, IssueCode::TooLarge, || {
                    format!("String must contain at most {max} character(s)")
                });
            }
            StringCheck::Length(exact) if len != *exact => {
                let code = if len < *exact {
                    IssueCode::TooSmall
                } else {
                    IssueCode::TooLarge
                };
                cx.refinement(r, code, || {
                    format!("String must contain exactly {exact} character(s)")
                });
            }
            StringCheck::Email if !is_email(s) => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Invalid email".into());
            }
            StringCheck::Url if !matches(&URL, s) => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Invalid url".into());
            }
            StringCheck::Uuid if !is_uuid(s) => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Invalid uuid".into());
            }
            StringCheck::Regex(re) if !re.is_match(s) => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Invalid".into());
            }
            StringCheck::StartsWith(prefix) if !s.starts_with(prefix.as_str()) => {
                cx.refinement(r, IssueCode::InvalidFormat, || {
                    format!("Invalid input: must start with \"{prefix}\"")
                });
            }
            StringCheck::EndsWith(suffix) if !s.ends_with(suffix.as_str()) => {
                cx.refinement(r, IssueCode::InvalidFormat, || {
                    format!("Invalid input: must end with \"{suffix}\"")
                });
            }
            StringCheck::DateTime if !is_datetime(s) => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Invalid datetime".into());
            }
            _ => {}
        }
    }

    cx.clean_since(mark).then(|| value.clone())
}

fn validate_number(schema: &NumberSchema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let n = match value {
        Value::Number(n) if !n.is_nan() => *n,
        _ => {
            let expected = match schema.kind {
                NumberKind::Integer => "integer",
                NumberKind::Float => "number",
            };
            cx.mismatch(expected, schema.type_message.as_ref(), value);
            return None;
        }
    };
    if schema.kind == NumberKind::Integer && !(n.is_finite() && n.fract() == 0.0) {
        match &schema.type_message {
            Some(message) => cx.report(IssueCode::TypeMismatch, message.clone()),
            None => cx.report(IssueCode::TypeMismatch, "Expected integer, received float"),
        }
        return None;
    }
    let mark = cx.mark();

    for r in &schema.checks {
        match r.check {
            NumberCheck::Gte(min) if n < min => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    format!("Number must be greater than or equal to {min}")
                });
            }
            NumberCheck::Gt(min) if n <= min => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    format!("Number must be greater than {min}")
                });
            }
            NumberCheck::Lte(max) if n > max => {
                cx.refinement(r, IssueCode::TooLarge, || {
                    format!("Number must be less than or equal to {max}")
                });
            }
            NumberCheck::Lt(max) if n >= max => {
                cx.refinement(r, IssueCode::TooLarge, || {
                    format!("Number must be less than {max}")
                });
            }
            NumberCheck::Int if !(n.is_finite() && n.fract() == 0.0) => {
                cx.refinement(r, IssueCode::InvalidFormat, || {
                    "Expected integer, received float".into()
                });
            }
            NumberCheck::Finite if !n.is_finite() => {
                cx.refinement(r, IssueCode::InvalidFormat, || "Number must be finite".into());
            }
            NumberCheck::MultipleOf(step) if !is_multiple(n, step) => {
                cx.refinement(r, IssueCode::InvalidFormat, || {
                    format!("Number must be a multiple of {step}")
                });
            }
            _ => {}
        }
    }

    cx.clean_since(mark).then(|| value.clone())
}

fn validate_date(schema: &DateSchema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let Value::Date(date) = value else {
        cx.mismatch("date", schema.type_message.as_ref(), value);
        return None;
    };
    let mark = cx.mark();

    for r in &schema.checks {
        match r.check {
            DateCheck::Min(min) if *date < min => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    format!(
                        "Date must be greater than or equal to {}",
                        min.to_rfc3339_opts(SecondsFormat::Millis, true)
                    )
                });
            }
            DateCheck::Max(max) if *date > max => {
                cx.refinement(r, IssueCode::TooLarge, || {
                    format!(
                        "Date must be less than or equal to {}",
                        max.to_rfc3339_opts(SecondsFormat::Millis, true)
                    )
                });
            }
            _ => {}
        }
    }

    cx.clean_since(mark).then(|| value.clone())
}

// =============================================================================
// Composites
// =============================================================================

fn validate_object(schema: &ObjectSchema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let Value::Object(input) = value else {
        cx.mismatch("object", schema.type_message.as_ref(), value);
        return None;
    };
    let mark = cx.mark();
    let mut output = Map::with_capacity(schema.fields.len());

    for (name, field) in &schema.fields {
        let item = input.get(name).unwrap_or(&ABSENT);
        match cx.nested(name.as_str(), |cx| validate(field, item, cx)) {
            Some(Value::Absent) | None => {}
            Some(out) => {
                output.insert(name.clone(), out);
            }
        }
    }

    let policy = cx.options.unknown_keys.unwrap_or(schema.unknown_keys);
    let unknown = input
        .iter()
        .filter(|(key, item)| !item.is_absent() && !schema.fields.contains_key(key.as_str()));
    match policy {
        UnknownKeys::Strip => {}
        UnknownKeys::Passthrough => {
            for (key, item) in unknown {
                output.insert(key.clone(), item.clone());
            }
        }
        UnknownKeys::Strict => {
            let keys: Vec<String> = unknown.map(|(key, _)| key.clone()).collect();
            if !keys.is_empty() {
                let listed = keys
                    .iter()
                    .map(|k| format!("'{k}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                cx.push(
                    Issue::new(
                        IssueCode::UnrecognizedKeys,
                        format!("Unrecognized key(s) in object: {listed}"),
                    )
                    .with_keys(keys),
                );
            }
        }
    }

    cx.clean_since(mark).then_some(Value::Object(output))
}

fn validate_array(schema: &ArraySchema, value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let Value::Array(items) = value else {
        cx.mismatch("array", schema.type_message.as_ref(), value);
        return None;
    };
    let mark = cx.mark();
    let len = items.len();

    let (nonempty, sized): (Vec<_>, Vec<_>) = schema
        .checks
        .iter()
        .partition(|r| matches!(r.check, ArrayCheck::NonEmpty));
    for r in nonempty.into_iter().chain(sized) {
        match r.check {
            ArrayCheck::NonEmpty if len == 0 => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    "Array must contain at least 1 element(s)".into()
                });
            }
            ArrayCheck::Min(min) if len < min => {
                cx.refinement(r, IssueCode::TooSmall, || {
                    format!("Array must contain at least {min} element(s)")
                });
            }
            ArrayCheck::Max(max) if len > max => {
                cx.refinement(r, IssueCode::TooLarge, || {
                    format!("Array must contain at most {max} element(s)")
                });
            }
            ArrayCheck::Length(exact) if len != exact => {
                let code = if len < exact {
                    IssueCode::TooSmall
                } else {
                    IssueCode::TooLarge
                };
                cx.refinement(r, code, || {
                    format!("Array must contain exactly {exact} element(s)")
                });
            }
            _ => {}
        }
    }

    let output: Vec<Value> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| cx.nested(index, |cx| validate(&schema.element, item, cx)))
        .collect();

    cx.clean_since(mark).then_some(Value::Array(output))
}

fn validate_tuple(items: &[Schema], value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let Value::Array(input) = value else {
        cx.mismatch("array", None, value);
        return None;
    };
    if input.len() != items.len() {
        cx.report(
            IssueCode::TypeMismatch,
            format!(
                "Expected tuple of {} item(s), received {}",
                items.len(),
                input.len()
            ),
        );
        return None;
    }
    let mark = cx.mark();

    let output: Vec<Value> = items
        .iter()
        .zip(input)
        .enumerate()
        .filter_map(|(index, (schema, item))| cx.nested(index, |cx| validate(schema, item, cx)))
        .collect();

    cx.clean_since(mark).then_some(Value::Array(output))
}

fn validate_record(
    key_schema: &Schema,
    value_schema: &Schema,
    value: &Value,
    cx: &mut Context<'_>,
) -> Option<Value> {
    let Value::Object(input) = value else {
        cx.mismatch("object", None, value);
        return None;
    };
    let mark = cx.mark();
    let mut output = Map::with_capacity(input.len());

    for (key, item) in input {
        if item.is_absent() {
            continue;
        }
        let entry = cx.nested(key.as_str(), |cx| {
            let key_out = validate(key_schema, &Value::String(key.clone()), cx);
            let item_out = validate(value_schema, item, cx);
            key_out.zip(item_out)
        });
        if let Some((key_out, item_out)) = entry {
            let key = match key_out {
                Value::String(s) => s,
                _ => key.clone(),
            };
            output.insert(key, item_out);
        }
    }

    cx.clean_since(mark).then_some(Value::Object(output))
}

fn validate_union(alternatives: &[Schema], value: &Value, cx: &mut Context<'_>) -> Option<Value> {
    let mut failures = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        let mut attempt = Context::new(cx.options, cx.path.clone());
        match validate(alternative, value, &mut attempt) {
            Some(output) if attempt.issues.is_empty() => return Some(output),
            _ => failures.push(attempt.issues),
        }
    }

    let mut issue = Issue::new(IssueCode::InvalidUnion, "Invalid input");
    if cx.options.union_errors {
        issue = issue.with_union_errors(failures);
    }
    cx.push(issue);
    None
}
