use serde_json::{Map, Value};
use std::collections::HashMap;

/// Renders a mediatee's property map with the message payload as data
/// context.
///
/// Property values may embed `{{path}}` placeholders referencing fields of
/// the payload by dot-separated path; a leading dot is tolerated. Unknown
/// paths render as the empty string.
pub fn render_properties(
    properties: &HashMap<String, String>,
    payload: &Value,
) -> Value {
    let mut rendered = Map::new();

    for (key, value) in properties {
        rendered.insert(key.clone(), Value::String(render(value, payload)));
    }

    Value::Object(rendered)
}

fn render(template: &str, payload: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        rest = &rest[start + 2..];

        match rest.find("}}") {
            Some(end) => {
                let path = rest[..end].trim().trim_start_matches('.');
                out.push_str(&lookup(payload, path));
                rest = &rest[end + 2..];
            }
            None => {
                // unterminated placeholder, emit verbatim
                out.push_str("{{");
                break;
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup(payload: &Value, path: &str) -> String {
    let mut current = payload;

    for segment in path.split('.').filter(|s| !s.is_empty()) {
        match current.get(segment) {
            Some(value) => current = value,
            None => return String::new(),
        }
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
