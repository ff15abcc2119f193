//! Conditional visibility resolution.
//!
//! A field with `conditionalLogic` is shown only while the field it depends on
//! holds one of the expected values. Hidden fields keep their stored value and
//! are exempt from validation.

use serde_json::Value;
use std::collections::HashMap;

use crate::domain::{FormField, FormSchema, FormValues, ShowWhen};

/// Whether `field` is currently shown for the given form state
pub fn is_visible(field: &FormField, values: &FormValues) -> bool {
    let Some(logic) = &field.conditional_logic else {
        return true;
    };
    let Some(dependent) = values.get(&logic.depends_on) else {
        return false;
    };
    match &logic.show_when {
        ShowWhen::AnyOf(expected) => expected.iter().any(|v| strict_equals(v, dependent)),
        ShowWhen::Equals(expected) => strict_equals(expected, dependent),
    }
}

/// Identity comparison for scalars. Lists and objects never compare equal,
/// so a rule can only match a scalar dependency value.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

/// Finds a loop in the `dependsOn` graph.
///
/// Each field depends on at most one other field, so following the chain
/// from every field either terminates or revisits a field on the current
/// path. Returns the loop as a path that starts and ends on the same id.
pub fn find_dependency_cycle(schema: &FormSchema) -> Option<Vec<String>> {
    let edges: HashMap<&str, &str> = schema
        .all_fields()
        .filter_map(|f| {
            f.conditional_logic
                .as_ref()
                .map(|logic| (f.id.as_str(), logic.depends_on.as_str()))
        })
        .collect();

    // 0 = unvisited, 1 = on current path, 2 = known acyclic
    let mut state: HashMap<&str, u8> = HashMap::new();

    for start in schema.all_fields().map(|f| f.id.as_str()) {
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(start);

        while let Some(id) = current {
            match state.get(id).copied().unwrap_or(0) {
                2 => break,
                1 => {
                    let from = path.iter().position(|p| *p == id).unwrap_or(0);
                    let mut cycle: Vec<String> = path[from..].iter().map(|s| s.to_string()).collect();
                    cycle.push(id.to_string());
                    return Some(cycle);
                }
                _ => {
                    state.insert(id, 1);
                    path.push(id);
                    current = edges.get(id).copied();
                }
            }
        }

        for id in path {
            state.insert(id, 2);
        }
    }

    None
}
