use serde_json::{Map, Value};

/// Print just the key answer value from the output.
///
/// Looks for well-known fields in the result envelope, then in its nested
/// `results` summary, before falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "total_monthly_payment",
        "monthly_payment",
        "tax_rate",
    ];

    if let Value::Object(map) = result_obj {
        let nested = map.get("results").and_then(Value::as_object);
        for scope in std::iter::once(map).chain(nested) {
            if let Some(val) = find_priority(scope, &priority_keys) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_priority<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
