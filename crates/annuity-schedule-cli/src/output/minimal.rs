use serde_json::Value;

/// Schedule headline figures, in the order they are printed.
const HEADLINE_KEYS: [&str; 3] = ["monthly_payment", "total_interest", "total_sum"];

/// Print the headline figures of a schedule on one line
/// (`monthly_payment=... total_interest=... total_sum=...`).
///
/// Anything that is not a schedule envelope is printed as-is.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let parts: Vec<String> = HEADLINE_KEYS
            .iter()
            .filter_map(|key| {
                map.get(*key)
                    .filter(|v| !v.is_null())
                    .map(|v| format!("{}={}", key, format_minimal(v)))
            })
            .collect();
        if !parts.is_empty() {
            println!("{}", parts.join(" "));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
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
