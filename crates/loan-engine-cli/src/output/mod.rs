pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text. Decimals arrive as strings.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into dotted keys (`resolved.installment`).
/// Arrays are left for the caller to render separately.
pub(crate) fn flatten_scalars(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    if let Value::Object(map) = value {
        for (key, val) in map {
            let name = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match val {
                Value::Object(_) => flatten_scalars(&name, val, out),
                Value::Array(_) => {}
                _ => out.push((name, val.clone())),
            }
        }
    }
}

/// Arrays of objects held directly in a result (e.g. `schedule`, `loans`).
pub(crate) fn row_arrays(value: &Value) -> Vec<(&str, &Vec<Value>)> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| match v {
                Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
                    Some((k.as_str(), rows))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
