use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_scalars, plain, row_arrays};

/// Format output as tables using the tabled crate: one Field/Value table for
/// the scalar results, then one table per row array (schedule, loans).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_field_table(value);
                print_row_arrays(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    print_field_table(result);
    print_row_arrays(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(value: &Value) {
    let mut fields = Vec::new();
    flatten_scalars("", value, &mut fields);
    if fields.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.clone(), plain(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_row_arrays(value: &Value) {
    for (name, rows) in row_arrays(value) {
        println!("\n{}:", name);
        print_array_table(rows);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(first) = arr.first().filter(|v| v.is_object()) {
        let mut header_fields = Vec::new();
        flatten_scalars("", first, &mut header_fields);
        let headers: Vec<String> = header_fields.into_iter().map(|(k, _)| k).collect();

        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(String::as_str));
        for item in arr {
            builder.push_record(row_values(&headers, item));
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", plain(item));
        }
    }
}

/// Cells for one row, in header order.
pub(crate) fn row_values(headers: &[String], item: &Value) -> Vec<String> {
    let mut fields = Vec::new();
    flatten_scalars("", item, &mut fields);
    headers
        .iter()
        .map(|h| {
            fields
                .iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| plain(v))
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_values_follow_headers() {
        let headers = vec!["month".to_string(), "progress.outstanding_balance".to_string()];
        let row = json!({ "progress": { "outstanding_balance": "10" }, "month": 3 });
        assert_eq!(row_values(&headers, &row), vec!["3", "10"]);
    }

    #[test]
    fn test_missing_cell_is_blank() {
        let headers = vec!["month".to_string(), "payment".to_string()];
        let row = json!({ "month": 1 });
        assert_eq!(row_values(&headers, &row), vec!["1", ""]);
    }
}
