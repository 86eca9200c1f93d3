use serde_json::Value;
use std::io;

use super::table::row_values;
use super::{flatten_scalars, plain, row_arrays};

/// Write output as CSV to stdout. A result carrying a schedule (or list of
/// loans) is written as one CSV row per entry; otherwise field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = map.get("result").unwrap_or(value);
            if let Some((_, rows)) = row_arrays(body).into_iter().next() {
                write_rows(&mut wtr, rows);
            } else {
                write_fields(&mut wtr, body);
            }
        }
        Value::Array(arr) => {
            write_rows(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&plain(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    let mut fields = Vec::new();
    flatten_scalars("", value, &mut fields);
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in &fields {
        let _ = wtr.write_record([key.clone(), plain(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(first) = arr.first() else {
        return;
    };

    if first.is_object() {
        let mut header_fields = Vec::new();
        flatten_scalars("", first, &mut header_fields);
        let headers: Vec<String> = header_fields.into_iter().map(|(k, _)| k).collect();
        let _ = wtr.write_record(&headers);
        for item in arr {
            let _ = wtr.write_record(row_values(&headers, item));
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&plain(item)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_rows_to_csv() {
        let rows = vec![
            json!({ "month": 1, "payment": "100" }),
            json!({ "month": 2, "payment": "100" }),
        ];
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, &rows);
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(out, "month,payment\n1,100\n2,100\n");
    }
}
