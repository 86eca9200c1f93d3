use serde_json::Value;

use super::plain;

/// Print just the solved value.
///
/// For a loan result the answer is whichever parameter was solved for;
/// otherwise the first well-known headline field present is printed.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let solved_key = value
        .pointer("/assumptions/solve_for")
        .and_then(Value::as_str)
        .filter(|_| {
            value.pointer("/assumptions/loan_kind").and_then(Value::as_str) == Some("amortizing")
        })
        .map(|solve_for| match solve_for {
            "tenure" => "/resolved/tenure_months",
            "rate" => "/resolved/annual_rate_pct",
            _ => "/resolved/installment",
        });

    let priority_keys = [
        "/resolved/installment",
        "/outstanding_balance",
        "/total_outstanding",
        "/total_payment",
    ];

    for key in solved_key.into_iter().chain(priority_keys) {
        if let Some(val) = result_obj.pointer(key) {
            if !val.is_null() {
                return plain(val);
            }
        }
    }

    match result_obj {
        Value::Object(map) => map
            .iter()
            .next()
            .map(|(key, val)| format!("{}: {}", key, plain(val)))
            .unwrap_or_default(),
        _ => plain(result_obj),
    }
}
