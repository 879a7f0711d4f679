//! Small helpers for JSON response bodies.

use axum::Json;
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Value, json};

/// Money as a JSON number.
#[must_use]
pub fn money(amount: Decimal) -> Value {
    amount.to_f64().map_or(Value::Null, |v| json!(v))
}

/// Optional money as a JSON number, `null` when missing.
#[must_use]
pub fn money_opt(amount: Option<Decimal>) -> Value {
    amount.map_or(Value::Null, money)
}

/// `YYYY-MM-DD`, or `null`.
#[must_use]
pub fn date_opt(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| json!(d.format("%Y-%m-%d").to_string()))
}

/// `{"success": true}`.
#[must_use]
pub fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// `{"message": ...}`.
#[must_use]
pub fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_money_is_a_number() {
        assert_eq!(money(Decimal::new(125_050, 2)), json!(1250.5));
        assert_eq!(money_opt(None), Value::Null);
    }

    #[test]
    fn test_date_opt() {
        assert_eq!(
            date_opt(NaiveDate::from_ymd_opt(2025, 8, 3)),
            json!("2025-08-03")
        );
        assert_eq!(date_opt(None), Value::Null);
    }
}
