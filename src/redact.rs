//! Masking of card data before it reaches the logs

use serde_json::{Map, Value};

/// Replacement for security codes
pub const MASKED_SECURITY_CODE: &str = "***";

/// Mask all but the last four characters of a card number
pub fn mask_card_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() > 4 {
        let visible: String = chars[chars.len() - 4..].iter().collect();
        "*".repeat(chars.len() - 4) + &visible
    } else {
        "*".repeat(chars.len())
    }
}

fn is_card_number_key(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k == "number" || k == "pan" || k.contains("cardnumber") || k.contains("card_number")
}

fn is_security_code_key(key: &str) -> bool {
    let k = key.to_ascii_lowercase();
    k.contains("securitycode")
        || k.contains("security_code")
        || k.contains("cvv")
        || k.contains("cvc")
}

/// Return a copy of `value` with card numbers and security codes masked
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::with_capacity(map.len());
            for (key, val) in map {
                let new_val = match val {
                    Value::String(s) if is_card_number_key(key) => {
                        Value::String(mask_card_number(s))
                    }
                    Value::Number(n) if is_card_number_key(key) => {
                        Value::String(mask_card_number(&n.to_string()))
                    }
                    Value::String(_) | Value::Number(_) if is_security_code_key(key) => {
                        Value::String(MASKED_SECURITY_CODE.to_string())
                    }
                    _ => redact_value(val),
                };
                redacted.insert(key.clone(), new_val);
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

/// Render a response body for logging
///
/// JSON bodies are redacted; anything else is reduced to its length.
pub fn redact_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => redact_value(&value).to_string(),
        Err(_) => format!("<{} bytes of non-JSON content>", body.len()),
    }
}
