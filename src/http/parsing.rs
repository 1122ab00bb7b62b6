use serde_json::Value;

/// Pulls the server's message out of an error body such as
/// `{"error":"model 'x' not found"}`.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    if !body_looks_like_json(body) {
        let text = String::from_utf8_lossy(body).trim().to_string();
        return if text.is_empty() { None } else { Some(text) };
    }

    let json_value = serde_json::from_slice::<Value>(body).ok()?;
    match json_value.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

/// Determines if the body content looks like JSON
pub fn body_looks_like_json(body: &[u8]) -> bool {
    if let Ok(text) = std::str::from_utf8(body) {
        let trimmed = text.trim();
        return trimmed.starts_with('{') || trimmed.starts_with('[');
    }
    false
}

pub fn body_is_blank(body: &[u8]) -> bool {
    body.iter().all(|byte| byte.is_ascii_whitespace())
}
