use std::fmt::Write;

/// Lowercase hex rendering used when binary column data has to travel as text.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 * bytes.len());
    for b in bytes {
        // Writing into a String cannot fail.
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Normalises the textual spellings drivers use for booleans.
pub fn normalize_bool(text: &str) -> Option<&'static str> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some("true"),
        "false" | "f" | "0" | "no" | "n" => Some("false"),
        _ => None,
    }
}
