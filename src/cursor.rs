use base64::{engine::general_purpose::STANDARD, Engine as _};

pub fn encode_cursor(id: u64) -> String {
    STANDARD.encode(id.to_string())
}

pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes = STANDARD.decode(cursor).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}
