use sha2::{Digest, Sha512};

/// The `jp_checksum` field: SHA-512 over `buyer_name || ag_token || order_no || total_amount`, with no separators,
/// as lowercase hex.
pub fn calculate_checksum(buyer_name: &str, ag_token: &str, order_no: &str, total_amount: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(buyer_name.as_bytes());
    hasher.update(ag_token.as_bytes());
    hasher.update(order_no.as_bytes());
    hasher.update(total_amount.as_bytes());
    hex::encode(hasher.finalize())
}

/// Minimal escaping for values placed inside HTML attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
