//! Keeps provider payloads and secrets out of logs in full.

/// Characters of a response body kept in log lines and error messages.
const BODY_LOG_LIMIT: usize = 256;

/// Characters of a secret left visible by [`mask_secret`].
const SECRET_VISIBLE_PREFIX: usize = 4;

/// Fold a response body onto one line and cap its length.
///
/// Cloudflare error bodies are pretty-printed JSON; one line per event keeps
/// the log greppable. Longer bodies keep their first characters plus a note
/// with the original byte length.
pub fn truncate_for_log(body: &str) -> String {
    let folded = body.split_whitespace().collect::<Vec<_>>().join(" ");

    match folded.char_indices().nth(BODY_LOG_LIMIT) {
        None => folded,
        Some((cut, _)) => format!("{}... [{} bytes]", &folded[..cut], body.len()),
    }
}

/// Show only the first few characters of a credential.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= SECRET_VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }
    let visible: String = secret.chars().take(SECRET_VISIBLE_PREFIX).collect();
    format!("{visible}****")
}
