const VISIBLE_PREFIX: usize = 4;
const MIN_MASKABLE_LENGTH: usize = 12;

/// Renders a credential for logs: a short prefix and the length, never the
/// full value.
pub fn mask_secret(secret: Option<&str>) -> String {
    let trimmed = match secret.map(str::trim) {
        None | Some("") => return String::from("[MISSING]"),
        Some(s) => s,
    };

    let chars = trimmed.chars().count();
    if chars < MIN_MASKABLE_LENGTH {
        return format!("[REDACTED] ({} chars)", chars);
    }

    let prefix: String = trimmed.chars().take(VISIBLE_PREFIX).collect();
    format!("{}… ({} chars)", prefix, chars)
}
