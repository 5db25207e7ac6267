/// Validate the basic `local@domain.tld` shape of an email address.
///
/// Intentionally loose: the goal is catching obvious garbage at the
/// signup endpoint, not RFC 5322 conformance. Accepts exactly the set the
/// site has always accepted: a non-empty local part, a single `@`, and a
/// domain containing at least one dot with non-empty sides. Whitespace
/// anywhere rejects the address.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must contain a dot with non-empty text on both sides. The
    // sides may themselves contain dots, so forms like "a@b.c." pass,
    // exactly as the historical shape check accepted them.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
