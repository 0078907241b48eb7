//! Customers Data

/// Check an email address against the simple `local@domain.tld` pattern.
///
/// This deliberately stays a shallow shape check: one `@`, a non-empty local
/// part, and a domain with a non-empty label on each side of a dot.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !host.is_empty()
        && !tld.is_empty()
        && !domain.contains('@')
        && !domain.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("gomez@example.com"));
        assert!(is_valid_email("ventas.mayorista@distribuidora.com.ar"));
    }

    #[test]
    fn rejects_missing_parts() {
        assert!(!is_valid_email("gomez"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("gomez@"));
        assert!(!is_valid_email("gomez@example"));
        assert!(!is_valid_email("gomez@.com"));
        assert!(!is_valid_email("gomez@example."));
    }

    #[test]
    fn rejects_whitespace_and_double_at() {
        assert!(!is_valid_email("go mez@example.com"));
        assert!(!is_valid_email("gomez@exa mple.com"));
        assert!(!is_valid_email("gomez@@example.com"));
    }
}
