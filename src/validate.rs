//! Client-side form validation.
//!
//! Runs before any network call and short-circuits it entirely; trivially
//! invalid input never reaches the service.

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Simple `local@domain.tld` shape check: exactly one `@`, no whitespace,
/// and a dot somewhere in the domain with a non-empty part on each side.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn validate_login(username: &str, password: &str) -> Result<(), &'static str> {
    if is_blank(username) || is_blank(password) {
        return Err(MSG_FILL_ALL_FIELDS);
    }
    Ok(())
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), &'static str> {
    if is_blank(username) || is_blank(email) || is_blank(password) || is_blank(confirm_password) {
        return Err(MSG_FILL_ALL_FIELDS);
    }
    if !is_valid_email(email) {
        return Err(MSG_INVALID_EMAIL);
    }
    if password != confirm_password {
        return Err(MSG_PASSWORD_MISMATCH);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejects_empty_and_whitespace_fields() {
        assert_eq!(validate_login("", ""), Err(MSG_FILL_ALL_FIELDS));
        assert_eq!(validate_login("alice", ""), Err(MSG_FILL_ALL_FIELDS));
        assert_eq!(validate_login("", "hunter2"), Err(MSG_FILL_ALL_FIELDS));
        assert_eq!(validate_login("   ", "hunter2"), Err(MSG_FILL_ALL_FIELDS));
        assert_eq!(validate_login("alice", "\t "), Err(MSG_FILL_ALL_FIELDS));
    }

    #[test]
    fn login_accepts_filled_fields() {
        assert_eq!(validate_login("alice", "hunter2"), Ok(()));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b@sub.example.co"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("missing@dot"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice@example."));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spa ce@example.com"));
    }

    #[test]
    fn registration_rejects_bad_email_before_anything_else() {
        assert_eq!(
            validate_registration("alice", "not-an-email", "pw", "pw"),
            Err(MSG_INVALID_EMAIL)
        );
    }

    #[test]
    fn registration_rejects_password_mismatch() {
        assert_eq!(
            validate_registration("alice", "alice@example.com", "pw1", "pw2"),
            Err(MSG_PASSWORD_MISMATCH)
        );
    }

    #[test]
    fn registration_rejects_any_empty_field() {
        assert_eq!(
            validate_registration("alice", "alice@example.com", "", ""),
            Err(MSG_FILL_ALL_FIELDS)
        );
        assert_eq!(
            validate_registration("", "alice@example.com", "pw", "pw"),
            Err(MSG_FILL_ALL_FIELDS)
        );
    }

    #[test]
    fn registration_accepts_well_formed_input() {
        assert_eq!(
            validate_registration("alice", "alice@example.com", "pw", "pw"),
            Ok(())
        );
    }
}
