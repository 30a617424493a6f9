//! Client-side form pre-checks.
//!
//! These run before any network call so forms can reject bad input
//! instantly. They are a UX fast path only: the backend re-validates
//! everything authoritatively, and the disposable-domain list here is a
//! subset of the server's.

use crate::error::{Error, Result};

/// Disposable email domains rejected client-side (subset of the backend list).
const DISPOSABLE_EMAIL_DOMAINS: &[&str] = &[
    "tempmail.com",
    "temp-mail.org",
    "guerrillamail.com",
    "guerrillamail.org",
    "guerrillamail.net",
    "guerrillamail.biz",
    "guerrillamailblock.com",
    "mailinator.com",
    "10minutemail.com",
    "throwaway.email",
    "fakeinbox.com",
    "trashmail.com",
    "mailnesia.com",
    "tempail.com",
    "dispostable.com",
    "yopmail.com",
    "sharklasers.com",
    "getnada.com",
    "maildrop.cc",
    "mohmal.com",
    "tempmailo.com",
    "emailondeck.com",
    "tempr.email",
    "throwawaymail.com",
    "mintemail.com",
    "mailcatch.com",
    "33mail.com",
    "spam4.me",
    "spamgourmet.com",
    "mytrashmail.com",
    "mt2009.com",
    "thankyou2010.com",
    "trash2009.com",
    "mt2014.com",
    "trashymail.com",
    "discard.email",
    "discardmail.com",
    "spambog.com",
    "spambog.de",
    "spamavert.com",
    "tempomail.fr",
    "jetable.org",
    "kasmail.com",
    "spamfree24.org",
    "grr.la",
    "pokemail.net",
    "spam.la",
    "mailexpire.com",
    "tempinbox.com",
    "anonymbox.com",
    "binkmail.com",
    "safetymail.info",
    "mailmoat.com",
    "mailnull.com",
    "e4ward.com",
    "spamex.com",
    "getonemail.com",
    "mailscrap.com",
    "mailzilla.com",
    "soodonims.com",
    "email-fake.com",
];

const MIN_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 100;
const MIN_ALIAS_LEN: usize = 3;
const MAX_ALIAS_LEN: usize = 50;

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Validates an email address: shape plus disposable-domain rejection.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(Error::Validation("Email is required".into()));
    }
    if !has_email_shape(email) {
        return Err(Error::Validation(
            "Please enter a valid email address".into(),
        ));
    }

    let domain = email
        .rsplit('@')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    if DISPOSABLE_EMAIL_DOMAINS.contains(&domain.as_str()) {
        return Err(Error::Validation(
            "Temporary/disposable emails are not allowed".into(),
        ));
    }

    Ok(())
}

/// `local@domain.tld`: one `@`, no whitespace, a dot with text on both sides
/// in the domain.
fn has_email_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
}

/// Validates a password against the 8-character minimum.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation("Password is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Per-requirement password strength report for signup forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordStrength {
    /// Number of satisfied requirements, 0..=5.
    #[must_use]
    pub fn score(self) -> u8 {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.digit,
            self.special,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }

    /// Only the length requirement is mandatory; the rest feed the meter.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.length
    }
}

/// Scores a password against the five strength requirements.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    PasswordStrength {
        length: password.chars().count() >= MIN_PASSWORD_LEN,
        uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        digit: password.chars().any(|c| c.is_ascii_digit()),
        special: password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)),
    }
}

/// Validates a display name: 2..=100 characters after trimming.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("Name is required".into()));
    }
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(Error::Validation(
            "Name must be at least 2 characters".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation("Name is too long".into()));
    }
    Ok(())
}

/// Validates the password-confirmation field against the password.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_confirm_password(password: &str, confirm: &str) -> Result<()> {
    if confirm.is_empty() {
        return Err(Error::Validation("Please confirm your password".into()));
    }
    if password != confirm {
        return Err(Error::Validation("Passwords do not match".into()));
    }
    Ok(())
}

/// Validates a custom alias: 3..=50 characters from `[A-Za-z0-9_-]`,
/// mirroring the backend's field constraints.
///
/// # Errors
///
/// Returns [`Error::Validation`] with a user-facing message.
pub fn validate_alias(alias: &str) -> Result<()> {
    let len = alias.chars().count();
    if !(MIN_ALIAS_LEN..=MAX_ALIAS_LEN).contains(&len) {
        return Err(Error::Validation(
            "Alias must be between 3 and 50 characters".into(),
        ));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Validation(
            "Alias may only contain letters, numbers, hyphens and underscores".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result.unwrap_err() {
            Error::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_email_passes() {
        assert!(validate_email("user@company.com").is_ok());
        assert!(validate_email("first.last@sub.company.co").is_ok());
    }

    #[test]
    fn empty_email_is_required() {
        assert_eq!(message(validate_email("")), "Email is required");
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["plainaddress", "no@tld", "two@@example.com", "a b@c.com", "@c.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn disposable_domain_is_rejected_case_insensitively() {
        assert_eq!(
            message(validate_email("user@mailinator.com")),
            "Temporary/disposable emails are not allowed"
        );
        assert!(validate_email("user@Mailinator.COM").is_err());
    }

    #[test]
    fn short_password_fails_minimum() {
        assert_eq!(
            message(validate_password("short")),
            "Password must be at least 8 characters"
        );
        assert!(validate_password("").is_err());
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn strong_password_meets_all_requirements() {
        let strength = password_strength("Str0ng!Pass");
        assert!(strength.length);
        assert!(strength.uppercase);
        assert!(strength.lowercase);
        assert!(strength.digit);
        assert!(strength.special);
        assert_eq!(strength.score(), 5);
        assert!(strength.is_valid());
    }

    #[test]
    fn weak_password_scores_low() {
        let strength = password_strength("abc");
        assert_eq!(strength.score(), 1); // lowercase only
        assert!(!strength.is_valid());
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("Jo").is_ok());
        assert_eq!(message(validate_name("")), "Name is required");
        assert_eq!(
            message(validate_name(" a ")),
            "Name must be at least 2 characters"
        );
        assert_eq!(message(validate_name(&"x".repeat(101))), "Name is too long");
    }

    #[test]
    fn confirm_password_must_match() {
        assert!(validate_confirm_password("secret12", "secret12").is_ok());
        assert_eq!(
            message(validate_confirm_password("secret12", "")),
            "Please confirm your password"
        );
        assert_eq!(
            message(validate_confirm_password("secret12", "secret13")),
            "Passwords do not match"
        );
    }

    #[test]
    fn alias_charset_and_length() {
        assert!(validate_alias("demo").is_ok());
        assert!(validate_alias("my-link_2024").is_ok());
        assert!(validate_alias("ab").is_err());
        assert!(validate_alias(&"a".repeat(51)).is_err());
        assert!(validate_alias("has space").is_err());
        assert!(validate_alias("emoji✨").is_err());
    }
}
