/// Input validators for the public request surface.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_CHIRP_LENGTH: usize = 140;

/// Words replaced by "****" in chirp bodies, matched case-insensitively.
const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates and normalizes an email address.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Length check applied when a password is set or changed. The hasher itself
/// accepts anything; this is a registration policy, not a hashing concern.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Validates a chirp body and replaces profane words.
///
/// Word boundaries are plain spaces; punctuation attached to a word defeats
/// the filter, which matches the original service behavior.
pub fn clean_chirp_body(body: &str) -> Result<String, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::EmptyField("chirp body"));
    }
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ValidationError::TooLong("chirp body", MAX_CHIRP_LENGTH));
    }

    let cleaned = body
        .split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_emails() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("  user.name+tag@sub.example.org  ").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "notanemail", "user@", "@example.com", "user@@example.com"] {
            assert!(is_valid_email(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn password_length_bounds() {
        assert!(is_valid_password("short").is_err());
        assert!(is_valid_password(&"a".repeat(129)).is_err());
        assert!(is_valid_password("secret123").is_ok());
    }

    #[test]
    fn chirp_body_length_limit() {
        assert!(clean_chirp_body(&"a".repeat(141)).is_err());
        assert!(clean_chirp_body(&"a".repeat(140)).is_ok());
        assert!(clean_chirp_body("").is_err());
    }

    #[test]
    fn profane_words_are_masked() {
        let cleaned =
            clean_chirp_body("This is a kerfuffle opinion I need to share with the world").unwrap();
        assert_eq!(
            cleaned,
            "This is a **** opinion I need to share with the world"
        );
    }

    #[test]
    fn masking_is_case_insensitive() {
        assert_eq!(clean_chirp_body("Sharbert!? no, SHARBERT").unwrap(),
            "Sharbert!? no, ****");
    }

    #[test]
    fn clean_bodies_pass_through_unchanged() {
        let body = "I had something interesting for breakfast";
        assert_eq!(clean_chirp_body(body).unwrap(), body);
    }
}
