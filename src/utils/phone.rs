use regex::Regex;
use std::sync::OnceLock;

pub const MIN_DIGITS: usize = 10;
pub const MAX_DIGITS: usize = 15;

fn non_digits() -> &'static Regex {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    NON_DIGITS.get_or_init(|| Regex::new(r"\D").expect("Invalid non-digit regex"))
}

/// Strips everything but ASCII digits, keeping any country code.
pub fn normalize(phone: &str) -> String {
    non_digits().replace_all(phone, "").into_owned()
}

pub fn is_valid(phone: &str) -> bool {
    let digits = normalize(phone).len();
    (MIN_DIGITS..=MAX_DIGITS).contains(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_spaces() {
        assert_eq!(normalize("+91 98765-43210"), "919876543210");
        assert_eq!(normalize("(987) 654.3210"), "9876543210");
        assert_eq!(normalize("9876543210"), "9876543210");
    }

    #[test]
    fn normalize_of_garbage_is_empty() {
        assert_eq!(normalize("phone"), "");
    }

    #[test]
    fn validity_is_judged_on_digits_only() {
        assert!(is_valid("+91 98765-43210"));
        assert!(is_valid("9876543210"));
        assert!(!is_valid("12345"));
        assert!(!is_valid("1234567890123456"));
        assert!(!is_valid("+1 (555) 12"));
    }
}
