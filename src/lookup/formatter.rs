//! CEP normalization, validation and per-provider formatting.

use super::types::CepFormat;

/// Number of digits in a well-formed CEP.
pub const CEP_DIGITS: usize = 8;

/// Strip every non-digit character.
pub fn normalize(cep: &str) -> String {
    cep.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// True iff the input reduces to exactly 8 digits.
pub fn validate(cep: &str) -> bool {
    normalize(cep).len() == CEP_DIGITS
}

/// Reshape `cep` into the form a provider asked for.
///
/// `Hyphenated` does not guard short input: it takes whatever of the
/// first five and next three digits exist, so `"0131"` becomes `"0131-"`.
pub fn format(cep: &str, required: CepFormat) -> String {
    match required {
        CepFormat::DigitsOnly => normalize(cep),
        CepFormat::Hyphenated => {
            let digits = normalize(cep);
            let head: String = digits.chars().take(5).collect();
            let tail: String = digits.chars().skip(5).take(3).collect();
            format!("{}-{}", head, tail)
        }
        CepFormat::Any => cep.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("01310-930"), "01310930");
        assert_eq!(normalize(" 01.310-930 "), "01310930");
        assert_eq!(normalize("abc"), "");
    }

    #[test]
    fn test_validate() {
        assert!(validate("01310-930"));
        assert!(validate("01310930"));
        assert!(validate("CEP: 01310 930"));
        assert!(!validate("123"));
        assert!(!validate("013109300"));
        assert!(!validate(""));
    }

    #[test]
    fn test_validate_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not CEP digits.
        assert!(!validate("٠١٣١٠٩٣٠"));
    }

    #[test]
    fn test_format_hyphenated() {
        assert_eq!(format("01310930", CepFormat::Hyphenated), "01310-930");
        assert_eq!(format("01310-930", CepFormat::Hyphenated), "01310-930");
    }

    #[test]
    fn test_format_hyphenated_short_input() {
        assert_eq!(format("0131", CepFormat::Hyphenated), "0131-");
        assert_eq!(format("013109", CepFormat::Hyphenated), "01310-9");
    }

    #[test]
    fn test_format_digits_only() {
        assert_eq!(format("01310-930", CepFormat::DigitsOnly), "01310930");
    }

    #[test]
    fn test_format_any_keeps_original() {
        assert_eq!(format(" 01310-930", CepFormat::Any), " 01310-930");
    }
}
