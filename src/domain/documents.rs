//! Brazilian taxpayer documents.
//!
//! Producers are identified either by a CPF (natural persons, 11 digits) or a
//! CNPJ (companies, 14 digits). Documents are persisted as bare digits and only
//! formatted for presentation.

use thiserror::Error;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;
const CNPJ_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_BLOCKLIST: [&str; 1] = ["12345678909"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cpf,
    Cnpj,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Invalid CPF or CNPJ format")]
    Length { digits: usize },
    #[error("Invalid CPF or CNPJ format")]
    CheckDigits { kind: DocumentKind },
}

/// Remove every non-digit character.
pub fn strip_non_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

pub fn document_kind(digits: &str) -> Option<DocumentKind> {
    match digits.len() {
        CPF_LEN => Some(DocumentKind::Cpf),
        CNPJ_LEN => Some(DocumentKind::Cnpj),
        _ => None,
    }
}

/// Strip punctuation and validate check digits, returning the bare digits.
pub fn normalize_document(input: &str) -> Result<String, DocumentError> {
    let digits = strip_non_digits(input);
    let kind = document_kind(&digits).ok_or(DocumentError::Length {
        digits: digits.len(),
    })?;

    let valid = match kind {
        DocumentKind::Cpf => is_valid_cpf(&digits),
        DocumentKind::Cnpj => is_valid_cnpj(&digits),
    };

    if valid {
        Ok(digits)
    } else {
        Err(DocumentError::CheckDigits { kind })
    }
}

pub fn is_valid_cpf(digits: &str) -> bool {
    let Some(values) = digit_values(digits, CPF_LEN) else {
        return false;
    };
    if all_same(&values) || CPF_BLOCKLIST.contains(&digits) {
        return false;
    }

    let first = cpf_check_digit(&values[..9]);
    let second = cpf_check_digit(&values[..10]);
    values[9] == first && values[10] == second
}

pub fn is_valid_cnpj(digits: &str) -> bool {
    let Some(values) = digit_values(digits, CNPJ_LEN) else {
        return false;
    };
    if all_same(&values) {
        return false;
    }

    let first = cnpj_check_digit(&values[..12]);
    let second = cnpj_check_digit(&values[..13]);
    values[12] == first && values[13] == second
}

/// Format a document for display; unknown lengths are returned untouched.
pub fn format_document(input: &str) -> String {
    let digits = strip_non_digits(input);
    match document_kind(&digits) {
        Some(DocumentKind::Cpf) => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        Some(DocumentKind::Cnpj) => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        None => input.to_string(),
    }
}

fn digit_values(digits: &str, expected: usize) -> Option<Vec<u32>> {
    if digits.len() != expected {
        return None;
    }
    digits.chars().map(|c| c.to_digit(10)).collect()
}

fn all_same(values: &[u32]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

fn cpf_check_digit(values: &[u32]) -> u32 {
    let start = values.len() as u32 + 1;
    let sum: u32 = values
        .iter()
        .zip((2..=start).rev())
        .map(|(value, weight)| value * weight)
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 { 0 } else { rest }
}

fn cnpj_check_digit(values: &[u32]) -> u32 {
    let weights = &CNPJ_WEIGHTS[CNPJ_WEIGHTS.len() - values.len()..];
    let sum: u32 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf_with_punctuation() {
        assert_eq!(
            normalize_document("529.982.247-25").expect("valid cpf"),
            "52998224725"
        );
    }

    #[test]
    fn accepts_valid_cnpj() {
        assert_eq!(
            normalize_document("11.222.333/0001-81").expect("valid cnpj"),
            "11222333000181"
        );
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert_eq!(
            normalize_document("52998224724"),
            Err(DocumentError::CheckDigits {
                kind: DocumentKind::Cpf
            })
        );
        assert!(!is_valid_cnpj("11222333000182"));
    }

    #[test]
    fn rejects_repeated_digits_and_odd_lengths() {
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cnpj("00000000000000"));
        assert_eq!(
            normalize_document("1234"),
            Err(DocumentError::Length { digits: 4 })
        );
    }

    #[test]
    fn rejects_blocklisted_sequence() {
        assert!(!is_valid_cpf("12345678909"));
    }

    #[test]
    fn formats_by_length() {
        assert_eq!(format_document("52998224725"), "529.982.247-25");
        assert_eq!(format_document("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_document("abc"), "abc");
    }
}
