use crate::error::PriceError;
use crate::preferences::Language;
use once_cell::sync::Lazy;
use regex::Regex;

// Plain "1234.5" or grouped "1,234.5"; digits are normalized to ASCII first.
static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$").unwrap());
static LEADING_DOT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.\d+$").unwrap());

const ARABIC_INDIC_ZERO: u32 = 0x0660;
const EXTENDED_ARABIC_INDIC_ZERO: u32 = 0x06F0;
const ARABIC_DECIMAL_SEPARATOR: char = '\u{066B}';
const ARABIC_THOUSANDS_SEPARATOR: char = '\u{066C}';

/// Map Arabic-Indic digits and separators onto their ASCII counterparts.
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            let code = c as u32;
            if (ARABIC_INDIC_ZERO..ARABIC_INDIC_ZERO + 10).contains(&code) {
                char::from(b'0' + (code - ARABIC_INDIC_ZERO) as u8)
            } else if (EXTENDED_ARABIC_INDIC_ZERO..EXTENDED_ARABIC_INDIC_ZERO + 10).contains(&code) {
                char::from(b'0' + (code - EXTENDED_ARABIC_INDIC_ZERO) as u8)
            } else if c == ARABIC_DECIMAL_SEPARATOR {
                '.'
            } else if c == ARABIC_THOUSANDS_SEPARATOR {
                ','
            } else {
                c
            }
        })
        .collect()
}

/// Parse a non-negative number typed by the user.
///
/// Accepts ASCII or Arabic-Indic digits, an optional fractional part and
/// comma thousands grouping.
///
/// # Examples
/// ```
/// use pixel_price_calculator::utils::parse_number;
/// assert_eq!(parse_number("1,250.5", "Width"), Ok(1250.5));
/// assert_eq!(parse_number("١٢٫٥", "Width"), Ok(12.5));
/// ```
pub fn parse_number(input: &str, field: &'static str) -> Result<f64, PriceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Missing { field });
    }

    let normalized = normalize_digits(trimmed);
    if !NUMBER_REGEX.is_match(&normalized) && !LEADING_DOT_REGEX.is_match(&normalized) {
        return Err(PriceError::Invalid {
            field,
            value: trimmed.to_string(),
        });
    }

    normalized
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| PriceError::Invalid {
            field,
            value: trimmed.to_string(),
        })
}

/// Generic numeric input validation
pub fn validate_numeric_input(
    input: &str,
    min: f64,
    max: f64,
    field: &'static str,
) -> Result<f64, PriceError> {
    let val = parse_number(input, field)?;
    if val < min || val > max {
        return Err(PriceError::OutOfRange { field, min, max });
    }
    Ok(val)
}

/// Validate a whole-number count such as a quantity.
pub fn validate_count(input: &str, min: u32, max: u32, field: &'static str) -> Result<u32, PriceError> {
    let val = validate_numeric_input(input, min as f64, max as f64, field)?;
    if val.fract() != 0.0 {
        return Err(PriceError::Invalid {
            field,
            value: input.trim().to_string(),
        });
    }
    Ok(val as u32)
}

/// Round a monetary amount to two decimals.
#[inline]
pub fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount with thousands grouping and two decimals for the given language.
pub fn format_amount(amount: f64, lang: Language) -> String {
    let fixed = format!("{:.2}", round_amount(amount).abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && round_amount(amount) != 0.0 { "-" } else { "" };
    let ascii = format!("{sign}{grouped}.{frac_part}");
    match lang {
        Language::English => ascii,
        Language::Arabic => localize_digits(&ascii),
    }
}

/// Render ASCII digits and separators with their Arabic-Indic forms.
pub fn localize_digits(ascii: &str) -> String {
    ascii
        .chars()
        .map(|c| match c {
            '0'..='9' => char::from_u32(ARABIC_INDIC_ZERO + (c as u32 - '0' as u32)).unwrap_or(c),
            '.' => ARABIC_DECIMAL_SEPARATOR,
            ',' => ARABIC_THOUSANDS_SEPARATOR,
            other => other,
        })
        .collect()
}
