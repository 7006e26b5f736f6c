use rust_decimal::Decimal;
use std::str::FromStr;

/// Largest exponent magnitude worth scaling by; anything beyond is out of `Decimal` range.
const MAX_EXPONENT: u32 = 64;

/// Read a numeric form value, coercing anything unreadable to zero.
///
/// Leading whitespace is skipped and the longest leading number is used, so
/// `"12.5kg"` reads as `12.5` and `"1e3"` as `1000`. Empty input, text with no
/// leading number, and values outside `Decimal` range all read as zero.
pub fn parse_numeric_or_zero(raw: &str) -> Decimal {
    let value = split_numeric_prefix(raw.trim_start()).and_then(|prefix| prefix.to_decimal());
    match value {
        Some(v) if !v.is_zero() => v,
        _ => Decimal::ZERO,
    }
}

struct NumericPrefix<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
    exponent: i32,
}

impl NumericPrefix<'_> {
    fn to_decimal(&self) -> Option<Decimal> {
        let mut text = String::with_capacity(self.integer.len() + self.fraction.len() + 3);
        if self.negative {
            text.push('-');
        }
        text.push_str(if self.integer.is_empty() { "0" } else { self.integer });
        if !self.fraction.is_empty() {
            text.push('.');
            text.push_str(self.fraction);
        }
        let mantissa = Decimal::from_str(&text).ok()?;
        scale(mantissa, self.exponent)
    }
}

fn split_numeric_prefix(s: &str) -> Option<NumericPrefix<'_>> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let integer_len = leading_digits(unsigned);
    let integer = &unsigned[..integer_len];
    let mut rest = &unsigned[integer_len..];

    let mut fraction = "";
    if let Some(after_dot) = rest.strip_prefix('.') {
        let fraction_len = leading_digits(after_dot);
        fraction = &after_dot[..fraction_len];
        rest = &after_dot[fraction_len..];
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    Some(NumericPrefix {
        negative,
        integer,
        fraction,
        exponent: parse_exponent(rest).unwrap_or(0),
    })
}

fn parse_exponent(s: &str) -> Option<i32> {
    let rest = s.strip_prefix(['e', 'E'])?;
    let (sign, digits) = match rest.as_bytes().first() {
        Some(b'-') => (-1, &rest[1..]),
        Some(b'+') => (1, &rest[1..]),
        _ => (1, rest),
    };
    let len = leading_digits(digits);
    if len == 0 {
        return None;
    }
    let magnitude: i32 = digits[..len].parse().unwrap_or(i32::MAX);
    Some(sign * magnitude)
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn scale(mut value: Decimal, exponent: i32) -> Option<Decimal> {
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return if exponent < 0 { Some(Decimal::ZERO) } else { None };
    }
    for _ in 0..exponent.unsigned_abs() {
        value = if exponent > 0 {
            value.checked_mul(Decimal::TEN)?
        } else {
            value.checked_div(Decimal::TEN)?
        };
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn plain_numbers() {
        assert_eq!(parse_numeric_or_zero("10"), dec!(10));
        assert_eq!(parse_numeric_or_zero("7.63"), dec!(7.63));
        assert_eq!(parse_numeric_or_zero("-20"), dec!(-20));
        assert_eq!(parse_numeric_or_zero("+5"), dec!(5));
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(parse_numeric_or_zero(""), Decimal::ZERO);
        assert_eq!(parse_numeric_or_zero("   "), Decimal::ZERO);
    }

    #[test]
    fn non_numeric_input_is_zero() {
        assert_eq!(parse_numeric_or_zero("abc"), Decimal::ZERO);
        assert_eq!(parse_numeric_or_zero("-"), Decimal::ZERO);
        assert_eq!(parse_numeric_or_zero("."), Decimal::ZERO);
        assert_eq!(parse_numeric_or_zero("Infinity"), Decimal::ZERO);
    }

    #[test]
    fn leading_number_is_used() {
        assert_eq!(parse_numeric_or_zero("  12.5kg"), dec!(12.5));
        assert_eq!(parse_numeric_or_zero("1,000"), dec!(1));
        assert_eq!(parse_numeric_or_zero("3.2.1"), dec!(3.2));
    }

    #[test]
    fn bare_fraction_and_trailing_dot() {
        assert_eq!(parse_numeric_or_zero(".5"), dec!(0.5));
        assert_eq!(parse_numeric_or_zero("5."), dec!(5));
    }

    #[test]
    fn exponents() {
        assert_eq!(parse_numeric_or_zero("1e3"), dec!(1000));
        assert_eq!(parse_numeric_or_zero("2.5E-2"), dec!(0.025));
        assert_eq!(parse_numeric_or_zero("4e"), dec!(4));
        assert_eq!(parse_numeric_or_zero("1e-999"), Decimal::ZERO);
    }

    #[test]
    fn out_of_range_is_zero() {
        assert_eq!(parse_numeric_or_zero("1e40"), Decimal::ZERO);
        assert_eq!(
            parse_numeric_or_zero("999999999999999999999999999999999"),
            Decimal::ZERO
        );
    }

    #[test]
    fn negative_zero_is_plain_zero() {
        let zero = parse_numeric_or_zero("-0");
        assert_eq!(zero, Decimal::ZERO);
        assert!(!zero.is_sign_negative());
    }
}
