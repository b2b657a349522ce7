use std::cmp::Ordering;

use fraction::{BigFraction, BigUint};
use serde_json::Number;

use super::cmp::compare_numbers;

#[inline]
pub(crate) fn ge(instance: &Number, limit: &Number) -> bool {
    matches!(
        compare_numbers(instance, limit),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

#[inline]
pub(crate) fn gt(instance: &Number, limit: &Number) -> bool {
    compare_numbers(instance, limit) == Some(Ordering::Greater)
}

#[inline]
pub(crate) fn le(instance: &Number, limit: &Number) -> bool {
    matches!(
        compare_numbers(instance, limit),
        Some(Ordering::Less | Ordering::Equal)
    )
}

#[inline]
pub(crate) fn lt(instance: &Number, limit: &Number) -> bool {
    compare_numbers(instance, limit) == Some(Ordering::Less)
}

/// Whether `instance` is an exact multiple of `multiple_of`.
pub(crate) fn is_multiple_of(instance: &Number, multiple_of: &Number) -> bool {
    if let (Some(item), Some(divisor)) = (as_integer(instance), as_integer(multiple_of)) {
        return divisor != 0 && item % divisor == 0;
    }
    let (Some(item), Some(divisor)) = (instance.as_f64(), multiple_of.as_f64()) else {
        return false;
    };
    if divisor == 0. {
        return false;
    }
    let quotient = item / divisor;
    if quotient.is_finite() && quotient.fract() == 0. {
        return true;
    }
    // Binary floats can't represent most decimal divisors, compare the decimal forms exactly
    let (Some(item), Some(divisor)) = (decimal(instance), decimal(multiple_of)) else {
        return false;
    };
    let fraction = item / divisor;
    fraction
        .denom()
        .is_some_and(|denom| *denom == BigUint::from(1u8))
}

/// Exact magnitude of the shortest decimal rendering of `number`.
fn decimal(number: &Number) -> Option<BigFraction> {
    let text = number.to_string();
    let text = text.strip_prefix('-').unwrap_or(&text);
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().ok()?),
        None => (text, 0),
    };
    let (integral, fractional) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits: BigUint = format!("{integral}{fractional}").parse().ok()?;
    let scale = exponent.checked_sub(i32::try_from(fractional.len()).ok()?)?;
    let ten = BigUint::from(10u8);
    if scale >= 0 {
        Some(BigFraction::new(
            digits * ten.pow(scale.unsigned_abs()),
            BigUint::from(1u8),
        ))
    } else {
        Some(BigFraction::new(digits, ten.pow(scale.unsigned_abs())))
    }
}

fn as_integer(number: &Number) -> Option<i128> {
    number
        .as_u64()
        .map(i128::from)
        .or_else(|| number.as_i64().map(i128::from))
}

#[cfg(test)]
mod tests {
    use super::{ge, gt, is_multiple_of, le, lt};
    use serde_json::Number;
    use test_case::test_case;

    fn number(value: f64) -> Number {
        Number::from_f64(value).expect("Finite")
    }

    #[test_case(Number::from(10), Number::from(5), true)]
    #[test_case(Number::from(10), Number::from(3), false)]
    #[test_case(Number::from(-9), Number::from(3), true)]
    #[test_case(number(0.3), number(0.1), true)]
    #[test_case(number(4.5), number(1.5), true)]
    #[test_case(number(4.6), number(1.5), false)]
    #[test_case(Number::from(7), number(0.5), true)]
    #[test_case(Number::from(7), Number::from(0), false)]
    #[test_case(number(19.99), number(0.01), true)]
    #[test_case(number(0.0075), number(0.0001), true)]
    #[test_case(number(1e-7), number(1e-8), true)]
    #[test_case(number(0.00751), number(0.0001), false)]
    fn multiple_of(instance: Number, divisor: Number, expected: bool) {
        assert_eq!(is_multiple_of(&instance, &divisor), expected);
    }

    #[test]
    fn bounds() {
        let five = Number::from(5);
        assert!(ge(&five, &Number::from(5)));
        assert!(!gt(&five, &Number::from(5)));
        assert!(le(&five, &number(5.5)));
        assert!(lt(&Number::from(-1), &five));
    }
}
