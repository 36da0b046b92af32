//! Digit helpers shared by every checksum

/// Decimal digits of `raw`, every other character dropped
pub(crate) fn digits_of(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Sum of `digits[i] * weights[i]`, truncated to the shorter slice
pub(crate) fn weighted_sum(digits: &[u32], weights: &[u32]) -> u32 {
    digits.iter().zip(weights).map(|(d, w)| d * w).sum()
}

/// Modulus 11 check digit: remainders 0 and 1 give 0
pub(crate) fn mod11(sum: u32) -> u32 {
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

/// Sum of the decimal digits of `n`
pub(crate) fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }
    total
}

/// Two check digits where the second covers the body plus the first
pub(crate) fn dual_mod11(body: &[u32], first: &[u32], second: &[u32]) -> [u32; 2] {
    let d1 = mod11(weighted_sum(body, first));
    let mut extended = body.to_vec();
    extended.push(d1);
    let d2 = mod11(weighted_sum(&extended, second));
    [d1, d2]
}

pub(crate) fn render(digits: &[u32]) -> String {
    digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect()
}

/// Leading two digits as a number, 0..=99
pub(crate) fn leading_pair(digits: &[u32]) -> u32 {
    match digits {
        [a, b, ..] => a * 10 + b,
        _ => 0,
    }
}

pub(crate) fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}
