//! Small numeric helpers.

/// Greatest common divisor of two numbers; `0` if either is `0`.
///
/// ```
/// use boundcache::util::gcd_pair;
///
/// assert_eq!(gcd_pair(12, 18), 6);
/// assert_eq!(gcd_pair(7, 0), 0);
/// ```
pub fn gcd_pair(mut a: u64, mut b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Greatest common divisor of all `nums`.
///
/// Returns `0` for fewer than two numbers or when any number is `0`.
///
/// ```
/// use boundcache::util::gcd;
///
/// assert_eq!(gcd(&[4, 60, 4, 10]), 2);
/// assert_eq!(gcd(&[5]), 0);
/// ```
pub fn gcd(nums: &[u64]) -> u64 {
    let [first, second, rest @ ..] = nums else {
        return 0;
    };
    rest.iter()
        .fold(gcd_pair(*first, *second), |acc, &n| gcd_pair(acc, n))
}
