//! Fixed-width big-integer encoding and the DH/SRP parameter sanity checks.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Hex form of the well-known 2048-bit DH modulus servers normally hand out.
/// Matching it skips the (expensive) primality test.
pub(crate) const CACHED_GOOD_PRIME: &str = "\
c71caeb9c6b1c9048e6c522f70f13f73980d40238e3e21c14934d037563d930f\
48198a0aa7c14058229493d22530f4dbfa336f6e0ac925139543aed44cce7c37\
20fd51f69458705ac68cd4fe6b6b13abdc9746512969328454f18faf8c595f64\
2477fe96bb2a941d5bcd1d4ac8cc49880708fa9b378e3c4f3a9060bee67cf9a4\
a4a695811051907e162753b56b0f6b410dba74d8a84b2a14b3144e0ef1284754\
fd17ed950d5965b4b9dd46582db1178d169c6bc465b0d6ff9ca3928fef5b9ae4\
e418fc15e83ebea0f87fa9ff5eed70050ded2849f47bf959d956850ce929851f\
0d8115f635b105ee2e4e15d04b2454bf6f4fadf034b10403119cd8e3b92fcc5b";

/// Encode `data` as a fixed 256-byte big-endian unsigned value.
///
/// Short values are left-zero-padded; overlong values lose their leading
/// bytes. The fixed width is a wire-format contract with the peer.
pub fn pad256(data: &[u8]) -> [u8; 256] {
    let mut out = [0u8; 256];
    let start = 256usize.saturating_sub(data.len());
    out[start..].copy_from_slice(&data[data.len().saturating_sub(256)..]);
    out
}

/// Byte-wise XOR of two 32-byte arrays.
pub fn xor32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = a[i] ^ b[i];
    }
    out
}

const SMALL_PRIMES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Miller–Rabin probabilistic primality test with `rounds` random bases.
pub fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for sp in SMALL_PRIMES {
        let sp = BigUint::from(sp);
        if *n == sp {
            return true;
        }
        if (n % &sp).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    let s = n_minus_one.trailing_zeros().unwrap_or(0) as usize;
    let d = &n_minus_one >> s;
    let n_minus_three = n - BigUint::from(3u32);
    let base_len = (n.bits() as usize).div_ceil(8) + 8;

    'witness: for _ in 0..rounds {
        // Random base in [2, n - 2].
        let mut buf = vec![0u8; base_len];
        getrandom::getrandom(&mut buf).expect("getrandom failed");
        let a = BigUint::from_bytes_be(&buf) % &n_minus_three + &two;

        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Check that `(p, g)` is an acceptable modulus/generator pair.
///
/// `p` must be exactly 2048 bits, `g` one of 2..=7 with the matching residue
/// of `p mod 4g`, and both `p` and `(p - 1) / 2` must be prime. The one
/// well-known server modulus short-circuits the primality tests.
pub fn is_good_prime(p: &BigUint, g: i32) -> bool {
    if !(2..=7).contains(&g) || p.bits() != 2048 {
        return false;
    }

    let x = (p % BigUint::from(4 * g as u32)).to_u64().unwrap_or(u64::MAX);
    let residue_ok = match g {
        2 => x == 7,
        3 => x % 3 == 2,
        4 => true,
        5 => x % 5 == 1 || x % 5 == 4,
        6 => x == 19 || x == 23,
        7 => x % 7 == 3 || x % 7 == 5 || x % 7 == 6,
        _ => false,
    };

    let cached = BigUint::parse_bytes(CACHED_GOOD_PRIME.as_bytes(), 16)
        .expect("cached prime constant parses");
    if *p == cached {
        return true;
    }

    residue_ok
        && is_probable_prime(p, 30)
        && is_probable_prime(&((p - BigUint::one()) >> 1usize), 30)
}

/// Range check for DH/SRP public values and derived bases.
///
/// `v` must fit in 256 bytes, carry at least `2048 - 64` significant bits,
/// lie strictly below `p`, and keep the same margin from `p` itself. Rejects
/// the trivially small/large values a malicious peer could use to force a
/// small subgroup.
pub fn is_good_ga_and_gb(v: &BigUint, p: &BigUint) -> bool {
    if v.bits() > 2048 || v.bits() < 2048 - 64 || v >= p {
        return false;
    }
    (p - v).bits() >= 2048 - 64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached_prime() -> BigUint {
        BigUint::parse_bytes(CACHED_GOOD_PRIME.as_bytes(), 16).unwrap()
    }

    #[test]
    fn pad256_pads_and_truncates() {
        let short = pad256(&[1, 2, 3]);
        assert_eq!(&short[..253], &[0u8; 253]);
        assert_eq!(&short[253..], &[1, 2, 3]);

        let long: Vec<u8> = (0..=255).chain(0..4).map(|b| b as u8).collect();
        let trimmed = pad256(&long);
        // Leading 4 bytes of the input are dropped.
        assert_eq!(trimmed[0], 4);
        assert_eq!(trimmed[255], 3);
    }

    #[test]
    fn miller_rabin_small_numbers() {
        for p in [2u32, 3, 5, 7, 97, 7919] {
            assert!(is_probable_prime(&BigUint::from(p), 30), "{p} is prime");
        }
        for c in [1u32, 4, 100, 7917, 561 /* Carmichael */] {
            assert!(!is_probable_prime(&BigUint::from(c), 30), "{c} is composite");
        }
    }

    #[test]
    fn good_prime_accepts_cached_modulus() {
        assert!(is_good_prime(&cached_prime(), 3));
    }

    #[test]
    fn good_prime_rejects_bad_generator_and_width() {
        let p = cached_prime();
        assert!(!is_good_prime(&p, 1));
        assert!(!is_good_prime(&p, 8));
        assert!(!is_good_prime(&BigUint::from(7u32), 3));
        // Flip the low byte: no longer the cached prime, and 2^2048-ish
        // composites fail Miller-Rabin fast.
        let tweaked = &p ^ BigUint::from(0x42u32);
        assert!(!is_good_prime(&tweaked, 3));
    }

    #[test]
    fn range_check_rejects_edges() {
        let p = cached_prime();
        assert!(!is_good_ga_and_gb(&BigUint::from(2u32), &p));
        assert!(!is_good_ga_and_gb(&(&p - BigUint::from(1u32)), &p));
        assert!(!is_good_ga_and_gb(&p, &p));
        assert!(is_good_ga_and_gb(&(&p >> 1usize), &p));
    }
}
