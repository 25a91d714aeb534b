//! SRP password-proof exchange.
//!
//! Proves knowledge of a password to the server without transmitting it.
//! The client receives the group parameters and the server's ephemeral `B`,
//! and answers with its own ephemeral `A` plus the proof `M1`. Every failure
//! mode returns `None`: the caller must abort the authentication attempt and
//! never retry with the same inputs.

use hmac::Hmac;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use num_traits::ops::euclid::Euclid;
use sha2::Sha512;

use crate::bigint::{is_good_ga_and_gb, is_good_prime, pad256, xor32};
use crate::sha256;

/// Server-supplied password KDF parameters.
#[derive(Clone, Debug)]
pub struct PasswordAlgo {
    /// First KDF salt.
    pub salt1: Vec<u8>,
    /// Second KDF salt.
    pub salt2: Vec<u8>,
    /// Group generator.
    pub g: i32,
    /// Group modulus, big-endian.
    pub p: Vec<u8>,
}

/// The client's answer to an SRP challenge.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SrpCheck {
    /// Proof of password knowledge.
    pub m1: [u8; 32],
    /// Client ephemeral public value `A`, fixed 256-byte encoding.
    pub a_pub: [u8; 256],
    /// Server-assigned exchange id, echoed back.
    pub srp_id: i64,
}

fn sh(data: &[u8], salt: &[u8]) -> [u8; 32] {
    sha256!(salt, data, salt)
}

/// Derive the SRP secret exponent `x` from the raw password.
///
/// Two salted SHA-256 rounds, a 100k-iteration PBKDF2-HMAC-SHA512 stretch,
/// and a final salted SHA-256. Deterministic; the iteration count is fixed
/// by the algorithm identifier.
pub fn derive_x(password: &[u8], algo: &PasswordAlgo) -> [u8; 32] {
    let hash1 = sh(&sh(password, &algo.salt1), &algo.salt2);
    let mut dk = [0u8; 64];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(&hash1, &algo.salt1, 100_000, &mut dk).unwrap();
    sh(&dk, &algo.salt2)
}

/// Run the client side of the SRP exchange.
///
/// `x_bytes` is the secret exponent from [`derive_x`], `server_b` the
/// server's ephemeral public value. Returns `None` on any validity-check
/// failure: empty inputs, a bad `(p, g)` pair, `B` out of `(0, p)`, a zero
/// scrambler `u`, a zero combined exponent, or a base failing the
/// small-subgroup range check.
pub fn start_check(
    x_bytes: &[u8],
    srp_id: i64,
    server_b: &[u8],
    algo: &PasswordAlgo,
) -> Option<SrpCheck> {
    let mut random = [0u8; 256];
    getrandom::getrandom(&mut random).expect("getrandom failed");
    do_start_check(x_bytes, srp_id, server_b, algo, &random)
}

fn do_start_check(
    x_bytes: &[u8],
    srp_id: i64,
    server_b: &[u8],
    algo: &PasswordAlgo,
    random: &[u8; 256],
) -> Option<SrpCheck> {
    if x_bytes.is_empty() || server_b.is_empty() {
        return None;
    }

    let big_p = BigInt::from_bytes_be(Sign::Plus, &algo.p);
    if !is_good_prime(big_p.magnitude(), algo.g) {
        return None;
    }

    let p_bytes = pad256(&algo.p);
    let big_g = BigInt::from(algo.g);
    let g_bytes = pad256(&big_g.to_bytes_be().1);

    let k = sha256!(&p_bytes, &g_bytes);
    let big_k = BigInt::from_bytes_be(Sign::Plus, &k);

    let big_a = BigInt::from_bytes_be(Sign::Plus, random);
    let a_pub = big_g.modpow(&big_a, &big_p);
    let a_pub_bytes = pad256(&a_pub.to_bytes_be().1);

    let big_b = BigInt::from_bytes_be(Sign::Plus, server_b);
    if big_b.is_zero() || big_b >= big_p {
        return None;
    }
    let b_pub_bytes = pad256(server_b);

    let u = sha256!(&a_pub_bytes, &b_pub_bytes);
    let big_u = BigInt::from_bytes_be(Sign::Plus, &u);
    if big_u.is_zero() {
        return None;
    }

    let big_x = BigInt::from_bytes_be(Sign::Plus, x_bytes);
    let big_v = big_g.modpow(&big_x, &big_p);
    let big_kv = (&big_k * &big_v) % &big_p;

    let base = (&big_b - &big_kv).rem_euclid(&big_p);
    if !is_good_ga_and_gb(base.magnitude(), big_p.magnitude()) {
        return None;
    }

    let exp = &big_a + &big_u * &big_x;
    if exp.is_zero() {
        return None;
    }
    let big_s = base.modpow(&exp, &big_p);
    let k_s = sha256!(&pad256(&big_s.to_bytes_be().1));

    let p_xor_g = xor32(&sha256!(&p_bytes), &sha256!(&g_bytes));
    let m1 = sha256!(
        &p_xor_g,
        &sha256!(&algo.salt1),
        &sha256!(&algo.salt2),
        &a_pub_bytes,
        &b_pub_bytes,
        &k_s
    );

    Some(SrpCheck { m1, a_pub: a_pub_bytes, srp_id })
}
