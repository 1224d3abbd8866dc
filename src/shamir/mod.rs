//! Shamir's secret sharing over GF(2^8).
//!
//! Every byte of the secret gets its own random polynomial of degree
//! `threshold - 1` whose constant term is that byte. Share `x` holds the
//! polynomial values at `x` for every byte position. Any `threshold` shares
//! pin the polynomials down and give back the constant terms through
//! Lagrange interpolation at zero; fewer shares leave every secret byte
//! equally likely.
//!
//! Shares carry no integrity protection. A corrupted or foreign share
//! combines into garbage without an error, and so does a set that is smaller
//! than the threshold the secret was split with.

mod combiner;
mod encoding;
pub mod gf256;
pub mod identifiers;
mod random;

use std::collections::HashSet;

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use gf256::GF256;

pub use combiner::Combiner;
pub use random::RandomSource;

/// Fewest shares a split can produce or a combine can accept
pub const MIN_SHARES: usize = 2;

/// Most shares a split can produce: one per nonzero field element
pub const MAX_SHARES: usize = 255;

/// Smallest meaningful threshold
pub const MIN_THRESHOLD: usize = 2;

#[derive(Debug, Error)]
pub enum ShamirError {
    #[error("share count {0} is outside 2..=255")]
    InvalidShareCount(usize),
    #[error("threshold {threshold} is outside 2..={shares}")]
    InvalidThreshold { threshold: usize, shares: usize },
    #[error("secret cannot be empty")]
    EmptySecret,
    #[error("share length {found} does not match the expected {expected}")]
    MismatchedShareLength { expected: usize, found: usize },
    #[error("share identifier {0} appears more than once")]
    DuplicateIdentifier(u8),
    #[error("division by zero in GF(256)")]
    FieldDivisionByZero,
    #[error("cannot allocate {0} identifiers, need 2..=255")]
    InvalidIdentifierCount(usize),
    #[error("at least 2 shares are needed, got {0}")]
    NotEnoughShares(usize),
    #[error("at most 255 shares can be combined, got {0}")]
    TooManyShares(usize),
    #[error("share identifier 0 is reserved for the secret")]
    InvalidShareIdentifier,
    #[error("malformed share: {0}")]
    MalformedShare(String),
}

/// Share represents a single share from the Shamir Secret Sharing scheme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    /// Evaluation point, never zero
    pub id: u8,
    /// One polynomial value per secret byte
    #[serde(with = "encoding::base64_data")]
    pub data: Vec<u8>,
}

impl Share {
    pub fn new(id: u8, data: Vec<u8>) -> Self {
        Self { id, data }
    }
}

/// Split a secret into `shares` shares, requiring `threshold` of them to
/// reconstruct it. Randomness comes from a ChaCha20 generator seeded by the OS.
pub fn split(secret: &[u8], shares: usize, threshold: usize) -> Result<Vec<Share>, ShamirError> {
    let mut rng = ChaCha20Rng::from_entropy();
    split_with_rng(secret, shares, threshold, &mut rng)
}

/// Split a secret with an explicit random source.
///
/// Identifiers are drawn at random from 1..=255.
pub fn split_with_rng<R: RandomSource + ?Sized>(
    secret: &[u8],
    shares: usize,
    threshold: usize,
    rng: &mut R,
) -> Result<Vec<Share>, ShamirError> {
    validate_parameters(secret, shares, threshold)?;

    let identifiers = identifiers::allocate(shares, rng)?;
    Ok(evaluate_shares(secret, &identifiers, threshold, rng))
}

/// Split a secret at caller-chosen identifiers, one share per identifier.
pub fn split_with_identifiers<R: RandomSource + ?Sized>(
    secret: &[u8],
    identifiers: &[u8],
    threshold: usize,
    rng: &mut R,
) -> Result<Vec<Share>, ShamirError> {
    validate_parameters(secret, identifiers.len(), threshold)?;

    let mut seen = HashSet::with_capacity(identifiers.len());
    for &id in identifiers {
        if id == 0 {
            return Err(ShamirError::InvalidShareIdentifier);
        }
        if !seen.insert(id) {
            return Err(ShamirError::DuplicateIdentifier(id));
        }
    }

    Ok(evaluate_shares(secret, identifiers, threshold, rng))
}

fn validate_parameters(secret: &[u8], shares: usize, threshold: usize) -> Result<(), ShamirError> {
    if !(MIN_SHARES..=MAX_SHARES).contains(&shares) {
        return Err(ShamirError::InvalidShareCount(shares));
    }
    if !(MIN_THRESHOLD..=shares).contains(&threshold) {
        return Err(ShamirError::InvalidThreshold { threshold, shares });
    }
    if secret.is_empty() {
        return Err(ShamirError::EmptySecret);
    }
    Ok(())
}

/// Build one polynomial per secret byte and evaluate it at every identifier.
/// Parameters must already be validated.
fn evaluate_shares<R: RandomSource + ?Sized>(
    secret: &[u8],
    identifiers: &[u8],
    threshold: usize,
    rng: &mut R,
) -> Vec<Share> {
    debug!(
        "splitting {} byte secret into {} shares, threshold {}",
        secret.len(),
        identifiers.len(),
        threshold
    );

    let mut shares: Vec<Share> = identifiers
        .iter()
        .map(|&id| Share::new(id, Vec::with_capacity(secret.len())))
        .collect();

    // coefficients[0] is the secret byte, the rest are redrawn for every byte
    let mut coefficients = Zeroizing::new(vec![0u8; threshold]);

    for &byte in secret {
        coefficients[0] = byte;
        rng.fill(&mut coefficients[1..]);

        for share in shares.iter_mut() {
            let y = evaluate(&coefficients, GF256::new(share.id));
            share.data.push(y.value());
        }
    }

    shares
}

/// Horner evaluation of `coefficients` (constant term first) at `x`
fn evaluate(coefficients: &[u8], x: GF256) -> GF256 {
    coefficients
        .iter()
        .rev()
        .fold(GF256::ZERO, |acc, &c| acc * x + GF256::new(c))
}

/// Combine shares to recover the original secret.
///
/// Passing fewer shares than the split threshold is not detected: the result
/// is simply not the secret.
pub fn combine(shares: &[Share]) -> Result<Vec<u8>, ShamirError> {
    if shares.len() < MIN_SHARES {
        return Err(ShamirError::NotEnoughShares(shares.len()));
    }
    if shares.len() > MAX_SHARES {
        return Err(ShamirError::TooManyShares(shares.len()));
    }

    let length = shares[0].data.len();
    let mut seen = HashSet::with_capacity(shares.len());
    for share in shares {
        check_share(share, length, &mut seen)?;
    }

    debug!("combining {} shares of {} bytes", shares.len(), length);

    let weights = lagrange_weights(shares)?;

    let mut result = Vec::with_capacity(length);
    for byte_idx in 0..length {
        let mut value = GF256::ZERO;
        for (share, &weight) in shares.iter().zip(weights.iter()) {
            value += GF256::new(share.data[byte_idx]) * weight;
        }
        result.push(value.value());
    }

    Ok(result)
}

/// Reject reserved or repeated identifiers and length mismatches
pub(crate) fn check_share(share: &Share, length: usize, seen: &mut HashSet<u8>) -> Result<(), ShamirError> {
    if share.id == 0 {
        return Err(ShamirError::InvalidShareIdentifier);
    }
    if share.data.len() != length {
        return Err(ShamirError::MismatchedShareLength {
            expected: length,
            found: share.data.len(),
        });
    }
    if !seen.insert(share.id) {
        return Err(ShamirError::DuplicateIdentifier(share.id));
    }
    Ok(())
}

/// Lagrange basis values at zero: L_k(0) = prod_{j != k} x_j / (x_j - x_k).
///
/// They depend only on the identifiers, so one set serves every byte position.
fn lagrange_weights(shares: &[Share]) -> Result<Vec<GF256>, ShamirError> {
    let mut weights = Vec::with_capacity(shares.len());

    for (k, share_k) in shares.iter().enumerate() {
        let x_k = GF256::new(share_k.id);
        let mut weight = GF256::ONE;

        for (j, share_j) in shares.iter().enumerate() {
            if j == k {
                continue;
            }
            let x_j = GF256::new(share_j.id);
            weight *= x_j.checked_div(x_j - x_k)?;
        }

        weights.push(weight);
    }

    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::random::tests::CountingSource;
    use super::*;

    fn seeded(seed: u8) -> ChaCha20Rng {
        ChaCha20Rng::from_seed([seed; 32])
    }

    /// Every subset of `k` indices out of `n`
    fn subsets(n: usize, k: usize) -> Vec<Vec<usize>> {
        fn walk(start: usize, n: usize, k: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if current.len() == k {
                out.push(current.clone());
                return;
            }
            for i in start..n {
                current.push(i);
                walk(i + 1, n, k, current, out);
                current.pop();
            }
        }

        let mut out = Vec::new();
        walk(0, n, k, &mut Vec::new(), &mut out);
        out
    }

    fn pick(shares: &[Share], indices: &[usize]) -> Vec<Share> {
        indices.iter().map(|&i| shares[i].clone()).collect()
    }

    #[test]
    fn test_split_and_combine() {
        let secret = b"Secret bytes for testing";

        // Split into 5 shares, require 3 to reconstruct
        let shares = split(secret, 5, 3).unwrap();
        assert_eq!(shares.len(), 5);

        for share in &shares {
            assert_eq!(share.data.len(), secret.len());
        }

        // Combine all shares
        let recovered = combine(&shares).unwrap();
        assert_eq!(recovered, secret);

        // Combine only threshold (3) shares
        let partial_shares = pick(&shares, &[0, 2, 4]);
        let recovered_partial = combine(&partial_shares).unwrap();
        assert_eq!(recovered_partial, secret);
    }

    #[test]
    fn test_round_trip_parameter_grid() {
        let mut rng = seeded(1);
        let params = [(2, 2), (3, 2), (5, 3), (7, 7), (17, 9), (40, 2), (255, 3), (255, 255)];

        for &(shares_count, threshold) in &params {
            for &length in &[1usize, 2, 31, 257] {
                let secret: Vec<u8> = (0..length).map(|i| (i * 37 + shares_count) as u8).collect();
                let shares = split_with_rng(&secret, shares_count, threshold, &mut rng).unwrap();

                // First threshold shares
                assert_eq!(combine(&shares[..threshold]).unwrap(), secret);
                // Last threshold shares, in reverse order
                let mut tail: Vec<Share> = shares[shares_count - threshold..].to_vec();
                tail.reverse();
                assert_eq!(combine(&tail).unwrap(), secret);
            }
        }
    }

    #[test]
    fn test_large_secret() {
        let mut rng = seeded(2);
        let secret: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
        let shares = split_with_rng(&secret, 6, 4, &mut rng).unwrap();

        assert_eq!(combine(&pick(&shares, &[5, 1, 3, 0])).unwrap(), secret);
    }

    #[test]
    fn test_every_subset_recovers() {
        let secret = b"subset independence";
        let shares = split_with_rng(secret, 6, 3, &mut seeded(3)).unwrap();

        for indices in subsets(6, 3) {
            assert_eq!(combine(&pick(&shares, &indices)).unwrap(), secret, "subset {:?}", indices);
        }
        // More than the threshold works too
        for indices in subsets(6, 4) {
            assert_eq!(combine(&pick(&shares, &indices)).unwrap(), secret, "subset {:?}", indices);
        }
    }

    #[test]
    fn test_single_byte_boundary() {
        let secret = [0x2A];
        let shares = split_with_rng(&secret, 5, 3, &mut seeded(4)).unwrap();
        assert_eq!(shares.len(), 5);
        assert!(shares.iter().all(|s| s.data.len() == 1));

        for indices in subsets(5, 3) {
            assert_eq!(combine(&pick(&shares, &indices)).unwrap(), secret);
        }
    }

    #[test]
    fn test_insufficient_shares() {
        let secret = b"Need more shares";
        let shares = split(secret, 5, 3).unwrap();

        // The math will produce an incorrect result, but it won't error
        let insufficient = pick(&shares, &[0, 1]);
        let recovered = combine(&insufficient).unwrap();
        assert_ne!(recovered, secret);
    }

    #[test]
    fn test_insufficient_shares_look_random() {
        let mut rng = seeded(5);
        let trials = 2000;
        let mut matches = 0;

        for trial in 0..trials {
            let secret = [trial as u8];
            let shares = split_with_rng(&secret, 4, 3, &mut rng).unwrap();
            if combine(&shares[..2]).unwrap() == secret {
                matches += 1;
            }
        }

        // Expected about trials / 256, i.e. ~8
        assert!(matches < 30, "{} of {} under-threshold combines hit the secret", matches, trials);
    }

    #[test]
    fn test_one_below_threshold_never_recovers_long_secret() {
        let mut rng = seeded(6);
        for threshold in 2..=8 {
            let secret = [0xA5u8; 32];
            let shares = split_with_rng(&secret, 10, threshold, &mut rng).unwrap();
            assert_ne!(combine(&shares[..threshold - 1].to_vec()).ok(), Some(secret.to_vec()));
        }
    }

    #[test]
    fn test_identifiers_unique() {
        let mut rng = seeded(7);
        for count in [2usize, 3, 100, 254, 255] {
            let shares = split_with_rng(b"x", count, 2, &mut rng).unwrap();
            let ids: HashSet<u8> = shares.iter().map(|s| s.id).collect();
            assert_eq!(ids.len(), count);
            assert!(!ids.contains(&0));
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let secret = b"Test secret";

        assert!(matches!(split(secret, 1, 1), Err(ShamirError::InvalidShareCount(1))));
        assert!(matches!(split(secret, 256, 2), Err(ShamirError::InvalidShareCount(256))));
        assert!(matches!(
            split(secret, 3, 1),
            Err(ShamirError::InvalidThreshold { threshold: 1, shares: 3 })
        ));
        assert!(matches!(
            split(secret, 3, 5),
            Err(ShamirError::InvalidThreshold { threshold: 5, shares: 3 })
        ));
        assert!(matches!(split(&[], 3, 2), Err(ShamirError::EmptySecret)));
    }

    #[test]
    fn test_share_count_checked_before_secret() {
        assert!(matches!(split(&[], 1, 1), Err(ShamirError::InvalidShareCount(1))));
        assert!(matches!(split(&[], 3, 4), Err(ShamirError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_combine_rejects_bad_input() {
        let shares = split(b"abcd", 3, 2).unwrap();

        assert!(matches!(combine(&[]), Err(ShamirError::NotEnoughShares(0))));
        assert!(matches!(combine(&shares[..1]), Err(ShamirError::NotEnoughShares(1))));

        let mismatched = vec![Share::new(1, vec![1, 2, 3, 4]), Share::new(2, vec![1, 2, 3, 4, 5])];
        assert!(matches!(
            combine(&mismatched),
            Err(ShamirError::MismatchedShareLength { expected: 4, found: 5 })
        ));

        let duplicated = vec![shares[0].clone(), shares[1].clone(), shares[0].clone()];
        assert!(matches!(combine(&duplicated), Err(ShamirError::DuplicateIdentifier(id)) if id == shares[0].id));

        let zero = vec![Share::new(0, vec![1]), Share::new(1, vec![2])];
        assert!(matches!(combine(&zero), Err(ShamirError::InvalidShareIdentifier)));
    }

    #[test]
    fn test_combine_rejects_too_many() {
        let shares: Vec<Share> = (0..256).map(|i| Share::new((i % 255 + 1) as u8, vec![0])).collect();
        assert!(matches!(combine(&shares), Err(ShamirError::TooManyShares(256))));
    }

    #[test]
    fn test_deterministic_generation() {
        let secret = b"Deterministic test";

        let shares1 = split_with_rng(secret, 3, 2, &mut seeded(42)).unwrap();
        let shares2 = split_with_rng(secret, 3, 2, &mut seeded(42)).unwrap();

        // Shares should be identical with the same seed
        assert_eq!(shares1, shares2);
    }

    #[test]
    fn test_randomness_consumption() {
        let mut source = CountingSource::new(8);
        let secret = [0u8; 10];
        split_with_identifiers(&secret, &[1, 2, 3, 4], 3, &mut source).unwrap();

        // Only coefficient bytes when identifiers are supplied
        assert_eq!(source.bytes, secret.len() * 2);
    }

    #[test]
    fn test_coefficients_fresh_per_byte() {
        // A repeated secret byte must not produce repeated share bytes
        let secret = [7u8; 64];
        let shares = split_with_rng(&secret, 3, 2, &mut seeded(9)).unwrap();
        let distinct: HashSet<u8> = shares[0].data.iter().copied().collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_split_with_identifiers() {
        let secret = b"chosen points";
        let shares = split_with_identifiers(secret, &[10, 20, 30], 2, &mut seeded(10)).unwrap();

        let ids: Vec<u8> = shares.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(combine(&shares[1..]).unwrap(), secret);
    }

    #[test]
    fn test_split_with_identifiers_rejects_bad_points() {
        let mut rng = seeded(11);
        assert!(matches!(
            split_with_identifiers(b"s", &[1, 0, 2], 2, &mut rng),
            Err(ShamirError::InvalidShareIdentifier)
        ));
        assert!(matches!(
            split_with_identifiers(b"s", &[4, 5, 4], 2, &mut rng),
            Err(ShamirError::DuplicateIdentifier(4))
        ));
        assert!(matches!(
            split_with_identifiers(b"s", &[4], 2, &mut rng),
            Err(ShamirError::InvalidShareCount(1))
        ));
    }

    #[test]
    fn test_horner_matches_power_sum() {
        let coefficients = [0x2A, 0x11, 0xFE, 0x03];
        for x in 1..=255u8 {
            let x = GF256::new(x);
            let mut expected = GF256::ZERO;
            for (i, &c) in coefficients.iter().enumerate() {
                expected += GF256::new(c) * x.pow(i as u32);
            }
            assert_eq!(evaluate(&coefficients, x), expected);
        }
    }

    #[test]
    fn test_constant_polynomial_at_zero() {
        // With threshold 2 and a zero slope every share equals the secret
        let shares = split_with_identifiers(b"\x00\x42", &[1, 2], 2, &mut ZeroSource).unwrap();
        assert!(shares.iter().all(|s| s.data == b"\x00\x42"));
    }

    struct ZeroSource;

    impl RandomSource for ZeroSource {
        fn fill(&mut self, buffer: &mut [u8]) {
            buffer.fill(0);
        }
    }

    #[test]
    fn test_concurrent_use() {
        let handles: Vec<_> = (0..4u8)
            .map(|seed| {
                std::thread::spawn(move || {
                    let secret = vec![seed; 128];
                    let shares = split_with_rng(&secret, 5, 3, &mut seeded(seed)).unwrap();
                    combine(&shares[2..]).unwrap() == secret
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
