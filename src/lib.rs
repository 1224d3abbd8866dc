//! Threshold secret sharing over GF(2^8).
//!
//! ```
//! let shares = gfshare::split(b"correct horse", 5, 3).unwrap();
//! let secret = gfshare::combine(&shares[1..4]).unwrap();
//! assert_eq!(secret, b"correct horse");
//! ```

pub mod shamir;

pub use shamir::{
    combine, split, split_with_identifiers, split_with_rng, Combiner, RandomSource, ShamirError, Share,
};
