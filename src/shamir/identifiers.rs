use rand::seq::index;

use super::random::{RandomSource, SourceRng};
use super::{ShamirError, MAX_SHARES, MIN_SHARES};

/// Draw `count` distinct share identifiers from 1..=255, uniformly without
/// replacement.
///
/// Position `i` of the result is the evaluation point of share `i`.
pub fn allocate<R: RandomSource + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<u8>, ShamirError> {
    if !(MIN_SHARES..=MAX_SHARES).contains(&count) {
        return Err(ShamirError::InvalidIdentifierCount(count));
    }

    // Sample indices 0..255 and shift them past the reserved zero point
    let mut rng = SourceRng(rng);
    let identifiers = index::sample(&mut rng, MAX_SHARES, count)
        .into_iter()
        .map(|i| (i + 1) as u8)
        .collect();

    Ok(identifiers)
}
