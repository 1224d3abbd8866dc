use std::collections::HashSet;

use log::trace;

use super::{check_share, combine, Share, ShamirError, MAX_SHARES};

/// Collects shares one at a time and recovers the secret once enough have
/// arrived.
///
/// Each share is checked as soon as it is added, so a bad share is reported
/// against the input that carried it rather than at the end.
#[derive(Debug, Default)]
pub struct Combiner {
    shares: Vec<Share>,
    seen: HashSet<u8>,
}

impl Combiner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a share. The first share fixes the expected length.
    pub fn add(&mut self, share: Share) -> Result<(), ShamirError> {
        if self.shares.len() >= MAX_SHARES {
            return Err(ShamirError::TooManyShares(self.shares.len() + 1));
        }

        let length = self.shares.first().map_or(share.data.len(), |s| s.data.len());
        check_share(&share, length, &mut self.seen)?;

        trace!("accepted share {} ({} collected)", share.id, self.shares.len() + 1);
        self.shares.push(share);
        Ok(())
    }

    /// Number of shares collected so far
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Interpolate the collected shares
    pub fn finish(self) -> Result<Vec<u8>, ShamirError> {
        combine(&self.shares)
    }
}
