use rand::{CryptoRng, RngCore};

/// A source of cryptographically secure random bytes.
///
/// Every `RngCore + CryptoRng` generator is a source already, so `OsRng`,
/// `ChaCha20Rng` and friends can be passed straight to the splitter. Other
/// entropy devices only need to implement `fill`.
pub trait RandomSource {
    /// Fill `buffer` completely with random bytes
    fn fill(&mut self, buffer: &mut [u8]);
}

impl<R: RngCore + CryptoRng + ?Sized> RandomSource for R {
    fn fill(&mut self, buffer: &mut [u8]) {
        self.fill_bytes(buffer);
    }
}

/// Adapts a [`RandomSource`] to `RngCore` so `rand`'s sampling helpers can
/// draw from it.
pub(crate) struct SourceRng<'a, S: RandomSource + ?Sized>(pub(crate) &'a mut S);

impl<S: RandomSource + ?Sized> RngCore for SourceRng<'_, S> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.0.fill(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.0.fill(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.fill(dest);
        Ok(())
    }
}
