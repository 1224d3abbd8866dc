//! Arithmetic in GF(2^8).
//!
//! Elements are bytes. Addition and subtraction are both XOR. Multiplication
//! and division go through log/exp tables over the AES field, reduced by the
//! irreducible polynomial x^8 + x^4 + x^3 + x + 1 (0x11B).
//!
//! The tables are built by a `const fn`, so they live in read-only statics and
//! can be shared between threads without any initialization step.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

use zeroize::Zeroize;

use super::ShamirError;

/// Irreducible polynomial x^8 + x^4 + x^3 + x + 1
const POLY: u16 = 0x11B;

/// Order of the multiplicative group
const ORDER: usize = 255;

/// Log and antilog tables for generator 0x03.
///
/// 0x02 only has order 51 in this field, so 0x03 is the smallest generator
/// that walks every nonzero element.
struct Tables {
    exp: [u8; 256],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];

    let mut x: u16 = 1;
    let mut i = 0;
    while i < ORDER {
        exp[i] = x as u8;
        log[x as usize] = i as u8;

        // x * 3 == (x * 2) ^ x
        let mut doubled = x << 1;
        if doubled & 0x100 != 0 {
            doubled ^= POLY;
        }
        x = doubled ^ x;
        i += 1;
    }
    // g^255 == g^0
    exp[ORDER] = exp[0];

    Tables { exp, log }
}

static TABLES: Tables = build_tables();

/// An element of GF(2^8)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct GF256(u8);

impl GF256 {
    pub const ZERO: GF256 = GF256(0);
    pub const ONE: GF256 = GF256(1);

    /// Wrap a raw byte
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Raw byte value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Divide, failing when `rhs` is zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self, ShamirError> {
        if rhs.0 == 0 {
            return Err(ShamirError::FieldDivisionByZero);
        }
        if self.0 == 0 {
            return Ok(Self::ZERO);
        }

        let log_a = TABLES.log[self.0 as usize] as usize;
        let log_b = TABLES.log[rhs.0 as usize] as usize;
        Ok(Self(TABLES.exp[(log_a + ORDER - log_b) % ORDER]))
    }

    /// Multiplicative inverse
    pub fn inverse(self) -> Result<Self, ShamirError> {
        Self::ONE.checked_div(self)
    }

    /// Raise to the power `exponent`. `0^0` is defined as 1.
    pub fn pow(self, exponent: u32) -> Self {
        if exponent == 0 {
            return Self::ONE;
        }
        if self.0 == 0 {
            return Self::ZERO;
        }

        let log_a = TABLES.log[self.0 as usize] as u64;
        let index = (log_a * exponent as u64) % ORDER as u64;
        Self(TABLES.exp[index as usize])
    }
}

impl Add for GF256 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for GF256 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for GF256 {
    type Output = Self;

    // Characteristic 2: subtraction is addition
    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Mul for GF256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if self.0 == 0 || rhs.0 == 0 {
            return Self::ZERO;
        }

        let log_a = TABLES.log[self.0 as usize] as usize;
        let log_b = TABLES.log[rhs.0 as usize] as usize;
        Self(TABLES.exp[(log_a + log_b) % ORDER])
    }
}

impl MulAssign for GF256 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Multiply two raw bytes as field elements
pub fn multiply(a: u8, b: u8) -> u8 {
    (GF256(a) * GF256(b)).0
}

/// Divide two raw bytes as field elements
pub fn divide(a: u8, b: u8) -> Result<u8, ShamirError> {
    GF256(a).checked_div(GF256(b)).map(GF256::value)
}

/// Raise a raw byte to a power
pub fn pow(a: u8, exponent: u32) -> u8 {
    GF256(a).pow(exponent).0
}
