//! Scalar field arithmetic modulo the group order
//! n = 0xffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc63255_1.
//!
//! Shape mirrors [`super::field`]: elements are four little-endian 64-bit
//! limbs, always held in Montgomery form. Unlike the prime field, `n` is not
//! congruent to `-1 mod 2^64`, so Montgomery reduction here carries an
//! explicit per-round multiplier `y = acc[i] * k0 mod 2^64` rather than
//! reusing `acc[i]` directly.

use crate::arithmetic::bigint::{
    add4, cmov, limbs_from_be_bytes, limbs_to_be_bytes, mul4x4, sqr4, sub4,
};
use crate::arithmetic::util::{adc, cswap_n, is_zero_mask, mac};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// n, little-endian limbs.
pub(crate) const MODULUS: [u64; 4] = [
    0xf3b9_cac2_fc63_2551,
    0xbce6_faad_a717_9e84,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_0000_0000,
];

/// `-n^-1 mod 2^64`, the Montgomery reduction constant for this modulus.
const K0: u64 = 0xccd1_c8aa_ee00_bc4f;

/// R mod n = 2^256 mod n.
const R: [u64; 4] = [
    0x0c46_353d_039c_daaf,
    0x4319_0552_58e8_617b,
    0x0000_0000_0000_0000,
    0x0000_0000_ffff_ffff,
];

/// R^2 mod n.
const R2: [u64; 4] = [
    0x8324_4c95_be79_eea2,
    0x4699_799c_49bd_6fa6,
    0x2845_b239_2b6b_ec59,
    0x66e1_2d94_f3d9_5620,
];

/// n - 2, little-endian limbs: the Fermat-inverse exponent.
const MODULUS_MINUS_2: [u64; 4] = [
    0xf3b9_cac2_fc63_254f,
    0xbce6_faad_a717_9e84,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_0000_0000,
];

/// An element of the scalar field GF(n), held in Montgomery form.
#[derive(Clone, Copy, Debug)]
pub struct Scalar([u64; 4]);

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        let diff = self.0[0] ^ other.0[0]
            | self.0[1] ^ other.0[1]
            | self.0[2] ^ other.0[2]
            | self.0[3] ^ other.0[3];
        Choice::from((is_zero_mask(diff) & 1) as u8)
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mask = 0u64.wrapping_sub(choice.unwrap_u8() as u64);
        Scalar(cmov(mask, a.0, b.0))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

#[inline]
const fn reduce_once(x: [u64; 4]) -> [u64; 4] {
    let (t, borrow) = sub4(x, MODULUS);
    let mask = 0u64.wrapping_sub(1 - borrow);
    cmov(mask, x, t)
}

impl Scalar {
    /// The additive identity.
    pub const ZERO: Scalar = Scalar([0, 0, 0, 0]);

    /// The multiplicative identity.
    pub const ONE: Scalar = Scalar(R);

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = add4(self.0, rhs.0);
        let (t, borrow) = sub4(sum, MODULUS);
        let use_t = carry | (1 - borrow);
        let mask = 0u64.wrapping_sub(use_t);
        Scalar(cmov(mask, sum, t))
    }

    /// Returns `2 * self mod n`.
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (t, borrow) = sub4(self.0, rhs.0);
        let mask = 0u64.wrapping_sub(borrow);
        let (w0, c) = adc(t[0], MODULUS[0] & mask, 0);
        let (w1, c) = adc(t[1], MODULUS[1] & mask, c);
        let (w2, c) = adc(t[2], MODULUS[2] & mask, c);
        let (w3, _c) = adc(t[3], MODULUS[3] & mask, c);
        Scalar([w0, w1, w2, w3])
    }

    /// Returns `-self mod n`.
    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Montgomery reduction of an 8-limb product. Unlike the prime-field
    /// reduction, the multiplier `y` at each round is `acc[i] * k0 mod 2^64`,
    /// not `acc[i]` itself, since `n` is not congruent to `-1 mod 2^64`.
    fn montgomery_reduce(t: [u64; 8]) -> Self {
        let mut acc = [t[0], t[1], t[2], t[3], t[4], t[5], t[6], t[7], 0u64];
        for i in 0..4 {
            let y = acc[i].wrapping_mul(K0);
            let (_, carry) = mac(acc[i], y, MODULUS[0], 0);
            let (w1, carry) = mac(acc[i + 1], y, MODULUS[1], carry);
            let (w2, carry) = mac(acc[i + 2], y, MODULUS[2], carry);
            let (w3, carry) = mac(acc[i + 3], y, MODULUS[3], carry);
            acc[i + 1] = w1;
            acc[i + 2] = w2;
            acc[i + 3] = w3;
            // propagate the remaining carry upward through the wide buffer;
            // runs every remaining position unconditionally rather than
            // stopping at the first zero carry, so the iteration count never
            // depends on operand values.
            let mut c = carry;
            for k in (i + 4)..9 {
                let (w, c2) = adc(acc[k], 0, c);
                acc[k] = w;
                c = c2;
            }
        }
        let result = [acc[4], acc[5], acc[6], acc[7]];
        let (wrapped, _borrow) = sub4(result, MODULUS);
        let normal = reduce_once(result);
        let mask = 0u64.wrapping_sub(acc[8]);
        Scalar(cmov(mask, normal, wrapped))
    }

    /// Returns `self * rhs mod n` (inputs and output in Montgomery form).
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::montgomery_reduce(mul4x4(self.0, rhs.0))
    }

    /// Returns `self * self mod n`.
    pub fn square(&self) -> Self {
        Self::montgomery_reduce(sqr4(self.0))
    }

    /// Converts out of Montgomery form: `self * R^-1 mod n`.
    pub(crate) fn mul_by_one(&self) -> Self {
        let mut wide = [0u64; 8];
        wide[..4].copy_from_slice(&self.0);
        Self::montgomery_reduce(wide)
    }

    /// Converts a non-Montgomery 4-limb value into Montgomery form.
    pub(crate) fn to_montgomery(x: [u64; 4]) -> Self {
        Scalar(reduce_once(x)).mul(&Scalar(R2))
    }

    /// Returns the raw (non-Montgomery) canonical limbs, fully reduced (< n).
    pub(crate) fn to_canonical(self) -> [u64; 4] {
        self.mul_by_one().0
    }

    /// Returns `true` (as a `Choice`) if `self` is zero.
    pub fn is_zero(&self) -> Choice {
        let mask = is_zero_mask(self.0[0] | self.0[1] | self.0[2] | self.0[3]);
        Choice::from((mask & 1) as u8)
    }

    /// Parses a big-endian 32-byte encoding of a scalar, rejecting any
    /// value `>= n` (i.e. not a canonical representative).
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let limbs = limbs_from_be_bytes(bytes);
        let (_, borrow) = sub4(limbs, MODULUS);
        CtOption::new(Self::to_montgomery(limbs), Choice::from(borrow as u8))
    }

    /// Serialises `self` as a big-endian 32-byte canonical integer.
    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        limbs_to_be_bytes(self.to_canonical())
    }

    /// Returns the multiplicative inverse of `self`, or `None` if `self` is
    /// zero. Computed via a 256-round constant-time Montgomery-ladder
    /// exponentiation to `n - 2`: every bit of the fixed exponent performs
    /// one squaring and one conditional multiply-in, swapped in and out of
    /// an accumulator with `cswap` rather than branching.
    pub fn invert(&self) -> CtOption<Self> {
        let mut r0 = Self::ONE;
        let mut r1 = *self;

        // n - 2 has 256 fixed bits; walk them MSB to LSB, maintaining the
        // ladder invariant r1 == r0 * self throughout.
        for i in (0..4).rev() {
            for j in (0..64).rev() {
                let bit = (MODULUS_MINUS_2[i] >> j) & 1;
                cswap_n(bit, &mut r0.0, &mut r1.0);
                r1 = r0.mul(&r1);
                r0 = r0.square();
                cswap_n(bit, &mut r0.0, &mut r1.0);
            }
        }

        CtOption::new(r0, !self.is_zero())
    }
}
