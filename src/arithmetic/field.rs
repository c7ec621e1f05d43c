//! Field arithmetic modulo p = 2^256 - 2^224 + 2^192 + 2^96 - 1.
//!
//! Elements are stored as four little-endian 64-bit limbs and are always
//! held in Montgomery form internally, i.e. `FieldElement(a)` represents
//! `a * R mod p` with `R = 2^256`. Every public arithmetic operation keeps
//! its result fully reduced (< p) and avoids branching on field values, so
//! that the only input this module's running time depends on is which
//! operation was called, never which values were passed to it.

use crate::arithmetic::bigint::{
    add4, cmov, limbs_from_be_bytes, limbs_to_be_bytes, mul4x4, sqr4, sub4,
};
use crate::arithmetic::util::{adc, is_zero_mask, mac};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// p = 2^256 - 2^224 + 2^192 + 2^96 - 1, little-endian limbs.
pub(crate) const MODULUS: [u64; 4] = [
    0xffff_ffff_ffff_ffff,
    0x0000_0000_ffff_ffff,
    0x0000_0000_0000_0000,
    0xffff_ffff_0000_0001,
];

/// R mod p = 2^256 mod p, the Montgomery representation of 1.
const R: [u64; 4] = [
    0x0000_0000_0000_0001,
    0xffff_ffff_0000_0000,
    0xffff_ffff_ffff_ffff,
    0x0000_0000_ffff_fffe,
];

/// R^2 mod p, used to move values into Montgomery form.
const R2: [u64; 4] = [
    0x0000_0000_0000_0003,
    0xffff_fffb_ffff_ffff,
    0xffff_ffff_ffff_fffe,
    0x0000_0004_ffff_fffd,
];

/// curve coefficient a = -3 mod p, in Montgomery form.
pub(crate) const CURVE_A: FieldElement = FieldElement([
    0xffff_ffff_ffff_fffc,
    0x0000_0003_ffff_ffff,
    0x0000_0000_0000_0000,
    0xffff_fffc_0000_0004,
]);

const ZERO: [u64; 4] = [0, 0, 0, 0];

/// curve coefficient b, in Montgomery form.
/// b = 0x5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b
pub(crate) const CURVE_B: FieldElement = FieldElement([
    0xd89c_df62_29c4_bddf,
    0xacf0_05cd_7884_3090,
    0xe5a2_20ab_f721_2ed6,
    0xdc30_061d_0487_4834,
]);

/// An element of the prime field GF(p) underlying P-256, held in Montgomery form.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldElement([u64; 4]);

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        let diff = self.0[0] ^ other.0[0]
            | self.0[1] ^ other.0[1]
            | self.0[2] ^ other.0[2]
            | self.0[3] ^ other.0[3];
        Choice::from((is_zero_mask(diff) & 1) as u8)
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mask = 0u64.wrapping_sub(choice.unwrap_u8() as u64);
        FieldElement(cmov(mask, a.0, b.0))
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

/// Solinas-style conditional subtraction: if `x >= p`, returns `x - p`, else `x`.
#[inline]
const fn reduce_once(x: [u64; 4]) -> [u64; 4] {
    let (t, borrow) = sub4(x, MODULUS);
    // borrow == 1 means x < p, so keep x; borrow == 0 means x >= p, use t.
    let mask = 0u64.wrapping_sub(1 - borrow);
    cmov(mask, x, t)
}

impl FieldElement {
    /// The additive identity.
    pub const ZERO: FieldElement = FieldElement(ZERO);

    /// The multiplicative identity.
    pub const ONE: FieldElement = FieldElement(R);

    /// Builds an element directly from its Montgomery-form limbs.
    ///
    /// Only for curve-constant definitions computed and verified ahead of
    /// time; callers with ordinary integers should go through
    /// [`FieldElement::to_montgomery`] instead.
    pub(crate) const fn from_raw(limbs: [u64; 4]) -> Self {
        FieldElement(limbs)
    }

    /// Returns `self + rhs mod p`.
    ///
    /// Bit 256 of `p` is effectively set once the limb addition is accounted
    /// for, so the five-word intermediate sum is conditionally reduced by a
    /// single subtraction of `p` (never a loop, never a branch on the value).
    pub fn add(&self, rhs: &Self) -> Self {
        let (sum, carry) = add4(self.0, rhs.0);
        let (t, borrow) = sub4(sum, MODULUS);
        // If the 5-limb value (carry:sum) is still >= p, t is the right
        // answer; otherwise keep sum. carry=1 always means >= p since p < 2^256.
        let use_t = carry | (1 - borrow);
        let mask = 0u64.wrapping_sub(use_t);
        FieldElement(cmov(mask, sum, t))
    }

    /// Returns `2 * self mod p`.
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// Returns `self - rhs mod p`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (t, borrow) = sub4(self.0, rhs.0);
        let mask = 0u64.wrapping_sub(borrow);
        let (w0, c) = adc(t[0], MODULUS[0] & mask, 0);
        let (w1, c) = adc(t[1], MODULUS[1] & mask, c);
        let (w2, c) = adc(t[2], MODULUS[2] & mask, c);
        let (w3, _c) = adc(t[3], MODULUS[3] & mask, c);
        FieldElement([w0, w1, w2, w3])
    }

    /// Returns `-self mod p`.
    pub fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    /// Montgomery reduction of an 8-limb product, exploiting that
    /// `-p^-1 mod 2^64 == 1` for this modulus: the multiplier at each round
    /// is simply the current low limb of the accumulator. A ninth overflow
    /// limb catches the carry that the final round can push past bit 512
    /// (the running total can briefly exceed `2^256`, i.e. the four result
    /// limbs alone aren't always enough to hold it before reduction).
    fn montgomery_reduce(t: [u64; 8]) -> Self {
        let mut acc = [t[0], t[1], t[2], t[3], t[4], t[5], t[6], t[7], 0u64];
        for i in 0..4 {
            let y = acc[i];
            // acc[i..] += y * MODULUS, then the low limb becomes 0 and drops out.
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
        // `result` (with the overflow limb folded back in) is always < 2p:
        // when the overflow limb is 1, a single wraparound subtraction of
        // MODULUS lands exactly on the right value; otherwise the usual
        // conditional subtraction suffices.
        let (wrapped, _borrow) = sub4(result, MODULUS);
        let normal = reduce_once(result);
        let mask = 0u64.wrapping_sub(acc[8]);
        FieldElement(cmov(mask, normal, wrapped))
    }

    /// Returns `self * rhs mod p` (inputs and output in Montgomery form).
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::montgomery_reduce(mul4x4(self.0, rhs.0))
    }

    /// Returns `self * self mod p`.
    pub fn square(&self) -> Self {
        Self::montgomery_reduce(sqr4(self.0))
    }

    /// Converts out of Montgomery form: `self * R^-1 mod p`.
    pub(crate) fn mul_by_one(&self) -> Self {
        let mut wide = [0u64; 8];
        wide[..4].copy_from_slice(&self.0);
        Self::montgomery_reduce(wide)
    }

    /// Converts a non-Montgomery 4-limb value into Montgomery form.
    pub(crate) fn to_montgomery(x: [u64; 4]) -> Self {
        FieldElement(reduce_once(x)).mul(&FieldElement(R2))
    }

    /// Returns the raw (non-Montgomery) canonical limbs, fully reduced (< p).
    pub(crate) fn to_canonical(self) -> [u64; 4] {
        self.mul_by_one().0
    }

    /// Squares `self` `n` times in place.
    fn square_n(&self, n: u32) -> Self {
        let mut x = *self;
        for _ in 0..n {
            x = x.square();
        }
        x
    }

    /// Returns `(self^(2^n - 1), self^(2^n))`: the usual "pow2m1" building
    /// block for addition-chain exponentiation (HACL's `fsquarePowNminusOne`).
    fn pow2m1(&self) -> impl Fn(u32) -> (Self, Self) + '_ {
        move |n: u32| {
            let mut a = *self;
            let mut b = Self::ONE;
            for _ in 0..n {
                b = b.mul(&a);
                a = a.square();
            }
            (b, a)
        }
    }

    /// Returns `self^(p-2) mod p`, i.e. the Fermat inverse, via the fixed
    /// addition chain `p - 2 = (2^32-1)*2^224 + 2^192 + (2^94-1)*4 + 1`.
    /// No branching on the value of `self`.
    fn pow_p_minus_2(&self) -> Self {
        let pow2m1 = self.pow2m1();

        let (b0, _a32) = pow2m1(32);
        let result1 = b0.square_n(224);

        let result2 = self.square_n(192);

        let (b94, _a94) = pow2m1(94);
        let result3 = b94.square_n(2);

        result1.mul(&result2).mul(&result3).mul(self)
    }

    /// Returns the multiplicative inverse of `self`, or `None` if `self` is
    /// zero. Constant-time in the value of `self` (the Fermat exponentiation
    /// performs the same operations regardless of the bits of `self`).
    pub fn invert(&self) -> CtOption<Self> {
        let inv = self.pow_p_minus_2();
        CtOption::new(inv, !self.is_zero())
    }

    /// Returns `true` (as a `Choice`) if `self` is zero.
    pub fn is_zero(&self) -> Choice {
        let mask = is_zero_mask(self.0[0] | self.0[1] | self.0[2] | self.0[3]);
        Choice::from((mask & 1) as u8)
    }

    /// Returns `true` (as a `Choice`) if the canonical integer represented
    /// by `self` is odd.
    pub(crate) fn is_odd(&self) -> Choice {
        Choice::from((self.to_canonical()[0] & 1) as u8)
    }

    /// Parses a big-endian 32-byte encoding of a field element, rejecting
    /// any value `>= p` (i.e. not a canonical representative).
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> CtOption<Self> {
        let limbs = limbs_from_be_bytes(bytes);
        let (_, borrow) = sub4(limbs, MODULUS);
        CtOption::new(Self::to_montgomery(limbs), Choice::from(borrow as u8))
    }

    /// Serialises `self` as a big-endian 32-byte canonical integer.
    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        limbs_to_be_bytes(self.to_canonical())
    }

    /// Returns `sqrt(self)`, if one exists: p ≡ 3 (mod 4), so
    /// `sqrt(a) = a^((p+1)/4) mod p`. The caller is responsible for picking
    /// the correctly-signed root between `r` and `p - r`.
    ///
    /// `(p+1)/4 = (2^32-1)*2^222 + 2^190 + 2^94`.
    pub fn sqrt(&self) -> CtOption<Self> {
        let pow2m1 = self.pow2m1();
        let (b32, _a32) = pow2m1(32);
        let result1 = b32.square_n(222);
        let result2 = self.square_n(190);
        let result3 = self.square_n(94);
        let candidate = result1.mul(&result2).mul(&result3);

        CtOption::new(candidate, candidate.square().ct_eq(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_additive_identity() {
        assert_eq!(FieldElement::ZERO.add(&FieldElement::ZERO), FieldElement::ZERO);
        assert_eq!(FieldElement::ONE.add(&FieldElement::ZERO), FieldElement::ONE);
    }

    #[test]
    fn one_is_multiplicative_identity() {
        assert_eq!(FieldElement::ONE.mul(&FieldElement::ONE), FieldElement::ONE);
    }

    #[test]
    fn montgomery_round_trip() {
        let a = FieldElement::to_montgomery([0x1234_5678, 0xdead_beef, 1, 0]);
        let back = a.mul_by_one();
        let redone = FieldElement::to_montgomery(back.0);
        assert_eq!(redone, a);
    }

    #[test]
    fn p_minus_1_plus_1_wraps_to_zero() {
        let p_minus_1 = FieldElement::to_montgomery(sub4(MODULUS, [1, 0, 0, 0]).0);
        let one = FieldElement::to_montgomery([1, 0, 0, 0]);
        assert_eq!(p_minus_1.add(&one), FieldElement::ZERO);
    }

    #[test]
    fn sub_zero_minus_one_is_p_minus_1() {
        let one = FieldElement::to_montgomery([1, 0, 0, 0]);
        let result = FieldElement::ZERO.sub(&one).to_canonical();
        let expect = sub4(MODULUS, [1, 0, 0, 0]).0;
        assert_eq!(result, expect);
    }

    #[test]
    fn invert_then_multiply_is_one() {
        let a = FieldElement::to_montgomery([7, 0, 0, 0]);
        let inv = a.invert().unwrap();
        assert_eq!(a.mul(&inv), FieldElement::ONE);
    }

    #[test]
    fn invert_zero_reports_none() {
        assert!(bool::from(FieldElement::ZERO.invert().is_none()));
    }

    #[test]
    fn bytes_round_trip() {
        let mut bytes = [0u8; 32];
        bytes[31] = 9;
        let a = FieldElement::from_bytes(&bytes).unwrap();
        assert_eq!(a.to_bytes(), bytes);
    }

    #[test]
    fn bytes_reject_out_of_range_value() {
        let bytes = limbs_to_be_bytes(MODULUS);
        assert!(bool::from(FieldElement::from_bytes(&bytes).is_none()));
    }

    #[test]
    fn is_odd_matches_canonical_low_bit() {
        let even = FieldElement::to_montgomery([8, 0, 0, 0]);
        let odd = FieldElement::to_montgomery([9, 0, 0, 0]);
        assert!(!bool::from(even.is_odd()));
        assert!(bool::from(odd.is_odd()));
    }

    #[test]
    fn sqrt_of_a_square_is_a_root() {
        let a = FieldElement::to_montgomery([9, 0, 0, 0]);
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert_eq!(root.square(), sq);
    }

    proptest! {
        #[test]
        fn add_then_sub_round_trips(a0 in any::<u64>(), b0 in any::<u64>()) {
            let a = FieldElement::to_montgomery([a0, 0, 0, 0]);
            let b = FieldElement::to_montgomery([b0, 0, 0, 0]);
            prop_assert_eq!(a.add(&b).sub(&a), b);
        }

        #[test]
        fn mul_is_commutative(a0 in any::<u64>(), b0 in any::<u64>()) {
            let a = FieldElement::to_montgomery([a0, 0, 0, 0]);
            let b = FieldElement::to_montgomery([b0, 0, 0, 0]);
            prop_assert_eq!(a.mul(&b), b.mul(&a));
        }

        #[test]
        fn square_matches_self_mul(a0 in any::<u64>()) {
            let a = FieldElement::to_montgomery([a0, 0, 0, 0]);
            prop_assert_eq!(a.square(), a.mul(&a));
        }
    }
}
