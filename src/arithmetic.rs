//! Hand-rolled 256-bit arithmetic for NIST P-256.
//!
//! Layered bottom-up: [`util`] and [`bigint`] provide modulus-independent
//! limb primitives; [`field`] and [`scalar`] build the two Montgomery-form
//! finite fields on top of them (the coordinate field `GF(p)` and the
//! scalar field `GF(n)`); [`projective`] builds Jacobian point arithmetic
//! and constant-time scalar multiplication on top of `field`; [`affine`]
//! adds point validation and SEC1 compression on top of `projective`.

pub(crate) mod affine;
pub(crate) mod bigint;
pub(crate) mod field;
pub(crate) mod projective;
pub(crate) mod scalar;
pub(crate) mod util;

use field::FieldElement;

/// Curve coefficient `a = -3 mod p`, in Montgomery form.
pub(crate) const CURVE_EQUATION_A: FieldElement = field::CURVE_A;

/// Curve coefficient `b`, in Montgomery form.
pub(crate) const CURVE_EQUATION_B: FieldElement = field::CURVE_B;

/// The base point `G`'s x-coordinate, in Montgomery form.
pub(crate) const GENERATOR_X: FieldElement = FieldElement::from_raw([
    0x79e7_30d4_18a9_143c,
    0x75ba_95fc_5fed_b601,
    0x79fb_732b_7762_2510,
    0x1890_5f76_a537_55c6,
]);

/// The base point `G`'s y-coordinate, in Montgomery form.
pub(crate) const GENERATOR_Y: FieldElement = FieldElement::from_raw([
    0xddf2_5357_ce95_560a,
    0x8b4a_b8e4_ba19_e45c,
    0xd2e8_8688_dd21_f325,
    0x8571_ff18_2588_5d85,
]);
