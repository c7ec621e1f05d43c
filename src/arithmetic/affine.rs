//! Point validation and SEC1 point compression/decompression.
//!
//! [`AffinePoint`] never represents the point at infinity: every value that
//! type checking lets you construct already passed the on-curve check, and
//! the point at infinity is not on the curve. Ordinary SEC1 decoding can
//! still fail (bad tag byte, coordinate out of range, not on the curve, or
//! a compressed point whose claimed parity doesn't match either square
//! root); those all report `None` through [`subtle::CtOption`] rather than
//! panicking, so that rejecting a malformed public key takes the same time
//! as accepting a valid one.

use super::field::FieldElement;
use super::projective::{curve_rhs, ProjectivePoint};
use super::{GENERATOR_X, GENERATOR_Y};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// A point on the curve, validated and held in affine coordinates.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AffinePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        AffinePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y)
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl AffinePoint {
    /// The base point `G`.
    pub(crate) const GENERATOR: AffinePoint = AffinePoint { x: GENERATOR_X, y: GENERATOR_Y };

    /// Validates that `(x, y)` lies on the curve, i.e. satisfies
    /// `y^2 = x^3 + a*x + b`.
    pub(crate) fn from_coordinates(x: FieldElement, y: FieldElement) -> CtOption<Self> {
        CtOption::new(AffinePoint { x, y }, y.square().ct_eq(&curve_rhs(&x)))
    }

    /// Checks `[n]Q = O`, `n` being the curve order. P-256 has cofactor 1,
    /// so this holds for every point already accepted by
    /// [`AffinePoint::from_coordinates`] — but public-key validation spells
    /// the check out explicitly rather than leaning on that fact.
    pub(crate) fn has_correct_order(&self) -> Choice {
        self.to_projective()
            .mul_limbs(&super::scalar::MODULUS)
            .is_identity()
    }

    /// Converts from Jacobian coordinates, rejecting the point at infinity
    /// (it has no affine representation).
    pub(crate) fn from_projective(p: &ProjectivePoint) -> CtOption<Self> {
        let (x, y) = p.to_affine();
        CtOption::new(AffinePoint { x, y }, !p.is_identity())
    }

    pub(crate) fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint::from_affine_coords(self.x, self.y)
    }

    /// Parses an uncompressed SEC1 point: `0x04 || X || Y`.
    pub(crate) fn from_uncompressed_bytes(bytes: &[u8; 65]) -> CtOption<Self> {
        let tag_ok = Choice::from((bytes[0] == 0x04) as u8);

        let mut x_bytes = [0u8; 32];
        let mut y_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..33]);
        y_bytes.copy_from_slice(&bytes[33..65]);

        FieldElement::from_bytes(&x_bytes)
            .and_then(|x| {
                FieldElement::from_bytes(&y_bytes).and_then(|y| Self::from_coordinates(x, y))
            })
            .and_then(|p| CtOption::new(p, tag_ok))
    }

    /// Encodes as an uncompressed SEC1 point: `0x04 || X || Y`.
    pub(crate) fn to_uncompressed_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..65].copy_from_slice(&self.y.to_bytes());
        out
    }

    /// Parses a compressed SEC1 point: `(0x02 | y_parity) || X`. Recovers
    /// `y` via [`FieldElement::sqrt`] and picks whichever of the two roots
    /// (`r`, `p - r`) matches the parity bit in the tag.
    pub(crate) fn from_compressed_bytes(bytes: &[u8; 33]) -> CtOption<Self> {
        let tag = bytes[0];
        let tag_ok = Choice::from(((tag == 0x02) || (tag == 0x03)) as u8);
        let y_is_odd = Choice::from(tag & 1);

        let mut x_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&bytes[1..33]);

        FieldElement::from_bytes(&x_bytes)
            .and_then(|x| {
                curve_rhs(&x).sqrt().map(|root| {
                    let flip = root.is_odd() ^ y_is_odd;
                    let y = FieldElement::conditional_select(&root, &root.neg(), flip);
                    AffinePoint { x, y }
                })
            })
            .and_then(|p| CtOption::new(p, tag_ok))
    }

    /// Encodes as a compressed SEC1 point: `(0x02 | y_parity) || X`.
    pub(crate) fn to_compressed_bytes(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = 0x02 | self.y.is_odd().unwrap_u8();
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(bool::from(
            AffinePoint::from_coordinates(GENERATOR_X, GENERATOR_Y).is_some()
        ));
    }

    #[test]
    fn uncompressed_round_trip() {
        let g = AffinePoint::GENERATOR;
        let bytes = g.to_uncompressed_bytes();
        let parsed = AffinePoint::from_uncompressed_bytes(&bytes).unwrap();
        assert_eq!(parsed, g);
    }

    #[test]
    fn compressed_round_trip() {
        let g = AffinePoint::GENERATOR;
        let bytes = g.to_compressed_bytes();
        let parsed = AffinePoint::from_compressed_bytes(&bytes).unwrap();
        assert_eq!(parsed, g);
    }

    #[test]
    fn uncompressed_rejects_bad_tag() {
        let mut bytes = AffinePoint::GENERATOR.to_uncompressed_bytes();
        bytes[0] = 0x05;
        assert!(bool::from(AffinePoint::from_uncompressed_bytes(&bytes).is_none()));
    }

    #[test]
    fn compressed_rejects_bad_tag() {
        let mut bytes = AffinePoint::GENERATOR.to_compressed_bytes();
        bytes[0] = 0x04;
        assert!(bool::from(AffinePoint::from_compressed_bytes(&bytes).is_none()));
    }

    #[test]
    fn uncompressed_rejects_off_curve_point() {
        let mut bytes = AffinePoint::GENERATOR.to_uncompressed_bytes();
        // flip the last byte of Y, almost certainly landing off the curve.
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        assert!(bool::from(AffinePoint::from_uncompressed_bytes(&bytes).is_none()));
    }

    #[test]
    fn compressed_both_parities_recover_valid_points() {
        let mut even = AffinePoint::GENERATOR.to_compressed_bytes();
        even[0] = 0x02;
        let mut odd = AffinePoint::GENERATOR.to_compressed_bytes();
        odd[0] = 0x03;

        let p_even = AffinePoint::from_compressed_bytes(&even).unwrap();
        let p_odd = AffinePoint::from_compressed_bytes(&odd).unwrap();
        assert!(!bool::from(p_even.y.is_odd()));
        assert!(bool::from(p_odd.y.is_odd()));
        assert_eq!(p_even.x, p_odd.x);
    }

    #[test]
    fn projective_round_trip() {
        let g = AffinePoint::GENERATOR;
        let projective = g.to_projective();
        let back = AffinePoint::from_projective(&projective).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn generator_has_correct_order() {
        assert!(bool::from(AffinePoint::GENERATOR.has_correct_order()));
    }

    #[test]
    fn identity_has_no_affine_representation() {
        assert!(bool::from(
            AffinePoint::from_projective(&ProjectivePoint::IDENTITY).is_none()
        ));
    }
}
