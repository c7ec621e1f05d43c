//! ECDSA signing and verification over P-256.
//!
//! [`hazmat`] holds the byte-exact, allocation-free primitives: a `u64`
//! flag for signing (never an early return — every call computes and
//! writes a full signature, and the flag only says whether `r` or `s`
//! landed on zero) and a `bool` for verification and point decoding
//! (branching here is fine, every input is public). The nonce `k` is
//! always supplied by the caller; this crate never generates randomness
//! or derives `k` from the message (no RFC 6979).
//!
//! The [`SigningKey`]/[`VerifyingKey`]/[`Signature`]/[`PublicKey`] types
//! below are a thin `Result`-returning convenience layer over the same
//! primitives, for callers who'd rather work with validated types than
//! raw byte buffers.

use crate::arithmetic::affine::AffinePoint;
use crate::arithmetic::projective::ProjectivePoint;
use crate::arithmetic::scalar::Scalar;
use crate::error::{Error, Result};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Which message digest a sign/verify call hashes with.
///
/// Only the first 32 bytes of the digest are ever used, read big-endian:
/// SHA-384 and SHA-512 are truncated to their leading 32 bytes, and
/// BLAKE2s's native 32-byte output passes through whole. This rule holds
/// uniformly regardless of the chosen algorithm's native output length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hash {
    /// SHA-256, used whole.
    Sha256,
    /// SHA-384, truncated to its leading 32 bytes.
    Sha384,
    /// SHA-512, truncated to its leading 32 bytes.
    Sha512,
    /// BLAKE2s, used whole (its native output is already 32 bytes).
    Blake2s,
}

impl Hash {
    fn digest32(self, m: &[u8]) -> [u8; 32] {
        use digest::Digest;
        let mut out = [0u8; 32];
        match self {
            Hash::Sha256 => out.copy_from_slice(&sha2::Sha256::digest(m)),
            Hash::Sha384 => out.copy_from_slice(&sha2::Sha384::digest(m)[..32]),
            Hash::Sha512 => out.copy_from_slice(&sha2::Sha512::digest(m)[..32]),
            Hash::Blake2s => out.copy_from_slice(&blake2::Blake2s256::digest(m)),
        }
        out
    }
}

/// Reduces a 32-byte big-endian digest or x-coordinate mod `n`. Unlike
/// [`Scalar::from_bytes`], this never rejects: any 32-byte value is
/// already `< 2^256 < 2n`, so [`Scalar::to_montgomery`]'s single
/// conditional subtraction always lands it in range.
fn reduce_digest(bytes: &[u8; 32]) -> Scalar {
    Scalar::to_montgomery(crate::arithmetic::bigint::limbs_from_be_bytes(bytes))
}

/// Byte-exact, allocation-free primitives: the flag/bool contract
/// described in the module documentation above.
pub mod hazmat {
    use super::*;

    fn sign_core(alg: Hash, out: &mut [u8; 64], m: &[u8], d: &[u8; 32], k: &[u8; 32]) -> u64 {
        let d = reduce_digest(d);
        let k = reduce_digest(k);
        let z = reduce_digest(&alg.digest32(m));

        let (x1, _) = ProjectivePoint::GENERATOR.mul(&k).to_affine();
        let r = reduce_digest(&x1.to_bytes());

        // If k happens to be zero, k*G is the identity and to_affine()
        // reports (0, 0); r comes out zero and the flag below catches it.
        let k_inv = k.invert().unwrap_or(Scalar::ZERO);
        let s = k_inv.mul(&z.add(&r.mul(&d)));

        out[..32].copy_from_slice(&r.to_bytes());
        out[32..].copy_from_slice(&s.to_bytes());

        u64::from(bool::from(r.is_zero())) | (u64::from(bool::from(s.is_zero())) << 1)
    }

    /// Validates a public key per SEC1 §3.2.2 and returns it as a
    /// projective point: coordinates in range (checked by
    /// [`crate::arithmetic::field::FieldElement::from_bytes`]), on-curve,
    /// and correct order.
    fn decode_public_key(public: &[u8; 64]) -> Option<ProjectivePoint> {
        use crate::arithmetic::field::FieldElement;

        let mut x_bytes = [0u8; 32];
        let mut y_bytes = [0u8; 32];
        x_bytes.copy_from_slice(&public[..32]);
        y_bytes.copy_from_slice(&public[32..]);

        let x: FieldElement = Option::from(FieldElement::from_bytes(&x_bytes))?;
        let y: FieldElement = Option::from(FieldElement::from_bytes(&y_bytes))?;
        let q: AffinePoint = Option::from(AffinePoint::from_coordinates(x, y))?;
        if !bool::from(q.has_correct_order()) {
            return None;
        }
        Some(q.to_projective())
    }

    fn verify_core(
        alg: Hash,
        m: &[u8],
        public: &[u8; 64],
        r_bytes: &[u8; 32],
        s_bytes: &[u8; 32],
    ) -> bool {
        let q = match decode_public_key(public) {
            Some(q) => q,
            None => return false,
        };

        let r: Scalar = match Option::from(Scalar::from_bytes(r_bytes)) {
            Some(r) => r,
            None => return false,
        };
        let s: Scalar = match Option::from(Scalar::from_bytes(s_bytes)) {
            Some(s) => s,
            None => return false,
        };
        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            return false;
        }

        let w: Scalar = match Option::from(s.invert()) {
            Some(w) => w,
            None => return false,
        };
        let z = reduce_digest(&alg.digest32(m));
        let u1 = z.mul(&w);
        let u2 = r.mul(&w);

        let p = ProjectivePoint::GENERATOR.mul(&u1).add(&q.mul(&u2));
        if bool::from(p.is_identity()) {
            return false;
        }

        let (px, _) = p.to_affine();
        bool::from(reduce_digest(&px.to_bytes()).ct_eq(&r))
    }

    /// Signs `m` with private key `d` and nonce `k`, writing `r || s` into
    /// `out`. Returns 0 on success; a nonzero flag means `r == 0` or
    /// `s == 0` (an astronomically unlikely but required check) — in that
    /// case `out` still holds a fully-computed signature that MUST NOT be
    /// used. Both `d` and `k` must be in `[1, n)`; the caller is
    /// responsible for that (they are reduced mod `n` here, not rejected).
    pub fn ecdsa_p256_sha2_256_sign(out: &mut [u8; 64], m: &[u8], d: &[u8; 32], k: &[u8; 32]) -> u64 {
        sign_core(Hash::Sha256, out, m, d, k)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_sign`], hashing with SHA-384.
    pub fn ecdsa_p256_sha2_384_sign(out: &mut [u8; 64], m: &[u8], d: &[u8; 32], k: &[u8; 32]) -> u64 {
        sign_core(Hash::Sha384, out, m, d, k)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_sign`], hashing with SHA-512.
    pub fn ecdsa_p256_sha2_512_sign(out: &mut [u8; 64], m: &[u8], d: &[u8; 32], k: &[u8; 32]) -> u64 {
        sign_core(Hash::Sha512, out, m, d, k)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_sign`], hashing with BLAKE2s.
    pub fn ecdsa_p256_blake2_sign(out: &mut [u8; 64], m: &[u8], d: &[u8; 32], k: &[u8; 32]) -> u64 {
        sign_core(Hash::Blake2s, out, m, d, k)
    }

    /// Verifies `(r, s)` over `m` against the uncompressed public key
    /// `pub` (`x || y`, 64 bytes). Rejects an invalid key or an
    /// out-of-range `r`/`s` the same way it rejects a bad signature.
    pub fn ecdsa_p256_sha2_256_verify(m: &[u8], public: &[u8; 64], r: &[u8; 32], s: &[u8; 32]) -> bool {
        verify_core(Hash::Sha256, m, public, r, s)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_verify`], hashing with SHA-384.
    pub fn ecdsa_p256_sha2_384_verify(m: &[u8], public: &[u8; 64], r: &[u8; 32], s: &[u8; 32]) -> bool {
        verify_core(Hash::Sha384, m, public, r, s)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_verify`], hashing with SHA-512.
    pub fn ecdsa_p256_sha2_512_verify(m: &[u8], public: &[u8; 64], r: &[u8; 32], s: &[u8; 32]) -> bool {
        verify_core(Hash::Sha512, m, public, r, s)
    }

    /// Same contract as [`ecdsa_p256_sha2_256_verify`], hashing with BLAKE2s.
    pub fn ecdsa_p256_blake2_verify(m: &[u8], public: &[u8; 64], r: &[u8; 32], s: &[u8; 32]) -> bool {
        verify_core(Hash::Blake2s, m, public, r, s)
    }

    /// Checks the `0x04` tag on an uncompressed SEC1 point and copies the
    /// 64-byte `x || y` payload out. Does not validate the coordinates.
    pub fn decompress_uncompressed(input: &[u8; 65], out: &mut [u8; 64]) -> bool {
        if input[0] != 0x04 {
            return false;
        }
        out.copy_from_slice(&input[1..65]);
        true
    }

    /// Decompresses a SEC1 point: checks the `0x02`/`0x03` tag, validates
    /// `x < p`, and recovers `y` via its modular square root.
    pub fn decompress_compressed(input: &[u8; 33], out: &mut [u8; 64]) -> bool {
        match Option::<AffinePoint>::from(AffinePoint::from_compressed_bytes(input)) {
            Some(p) => {
                out[..32].copy_from_slice(&p.x.to_bytes());
                out[32..].copy_from_slice(&p.y.to_bytes());
                true
            }
            None => false,
        }
    }

    /// Formats `x || y` as an uncompressed SEC1 point. Pure reformatting,
    /// no validation.
    pub fn compress_uncompressed(input: &[u8; 64], out: &mut [u8; 65]) {
        out[0] = 0x04;
        out[1..].copy_from_slice(input);
    }

    /// Formats `x || y` as a compressed SEC1 point (drops `y`, keeps its
    /// parity in the tag byte). Pure reformatting, no validation.
    pub fn compress_compressed(input: &[u8; 64], out: &mut [u8; 33]) {
        out[0] = 0x02 | (input[63] & 1);
        out[1..].copy_from_slice(&input[..32]);
    }
}

/// A parsed ECDSA signature: `r` and `s`, each validated to lie in
/// `[1, n)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; 64],
}

impl Signature {
    /// Parses `r || s` from 64 bytes, rejecting a zero or out-of-range
    /// component.
    pub fn from_bytes(bytes: [u8; 64]) -> Result<Self> {
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        s_bytes.copy_from_slice(&bytes[32..]);

        let r: Scalar = Option::from(Scalar::from_bytes(&r_bytes)).ok_or(Error)?;
        let s: Scalar = Option::from(Scalar::from_bytes(&s_bytes)).ok_or(Error)?;
        if bool::from(r.is_zero()) || bool::from(s.is_zero()) {
            return Err(Error);
        }
        Ok(Signature { bytes })
    }

    /// Encodes as `r || s`, 64 bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.bytes
    }
}

/// A validated public key.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    fn from_point(point: AffinePoint) -> Result<Self> {
        if bool::from(point.has_correct_order()) {
            Ok(PublicKey { point })
        } else {
            Err(Error)
        }
    }

    /// Parses and validates an uncompressed SEC1 point.
    pub fn from_uncompressed_bytes(bytes: &[u8; 65]) -> Result<Self> {
        let point: AffinePoint =
            Option::from(AffinePoint::from_uncompressed_bytes(bytes)).ok_or(Error)?;
        Self::from_point(point)
    }

    /// Parses and validates a compressed SEC1 point.
    pub fn from_compressed_bytes(bytes: &[u8; 33]) -> Result<Self> {
        let point: AffinePoint =
            Option::from(AffinePoint::from_compressed_bytes(bytes)).ok_or(Error)?;
        Self::from_point(point)
    }

    /// Encodes as an uncompressed SEC1 point.
    pub fn to_uncompressed_bytes(&self) -> [u8; 65] {
        self.point.to_uncompressed_bytes()
    }

    /// Encodes as a compressed SEC1 point.
    pub fn to_compressed_bytes(&self) -> [u8; 33] {
        self.point.to_compressed_bytes()
    }

    fn to_raw(self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.point.x.to_bytes());
        out[32..].copy_from_slice(&self.point.y.to_bytes());
        out
    }
}

/// A public key used to verify ECDSA signatures.
#[derive(Clone, Copy, Debug)]
pub struct VerifyingKey {
    public_key: PublicKey,
}

impl VerifyingKey {
    pub fn from_uncompressed_bytes(bytes: &[u8; 65]) -> Result<Self> {
        Ok(VerifyingKey { public_key: PublicKey::from_uncompressed_bytes(bytes)? })
    }

    pub fn from_compressed_bytes(bytes: &[u8; 33]) -> Result<Self> {
        Ok(VerifyingKey { public_key: PublicKey::from_compressed_bytes(bytes)? })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Verifies `signature` over `m` under `hash`.
    pub fn verify(&self, hash: Hash, m: &[u8], signature: &Signature) -> Result<()> {
        let public = self.public_key.to_raw();
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        let ok = match hash {
            Hash::Sha256 => hazmat::ecdsa_p256_sha2_256_verify(m, &public, &r, &s),
            Hash::Sha384 => hazmat::ecdsa_p256_sha2_384_verify(m, &public, &r, &s),
            Hash::Sha512 => hazmat::ecdsa_p256_sha2_512_verify(m, &public, &r, &s),
            Hash::Blake2s => hazmat::ecdsa_p256_blake2_verify(m, &public, &r, &s),
        };
        if ok {
            Ok(())
        } else {
            Err(Error)
        }
    }
}

/// A private key used to produce ECDSA signatures. The nonce `k` for each
/// signature is always supplied by the caller of [`SigningKey::sign`];
/// this type never generates or derives one itself.
#[derive(Clone)]
pub struct SigningKey {
    scalar: Scalar,
    bytes: [u8; 32],
}

impl SigningKey {
    /// Parses a private scalar `d`, rejecting zero or an out-of-range
    /// value.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        let scalar: Scalar = Option::from(Scalar::from_bytes(&bytes)).ok_or(Error)?;
        if bool::from(scalar.is_zero()) {
            return Err(Error);
        }
        Ok(SigningKey { scalar, bytes })
    }

    /// Derives the matching public key, `d * G`.
    pub fn verifying_key(&self) -> VerifyingKey {
        let point = ProjectivePoint::GENERATOR.mul(&self.scalar);
        // A nonzero scalar times the generator of a prime-order group is
        // never the identity.
        let affine = Option::from(AffinePoint::from_projective(&point))
            .expect("nonzero private scalar yields a nonzero public point");
        VerifyingKey { public_key: PublicKey { point: affine } }
    }

    /// Signs `m` under `hash` with nonce `k`. `k` must be in `[1, n)` and
    /// must never be reused across two different messages signed with the
    /// same key; this type has no way to enforce either requirement.
    pub fn sign(&self, hash: Hash, m: &[u8], k: [u8; 32]) -> Result<Signature> {
        let mut out = [0u8; 64];
        let flag = match hash {
            Hash::Sha256 => hazmat::ecdsa_p256_sha2_256_sign(&mut out, m, &self.bytes, &k),
            Hash::Sha384 => hazmat::ecdsa_p256_sha2_384_sign(&mut out, m, &self.bytes, &k),
            Hash::Sha512 => hazmat::ecdsa_p256_sha2_512_sign(&mut out, m, &self.bytes, &k),
            Hash::Blake2s => hazmat::ecdsa_p256_blake2_sign(&mut out, m, &self.bytes, &k),
        };
        if flag != 0 {
            return Err(Error);
        }
        Signature::from_bytes(out)
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
