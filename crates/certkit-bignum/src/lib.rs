//! Arbitrary-precision integer arithmetic for certkit.
//!
//! [`BigNum`] stores a sign-and-magnitude integer over 64-bit limbs and
//! backs the RSA operations and certificate serial numbers elsewhere in
//! the workspace. Modular exponentiation with an odd modulus runs through
//! [`MontgomeryCtx`], which keeps its window table lookups and final
//! reductions constant-time.

#![forbid(unsafe_code)]

mod bignum;
mod ct;
mod gcd;
mod montgomery;
mod ops;
mod prime;
mod rand;

pub use bignum::BigNum;
pub use montgomery::MontgomeryCtx;
