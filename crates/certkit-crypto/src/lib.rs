#![forbid(unsafe_code)]
#![doc = "Cryptographic algorithm library for certkit."]
#![allow(clippy::new_without_default)]

// Core traits
pub mod provider;

// Hash algorithms
#[cfg(feature = "md2")]
pub mod md2;
#[cfg(feature = "md5")]
pub mod md5;
#[cfg(feature = "sha1")]
pub mod sha1;
#[cfg(feature = "sha2")]
pub mod sha2;

pub mod hash;

// Asymmetric algorithms
#[cfg(feature = "rsa")]
pub mod rsa;
