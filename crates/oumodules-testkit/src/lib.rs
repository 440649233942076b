//! # OU Modules Testkit
//!
//! Testing utilities for the interaction endpoint.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: known signatures that must (or must not) verify
//! - **Generators**: proptest strategies for codes and message text
//! - **Fixtures**: a signing keypair, a sample catalog, and request builders
//!
//! ## Golden Vectors
//!
//! ```rust
//! use oumodules_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok) in verify_all_vectors() {
//!     assert!(ok, "{name}");
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use oumodules_testkit::fixtures::{command_request, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let body = command_request("M208").to_string();
//! let signed = fixture.sign_body(body.as_bytes());
//! assert_eq!(signed.signature.len(), 128);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{command_request, ping_request, sample_catalog, SignedBody, TestFixture};
pub use vectors::{all_vectors, verify_all_vectors, SignatureVector};
