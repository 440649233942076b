//! # OU Modules Core
//!
//! Pure primitives for the interaction endpoint: request authentication,
//! the course-code catalog, text scanning, and reply construction.
//!
//! This crate contains no networking and no queueing. Apart from loading the
//! catalog file, it is pure computation over the request.
//!
//! ## Key Types
//!
//! - [`Ed25519PublicKey`] / [`verify_signature`] - the authentication gate
//! - [`CodeCatalog`] - read-only code → (name, url) mapping
//! - [`scan`] - lazy, restartable course-code scanner
//! - [`build_reply`] - turns a scan into an [`InteractionReply`]
//! - [`Interaction`] - a parsed inbound interaction

pub mod catalog;
pub mod crypto;
pub mod error;
pub mod interaction;
pub mod reply;
pub mod scanner;

pub use catalog::{CodeCatalog, CodeEntry, CodeLookup};
pub use crypto::{
    signed_message, verify_signature, Ed25519PublicKey, Ed25519Signature, Keypair,
    APPLICATION_PUBLIC_KEY, SIGNATURE_HEX_LEN,
};
pub use error::CoreError;
pub use interaction::{CommandInteraction, Interaction, TargetMessage, DEFAULT_GUILD_ID};
pub use reply::{
    build_reply, ImmediateMessage, InteractionReply, JumpLink, MessageBody, MessageData,
    ResolvedSet,
};
pub use scanner::{scan, CodeMatch, Scan};
