//! # OU Modules
//!
//! Interaction endpoint for the OU modules bot: a message command that looks
//! up every course code in the referenced message.
//!
//! ## Overview
//!
//! - **Authentication**: every request is verified against the platform's
//!   Ed25519 signature before its body is parsed
//! - **Fast path**: codes are scanned and resolved against an in-process
//!   catalog, and the reply is built immediately
//! - **Handoff**: if any code is unknown, the endpoint acknowledges with a
//!   deferred reply and publishes the request for a slower worker
//! - **Follow-up**: the worker claims the handoff, resolves the codes against
//!   the catalog and the university site, and edits the deferred reply
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oumodules::{InteractionConfig, InteractionService, InboundRequest, MemoryPublisher};
//!
//! async fn example(body: Vec<u8>, timestamp: String, signature: String) {
//!     let service = InteractionService::open(InteractionConfig::default(), MemoryPublisher::new())
//!         .unwrap();
//!
//!     let request = InboundRequest::post(body)
//!         .with_header("x-signature-timestamp", timestamp)
//!         .with_header("x-signature-ed25519", signature);
//!
//!     let response = service.handle(&request).await.unwrap();
//!     println!("{} {:?}", response.status, response.body);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `oumodules::core` - scanner, catalog, reply construction, signatures

pub mod claims;
pub mod config;
pub mod error;
pub mod followup;
pub mod handler;
pub mod publisher;
pub mod resolver;
pub mod service;

pub use oumodules_core as core;

pub use claims::{MemoryClaims, MessageClaims};
pub use config::{FollowUpConfig, HandoffTopic, InteractionConfig};
pub use error::{InteractionError, Result};
pub use followup::{build_follow_up, compose_follow_up, FollowUp};
pub use handler::{HandoffPayload, Handled, InteractionHandler, Outcome};
pub use publisher::{HandoffPublisher, MemoryPublisher, PublishedMessage};
pub use resolver::{CatalogResolver, CodeResolver, PageFetcher, PageHead, WebResolver};
pub use service::{HttpResponse, InboundRequest, InteractionService};

pub use oumodules_core::{
    CodeCatalog, CodeEntry, CodeLookup, Ed25519PublicKey, Interaction, InteractionReply, Keypair,
};
