//! The deferred worker's side of a handoff.
//!
//! After the endpoint answers with a deferred acknowledgment, the worker
//! resolves every code in the message with a slower, more complete resolver
//! and edits the original response. Unlike the fast path, codes that still
//! cannot be resolved are reported as "Not found" instead of aborting.
//! Each handoff is claimed first, so a redelivered or duplicated handoff is
//! answered at most once.

use std::collections::HashSet;

use oumodules_core::reply::{linked_name, Embed, EmbedField, NO_RESULTS_TEXT};
use oumodules_core::{scan, CodeEntry, JumpLink, MessageData};

use crate::claims::MessageClaims;
use crate::config::FollowUpConfig;
use crate::error::Result;
use crate::handler::HandoffPayload;
use crate::resolver::CodeResolver;

/// Title used for codes the resolver does not know.
pub const NOT_FOUND_TITLE: &str = "Not found";

/// Content of a follow-up listing several codes.
pub const MULTIPLE_RESULTS_TEXT: &str = "Multiple results found.";

/// The edit to apply to the deferred response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    /// Endpoint for editing the original response.
    pub url: String,
    pub data: MessageData,
}

/// Claim the handoff, then resolve its codes and build the follow-up message.
///
/// Returns `Ok(None)` when another worker already holds the claim. If
/// resolution fails the claim is released so a later delivery can retry.
pub async fn build_follow_up<R, C>(
    handoff: &HandoffPayload,
    resolver: &R,
    claims: &C,
    config: &FollowUpConfig,
) -> Result<Option<FollowUp>>
where
    R: CodeResolver + ?Sized,
    C: MessageClaims + ?Sized,
{
    let key = handoff.claim_key();
    if !claims.try_claim(&key).await? {
        tracing::info!(claim_key = %key, "handoff already claimed, skipping");
        return Ok(None);
    }

    match compose_follow_up(handoff, resolver, config).await {
        Ok(follow_up) => Ok(Some(follow_up)),
        Err(e) => {
            if let Err(release) = claims.release(&key).await {
                tracing::warn!(claim_key = %key, error = %release, "failed to release claim");
            }
            Err(e)
        }
    }
}

/// Resolve the handoff's codes and build the follow-up message, unclaimed.
///
/// At most `codes_limit` raw matches are considered, before deduplication.
pub async fn compose_follow_up<R>(
    handoff: &HandoffPayload,
    resolver: &R,
    config: &FollowUpConfig,
) -> Result<FollowUp>
where
    R: CodeResolver + ?Sized,
{
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for m in scan(handoff.message.content()).take(config.codes_limit) {
        let code = m.canonical();
        if !seen.insert(code.clone()) {
            continue;
        }
        let entry = match resolver.resolve(&code).await? {
            Some(entry) => entry,
            None => {
                tracing::info!(code = %code, "code not found by resolver");
                CodeEntry::new(code, NOT_FOUND_TITLE, None)
            }
        };
        results.push(entry);
    }

    let jump = JumpLink {
        base: &config.jump_link_base,
        guild_id: &handoff.guild_id,
        channel_id: &handoff.message.channel_id,
        message_id: &handoff.target_id,
    };
    let mut data = MessageData::with_jump_link(&jump.url());
    match results.as_slice() {
        [] => data.content = Some(NO_RESULTS_TEXT.to_string()),
        [single] => data.content = Some(format_result(single, false)),
        many => {
            data.content = Some(MULTIPLE_RESULTS_TEXT.to_string());
            data.embeds = Some(vec![Embed {
                fields: many
                    .iter()
                    .map(|e| EmbedField {
                        name: e.code.clone(),
                        value: format_result(e, true),
                    })
                    .collect(),
            }]);
        }
    }

    Ok(FollowUp {
        url: format!(
            "{}/{}/{}/messages/@original",
            config.webhook_base.trim_end_matches('/'),
            config.application_id,
            handoff.token
        ),
        data,
    })
}

/// Format one result for the follow-up.
///
/// `!` is stripped so the reply can never trigger another bot command.
pub fn format_result(entry: &CodeEntry, for_embed: bool) -> String {
    let text = linked_name(&entry.full_name, entry.url.as_deref());
    let formatted = if for_embed {
        format!(" * {text} ")
    } else {
        format!("{}: {text}", entry.code)
    };
    formatted.replace('!', "")
}
