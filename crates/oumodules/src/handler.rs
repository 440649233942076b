//! The interaction handler: scanner → catalog → reply, plus the handoff
//! decision.

use serde::{Deserialize, Serialize};

use oumodules_core::{
    build_reply, scan, CodeLookup, CommandInteraction, Interaction, InteractionReply, JumpLink,
    TargetMessage,
};

use crate::config::InteractionConfig;
use crate::error::Result;

/// What the deferred worker receives.
///
/// Built only when the fast path could not resolve every code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffPayload {
    pub guild_id: String,
    pub target_id: String,
    pub message: TargetMessage,
    pub token: String,
    pub interaction_id: String,
}

impl HandoffPayload {
    pub fn from_command(command: &CommandInteraction) -> Self {
        Self {
            guild_id: command.guild_id.clone(),
            target_id: command.target_id.clone(),
            message: command.target_message.clone(),
            token: command.token.clone(),
            interaction_id: command.id.clone(),
        }
    }

    /// Key identifying this request, so only one worker instance answers it.
    pub fn claim_key(&self) -> String {
        format!("{}_{}", self.target_id, self.interaction_id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Result of handling a recognized interaction.
///
/// A handoff is present exactly when the reply is [`InteractionReply::Deferred`].
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    reply: InteractionReply,
    handoff: Option<HandoffPayload>,
}

impl Handled {
    fn reply_only(reply: InteractionReply) -> Self {
        Self {
            reply,
            handoff: None,
        }
    }

    fn deferred(handoff: HandoffPayload) -> Self {
        Self {
            reply: InteractionReply::Deferred,
            handoff: Some(handoff),
        }
    }

    /// The synchronous reply.
    pub fn reply(&self) -> &InteractionReply {
        &self.reply
    }

    /// Whether the request must be forwarded to the deferred worker.
    pub fn should_forward_to_worker(&self) -> bool {
        self.handoff.is_some()
    }

    pub fn handoff(&self) -> Option<&HandoffPayload> {
        self.handoff.as_ref()
    }

    /// The serialized handoff, if one is needed.
    pub fn handoff_json(&self) -> Result<Option<String>> {
        self.handoff.as_ref().map(HandoffPayload::to_json).transpose()
    }

    pub fn into_parts(self) -> (InteractionReply, Option<HandoffPayload>) {
        (self.reply, self.handoff)
    }
}

/// Outcome of [`InteractionHandler::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Handled(Handled),
    /// Interaction type this endpoint does not serve.
    Unrecognized(u64),
}

/// Drives the fast path for one interaction at a time.
///
/// Holds only shared, read-only state and can serve concurrent invocations.
#[derive(Debug, Clone)]
pub struct InteractionHandler<L> {
    catalog: L,
    jump_link_base: String,
}

impl<L: CodeLookup> InteractionHandler<L> {
    pub fn new(catalog: L, config: &InteractionConfig) -> Self {
        Self {
            catalog,
            jump_link_base: config.jump_link_base.clone(),
        }
    }

    pub fn catalog(&self) -> &L {
        &self.catalog
    }

    pub fn handle(&self, interaction: &Interaction) -> Outcome {
        match interaction {
            Interaction::Ping => Outcome::Handled(Handled::reply_only(InteractionReply::Pong)),
            Interaction::Command(command) => Outcome::Handled(self.handle_command(command)),
            Interaction::Unknown(kind) => Outcome::Unrecognized(*kind),
        }
    }

    pub fn handle_command(&self, command: &CommandInteraction) -> Handled {
        let jump = JumpLink {
            base: &self.jump_link_base,
            guild_id: &command.guild_id,
            channel_id: &command.target_message.channel_id,
            message_id: &command.target_id,
        };

        match build_reply(scan(command.target_message.content()), &self.catalog, jump) {
            InteractionReply::Deferred => {
                tracing::info!(
                    interaction_id = %command.id,
                    target_id = %command.target_id,
                    "unresolved code, handing off"
                );
                Handled::deferred(HandoffPayload::from_command(command))
            }
            reply => Handled::reply_only(reply),
        }
    }
}
