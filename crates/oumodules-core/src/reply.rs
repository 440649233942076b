//! Reply construction.
//!
//! The builder walks the scan lazily and resolves each token as it goes. The
//! first token the catalog cannot resolve aborts the walk: whatever was
//! resolved so far is dropped and the reply becomes [`InteractionReply::Deferred`],
//! so the slower resolver answers the whole request.

use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::catalog::{CodeEntry, CodeLookup};
use crate::scanner::CodeMatch;

/// Message flag: only the invoking user can see the reply.
pub const EPHEMERAL: u32 = 1 << 6;

/// Text of the reply when the message has no codes at all.
pub const NO_RESULTS_TEXT: &str = "No modules found.";

/// Label of the link button pointing back at the scanned message.
pub const JUMP_LABEL: &str = "Jump to referenced message";

/// Interaction callback types.
pub mod callback {
    pub const PONG: u8 = 1;
    pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE: u8 = 5;
}

/// Message component types and styles.
pub mod component {
    pub const ACTION_ROW: u8 = 1;
    pub const BUTTON: u8 = 2;
    pub const STYLE_LINK: u8 = 5;
}

/// The synchronous reply to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionReply {
    /// Acknowledges a ping.
    Pong,
    /// A message answered in-process.
    Immediate(ImmediateMessage),
    /// The answer will follow asynchronously.
    Deferred,
}

impl InteractionReply {
    /// The callback type code sent on the wire.
    pub fn callback_type(&self) -> u8 {
        match self {
            InteractionReply::Pong => callback::PONG,
            InteractionReply::Immediate(_) => callback::CHANNEL_MESSAGE_WITH_SOURCE,
            InteractionReply::Deferred => callback::DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, InteractionReply::Deferred)
    }
}

impl Serialize for InteractionReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            InteractionReply::Immediate(message) => {
                let mut state = serializer.serialize_struct("InteractionReply", 2)?;
                state.serialize_field("type", &self.callback_type())?;
                state.serialize_field("data", &message.to_data())?;
                state.end()
            }
            InteractionReply::Pong | InteractionReply::Deferred => {
                let mut state = serializer.serialize_struct("InteractionReply", 1)?;
                state.serialize_field("type", &self.callback_type())?;
                state.end()
            }
        }
    }
}

/// What the immediate message says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// No codes in the text. Sent ephemerally.
    NoResults,
    /// Exactly one distinct code, sent as a plain line.
    Single(CodeEntry),
    /// Two or more distinct codes, grouped into one embed.
    Grouped(Vec<CodeEntry>),
}

/// An in-process answer plus the link back to the scanned message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmediateMessage {
    pub body: MessageBody,
    pub jump_url: String,
}

impl ImmediateMessage {
    /// Render into the wire message shape.
    pub fn to_data(&self) -> MessageData {
        let mut data = MessageData::with_jump_link(&self.jump_url);
        match &self.body {
            MessageBody::NoResults => {
                data.content = Some(NO_RESULTS_TEXT.to_string());
                data.flags = Some(EPHEMERAL);
            }
            MessageBody::Single(entry) => {
                data.content = Some(plain_text_line(entry));
            }
            MessageBody::Grouped(entries) => {
                data.embeds = Some(vec![Embed {
                    fields: entries
                        .iter()
                        .map(|e| EmbedField {
                            name: e.code.clone(),
                            value: embed_field_value(e),
                        })
                        .collect(),
                }]);
            }
        }
        data
    }
}

/// Wire shape of a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    pub components: Vec<ActionRow>,
}

impl MessageData {
    /// An empty message carrying only the jump-link button.
    pub fn with_jump_link(url: &str) -> Self {
        Self {
            content: None,
            embeds: None,
            flags: None,
            components: vec![ActionRow {
                kind: component::ACTION_ROW,
                components: vec![LinkButton {
                    kind: component::BUTTON,
                    style: component::STYLE_LINK,
                    label: JUMP_LABEL.to_string(),
                    url: url.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<LinkButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkButton {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub url: String,
}

/// Link back to a message: `<base>/<guild>/<channel>/<message>`.
#[derive(Debug, Clone, Copy)]
pub struct JumpLink<'a> {
    pub base: &'a str,
    pub guild_id: &'a str,
    pub channel_id: &'a str,
    pub message_id: &'a str,
}

impl JumpLink<'_> {
    pub fn url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base.trim_end_matches('/'),
            self.guild_id,
            self.channel_id,
            self.message_id
        )
    }
}

/// `[name](<url>)`, or just the name when there is no URL.
pub fn linked_name(name: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("[{name}](<{url}>)"),
        None => name.to_string(),
    }
}

/// `CODE: [name](<url>)` or `CODE: name`.
pub fn plain_text_line(entry: &CodeEntry) -> String {
    format!(
        "{}: {}",
        entry.code,
        linked_name(&entry.full_name, entry.url.as_deref())
    )
}

/// ` * [name](<url>)` or ` * name`.
pub fn embed_field_value(entry: &CodeEntry) -> String {
    format!(" * {}", linked_name(&entry.full_name, entry.url.as_deref()))
}

/// Distinct entries in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    entries: Vec<CodeEntry>,
    seen: HashSet<String>,
}

impl ResolvedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry unless its code is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: CodeEntry) -> bool {
        if !self.seen.insert(entry.code.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CodeEntry> {
        self.entries
    }
}

/// Build the reply for a scan.
///
/// Never returns [`InteractionReply::Pong`].
pub fn build_reply<'t, I, L>(matches: I, lookup: &L, jump: JumpLink<'_>) -> InteractionReply
where
    I: IntoIterator<Item = CodeMatch<'t>>,
    L: CodeLookup + ?Sized,
{
    let mut resolved = ResolvedSet::new();
    for m in matches {
        let code = m.canonical();
        match lookup.lookup(&code) {
            Some(entry) => {
                resolved.insert(entry);
            }
            None => {
                tracing::debug!(code = %code, offset = m.start, "code not in catalog, deferring");
                return InteractionReply::Deferred;
            }
        }
    }

    let mut entries = resolved.into_entries();
    let body = match entries.len() {
        0 => MessageBody::NoResults,
        1 => MessageBody::Single(entries.remove(0)),
        _ => MessageBody::Grouped(entries),
    };
    InteractionReply::Immediate(ImmediateMessage {
        body,
        jump_url: jump.url(),
    })
}
