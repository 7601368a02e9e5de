// Canonical update model shared by the receiver, router and handlers
use serde::{Deserialize, Serialize};

use crate::telegram::types::{Message, RawUpdate};

/// Platform-native user identifier (Telegram user ids fit in BIGINT)
pub type UserId = i64;

/// Commands the router knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandName {
    Start,
    Status,
    NewProject,
}

impl CommandName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "status" => Some(Self::Status),
            "newproject" => Some(Self::NewProject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Status => "status",
            Self::NewProject => "newproject",
        }
    }
}

/// One size variant of an inbound photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    pub platform_file_id: String,
    pub width: u32,
    pub height: u32,
}

/// What an update asks for, resolved once at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Start,
    Status,
    NewProject { name: Option<String> },
    /// Variants in the platform's size-ascending order
    Photo { variants: Vec<PhotoVariant> },
    Unrecognized { text: Option<String> },
}

impl UpdateKind {
    /// Route label used in logs and in the webhook response
    pub fn route(&self) -> &'static str {
        match self {
            UpdateKind::Start => "start",
            UpdateKind::Status => "status",
            UpdateKind::NewProject { .. } => "newproject",
            UpdateKind::Photo { .. } => "photo",
            UpdateKind::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn command(&self) -> Option<CommandName> {
        match self {
            UpdateKind::Start => Some(CommandName::Start),
            UpdateKind::Status => Some(CommandName::Status),
            UpdateKind::NewProject { .. } => Some(CommandName::NewProject),
            UpdateKind::Photo { .. } | UpdateKind::Unrecognized { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub caller: UserId,
    /// Where replies go
    pub chat_id: i64,
    pub kind: UpdateKind,
}

impl Update {
    /// Build the canonical update from the platform envelope.
    ///
    /// `bot_username` is this bot's own handle; a command addressed to any other bot
    /// (`/start@other_bot` in a group) is not ours to answer.
    ///
    /// Returns `None` for updates that carry no message or no sender (edits, channel posts,
    /// callback queries) and for commands aimed at another bot; those are acknowledged and
    /// dropped.
    pub fn from_raw(raw: RawUpdate, bot_username: &str) -> Option<Self> {
        let message = raw.message?;
        let caller = message.from.as_ref()?.id;
        let chat_id = message.chat.id;
        let kind = classify(message, bot_username)?;

        Some(Self {
            update_id: raw.update_id,
            caller,
            chat_id,
            kind,
        })
    }
}

fn classify(message: Message, bot_username: &str) -> Option<UpdateKind> {
    if let Some(photo) = message.photo.filter(|p| !p.is_empty()) {
        let variants = photo
            .into_iter()
            .map(|p| PhotoVariant {
                platform_file_id: p.file_id,
                width: p.width,
                height: p.height,
            })
            .collect();
        return Some(UpdateKind::Photo { variants });
    }

    let Some(text) = message.text else {
        return Some(UpdateKind::Unrecognized { text: None });
    };

    let kind = match parse_command(&text, bot_username) {
        ParsedText::Command(CommandName::Start, _) => UpdateKind::Start,
        ParsedText::Command(CommandName::Status, _) => UpdateKind::Status,
        ParsedText::Command(CommandName::NewProject, arg) => UpdateKind::NewProject { name: arg },
        ParsedText::Foreign => return None,
        ParsedText::Other => UpdateKind::Unrecognized { text: Some(text) },
    };
    Some(kind)
}

enum ParsedText {
    Command(CommandName, Option<String>),
    /// `/name@someone_else`
    Foreign,
    Other,
}

/// Split `/name@bot argument...` into a known command and its trimmed argument
fn parse_command(text: &str, bot_username: &str) -> ParsedText {
    let Some(body) = text.trim_start().strip_prefix('/') else {
        return ParsedText::Other;
    };
    let (head, rest) = match body.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (body, ""),
    };
    let name = match head.split_once('@') {
        Some((name, target)) => {
            if !target.eq_ignore_ascii_case(bot_username.trim_start_matches('@')) {
                return ParsedText::Foreign;
            }
            name
        }
        None => head,
    };
    match CommandName::parse(name) {
        Some(command) => ParsedText::Command(command, (!rest.is_empty()).then(|| rest.to_string())),
        None => ParsedText::Other,
    }
}
