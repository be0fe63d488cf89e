//! Path segment classification into embeddable streams.

use std::sync::LazyLock;

use regex::Regex;

/// Label of the synthetic chat entry that blanks the chat panel.
pub const CLOSE_LABEL: &str = "닫기";

/// Chat target meaning "no chat".
pub const CLOSED_CHAT_URL: &str = "about:blank";

static CHZZK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-f]{32}$").expect("valid chzzk pattern"));
static TWITCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_]{4,25}$").expect("valid twitch pattern"));
static AFREECATV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^a:([a-z0-9]{3,12})$").expect("valid afreecatv pattern"));
static YOUTUBE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^y:([A-Za-z0-9_-]{11})$").expect("valid youtube pattern"));

/// Streaming platform a path segment refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Chzzk,
    Twitch,
    AfreecaTv,
    YouTube,
}

struct KindEntry {
    kind: StreamKind,
    regex: &'static LazyLock<Regex>,
}

// Classification order; the first match wins.
static KINDS: &[KindEntry] = &[
    KindEntry { kind: StreamKind::Chzzk, regex: &CHZZK_REGEX },
    KindEntry { kind: StreamKind::Twitch, regex: &TWITCH_REGEX },
    KindEntry { kind: StreamKind::AfreecaTv, regex: &AFREECATV_REGEX },
    KindEntry { kind: StreamKind::YouTube, regex: &YOUTUBE_REGEX },
];

impl StreamKind {
    /// Identify the platform of a segment and extract its ID.
    pub fn detect(segment: &str) -> Option<(Self, &str)> {
        KINDS.iter().find_map(|entry| {
            let caps = entry.regex.captures(segment)?;
            // Prefixed kinds capture the ID without the prefix
            let id = caps.get(1).or_else(|| caps.get(0))?.as_str();
            Some((entry.kind, id))
        })
    }

    /// Build the embed URLs for `id`. `host` is the embedding site's host,
    /// which Twitch and YouTube require as the parent domain.
    pub fn embed(&self, id: &str, host: &str) -> StreamRef {
        match self {
            Self::Chzzk => StreamRef {
                kind: *self,
                id: id.to_string(),
                name: Some(id.chars().take(6).collect()),
                player: format!("https://chzzk.naver.com/live/{}", id),
                chat: Some(format!("https://chzzk.naver.com/live/{}/chat", id)),
            },
            Self::Twitch => StreamRef {
                kind: *self,
                id: id.to_string(),
                name: Some(id.to_string()),
                player: format!("https://player.twitch.tv/?channel={}&parent={}", id, host),
                chat: Some(format!(
                    "https://www.twitch.tv/embed/{}/chat?darkpopout&parent={}",
                    id, host
                )),
            },
            Self::AfreecaTv => StreamRef {
                kind: *self,
                id: id.to_string(),
                name: None,
                player: format!("https://play.afreecatv.com/{}/embed", id),
                chat: None,
            },
            Self::YouTube => StreamRef {
                kind: *self,
                id: id.to_string(),
                name: Some(id.to_string()),
                player: format!("https://www.youtube.com/embed/{}?autoplay=1", id),
                chat: Some(format!(
                    "https://www.youtube.com/live_chat?v={}&embed_domain={}&dark_theme=1",
                    id, host
                )),
            },
        }
    }
}

/// One embeddable stream parsed from a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRef {
    /// Platform.
    pub kind: StreamKind,
    /// Platform ID, without any prefix.
    pub id: String,
    /// Display label in the chat switcher.
    pub name: Option<String>,
    /// Player embed URL.
    pub player: String,
    /// Chat embed URL, if the platform offers one.
    pub chat: Option<String>,
}

impl StreamRef {
    /// Classify one path segment. Unrecognized segments yield `None`.
    pub fn classify(segment: &str, host: &str) -> Option<Self> {
        let (kind, id) = StreamKind::detect(segment)?;
        Some(kind.embed(id, host))
    }
}

/// Streams named by a URL path, in path order.
pub fn parse_path<'a>(path: &'a str, host: &'a str) -> impl Iterator<Item = StreamRef> + 'a {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .filter_map(move |segment| StreamRef::classify(segment, host))
}

/// An entry in the chat switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    /// Link text.
    pub label: String,
    /// URL loaded into the chat frame.
    pub target: String,
}

impl ChatEntry {
    /// The entry that closes the chat panel.
    pub fn close() -> Self {
        Self {
            label: CLOSE_LABEL.to_string(),
            target: CLOSED_CHAT_URL.to_string(),
        }
    }
}

/// Chat entries for every stream with a chat, followed by the close entry.
///
/// Never empty; the last entry always targets `about:blank`.
pub fn chat_entries(streams: &[StreamRef]) -> Vec<ChatEntry> {
    streams
        .iter()
        .filter_map(|stream| {
            let target = stream.chat.clone()?;
            let label = stream.name.clone().unwrap_or_else(|| stream.id.clone());
            Some(ChatEntry { label, target })
        })
        .chain(std::iter::once(ChatEntry::close()))
        .collect()
}
