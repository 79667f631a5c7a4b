//! Base64 and hex conversions of whatever text is on the clipboard.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use rootcause::Report;

use crate::search::{
    Icon, Provider, ProviderKind, ResultAction, SearchResult, result::read_clipboard,
};

pub type ClipboardReader = Arc<dyn Fn() -> Result<String, Report> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
enum DecodeError {
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error("decoded bytes are not UTF-8 text")]
    NotText(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Base64,
    Hex,
}

impl Codec {
    const ALL: [Codec; 2] = [Codec::Base64, Codec::Hex];

    fn keyword(self) -> &'static str {
        match self {
            Codec::Base64 => "base64",
            Codec::Hex => "hex",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Codec::Base64 => "Base64",
            Codec::Hex => "Hex",
        }
    }

    fn encode(self, text: &str) -> String {
        match self {
            Codec::Base64 => STANDARD.encode(text),
            Codec::Hex => hex::encode(text),
        }
    }

    fn decode(self, text: &str) -> Result<String, DecodeError> {
        let bytes = match self {
            Codec::Base64 => STANDARD.decode(text)?,
            Codec::Hex => hex::decode(text)?,
        };

        Ok(String::from_utf8(bytes)?)
    }
}

/// Whether the characters of `query` appear in `word` in order, so "b64"
/// and "he" both count.
fn abbreviates(query: &str, word: &str) -> bool {
    let mut word = word.chars();
    query.chars().all(|c| word.any(|w| w == c))
}

fn codecs(query: &str) -> impl Iterator<Item = Codec> {
    let query = query.trim().to_lowercase();
    let long_enough = query.chars().count() >= 2;

    Codec::ALL
        .into_iter()
        .filter(move |codec| long_enough && abbreviates(&query, codec.keyword()))
}

pub struct EncodeDecodeProvider {
    priority: i32,
    clipboard: ClipboardReader,
}

impl EncodeDecodeProvider {
    #[must_use]
    pub fn new(priority: i32) -> Self {
        Self::with_clipboard(priority, Arc::new(read_clipboard))
    }

    #[must_use]
    pub fn with_clipboard(priority: i32, clipboard: ClipboardReader) -> Self {
        Self {
            priority,
            clipboard,
        }
    }
}

fn converted(codec: Codec, direction: &str, value: String) -> SearchResult {
    SearchResult::new(
        ProviderKind::System,
        format!("{} {direction}", codec.label()),
    )
    .description(format!("Result: {value}"))
    .path(format!("{}:{}", codec.keyword(), direction.to_lowercase()))
    .icon(Icon::Symbol("⇄"))
    .action(ResultAction::Copy(value))
}

impl Provider for EncodeDecodeProvider {
    fn name(&self) -> &str {
        "Encoder/Decoder"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::System
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        codecs(query).next().is_some()
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let text = (self.clipboard)()?;

        if text.is_empty() {
            return Ok(vec![
                SearchResult::new(ProviderKind::System, "No text in clipboard")
                    .description("Copy some text to encode or decode")
                    .path("clipboard:empty")
                    .icon(Icon::Symbol("⇄")),
            ]);
        }

        let mut results = Vec::new();
        for codec in codecs(query) {
            results.push(converted(codec, "Encode", codec.encode(&text)));

            match codec.decode(text.trim()) {
                Ok(decoded) => results.push(converted(codec, "Decode", decoded)),
                Err(err) => {
                    tracing::debug!(codec = codec.keyword(), error = %err, "clipboard did not decode");
                    results.push(
                        SearchResult::new(
                            ProviderKind::System,
                            format!("{} Decode Failed", codec.label()),
                        )
                        .description(format!(
                            "Invalid {} input in clipboard: {err}",
                            codec.keyword()
                        ))
                        .path(format!("{}:decode_failed", codec.keyword()))
                        .icon(Icon::Symbol("!")),
                    );
                }
            }
        }

        Ok(results)
    }
}
