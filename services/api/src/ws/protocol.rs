//! Defines the WebSocket message protocol between the learner client and the server.
//!
//! Inbound frames are a single envelope with optional fields; a frame missing
//! (or carrying an unrecognized value for) a field is simply ignored for that
//! field. Outbound frames are a `response` text plus a `step` tag naming the
//! phase outcome, with step-specific optional fields. When a step entails
//! spoken output, the raw audio follows as a separate binary frame.

use sabaq_core::script::LanguageMode;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The decoded shape of every text frame from the client.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClientFrame {
    /// Control tag, e.g. `"you_said_complete"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_language_mode")]
    pub language_mode: Option<LanguageMode>,
    /// Present only on audio-submission turns.
    pub audio_base64: Option<String>,
}

/// An unrecognized mode value is treated as absent rather than failing the
/// whole frame.
fn lenient_language_mode<'de, D>(deserializer: D) -> Result<Option<LanguageMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(LanguageMode::from_wire))
}

/// The acknowledgments the client sends when it finishes playing a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    YouSaidComplete,
    WordByWordComplete,
    FeedbackComplete,
}

impl Ack {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YouSaidComplete => "you_said_complete",
            Self::WordByWordComplete => "word_by_word_complete",
            Self::FeedbackComplete => "feedback_complete",
        }
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags each outbound frame with the phase outcome it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Error,
    NoSpeech,
    EnglishInputEdgeCase,
    YouSaidAudio,
    RepeatPrompt,
    FullSentenceAudio,
    AwaitNext,
    FeedbackStep,
    WordByWord,
}

/// One outbound JSON frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    pub response: String,
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_sentence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urdu_sentence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_true: Option<bool>,
}

impl ServerFrame {
    pub fn new(step: Step, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            step,
            english_sentence: None,
            urdu_sentence: None,
            words: None,
            detected_language: None,
            is_true: None,
        }
    }

    pub fn english_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.english_sentence = Some(sentence.into());
        self
    }

    pub fn urdu_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.urdu_sentence = Some(sentence.into());
        self
    }

    pub fn words(mut self, words: Vec<String>) -> Self {
        self.words = Some(words);
        self
    }

    pub fn detected_language(mut self, language: impl Into<String>) -> Self {
        self.detected_language = Some(language.into());
        self
    }

    pub fn is_true(mut self, value: bool) -> Self {
        self.is_true = Some(value);
        self
    }
}
