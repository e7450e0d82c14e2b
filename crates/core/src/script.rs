//! The bilingual drill script.
//!
//! Every prompt the tutor speaks exists in an English and an Urdu register.
//! The active [`LanguageMode`] is a per-session switch the client may flip on
//! any inbound frame; it changes the wording of prompts only, never the drill
//! structure.

use serde::{Deserialize, Serialize};

/// Which register the tutor uses for its prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    English,
    #[default]
    Urdu,
}

impl LanguageMode {
    /// Parses the wire value (`"english"` / `"urdu"`). Anything else is not a
    /// mode, and callers are expected to keep their previous setting.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "english" => Some(Self::English),
            "urdu" => Some(Self::Urdu),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Urdu => "urdu",
        }
    }
}

/// Sent when a frame arrives that is not valid JSON.
pub const INVALID_PAYLOAD: &str = "Invalid JSON format.";

/// Sent when the opening utterance frame carries no `audio_base64` field.
pub const MISSING_AUDIO_FIELD: &str = "No audio_base64 found.";

/// Sent when an `audio_base64` payload does not decode.
pub const UNDECODABLE_AUDIO: &str = "Failed to decode audio.";

/// Short prompts synthesized ahead of time so the common error and edge-case
/// paths never wait on the synthesis collaborator.
pub const PREWARM_LINES: [&str; 6] = [
    "Great job speaking English! However, please say the Urdu sentence to proceed.",
    "No speech detected.",
    "Invalid JSON format.",
    "No audio_base64 found.",
    "Failed to decode audio.",
    "No valid audio found in user response.",
];

pub fn no_speech(mode: LanguageMode) -> &'static str {
    match mode {
        LanguageMode::English => "No speech detected.",
        LanguageMode::Urdu => "کوئی آواز نہیں ملی۔",
    }
}

pub fn english_input(mode: LanguageMode) -> &'static str {
    match mode {
        LanguageMode::English => {
            "Great job speaking English! However, please say the Urdu sentence to proceed."
        }
        LanguageMode::Urdu => "زبردست! لیکن براہ کرم اردو بولیں تاکہ ہم آگے بڑھ سکیں۔",
    }
}

pub fn missing_audio(mode: LanguageMode) -> &'static str {
    match mode {
        LanguageMode::English => "No valid audio found in user response.",
        LanguageMode::Urdu => "صارف کے جواب میں کوئی درست آڈیو نہیں ملی۔",
    }
}

/// Sent when a collaborator call fails and the drill resets to listening.
pub fn trouble(mode: LanguageMode) -> &'static str {
    match mode {
        LanguageMode::English => "Something went wrong on our side. Please try that again.",
        LanguageMode::Urdu => "معذرت، کچھ مسئلہ ہو گیا۔ براہ کرم دوبارہ کوشش کریں۔",
    }
}

/// Echoes the learner's sentence back before asking them to repeat it.
pub fn you_said(mode: LanguageMode, urdu_sentence: &str) -> String {
    match mode {
        LanguageMode::English => {
            format!("You said: {urdu_sentence}. Now repeat after me.")
        }
        LanguageMode::Urdu => {
            format!("آپ نے کہا، {urdu_sentence}۔ اب میرے بعد دوہرائیں۔")
        }
    }
}

pub fn repeat_prompt(mode: LanguageMode, english_sentence: &str) -> String {
    match mode {
        LanguageMode::English => {
            format!("The English sentence is \"{english_sentence}\". Can you repeat after me?")
        }
        LanguageMode::Urdu => {
            format!("انگریزی جملہ ہے: \"{english_sentence}\"۔ میرے بعد دہرائیں۔")
        }
    }
}

pub fn full_sentence(mode: LanguageMode, english_sentence: &str) -> String {
    match mode {
        LanguageMode::English => {
            format!("Now repeat the full sentence: {english_sentence}.")
        }
        LanguageMode::Urdu => format!("اب دوہرائیں:{english_sentence}."),
    }
}

pub fn word_by_word(mode: LanguageMode, english_sentence: &str) -> String {
    match mode {
        LanguageMode::English => {
            format!("Let's practice word-by-word: {english_sentence}")
        }
        LanguageMode::Urdu => format!("آئیے لفظ بہ لفظ مشق کریں: {english_sentence}"),
    }
}
