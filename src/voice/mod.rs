//! Voice processing (speech-to-text)

mod stt;

pub use stt::{MAX_AUDIO_BYTES, SpeechToText, Transcription};
