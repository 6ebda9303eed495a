//! Speech-to-text (STT) processing

use secrecy::{ExposeSecret, SecretString};

use crate::config::{ApiKeys, VoiceConfig};
use crate::{Error, Result};

/// Practical cap on uploaded audio payloads (25 MB)
pub const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// A finished transcription
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    /// Language reported by the provider, when available
    pub language: Option<String>,
}

impl Transcription {
    /// Whether any speech was detected
    ///
    /// Empty or whitespace-only text means "no speech detected", a distinct
    /// condition from a transport error.
    #[must_use]
    pub fn is_speech(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Response from OpenAI Whisper transcription API (verbose JSON)
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
    language: Option<String>,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
    detected_language: Option<String>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug)]
enum SttProvider {
    Whisper,
    Deepgram,
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the client cannot be built
    pub fn new_whisper(
        api_key: SecretString,
        model: String,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for Whisper".to_string(),
            ));
        }

        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            model,
            provider: SttProvider::Whisper,
        })
    }

    /// Create a new STT instance using Deepgram
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the client cannot be built
    pub fn new_deepgram(
        api_key: SecretString,
        model: String,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("Deepgram API key required".to_string()));
        }

        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            model,
            provider: SttProvider::Deepgram,
        })
    }

    /// Resolve an STT backend from configuration
    ///
    /// An explicit provider must have its key; without one, the backend is
    /// picked by whichever key is available (Whisper first). No key at all
    /// means no transcription, not an error.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly selected provider has no API key, or
    /// the provider name is unknown.
    pub fn from_config(
        voice: &VoiceConfig,
        keys: &ApiKeys,
        timeout: std::time::Duration,
    ) -> Result<Option<Self>> {
        let model = voice.model.clone();
        match voice.provider.as_deref() {
            Some("whisper") => {
                let key = keys.openai.clone().ok_or_else(|| {
                    Error::Config("STT provider whisper needs OPENAI_API_KEY".to_string())
                })?;
                Ok(Some(Self::new_whisper(SecretString::from(key), model, timeout)?))
            }
            Some("deepgram") => {
                let key = keys.deepgram.clone().ok_or_else(|| {
                    Error::Config("STT provider deepgram needs DEEPGRAM_API_KEY".to_string())
                })?;
                Ok(Some(Self::new_deepgram(SecretString::from(key), model, timeout)?))
            }
            Some(other) => Err(Error::Config(format!("unknown STT provider: {other}"))),
            None => {
                if let Some(key) = keys.openai.clone() {
                    Ok(Some(Self::new_whisper(SecretString::from(key), model, timeout)?))
                } else if let Some(key) = keys.deepgram.clone() {
                    Ok(Some(Self::new_deepgram(SecretString::from(key), model, timeout)?))
                } else {
                    tracing::warn!("no STT API key available, transcription disabled");
                    Ok(None)
                }
            }
        }
    }

    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio` - WAV audio bytes (at most [`MAX_AUDIO_BYTES`])
    /// * `language` - optional language hint (e.g. "fr")
    ///
    /// # Errors
    ///
    /// Returns error if the payload exceeds the size cap or transcription
    /// fails. A successful call with no detected speech is NOT an error;
    /// check [`Transcription::is_speech`].
    pub async fn transcribe(
        &self,
        audio: &[u8],
        language: Option<&str>,
    ) -> Result<Transcription> {
        if audio.len() > MAX_AUDIO_BYTES {
            return Err(Error::Stt(format!(
                "audio payload of {} bytes exceeds the {MAX_AUDIO_BYTES} byte cap",
                audio.len()
            )));
        }

        match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(audio, language).await,
            SttProvider::Deepgram => self.transcribe_deepgram(audio, language).await,
        }
    }

    /// Transcribe using OpenAI Whisper
    async fn transcribe_whisper(
        &self,
        audio: &[u8],
        language: Option<&str>,
    ) -> Result<Transcription> {
        tracing::debug!(audio_bytes = audio.len(), "starting Whisper transcription");

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Whisper request failed");
                Error::Stt(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let result: WhisperResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            Error::Stt(e.to_string())
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(Transcription {
            text: result.text,
            language: result.language,
        })
    }

    /// Transcribe using Deepgram
    async fn transcribe_deepgram(
        &self,
        audio: &[u8],
        language: Option<&str>,
    ) -> Result<Transcription> {
        tracing::debug!(audio_bytes = audio.len(), "starting Deepgram transcription");

        let mut url = format!(
            "https://api.deepgram.com/v1/listen?model={}&punctuate=true",
            self.model
        );
        if let Some(lang) = language {
            url.push_str("&language=");
            url.push_str(lang);
        }

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Token {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "audio/wav")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Deepgram request failed");
                Error::Stt(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let result: DeepgramResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse Deepgram response");
            Error::Stt(e.to_string())
        })?;

        let channel = result.results.channels.into_iter().next();
        let detected = channel.as_ref().and_then(|c| c.detected_language.clone());
        let transcript = channel
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .unwrap_or_default();

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(Transcription {
            text: transcript,
            language: detected.or_else(|| language.map(String::from)),
        })
    }
}

fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}
