//! Configuration management for the Carte gateway
//!
//! Environment variables win over the optional `carte.toml` file, which
//! wins over built-in defaults. The catalog itself is loaded separately by
//! the daemon (see [`crate::catalog`]).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::Result;

/// Default chat-completions endpoint base
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Carte gateway configuration
#[derive(Debug)]
pub struct Config {
    /// Path to the menu catalog document; `None` uses the embedded default
    pub menu_path: Option<PathBuf>,

    /// Path to static files directory (bundled web UI), if any
    pub static_dir: Option<PathBuf>,

    /// Voice (speech-to-text) configuration
    pub voice: VoiceConfig,

    /// Language-model collaborator configuration
    pub llm: LlmConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// Bounded wait applied to each external call
    pub request_timeout: Duration,

    /// Default language hint for transcription (e.g. "fr")
    pub language: Option<String>,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Default)]
pub struct VoiceConfig {
    /// Enable voice input
    pub enabled: bool,

    /// STT provider: "whisper" or "deepgram"; unset picks by available key
    pub provider: Option<String>,

    /// STT model identifier (e.g. "whisper-1", "nova-2")
    pub model: String,
}

/// Language-model configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat model identifier
    pub model: String,

    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Max tokens per completion
    pub max_tokens: u32,
}

/// API keys for external services
///
/// Held as plain strings here; call sites wrap them in
/// `secrecy::SecretString` when constructing clients.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and chat completions)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,
}

/// Optional overrides read from `carte.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    menu: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    language: Option<String>,
    llm_model: Option<String>,
    llm_base_url: Option<String>,
    stt_provider: Option<String>,
    stt_model: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an override value cannot be interpreted.
    pub fn load() -> Result<Self> {
        Self::load_with_options(false)
    }

    /// Load configuration with explicit voice disable option
    ///
    /// # Errors
    ///
    /// Returns an error if an override value cannot be interpreted.
    pub fn load_with_options(disable_voice: bool) -> Result<Self> {
        let file = Self::load_file_config();

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok(),
            deepgram: std::env::var("DEEPGRAM_API_KEY").ok(),
        };

        let menu_path = std::env::var("CARTE_MENU")
            .ok()
            .map(PathBuf::from)
            .or(file.menu);

        let static_dir = std::env::var("CARTE_STATIC_DIR")
            .ok()
            .map(PathBuf::from)
            .or(file.static_dir);

        let voice_disabled = disable_voice
            || std::env::var("CARTE_DISABLE_VOICE")
                .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let voice = VoiceConfig {
            enabled: !voice_disabled,
            provider: std::env::var("CARTE_STT_PROVIDER").ok().or(file.stt_provider),
            model: std::env::var("CARTE_STT_MODEL")
                .ok()
                .or(file.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
        };

        if voice_disabled {
            tracing::info!("voice explicitly disabled");
        }

        let llm = LlmConfig {
            model: std::env::var("CARTE_LLM_MODEL")
                .ok()
                .or(file.llm_model)
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: std::env::var("CARTE_LLM_BASE_URL")
                .ok()
                .or(file.llm_base_url)
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            max_tokens: std::env::var("CARTE_LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024),
        };

        let request_timeout = std::env::var("CARTE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(file.request_timeout_secs)
            .map_or(Duration::from_secs(30), Duration::from_secs);

        let language = std::env::var("CARTE_LANGUAGE").ok().or(file.language);

        Ok(Self {
            menu_path,
            static_dir,
            voice,
            llm,
            api_keys,
            request_timeout,
            language,
        })
    }

    /// Load `carte.toml` from the working directory or the XDG config dir
    ///
    /// Missing files are normal; parse failures log a warning and fall back
    /// to defaults rather than refusing to start.
    fn load_file_config() -> FileConfig {
        let config_paths = [
            Some(PathBuf::from("carte.toml")),
            directories::ProjectDirs::from("dev", "carte", "carte")
                .map(|d| d.config_dir().join("carte.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(content) => match toml::from_str(&content) {
                        Ok(config) => {
                            tracing::info!(path = %path.display(), "loaded config file");
                            return config;
                        }
                        Err(e) => {
                            tracing::warn!(
                                path = %path.display(),
                                error = %e,
                                "failed to parse config file, using defaults"
                            );
                        }
                    },
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to read config file"
                        );
                    }
                }
            }
        }

        FileConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses_partial_toml() {
        let config: FileConfig = toml::from_str(
            r#"
            language = "fr"
            llm_model = "gpt-4o"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.language.as_deref(), Some("fr"));
        assert_eq!(config.llm_model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.request_timeout_secs, Some(10));
        assert!(config.menu.is_none());
    }

    #[test]
    fn file_config_rejects_bad_types() {
        assert!(toml::from_str::<FileConfig>("request_timeout_secs = \"soon\"").is_err());
    }
}
