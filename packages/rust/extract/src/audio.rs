//! Audio transcription: ffmpeg transcode plus a speech-to-text HTTP call.
//!
//! Payloads that are not already WAV are piped through an `ffmpeg`
//! subprocess into 16 kHz mono WAV, then uploaded as a multipart form to
//! the configured endpoint. Every failure along the way is a typed
//! [`WebCorpusError::Conversion`]; a transcript is never fabricated.

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use webcorpus_shared::{Result, TranscriberConfig, WebCorpusError};

/// WAV target sample rate handed to ffmpeg.
const TARGET_SAMPLE_RATE: &str = "16000";

/// Speech-to-text client for audio payloads.
pub struct Transcriber {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

/// Response body of the transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl Transcriber {
    /// Build a transcriber from config. Returns `None` when no endpoint is
    /// configured; the API key is read from the configured env var.
    pub fn from_config(config: &TranscriberConfig) -> Option<Self> {
        if config.endpoint.is_empty() {
            return None;
        }
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        Some(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Build a transcriber against an explicit endpoint (tests, overrides).
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
        }
    }

    /// Transcribe an audio payload to text.
    pub async fn transcribe(&self, bytes: &[u8], media_type: Option<&str>) -> Result<String> {
        let wav = if is_wav(bytes) {
            bytes.to_vec()
        } else {
            debug!(media_type, "transcoding audio payload to wav");
            transcode_to_wav(bytes.to_vec()).await?
        };

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| WebCorpusError::Conversion(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WebCorpusError::Conversion(format!("transcription request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebCorpusError::Conversion(format!(
                "transcription endpoint returned HTTP {status}"
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| WebCorpusError::Conversion(format!("transcription response: {e}")))?;

        Ok(body.text)
    }
}

/// RIFF/WAVE header check.
fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Pipe the payload through ffmpeg into 16 kHz mono WAV.
async fn transcode_to_wav(input: Vec<u8>) -> Result<Vec<u8>> {
    let mut child = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            "pipe:0",
            "-ar",
            TARGET_SAMPLE_RATE,
            "-ac",
            "1",
            "-f",
            "wav",
            "pipe:1",
        ])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| WebCorpusError::Conversion(format!("failed to spawn ffmpeg: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| WebCorpusError::Conversion("ffmpeg stdin unavailable".into()))?;

    // Feed stdin from a separate task so a full pipe buffer cannot deadlock
    // against the unread stdout.
    let writer = tokio::spawn(async move {
        stdin.write_all(&input).await?;
        stdin.shutdown().await
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| WebCorpusError::Conversion(format!("ffmpeg did not run: {e}")))?;

    if let Ok(Err(e)) = writer.await {
        return Err(WebCorpusError::Conversion(format!("ffmpeg stdin: {e}")));
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WebCorpusError::Conversion(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Minimal RIFF/WAVE header followed by no samples, enough for the
    /// is_wav check to route around ffmpeg.
    fn tiny_wav() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes
    }

    #[test]
    fn wav_detection() {
        assert!(is_wav(&tiny_wav()));
        assert!(!is_wav(b"ID3\x04mp3 payload"));
        assert!(!is_wav(b"RIFF"));
    }

    #[tokio::test]
    async fn transcribes_wav_via_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/transcribe"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "text": "hello from orbit" })),
            )
            .mount(&server)
            .await;

        let transcriber = Transcriber::new(format!("{}/v1/transcribe", server.uri()), "whisper-1");
        let text = transcriber
            .transcribe(&tiny_wav(), Some("audio/wav"))
            .await
            .unwrap();

        assert_eq!(text, "hello from orbit");
    }

    #[tokio::test]
    async fn endpoint_failure_is_a_conversion_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transcriber = Transcriber::new(server.uri(), "whisper-1");
        let err = transcriber
            .transcribe(&tiny_wav(), Some("audio/wav"))
            .await
            .unwrap_err();

        assert!(matches!(err, WebCorpusError::Conversion(_)));
        assert!(err.to_string().contains("500"));
    }
}
