//! Decodes edit responses and writes the resulting images to disk.

use crate::edit::types::{EditModel, EditResponse, ImageFormat, OutputArtifact};
use crate::error::{EditError, Result};
use base64::Engine;
use chrono::Local;
use std::fs;
use std::path::Path;

/// Maximum length of the sanitized prompt component of a filename.
const MAX_PROMPT_COMPONENT: usize = 50;

/// Turns a prompt into a filename component: spaces become underscores and
/// the result is truncated to 50 characters.
pub fn sanitize_prompt(prompt: &str) -> String {
    prompt
        .chars()
        .take(MAX_PROMPT_COMPONENT)
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Decodes every image in `raw` and writes each to `output_dir`.
///
/// The directory is created if missing. Files are named
/// `{YYYYMMDD_HHMMSS}_{model}_{sanitized_prompt}_{index}.png` with a 1-based
/// index following the order of the response's `data` array; the timestamp,
/// model, and prompt are fixed for the run, so names within one invocation
/// never collide. Two invocations in the same second with the same model and
/// prompt share a prefix. This is accepted behavior, matching the filename
/// scheme callers already rely on.
///
/// Failure is best-effort, not transactional: a malformed entry stops
/// processing and surfaces as [`EditError::MalformedResponse`] carrying the
/// raw body, but images already written stay on disk.
pub fn materialize(
    raw: &serde_json::Value,
    model: EditModel,
    prompt: &str,
    output_dir: &Path,
) -> Result<Vec<OutputArtifact>> {
    fs::create_dir_all(output_dir)?;

    let response: EditResponse = serde_json::from_value(raw.clone())
        .map_err(|e| malformed(format!("unexpected response shape: {e}"), raw))?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let prefix = format!("{}_{}_{}", stamp, model, sanitize_prompt(prompt));

    let mut artifacts = Vec::with_capacity(response.data.len());
    for (position, item) in response.data.iter().enumerate() {
        let index = position + 1;
        let bytes = decode_image(&item.b64_json)
            .map_err(|message| malformed(format!("image {index}: {message}"), raw))?;

        let path = output_dir.join(format!("{prefix}_{index}.png"));
        fs::write(&path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "image saved");

        artifacts.push(OutputArtifact {
            path,
            bytes: bytes.len(),
            index,
        });
    }

    Ok(artifacts)
}

fn decode_image(b64: &str) -> std::result::Result<Vec<u8>, String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| format!("invalid base64: {e}"))?;
    if ImageFormat::from_magic_bytes(&bytes).is_none() {
        return Err("decoded payload is not a recognizable image".into());
    }
    Ok(bytes)
}

fn malformed(message: String, raw: &serde_json::Value) -> EditError {
    EditError::MalformedResponse {
        message,
        raw: serde_json::to_string_pretty(raw).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A valid 1x1 PNG.
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn png_bytes() -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .decode(PNG_B64)
            .unwrap()
    }

    #[test]
    fn test_sanitize_replaces_spaces() {
        assert_eq!(sanitize_prompt("a red ball"), "a_red_ball");
    }

    #[test]
    fn test_sanitize_truncates_to_fifty() {
        let prompt = "a very long prompt that keeps going well past the fifty character limit";
        let sanitized = sanitize_prompt(prompt);
        assert_eq!(sanitized.chars().count(), 50);
        assert!(!sanitized.contains(' '));
    }

    #[test]
    fn test_sanitize_short_prompt_unchanged_length() {
        assert_eq!(sanitize_prompt("pirate era"), "pirate_era");
        assert_eq!(sanitize_prompt(""), "");
    }

    #[test]
    fn test_materialize_writes_one_file_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": [{"b64_json": PNG_B64}, {"b64_json": PNG_B64}]});

        let artifacts =
            materialize(&raw, EditModel::Gpt, "a red ball", dir.path()).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].index, 1);
        assert_eq!(artifacts[1].index, 2);
        for artifact in &artifacts {
            assert!(artifact.path.exists());
        }
        let name = artifacts[0].path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_gpt_a_red_ball_1.png"), "got {name}");
    }

    #[test]
    fn test_materialize_round_trips_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": [{"b64_json": PNG_B64}]});

        let artifacts = materialize(&raw, EditModel::Flux, "round trip", dir.path()).unwrap();

        let written = fs::read(&artifacts[0].path).unwrap();
        assert_eq!(written, png_bytes());
        assert_eq!(ImageFormat::from_magic_bytes(&written), Some(ImageFormat::Png));
    }

    #[test]
    fn test_materialize_empty_data_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": []});

        let artifacts = materialize(&raw, EditModel::Gpt, "nothing", dir.path()).unwrap();

        assert!(artifacts.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_materialize_missing_data_key() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"error": {"code": "contentFilter", "message": "blocked"}});

        let err = materialize(&raw, EditModel::Gpt, "blocked", dir.path()).unwrap_err();

        assert!(matches!(err, EditError::MalformedResponse { .. }));
        assert!(err.raw_response().unwrap().contains("contentFilter"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_materialize_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": [{"b64_json": "not base64!!!"}]});

        let err = materialize(&raw, EditModel::Gpt, "bad", dir.path()).unwrap_err();

        assert!(matches!(err, EditError::MalformedResponse { .. }));
        assert!(err.to_string().contains("image 1"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_materialize_payload_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let not_an_image =
            base64::engine::general_purpose::STANDARD.encode(b"plain text, no magic bytes");
        let raw = json!({"data": [{"b64_json": not_an_image}]});

        let err = materialize(&raw, EditModel::Flux, "text", dir.path()).unwrap_err();
        assert!(matches!(err, EditError::MalformedResponse { .. }));
    }

    #[test]
    fn test_materialize_is_best_effort() {
        // A bad entry after a good one leaves the good file on disk.
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": [{"b64_json": PNG_B64}, {"b64_json": "broken"}]});

        let err = materialize(&raw, EditModel::Gpt, "partial", dir.path()).unwrap_err();

        assert!(matches!(err, EditError::MalformedResponse { .. }));
        assert!(err.to_string().contains("image 2"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_filename_scenario_gpt_red_ball() {
        let dir = tempfile::tempdir().unwrap();
        let raw = json!({"data": [{"b64_json": PNG_B64}]});

        let artifacts = materialize(&raw, EditModel::Gpt, "a red ball", dir.path()).unwrap();

        let name = artifacts[0].path.file_name().unwrap().to_str().unwrap();
        // {YYYYMMDD_HHMMSS}_gpt_a_red_ball_1.png
        assert!(name.ends_with("_gpt_a_red_ball_1.png"), "got {name}");
        let stamp = &name[..15];
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp[..8].chars().all(|c| c.is_ascii_digit()));
        assert!(stamp[9..].chars().all(|c| c.is_ascii_digit()));

        let written = fs::read(&artifacts[0].path).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&written), Some(ImageFormat::Png));
    }
}
