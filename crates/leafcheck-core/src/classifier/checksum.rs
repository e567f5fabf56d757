//! BLAKE3 integrity check for the model artifact.

use blake3::Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::PipelineError;

/// BLAKE3 digest (hex) of a file, streamed in 64KB chunks.
pub fn artifact_digest(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Fail with a model-load error unless `path` hashes to `expected`.
pub fn verify_artifact(path: &Path, expected: &str) -> Result<(), PipelineError> {
    let actual = artifact_digest(path).map_err(|e| PipelineError::ModelLoad {
        path: path.to_path_buf(),
        message: format!("Checksum computation failed: {e}"),
    })?;

    if !actual.eq_ignore_ascii_case(expected) {
        return Err(PipelineError::ModelLoad {
            path: path.to_path_buf(),
            message: format!("Checksum mismatch: expected {expected}, got {actual}"),
        });
    }

    tracing::debug!("Model checksum verified: {}…", &actual[..16]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_in_memory_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.onnx");
        std::fs::write(&path, b"leaf weights").unwrap();

        let expected = blake3::hash(b"leaf weights").to_hex().to_string();
        assert_eq!(artifact_digest(&path).unwrap(), expected);
        assert!(verify_artifact(&path, &expected).is_ok());
        assert!(verify_artifact(&path, &expected.to_uppercase()).is_ok());
    }

    #[test]
    fn test_verify_mismatch_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.onnx");
        std::fs::write(&path, b"tampered").unwrap();

        let err = verify_artifact(&path, &"0".repeat(64)).unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoad { .. }));
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_verify_missing_file() {
        let err = verify_artifact(Path::new("/nonexistent/weights.onnx"), &"0".repeat(64))
            .unwrap_err();
        assert!(err.to_string().contains("Checksum computation failed"));
    }
}
