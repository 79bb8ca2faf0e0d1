//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, TubechatError};
use crate::transcript::LocalTranscript;
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Printing a transcript only needs the transcript source.
    Transcript,
    /// Search also embeds the transcript and the query.
    Search,
    /// Asking and summarizing also call the generation model.
    Ask,
}

/// Run pre-flight checks for the given operation on `input`.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings, input: &str) -> Result<()> {
    if !LocalTranscript::new().can_handle(input.trim()) {
        check_tool(&settings.transcript.ytdlp_path)?;
    }

    match operation {
        Operation::Transcript => {}
        Operation::Search => {
            check_embedding_key(settings)?;
        }
        Operation::Ask => {
            check_embedding_key(settings)?;
            check_api_key(&settings.generation.api_key_env)?;
        }
    }
    Ok(())
}

fn check_embedding_key(settings: &Settings) -> Result<()> {
    if settings.embedding.provider == "openai" {
        check_api_key(&settings.embedding.api_key_env)?;
    }
    Ok(())
}

/// Check if an API key environment variable is set.
fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(TubechatError::Config(format!(
            "{var} is empty. Set it with: export {var}='...'"
        ))),
        Err(_) => Err(TubechatError::Config(format!(
            "{var} not set. Set it with: export {var}='...' or add it to .env"
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubechatError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubechatError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubechatError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_transcript_needs_nothing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello").unwrap();
        let path = file.path().to_str().unwrap();

        let mut settings = Settings::default();
        settings.transcript.ytdlp_path = "definitely-not-a-real-ytdlp".to_string();
        assert!(check(Operation::Transcript, &settings, path).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        let mut settings = Settings::default();
        settings.transcript.ytdlp_path = "definitely-not-a-real-ytdlp".to_string();
        let err = check(Operation::Transcript, &settings, "dQw4w9WgXcQ").unwrap_err();
        assert!(matches!(err, TubechatError::ToolNotFound(_)));
    }

    #[test]
    fn test_missing_api_key() {
        let err = check_api_key("TUBECHAT_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, TubechatError::Config(_)));
    }

    #[test]
    fn test_offline_embedders_need_no_key() {
        for provider in ["local", "hash"] {
            let mut settings = Settings::default();
            settings.embedding.provider = provider.to_string();
            settings.embedding.api_key_env = "TUBECHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
            assert!(check_embedding_key(&settings).is_ok());
        }

        let mut settings = Settings::default();
        settings.embedding.provider = "openai".to_string();
        settings.embedding.api_key_env = "TUBECHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(check_embedding_key(&settings).is_err());
    }
}
