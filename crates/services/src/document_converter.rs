use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use log::{debug, warn};
use regex::{Captures, Regex};
use tempfile::TempDir;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::ConversionError;

/// Style map that keeps underlines, which mark the correct answers.
pub const UNDERLINE_STYLE_MAP: &str = "u => u\n";

const DEFAULT_CONVERTER: &str = "mammoth";

static INLINE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])(data:[^"']+)(["'])"#)
        .expect("inline image pattern should compile")
});

/// Placeholder that stands in for the `index`-th image inside converted markup.
#[must_use]
pub fn image_placeholder(index: usize) -> String {
    format!("[IMAGE_REF_{index}]")
}

/// Markup produced from a document, with inline images lifted out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub markup: String,
    /// `images[n]` is the data URI that `[IMAGE_REF_n]` refers to.
    pub images: Vec<String>,
}

impl ConvertedDocument {
    /// Replace every inline `data:` image source with a placeholder and keep the URI aside.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let mut images = Vec::new();
        let markup = INLINE_IMAGE
            .replace_all(html, |caps: &Captures<'_>| {
                let placeholder = image_placeholder(images.len());
                images.push(caps[3].to_string());
                format!("{}{}{}{}", &caps[1], &caps[2], placeholder, &caps[4])
            })
            .into_owned();
        Self { markup, images }
    }

    #[must_use]
    pub fn image(&self, index: usize) -> Option<&str> {
        self.images.get(index).map(String::as_str)
    }
}

/// Turns raw document bytes into markup.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// # Errors
    ///
    /// Returns `ConversionError` if the document cannot be converted.
    async fn convert(&self, document: &[u8]) -> Result<ConvertedDocument, ConversionError>;
}

/// Runs an external `.docx` → HTML converter (mammoth's CLI interface):
/// `<program> <input.docx> --style-map=<file>`, HTML on stdout, images inlined.
#[derive(Clone, Debug)]
pub struct CommandConverter {
    program: String,
    style_map: String,
}

impl CommandConverter {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            style_map: UNDERLINE_STYLE_MAP.to_string(),
        }
    }

    /// Uses `QUIZ_CONVERTER`, falling back to `mammoth`.
    #[must_use]
    pub fn from_env() -> Self {
        let program = env::var("QUIZ_CONVERTER")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERTER.into());
        Self::new(program)
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(&self, document: &[u8]) -> Result<ConvertedDocument, ConversionError> {
        if document.is_empty() {
            return Err(ConversionError::EmptyDocument);
        }

        let staged = StagedInput::write(document, &self.style_map).await?;
        let output = Command::new(&self.program)
            .arg(&staged.document)
            .arg(format!("--style-map={}", staged.style_map.display()))
            .kill_on_drop(true)
            .output()
            .await;
        staged.remove();

        let output = output.map_err(|source| ConversionError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(ConversionError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let html = String::from_utf8(output.stdout)?;
        let converted = ConvertedDocument::from_html(&html);
        debug!(
            "converted document into {} bytes of markup and {} images",
            converted.markup.len(),
            converted.images.len()
        );
        Ok(converted)
    }
}

const STAGED_DOCUMENT: &str = "document.docx";
const STAGED_STYLE_MAP: &str = "style-map.txt";

/// Files handed to the converter process, inside a private directory that is
/// removed with them.
struct StagedInput {
    dir: TempDir,
    document: PathBuf,
    style_map: PathBuf,
}

impl StagedInput {
    async fn write(document: &[u8], style_map: &str) -> Result<Self, ConversionError> {
        let dir = tempfile::Builder::new().prefix("quizdoc-").tempdir()?;
        Self::write_in(dir, document, style_map).await
    }

    async fn write_in(
        dir: TempDir,
        document: &[u8],
        style_map: &str,
    ) -> Result<Self, ConversionError> {
        let staged = Self {
            document: dir.path().join(STAGED_DOCUMENT),
            style_map: dir.path().join(STAGED_STYLE_MAP),
            dir,
        };
        write_new(&staged.document, document).await?;
        write_new(&staged.style_map, style_map.as_bytes()).await?;
        Ok(staged)
    }

    fn remove(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!("failed to remove {}: {err}", path.display());
        }
    }
}

/// Write a file that must not exist yet; never follows an existing link.
async fn write_new(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_images_become_placeholders() {
        let html = r#"<p>Q1 <img src="data:image/png;base64,AAA=" alt="x" /></p><p><IMG alt='y' SRC='data:image/jpeg;base64,BBB='></p>"#;
        let converted = ConvertedDocument::from_html(html);

        assert_eq!(
            converted.markup,
            r#"<p>Q1 <img src="[IMAGE_REF_0]" alt="x" /></p><p><IMG alt='y' SRC='[IMAGE_REF_1]'></p>"#
        );
        assert_eq!(
            converted.images,
            vec![
                "data:image/png;base64,AAA=".to_string(),
                "data:image/jpeg;base64,BBB=".to_string()
            ]
        );
        assert_eq!(converted.image(1), Some("data:image/jpeg;base64,BBB="));
        assert_eq!(converted.image(2), None);
    }

    #[test]
    fn external_images_are_left_alone() {
        let html = r#"<p><u>B. four</u><img src="https://example.com/a.png"></p>"#;
        let converted = ConvertedDocument::from_html(html);
        assert_eq!(converted.markup, html);
        assert!(converted.images.is_empty());
    }

    #[tokio::test]
    async fn empty_document_is_rejected_before_spawning() {
        let converter = CommandConverter::new("definitely-not-a-real-converter");
        let err = converter.convert(&[]).await.unwrap_err();
        assert!(matches!(err, ConversionError::EmptyDocument));
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_failure() {
        let converter = CommandConverter::new("definitely-not-a-real-converter");
        let err = converter.convert(b"PK\x03\x04").await.unwrap_err();
        assert!(matches!(err, ConversionError::Spawn { .. }));
    }

    #[tokio::test]
    async fn staged_files_live_in_a_private_directory() {
        let staged = StagedInput::write(b"PK-doc", UNDERLINE_STYLE_MAP).await.unwrap();
        let dir = staged.dir.path().to_path_buf();

        assert_ne!(dir, env::temp_dir());
        assert!(staged.document.starts_with(&dir));
        assert_eq!(tokio::fs::read(&staged.document).await.unwrap(), b"PK-doc");
        assert_eq!(
            tokio::fs::read_to_string(&staged.style_map).await.unwrap(),
            UNDERLINE_STYLE_MAP
        );

        staged.remove();
        assert!(!dir.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn staging_never_writes_through_a_planted_link() {
        let outside = tempfile::tempdir().unwrap();
        let victim = outside.path().join("victim.txt");
        std::fs::write(&victim, b"precious").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&victim, dir.path().join(STAGED_DOCUMENT)).unwrap();

        let err = StagedInput::write_in(dir, b"replacement", UNDERLINE_STYLE_MAP)
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConversionError::Staging(ref source) if source.kind() == io::ErrorKind::AlreadyExists
        ));
        assert_eq!(std::fs::read(&victim).unwrap(), b"precious");
    }
}
