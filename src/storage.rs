use axum::extract::multipart::Field;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::io::ErrorKind;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
};

use crate::error::{AppError, Result};

/// How many alternative names are tried before an upload is refused.
const MAX_NAME_ATTEMPTS: u32 = 64;

/// A resume written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResume {
    /// Name inside the upload directory, as recorded on the application.
    pub file_name: String,
    /// Full path on disk.
    pub path: PathBuf,
}

/// The client's file name without directories or whitespace.
fn clean_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_whitespace()).collect();
    match cleaned.as_str() {
        "" | "." | ".." => "resume".to_string(),
        _ => cleaned,
    }
}

/// Local directory holding uploaded resumes.
#[derive(Clone, Debug)]
pub struct ResumeStore {
    root: PathBuf,
}

impl ResumeStore {
    /// Opens the store, creating `root` if needed.
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Builds the on-disk name for an upload: ingestion time in milliseconds,
    /// a dash, then the client's file name without whitespace or directories.
    pub fn stored_name(original: &str, received_at: DateTime<Utc>) -> String {
        format!("{}-{}", received_at.timestamp_millis(), clean_file_name(original))
    }

    /// The name tried after `attempt` earlier names for the same upload were taken.
    fn alternative_name(original: &str, received_at: DateTime<Utc>, attempt: u32) -> String {
        format!(
            "{}-{}-{}",
            received_at.timestamp_millis(),
            attempt,
            clean_file_name(original)
        )
    }

    /// Creates the destination file for an upload named `original`.
    ///
    /// Existing files are never opened: when the name is taken, a numbered
    /// variant is tried instead.
    async fn create(&self, original: &str) -> Result<(StoredResume, BufWriter<File>)> {
        let received_at = Utc::now();
        let mut file_name = Self::stored_name(original, received_at);
        let mut attempt = 0;

        loop {
            let path = self.root.join(&file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((StoredResume { file_name, path }, BufWriter::new(file))),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    tracing::debug!("Resume name {} taken, trying another", file_name);
                    attempt += 1;
                    file_name = Self::alternative_name(original, received_at, attempt);
                }
                Err(e) => {
                    tracing::error!("❌ Failed to create resume file {}: {}", file_name, e);
                    return Err(AppError::Io(e));
                }
            }
        }
    }

    /// Streams a multipart file field to disk.
    ///
    /// A partially written file is removed before the error is returned.
    pub async fn save_field(&self, original: &str, mut field: Field<'_>) -> Result<StoredResume> {
        let (resume, mut writer) = self.create(original).await?;

        let written = async {
            let mut total = 0u64;
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| AppError::Multipart(format!("resume: {}", e)))?
            {
                writer.write_all(&chunk).await?;
                total += chunk.len() as u64;
            }
            writer.flush().await?;
            Ok::<u64, AppError>(total)
        }
        .await;

        match written {
            Ok(bytes) => {
                tracing::debug!("✅ Resume saved: {} ({} bytes)", resume.file_name, bytes);
                Ok(resume)
            }
            Err(e) => {
                drop(writer);
                self.discard(&resume).await;
                Err(e)
            }
        }
    }

    /// Deletes a stored resume. Failures are logged, never propagated.
    pub async fn discard(&self, resume: &StoredResume) {
        match tokio::fs::remove_file(&resume.path).await {
            Ok(()) => tracing::info!("🧹 Removed orphaned resume: {}", resume.file_name),
            Err(e) => tracing::error!(
                "❌ Failed to remove orphaned resume {}: {}",
                resume.file_name,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn stored_name_strips_whitespace_and_prefixes_timestamp() {
        assert_eq!(
            ResumeStore::stored_name("My Resume 2024.pdf", at()),
            "1700000000123-MyResume2024.pdf"
        );
    }

    #[test]
    fn stored_name_drops_directories() {
        assert_eq!(
            ResumeStore::stored_name("../../etc/passwd", at()),
            "1700000000123-passwd"
        );
        assert_eq!(
            ResumeStore::stored_name("C:\\Users\\me\\cv.docx", at()),
            "1700000000123-cv.docx"
        );
        assert_eq!(ResumeStore::stored_name("..", at()), "1700000000123-resume");
    }

    #[tokio::test]
    async fn create_then_discard_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path().join("uploads")).await.unwrap();

        let (resume, mut writer) = store.create("cv.pdf").await.unwrap();
        writer.write_all(b"%PDF-1.4").await.unwrap();
        writer.flush().await.unwrap();
        drop(writer);

        assert!(resume.path.starts_with(store.root()));
        assert!(resume.file_name.ends_with("-cv.pdf"));
        assert!(resume.path.exists());

        store.discard(&resume).await;
        assert!(!resume.path.exists());
    }

    #[tokio::test]
    async fn same_name_uploads_never_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();

        let (alice, mut alice_writer) = store.create("cv.pdf").await.unwrap();
        alice_writer.write_all(b"alice").await.unwrap();
        alice_writer.flush().await.unwrap();
        drop(alice_writer);

        let (bob, mut bob_writer) = store.create("cv.pdf").await.unwrap();
        bob_writer.write_all(b"bob").await.unwrap();
        bob_writer.flush().await.unwrap();
        drop(bob_writer);

        assert_ne!(alice.path, bob.path);
        assert!(bob.file_name.ends_with("cv.pdf"));
        assert_eq!(tokio::fs::read(&alice.path).await.unwrap(), b"alice");

        store.discard(&bob).await;
        assert!(alice.path.exists());
        assert_eq!(tokio::fs::read(&alice.path).await.unwrap(), b"alice");
    }

    #[tokio::test]
    async fn taken_names_get_a_numbered_variant() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let now = Utc::now();

        // Occupy the plain names for the next few milliseconds.
        for offset in 0..5 {
            let at = now + chrono::Duration::milliseconds(offset);
            tokio::fs::write(store.root().join(ResumeStore::stored_name("cv.pdf", at)), b"x")
                .await
                .unwrap();
        }

        let (resume, writer) = store.create("cv.pdf").await.unwrap();
        drop(writer);

        assert!(resume.path.exists());
        assert_eq!(tokio::fs::read(&resume.path).await.unwrap(), b"");
    }

    #[test]
    fn alternative_names_keep_timestamp_and_file_name() {
        assert_eq!(
            ResumeStore::alternative_name("My CV.pdf", at(), 2),
            "1700000000123-2-MyCV.pdf"
        );
    }

    #[tokio::test]
    async fn discarding_a_missing_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::init(dir.path()).await.unwrap();
        let ghost = StoredResume {
            file_name: "1-ghost.pdf".to_string(),
            path: dir.path().join("1-ghost.pdf"),
        };
        store.discard(&ghost).await;
    }
}
