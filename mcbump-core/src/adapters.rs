//! Default port implementations: real network, real processes, real filesystem.

use crate::ports::{ProgressPort, WritePort};
use crate::settings::SwitchSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mcbump_build::GradleWrapper;
use mcbump_sources::HttpFetcher;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::debug;

/// Writes files to the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))?;
        debug!(path = %path, bytes = contents.len(), "wrote artifact");
        Ok(())
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create dir {}", path))
    }
}

/// Keeps written files in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryWritePort {
    files: RefCell<BTreeMap<Utf8PathBuf, Vec<u8>>>,
}

impl InMemoryWritePort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl WritePort for InMemoryWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressPort for NoProgress {}

/// Live metadata over HTTPS.
pub fn http_fetcher() -> anyhow::Result<HttpFetcher> {
    HttpFetcher::new().context("build HTTP client")
}

/// The project's Gradle wrapper, or the configured replacement.
pub fn gradle_wrapper(settings: &SwitchSettings) -> GradleWrapper {
    let root = &settings.project_root;
    match &settings.gradle_wrapper {
        Some(script) if script.is_absolute() => GradleWrapper::new(root, script.as_str()),
        Some(script) => GradleWrapper::new(root, root.join(script).to_string()),
        None => GradleWrapper::locate(root),
    }
}
