use camino::Utf8PathBuf;
use diffy::PatchFormatter;
use mcbump_types::patch::FileChange;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub(crate) fn file_change(path: &str, before: &str, after: &str) -> FileChange {
    FileChange {
        path: path.to_string(),
        sha256_before: sha256_hex(before.as_bytes()),
        sha256_after: sha256_hex(after.as_bytes()),
        bytes_before: before.len() as u64,
        bytes_after: after.len() as u64,
    }
}

/// Unified git-style diff of every file whose contents differ.
pub(crate) fn render_patch(
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        let patch = diffy::create_patch(old, new);
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy repeats the ---/+++ header; keep only the hunks.
        let hunks = body
            .find("\n@@")
            .map(|i| &body[i + 1..])
            .unwrap_or(body.as_str());
        out.push_str(hunks);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
