use camino::Utf8Path;
use tracing::debug;

/// Jars under `build/libs`, relative to `root`, sorted.
pub fn list_jars(root: &Utf8Path) -> Vec<String> {
    let pattern = root.join("build").join("libs").join("*.jar");
    let Ok(entries) = glob::glob(pattern.as_str()) else {
        return vec![];
    };

    let mut jars: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|p| {
            p.strip_prefix(root.as_std_path())
                .ok()
                .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    jars.sort();
    debug!(count = jars.len(), "built artifacts");
    jars
}
