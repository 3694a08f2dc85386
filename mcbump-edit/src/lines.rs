//! Pattern-anchored edits for line-oriented files.
//!
//! Only the matched region is replaced; every other byte (comments, blank lines, `\r\n`
//! endings) is carried over untouched.

use crate::error::PatchError;
use mcbump_types::patch::Locator;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineEdit {
    pub content: String,
    pub matches: usize,
}

impl LineEdit {
    pub fn changed(&self, original: &str) -> bool {
        self.content != original
    }
}

/// Write `value` at every place `locator` matches in `content`.
pub(crate) fn rewrite(
    content: &str,
    locator: &Locator,
    value: &str,
    path: &str,
) -> Result<LineEdit, PatchError> {
    match locator {
        Locator::Property { key } => {
            let re = compile(
                locator,
                &format!(r"(?m)^[ \t]*{}[ \t]*=[^\r\n]*", regex::escape(key)),
            )?;
            Ok(replace_group(content, &re, 0, &format!("{key}={value}")))
        }
        Locator::DistributionUrl { key } => {
            let re = compile(
                locator,
                &format!(
                    r"(?m)^[ \t]*{}[ \t]*=[^\r\n]*?gradle-([^/\s]+?)-(?:bin|all)\.zip",
                    regex::escape(key)
                ),
            )?;
            Ok(replace_group(content, &re, 1, value))
        }
        Locator::PluginVersion { plugin_id } => {
            let re = compile(
                locator,
                &format!(
                    r#"id\s*\(?\s*["']{}["']\s*\)?\s+version\s*\(?\s*["']([^"'$]+)["']"#,
                    regex::escape(plugin_id)
                ),
            )?;
            Ok(replace_group(content, &re, 1, value))
        }
        Locator::KeyPath { .. } => Err(PatchError::FormatMismatch {
            path: path.to_string(),
            locator: locator.to_string(),
            format: "line-pattern",
        }),
    }
}

fn compile(locator: &Locator, pattern: &str) -> Result<Regex, PatchError> {
    Regex::new(pattern).map_err(|source| PatchError::Pattern {
        locator: locator.to_string(),
        source,
    })
}

fn replace_group(content: &str, re: &Regex, group: usize, value: &str) -> LineEdit {
    let mut out = String::with_capacity(content.len() + value.len());
    let mut last = 0;
    let mut matches = 0;

    for caps in re.captures_iter(content) {
        let Some(m) = caps.get(group) else {
            continue;
        };
        matches += 1;
        out.push_str(&content[last..m.start()]);
        out.push_str(value);
        last = m.end();
    }
    out.push_str(&content[last..]);

    LineEdit {
        content: out,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prop(key: &str) -> Locator {
        Locator::property(key)
    }

    #[test]
    fn property_line_is_replaced_whole() {
        let src = "# Fabric\nminecraft_version=1.20.4\nyarn_mappings=1.20.4+build.3\n";
        let edit = rewrite(src, &prop("minecraft_version"), "1.21.1", "gradle.properties").unwrap();
        assert_eq!(
            edit.content,
            "# Fabric\nminecraft_version=1.21.1\nyarn_mappings=1.20.4+build.3\n"
        );
        assert_eq!(edit.matches, 1);
        assert!(edit.changed(src));
    }

    #[test]
    fn property_key_must_be_followed_by_equals() {
        let src = "mod_version_suffix=beta\nmod_version = 1.0.0\n";
        let edit = rewrite(src, &prop("mod_version"), "1.21.1-1.2.0", "p").unwrap();
        assert_eq!(edit.content, "mod_version_suffix=beta\nmod_version=1.21.1-1.2.0\n");
    }

    #[test]
    fn commented_property_is_ignored() {
        let src = "#loader_version=0.15.0\n";
        let edit = rewrite(src, &prop("loader_version"), "0.16.9", "p").unwrap();
        assert_eq!(edit.matches, 0);
        assert_eq!(edit.content, src);
    }

    #[test]
    fn crlf_endings_survive() {
        let src = "a=1\r\nloader_version=0.15.0\r\nb=2\r\n";
        let edit = rewrite(src, &prop("loader_version"), "0.16.9", "p").unwrap();
        assert_eq!(edit.content, "a=1\r\nloader_version=0.16.9\r\nb=2\r\n");
    }

    #[test]
    fn replacement_text_is_literal() {
        let src = "x=1\n";
        let edit = rewrite(src, &prop("x"), "$1${0}", "p").unwrap();
        assert_eq!(edit.content, "x=$1${0}\n");
    }

    #[test]
    fn distribution_url_version_segment() {
        let src = "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-8.8-bin.zip\nnetworkTimeout=10000\n";
        let loc = Locator::DistributionUrl {
            key: "distributionUrl".to_string(),
        };
        let edit = rewrite(src, &loc, "8.10.2", "gradle-wrapper.properties").unwrap();
        assert_eq!(
            edit.content,
            "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-8.10.2-bin.zip\nnetworkTimeout=10000\n"
        );
    }

    #[test]
    fn distribution_url_all_flavour() {
        let src = "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.8-all.zip\n";
        let loc = Locator::DistributionUrl {
            key: "distributionUrl".to_string(),
        };
        let edit = rewrite(src, &loc, "8.10", "w").unwrap();
        assert!(edit.content.contains("gradle-8.10-all.zip"));
    }

    #[test]
    fn plugin_version_groovy_and_kotlin() {
        let loc = Locator::PluginVersion {
            plugin_id: "fabric-loom".to_string(),
        };

        let groovy = "plugins {\n\tid 'fabric-loom' version '1.7-SNAPSHOT'\n\tid 'maven-publish'\n}\n";
        let edit = rewrite(groovy, &loc, "1.10.1", "build.gradle").unwrap();
        assert_eq!(
            edit.content,
            "plugins {\n\tid 'fabric-loom' version '1.10.1'\n\tid 'maven-publish'\n}\n"
        );

        let kts = "plugins {\n    id(\"fabric-loom\") version \"1.7.4\"\n}\n";
        let edit = rewrite(kts, &loc, "1.10.1", "build.gradle.kts").unwrap();
        assert_eq!(edit.content, "plugins {\n    id(\"fabric-loom\") version \"1.10.1\"\n}\n");
    }

    #[test]
    fn interpolated_plugin_version_is_not_touched() {
        let loc = Locator::PluginVersion {
            plugin_id: "fabric-loom".to_string(),
        };
        let src = "plugins {\n\tid 'fabric-loom' version \"${loom_version}\"\n}\n";
        let edit = rewrite(src, &loc, "1.10.1", "build.gradle").unwrap();
        assert_eq!(edit.matches, 0);
        assert_eq!(edit.content, src);
    }

    #[test]
    fn key_path_is_a_format_mismatch() {
        let err = rewrite("", &Locator::key_path(&["depends"]), "x", "gradle.properties")
            .unwrap_err();
        assert!(matches!(err, PatchError::FormatMismatch { .. }));
    }
}
