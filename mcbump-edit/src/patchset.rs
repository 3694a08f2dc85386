use camino::Utf8PathBuf;
use mcbump_types::fact::FactId;
use mcbump_types::patch::{Binding, FileFormat, Locator, PatchTarget, ValueTemplate};

pub const DEFAULT_MOD_JSON: &str = "src/main/resources/fabric.mod.json";
pub const DEFAULT_LOOM_PLUGIN_ID: &str = "fabric-loom";

/// Knobs for the built-in Fabric patch set.
#[derive(Debug, Clone)]
pub struct PatchSetConfig {
    pub mod_json: Utf8PathBuf,
    pub loom_plugin_id: String,

    /// Write `*` for the Fabric API dependency in the mod manifest when its version is unresolved.
    pub wildcard_unresolved_dependencies: bool,
}

impl Default for PatchSetConfig {
    fn default() -> Self {
        Self {
            mod_json: Utf8PathBuf::from(DEFAULT_MOD_JSON),
            loom_plugin_id: DEFAULT_LOOM_PLUGIN_ID.to_string(),
            wildcard_unresolved_dependencies: true,
        }
    }
}

/// The files a Fabric mod project keeps versions in, in patch order:
/// properties file, mod manifest, wrapper descriptor, build scripts.
pub fn default_patch_set(config: &PatchSetConfig) -> Vec<PatchTarget> {
    let fact = ValueTemplate::fact;

    let properties = PatchTarget::new("gradle.properties", FileFormat::LinePattern)
        .bind(Binding::new(
            Locator::property("minecraft_version"),
            ValueTemplate::new("{minecraft_version}"),
        ))
        .bind(Binding::new(
            Locator::property("mod_version"),
            ValueTemplate::new("{minecraft_version}-{mod_version}"),
        ))
        .bind(Binding::new(
            Locator::property("yarn_mappings"),
            fact(FactId::YarnMappings),
        ))
        .bind(Binding::new(
            Locator::property("loader_version"),
            fact(FactId::LoaderVersion),
        ))
        .bind(Binding::new(
            Locator::property("fabric_version"),
            fact(FactId::FabricVersion),
        ))
        .bind(Binding::new(
            Locator::property("loom_version"),
            fact(FactId::LoomVersion),
        ));

    let manifest = PatchTarget::new(config.mod_json.clone(), FileFormat::StructuredDocument)
        .bind(Binding::new(
            Locator::key_path(&["depends", "minecraft"]),
            ValueTemplate::new("~{minecraft_version}"),
        ))
        .bind(Binding::new(
            Locator::key_path(&["depends", "fabricloader"]),
            ValueTemplate::new(">={loader_version}"),
        ))
        .bind(
            Binding::new(
                Locator::key_path(&["depends", "fabric-api"]),
                ValueTemplate::new(">={fabric_version}"),
            )
            .wildcard_when_unresolved(config.wildcard_unresolved_dependencies),
        );

    let wrapper = PatchTarget::new(
        "gradle/wrapper/gradle-wrapper.properties",
        FileFormat::LinePattern,
    )
    .bind(Binding::new(
        Locator::DistributionUrl {
            key: "distributionUrl".to_string(),
        },
        fact(FactId::GradleVersion),
    ));

    let plugin = || {
        Binding::new(
            Locator::PluginVersion {
                plugin_id: config.loom_plugin_id.clone(),
            },
            fact(FactId::LoomVersion),
        )
    };
    let groovy = PatchTarget::new("build.gradle", FileFormat::LinePattern).bind(plugin());
    let kotlin = PatchTarget::new("build.gradle.kts", FileFormat::LinePattern).bind(plugin());

    vec![properties, manifest, wrapper, groovy, kotlin]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_order() {
        let paths: Vec<String> = default_patch_set(&PatchSetConfig::default())
            .into_iter()
            .map(|t| t.path.to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "gradle.properties",
                DEFAULT_MOD_JSON,
                "gradle/wrapper/gradle-wrapper.properties",
                "build.gradle",
                "build.gradle.kts",
            ]
        );
    }

    #[test]
    fn locators_match_target_format() {
        for target in default_patch_set(&PatchSetConfig::default()) {
            for binding in &target.bindings {
                assert_eq!(binding.locator.format(), target.format, "{}", target.path);
            }
        }
    }

    #[test]
    fn wildcard_is_switchable() {
        let config = PatchSetConfig {
            wildcard_unresolved_dependencies: false,
            ..PatchSetConfig::default()
        };
        let wildcards = default_patch_set(&config)
            .iter()
            .flat_map(|t| t.bindings.iter())
            .filter(|b| b.wildcard_when_unresolved)
            .count();
        assert_eq!(wildcards, 0);

        let wildcards = default_patch_set(&PatchSetConfig::default())
            .iter()
            .flat_map(|t| t.bindings.iter())
            .filter(|b| b.wildcard_when_unresolved)
            .count();
        assert_eq!(wildcards, 1);
    }

    #[test]
    fn custom_plugin_id() {
        let config = PatchSetConfig {
            loom_plugin_id: "dev.architectury.loom".to_string(),
            ..PatchSetConfig::default()
        };
        let set = default_patch_set(&config);
        let locator = &set[3].bindings[0].locator;
        assert_eq!(locator.to_string(), "plugin 'dev.architectury.loom' version");
    }
}
