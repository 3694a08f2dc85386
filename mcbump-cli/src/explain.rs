//! Fact explanations for the `mcbump explain` and `mcbump list-facts` commands.
//!
//! The static text says what a fact is and how to check it by hand; the live parts
//! (source URL, fallback, files) come from the resolver rules and the patch set.

use mcbump_types::fact::FactId;

/// Information about one version fact.
#[derive(Debug, Clone)]
pub struct FactExplanation {
    pub fact: FactId,
    /// Short names accepted by `explain`, besides the fact name itself.
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    /// Why the fallback policy is what it is.
    pub fallback_rationale: &'static str,
    pub remediation: &'static str,
}

pub static FACT_REGISTRY: &[FactExplanation] = &[
    FactExplanation {
        fact: FactId::YarnMappings,
        aliases: &["yarn", "mappings"],
        description: r#"The Yarn mappings build used to deobfuscate Minecraft in the dev environment.
Written to `yarn_mappings` in gradle.properties.

The newest build for the target version is read from the Fabric meta service."#,
        fallback_rationale: r#"Every Minecraft version Fabric supports has a `+build.1` mappings release, so
`<minecraft_version>+build.1` is a safe guess. It is recorded as a fallback because a
newer build almost always exists."#,
        remediation: r#"Pick the newest build for your Minecraft version at https://fabricmc.net/develop/
and set it in gradle.properties:

    yarn_mappings=1.21.1+build.3"#,
    },
    FactExplanation {
        fact: FactId::LoaderVersion,
        aliases: &["loader", "fabricloader"],
        description: r#"The Fabric Loader version. Written to `loader_version` in gradle.properties and
as `>=<version>` to `depends.fabricloader` in the mod manifest.

The loader is independent of the Minecraft version; the newest release is used."#,
        fallback_rationale: r#"Loader releases are backwards compatible, so a known-good release is substituted
when the meta service is unreachable. Override it with `--loader-fallback` or
`[fallbacks] loader_version` in mcbump.toml."#,
        remediation: r#"Check the current loader release at https://fabricmc.net/develop/ and update both
gradle.properties and the `fabricloader` dependency in fabric.mod.json."#,
    },
    FactExplanation {
        fact: FactId::FabricVersion,
        aliases: &["fabric", "fabric-api", "api"],
        description: r#"The Fabric API release built for the target Minecraft version. Written to
`fabric_version` in gradle.properties and as `>=<version>` to `depends.fabric-api`
in the mod manifest."#,
        fallback_rationale: r#"Fabric API releases are tied to one Minecraft version and there is no pattern
to derive them from. Guessing would produce a build that fails to resolve, so the
fact stays unresolved and its lines are left as they are. The manifest dependency
is relaxed to `*` unless `--no-wildcard` is given."#,
        remediation: r#"Look up the Fabric API release for your Minecraft version at
https://fabricmc.net/develop/ and set `fabric_version` in gradle.properties. Pin the
`fabric-api` dependency in fabric.mod.json if it was relaxed to `*`."#,
    },
    FactExplanation {
        fact: FactId::GradleVersion,
        aliases: &["gradle", "wrapper"],
        description: r#"The Gradle release the wrapper downloads. Written into `distributionUrl` in
gradle/wrapper/gradle-wrapper.properties.

The newest Gradle release is used, which may be ahead of what Loom supports, so a
caution is reported even when the lookup succeeds."#,
        fallback_rationale: r#"A wrong Gradle version breaks the build before any mod code compiles, so nothing
is guessed."#,
        remediation: r#"Check the Gradle version required by your Loom release and the list at
https://gradle.org/releases/, then run `./gradlew wrapper --gradle-version <version>`."#,
    },
    FactExplanation {
        fact: FactId::LoomVersion,
        aliases: &["loom", "fabric-loom"],
        description: r#"The Fabric Loom Gradle plugin version. Written to `loom_version` in
gradle.properties and to the plugin declaration in build.gradle or build.gradle.kts:

    id 'fabric-loom' version '1.7.4'

The newest release tag is used; it can appear before the plugin is published."#,
        fallback_rationale: r#"Loom versions follow their own cadence, so nothing is guessed."#,
        remediation: r#"Check the published Loom versions at https://maven.fabricmc.net/net/fabricmc/fabric-loom/
and update the plugin block. Use a `-SNAPSHOT` version to follow the latest minor."#,
    },
];

/// Find a fact by name (`loom_version`, `loom-version`) or alias (`loom`), ignoring case.
pub fn lookup_fact(query: &str) -> Option<&'static FactExplanation> {
    let normalized = query.trim().to_lowercase();
    let underscored = normalized.replace('-', "_");

    FACT_REGISTRY.iter().find(|e| {
        e.fact.as_str() == underscored || e.aliases.iter().any(|a| *a == normalized)
    })
}

pub fn list_fact_keys() -> Vec<&'static str> {
    FACT_REGISTRY.iter().map(|e| e.fact.as_str()).collect()
}
