//! Dependency declaration snippets for common build tools

use crate::model::Artifact;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use strum::{Display, EnumIter, EnumString};

/// Build tools a dependency snippet can be generated for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum BuildTool {
    #[strum(serialize = "maven")]
    Maven,
    #[strum(serialize = "gradle")]
    Gradle,
    #[strum(serialize = "ivy")]
    Ivy,
    #[strum(serialize = "sbt")]
    Sbt,
    #[strum(to_string = "leiningen", serialize = "lein")]
    Leiningen,
    #[strum(serialize = "grape")]
    Grape,
    #[strum(serialize = "buildr")]
    Buildr,
    #[strum(serialize = "bld")]
    Bld,
}

/// Render the dependency declaration of `artifact` for `tool`
pub fn snippet(tool: BuildTool, artifact: &Artifact) -> String {
    let parts = Parts::of(artifact);
    match tool {
        BuildTool::Maven => maven(&parts),
        BuildTool::Gradle => gradle(&parts),
        BuildTool::Ivy => ivy(&parts),
        BuildTool::Sbt => sbt(&parts),
        BuildTool::Leiningen => leiningen(&parts),
        BuildTool::Grape => grape(&parts),
        BuildTool::Buildr => buildr(&parts),
        BuildTool::Bld => bld(&parts),
    }
}

struct Parts<'a> {
    group: &'a str,
    artifact: &'a str,
    version: &'a str,
    classifier: Option<&'a str>,
    extension: Option<&'a str>,
}

impl<'a> Parts<'a> {
    fn of(artifact: &'a Artifact) -> Self {
        Self {
            group: &artifact.group_id,
            artifact: &artifact.artifact_id,
            version: &artifact.version,
            classifier: non_blank(artifact.classifier.as_deref()),
            extension: non_blank(artifact.extension.as_deref()),
        }
    }

    /// Extension worth spelling out; `jar` is every tool's default
    fn non_jar_extension(&self) -> Option<&'a str> {
        self.extension
            .filter(|ext| !ext.eq_ignore_ascii_case("jar"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// `write!` into a String cannot fail, so results are discarded below.

fn maven(p: &Parts<'_>) -> String {
    let mut out = String::from("<dependency>\n");
    let _ = writeln!(out, "  <groupId>{}</groupId>", p.group);
    let _ = writeln!(out, "  <artifactId>{}</artifactId>", p.artifact);
    let _ = writeln!(out, "  <version>{}</version>", p.version);
    if let Some(classifier) = p.classifier {
        let _ = writeln!(out, "  <classifier>{classifier}</classifier>");
    }
    if let Some(extension) = p.non_jar_extension() {
        let _ = writeln!(out, "  <type>{extension}</type>");
    }
    out.push_str("</dependency>\n");
    out
}

fn gradle(p: &Parts<'_>) -> String {
    let coords = match (p.classifier, p.non_jar_extension()) {
        (Some(c), Some(ext)) => format!("{}:{}:{}:{c}@{ext}", p.group, p.artifact, p.version),
        (Some(c), None) => format!("{}:{}:{}:{c}", p.group, p.artifact, p.version),
        (None, _) => format!("{}:{}:{}", p.group, p.artifact, p.version),
    };
    format!("dependencies {{\n    implementation \"{coords}\"\n}}\n")
}

fn ivy(p: &Parts<'_>) -> String {
    let mut out = format!(
        "<dependency org=\"{}\" name=\"{}\" rev=\"{}\"",
        p.group, p.artifact, p.version
    );
    if let Some(extension) = p.extension {
        let _ = write!(out, " type=\"{extension}\"");
    }
    if let Some(classifier) = p.classifier {
        let _ = write!(out, " classifier=\"{classifier}\"");
    }
    out.push_str(" />\n");
    out
}

fn sbt(p: &Parts<'_>) -> String {
    let mut out = format!(
        "libraryDependencies += \"{}\" % \"{}\" % \"{}\"",
        p.group, p.artifact, p.version
    );
    if let Some(classifier) = p.classifier {
        let _ = write!(out, " classifier \"{classifier}\"");
    }
    out.push('\n');
    out
}

fn leiningen(p: &Parts<'_>) -> String {
    let mut out = format!("[\"{}/{}\" \"{}\"", p.group, p.artifact, p.version);
    if let Some(classifier) = p.classifier {
        let _ = write!(out, " :classifier \"{classifier}\"");
    }
    if let Some(extension) = p.non_jar_extension() {
        let _ = write!(out, " :extension \"{extension}\"");
    }
    out.push_str("]\n");
    out
}

fn grape(p: &Parts<'_>) -> String {
    let mut out = format!(
        "@Grapes(\n    @Grab(group='{}', module='{}', version='{}'",
        p.group, p.artifact, p.version
    );
    if let Some(classifier) = p.classifier {
        let _ = write!(out, ", classifier='{classifier}'");
    }
    if let Some(extension) = p.non_jar_extension() {
        let _ = write!(out, ", type='{extension}'");
    }
    out.push_str(")\n)\n");
    out
}

fn buildr(p: &Parts<'_>) -> String {
    let packaging = p.extension.unwrap_or("jar");
    let mut out = format!(
        "compile '{}:{}:{packaging}:{}",
        p.group, p.artifact, p.version
    );
    if let Some(classifier) = p.classifier {
        let _ = write!(out, ":{classifier}");
    }
    out.push_str("'\n");
    out
}

fn bld(p: &Parts<'_>) -> String {
    let mut out = format!(
        "dependency(\"{}\", \"{}\", \"{}\"",
        p.group, p.artifact, p.version
    );
    if let Some(classifier) = p.classifier {
        let _ = write!(out, ", classifier=\"{classifier}\"");
    }
    if let Some(extension) = p.non_jar_extension() {
        let _ = write!(out, ", type=\"{extension}\"");
    }
    out.push_str(");\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn guava() -> Artifact {
        let mut artifact = Artifact::new("com.google.guava", "guava", "33.0.0-jre");
        artifact.extension = Some("jar".to_string());
        artifact
    }

    fn natives() -> Artifact {
        let mut artifact = Artifact::new("org.lwjgl", "lwjgl", "3.3.3");
        artifact.classifier = Some("natives-linux".to_string());
        artifact.extension = Some("zip".to_string());
        artifact
    }

    #[test]
    fn test_maven_plain_jar() {
        assert_eq!(
            snippet(BuildTool::Maven, &guava()),
            "<dependency>\n  <groupId>com.google.guava</groupId>\n  <artifactId>guava</artifactId>\n  <version>33.0.0-jre</version>\n</dependency>\n"
        );
    }

    #[test]
    fn test_maven_classifier_and_type() {
        let out = snippet(BuildTool::Maven, &natives());
        assert!(out.contains("  <classifier>natives-linux</classifier>\n"));
        assert!(out.contains("  <type>zip</type>\n"));
    }

    #[test]
    fn test_gradle_variants() {
        assert_eq!(
            snippet(BuildTool::Gradle, &guava()),
            "dependencies {\n    implementation \"com.google.guava:guava:33.0.0-jre\"\n}\n"
        );
        assert!(snippet(BuildTool::Gradle, &natives())
            .contains("\"org.lwjgl:lwjgl:3.3.3:natives-linux@zip\""));

        let mut sources = guava();
        sources.classifier = Some("sources".to_string());
        assert!(snippet(BuildTool::Gradle, &sources)
            .contains("\"com.google.guava:guava:33.0.0-jre:sources\""));
    }

    #[test]
    fn test_ivy_keeps_jar_type() {
        assert_eq!(
            snippet(BuildTool::Ivy, &guava()),
            "<dependency org=\"com.google.guava\" name=\"guava\" rev=\"33.0.0-jre\" type=\"jar\" />\n"
        );
    }

    #[test]
    fn test_sbt_and_leiningen() {
        assert_eq!(
            snippet(BuildTool::Sbt, &natives()),
            "libraryDependencies += \"org.lwjgl\" % \"lwjgl\" % \"3.3.3\" classifier \"natives-linux\"\n"
        );
        assert_eq!(
            snippet(BuildTool::Leiningen, &natives()),
            "[\"org.lwjgl/lwjgl\" \"3.3.3\" :classifier \"natives-linux\" :extension \"zip\"]\n"
        );
    }

    #[test]
    fn test_grape_buildr_bld() {
        assert_eq!(
            snippet(BuildTool::Grape, &guava()),
            "@Grapes(\n    @Grab(group='com.google.guava', module='guava', version='33.0.0-jre')\n)\n"
        );
        assert_eq!(
            snippet(BuildTool::Buildr, &natives()),
            "compile 'org.lwjgl:lwjgl:zip:3.3.3:natives-linux'\n"
        );
        assert_eq!(
            snippet(BuildTool::Buildr, &Artifact::new("g", "a", "1")),
            "compile 'g:a:jar:1'\n"
        );
        assert_eq!(
            snippet(BuildTool::Bld, &natives()),
            "dependency(\"org.lwjgl\", \"lwjgl\", \"3.3.3\", classifier=\"natives-linux\", type=\"zip\");\n"
        );
    }

    #[test]
    fn test_blank_classifier_is_ignored() {
        let mut artifact = guava();
        artifact.classifier = Some("  ".to_string());
        assert_eq!(
            snippet(BuildTool::Sbt, &artifact),
            "libraryDependencies += \"com.google.guava\" % \"guava\" % \"33.0.0-jre\"\n"
        );
    }

    #[test]
    fn test_every_snippet_ends_with_newline() {
        for tool in BuildTool::iter() {
            assert!(snippet(tool, &natives()).ends_with('\n'), "{tool}");
        }
    }

    #[test]
    fn test_build_tool_parsing() {
        assert_eq!(BuildTool::from_str("Gradle").unwrap(), BuildTool::Gradle);
        assert_eq!(BuildTool::from_str("lein").unwrap(), BuildTool::Leiningen);
        assert!(BuildTool::from_str("make").is_err());
    }
}
