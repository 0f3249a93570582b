use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::syntax::span::Span;

/// Project file name searched for next to the inputs.
pub const PROJECT_FILE: &str = "automi.toml";

/// Minimal project configuration from automi.toml.
#[derive(Clone, Debug, Default)]
pub struct Project {
    pub root_dir: PathBuf,
    /// `[convert] track_free`: emit code without per-message track masks.
    pub track_free: Option<bool>,
    pub vector_type: Option<String>,
    pub lanes: Option<String>,
}

fn parse_bool(key: &str, value: &str, path: &Path) -> Result<bool, Diagnostic> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Diagnostic::error(
            format!(
                "'{}' in '{}' must be true or false, found '{}'",
                key,
                path.display(),
                other
            ),
            Span::dummy(),
        )),
    }
}

impl Project {
    /// Load project settings from an automi.toml file.
    pub fn load(toml_path: &Path) -> Result<Project, Diagnostic> {
        let content = std::fs::read_to_string(toml_path).map_err(|e| {
            Diagnostic::error(
                format!("cannot read '{}': {}", toml_path.display(), e),
                Span::dummy(),
            )
        })?;
        Self::parse(&content, toml_path)
    }

    /// Section-aware minimal TOML parsing of the `[convert]` table.
    pub fn parse(content: &str, toml_path: &Path) -> Result<Project, Diagnostic> {
        let root_dir = toml_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let mut project = Project {
            root_dir,
            ..Project::default()
        };
        let mut current_section = String::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current_section = trimmed[1..trimmed.len() - 1].trim().to_string();
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                continue;
            };
            if current_section != "convert" {
                continue;
            }
            let key = key.trim().trim_matches('"');
            let value = strip_comment(value).trim();
            match key {
                "track_free" => project.track_free = Some(parse_bool(key, value, toml_path)?),
                "vector_type" => project.vector_type = Some(value.trim_matches('"').to_string()),
                "lanes" => project.lanes = Some(value.trim_matches('"').to_string()),
                other => {
                    return Err(Diagnostic::error(
                        format!(
                            "unknown key '{}' in [convert] of '{}'",
                            other,
                            toml_path.display()
                        ),
                        Span::dummy(),
                    )
                    .with_help("known keys: track_free, vector_type, lanes".to_string()))
                }
            }
        }
        Ok(project)
    }

    /// Try to find an automi.toml in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(PROJECT_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

/// Cut a trailing `#` comment that sits outside a quoted string.
fn strip_comment(value: &str) -> &str {
    let mut quoted = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &value[..i],
            _ => {}
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use std::fs;

    #[test]
    fn test_load_project() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join(PROJECT_FILE);
        fs::write(
            &toml_path,
            r#"# conversion settings
[convert]
track_free = true
vector_type = "graphlab::dimitra_bitvec"
lanes = "64"
"#,
        )
        .unwrap();

        let project = Project::load(&toml_path).unwrap();
        assert_eq!(project.track_free, Some(true));
        assert_eq!(
            project.vector_type.as_deref(),
            Some("graphlab::dimitra_bitvec")
        );
        assert_eq!(project.lanes.as_deref(), Some("64"));
        assert_eq!(project.root_dir, dir.path());

        let options = ConvertOptions::from_project(&project);
        assert!(!options.tracking);
        assert_eq!(options.lanes, "64");
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let project = Project::parse("[convert]\n", Path::new("automi.toml")).unwrap();
        assert_eq!(ConvertOptions::from_project(&project), ConvertOptions::default());
    }

    #[test]
    fn test_other_sections_ignored() {
        let project = Project::parse(
            "[package]\nname = \"sssp\"\n\n[convert]\nlanes = \"8\" # per batch\n",
            Path::new("automi.toml"),
        )
        .unwrap();
        assert_eq!(project.lanes.as_deref(), Some("8"));
        assert_eq!(project.track_free, None);
    }

    #[test]
    fn test_comments_outside_quotes_only() {
        let project = Project::parse(
            "[convert]\ntrack_free = true#batch run\nlanes = \"A #B\" # lanes\n",
            Path::new("automi.toml"),
        )
        .unwrap();
        assert_eq!(project.track_free, Some(true));
        assert_eq!(project.lanes.as_deref(), Some("A #B"));
    }

    #[test]
    fn test_bad_bool_is_an_error() {
        let err = Project::parse("[convert]\ntrack_free = yes\n", Path::new("automi.toml"))
            .unwrap_err();
        assert!(err.message.contains("must be true or false"));
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = Project::parse("[convert]\nwidth = 4\n", Path::new("automi.toml")).unwrap_err();
        assert!(err.message.contains("unknown key 'width'"));
    }

    #[test]
    fn test_find_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("programs").join("sssp");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "[convert]\n").unwrap();

        let found = Project::find(&nested).unwrap();
        assert_eq!(found, dir.path().join(PROJECT_FILE));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Project::load(&dir.path().join(PROJECT_FILE)).unwrap_err();
        assert!(err.message.contains("cannot read"));
    }
}
