//! Generation settings.
//!
//! Everything a run needs is carried in [`Config`]; nothing reads the process
//! environment or working directory behind its back. A config can be loaded
//! from a JSON file and then adjusted by the caller (usually from CLI flags).
use crate::{
    error::{Error, Result},
    process::ProcessRunner,
    sanitize::{is_valid_package_name, is_valid_type_name, snake_case},
    strategy::FontMode,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 900;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the generated Dart class, also used as the font family.
    pub class_name: String,
    /// Flutter package the font is bundled in, if any.
    pub package: Option<String>,
    pub input_dir: PathBuf,
    pub font_out_dir: PathBuf,
    pub source_out_dir: PathBuf,
    pub mode: FontMode,
    /// Emit the `values` map from icon name to `IconData`.
    pub aggregate: bool,
    pub verbose: bool,
    /// Retain the scratch workspace for debugging instead of deleting it.
    pub keep_workspace: bool,
    /// Parent of the scratch workspace; the system temp directory if unset.
    pub workspace_root: Option<PathBuf>,
    /// Per external command; `0` waits forever.
    pub timeout_secs: u64,
    pub tools: ToolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            package: None,
            input_dir: PathBuf::new(),
            font_out_dir: PathBuf::from("."),
            source_out_dir: PathBuf::from("."),
            mode: FontMode::default(),
            aggregate: true,
            verbose: false,
            keep_workspace: false,
            workspace_root: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tools: ToolConfig::default(),
        }
    }
}

/// External programs and packages used by the font strategies.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub node: String,
    pub npm: String,
    pub python: String,
    /// npm package spec installed into the workspace, e.g. `fantasticon@3`.
    pub fantasticon: String,
    /// pip requirement installed into the virtual environment.
    pub nanoemoji: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            node: "node".into(),
            npm: if cfg!(windows) { "npm.cmd" } else { "npm" }.into(),
            python: if cfg!(windows) { "python" } else { "python3" }.into(),
            fantasticon: "fantasticon".into(),
            nanoemoji: "nanoemoji".into(),
        }
    }
}

impl Config {
    /// Loads a JSON config file. Relative paths are resolved against the
    /// directory containing the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [
            &mut self.input_dir,
            &mut self.font_out_dir,
            &mut self.source_out_dir,
        ] {
            if dir.is_relative() && !dir.as_os_str().is_empty() {
                *dir = base.join(&*dir);
            }
        }
        if let Some(root) = &mut self.workspace_root {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }

    /// Rejects settings that cannot produce a usable result. Runs before any
    /// file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.class_name.is_empty() {
            return Err(Error::Usage("a class name is required".into()));
        }
        if !is_valid_type_name(&self.class_name) {
            return Err(Error::Usage(format!(
                "`{}` is not a valid Dart class name",
                self.class_name
            )));
        }
        if self.file_stem().is_empty() {
            return Err(Error::Usage(format!(
                "cannot derive a file name from class name `{}`",
                self.class_name
            )));
        }
        if let Some(package) = &self.package {
            if !is_valid_package_name(package) {
                return Err(Error::Usage(format!(
                    "`{package}` is not a valid Dart package name"
                )));
            }
        }
        if self.input_dir.as_os_str().is_empty() {
            return Err(Error::Usage("an input directory is required".into()));
        }
        Ok(())
    }

    /// Base name shared by the font and the generated source file.
    pub fn file_stem(&self) -> String {
        snake_case(&self.class_name)
    }

    pub fn font_file_name(&self) -> String {
        format!("{}.ttf", self.file_stem())
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.dart", self.file_stem())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn runner(&self) -> ProcessRunner {
        ProcessRunner::new(self.verbose, self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(class_name: &str) -> Config {
        Config {
            class_name: class_name.into(),
            input_dir: "icons".into(),
            ..Config::default()
        }
    }

    #[test]
    fn validate_accepts_plain_config() {
        config("MyIcons").validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_class_names() {
        for name in ["", "2Icons", "My Icons", "class"] {
            let err = config(name).validate().unwrap_err();
            assert!(err.is_usage(), "{name:?}: {err}");
        }
    }

    #[test]
    fn validate_rejects_bad_package() {
        let mut c = config("MyIcons");
        c.package = Some("My-Package".into());
        assert!(c.validate().unwrap_err().is_usage());
    }

    #[test]
    fn validate_requires_input_dir() {
        let mut c = config("MyIcons");
        c.input_dir = PathBuf::new();
        assert!(c.validate().unwrap_err().is_usage());
    }

    #[test]
    fn derived_file_names() {
        let c = config("AppIcons");
        assert_eq!(c.font_file_name(), "app_icons.ttf");
        assert_eq!(c.source_file_name(), "app_icons.dart");
    }

    #[test]
    fn zero_timeout_disables() {
        let mut c = config("MyIcons");
        assert_eq!(c.timeout(), Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        c.timeout_secs = 0;
        assert_eq!(c.timeout(), None);
    }

    #[test]
    fn parse_json_with_defaults() {
        let c: Config = serde_json::from_str(
            r#"{ "class_name": "MyIcons", "input_dir": "svg", "mode": "color", "tools": { "python": "python3.12" } }"#,
        )
        .unwrap();
        assert_eq!(c.mode, FontMode::Color);
        assert!(c.aggregate);
        assert_eq!(c.tools.python, "python3.12");
        assert_eq!(c.tools.node, "node");
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let mut c = config("MyIcons");
        c.workspace_root = Some("scratch".into());
        c.resolve_relative_to(Path::new("/project"));
        assert_eq!(c.input_dir, PathBuf::from("/project/icons"));
        assert_eq!(c.workspace_root, Some(PathBuf::from("/project/scratch")));
        assert_eq!(c.font_out_dir, PathBuf::from("/project/."));
    }
}
