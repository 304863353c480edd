use crate::{
    color::ColorStrategy,
    config::Config,
    error::{Result, ToolError},
    glyph::FontArtifact,
    input::PreparedInput,
    mono::MonochromeStrategy,
    process::ProcessRunner,
    workspace::Workspace,
};
use log::info;
use serde::Deserialize;
use std::path::Path;

/// Anything smaller cannot be a real font; tools sometimes exit 0 after
/// writing an empty file.
pub const MIN_FONT_BYTES: u64 = 256;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontMode {
    /// Single color glyphs built with fantasticon.
    #[default]
    Monochrome,
    /// Multi color COLR glyphs built with nanoemoji.
    Color,
}

/// The two ways of turning a set of SVG files into a font.
///
/// A closed set of variants dispatched by tag; each one verifies its own
/// toolchain and then drives it.
pub enum FontStrategy {
    Monochrome(MonochromeStrategy),
    Color(ColorStrategy),
}

/// Version string reported by a required tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolVersion {
    pub tool: String,
    pub version: String,
}

impl FontStrategy {
    pub fn for_config(config: &Config) -> Self {
        match config.mode {
            FontMode::Monochrome => FontStrategy::Monochrome(MonochromeStrategy::new(
                &config.tools,
                config.file_stem(),
            )),
            FontMode::Color => FontStrategy::Color(ColorStrategy::new(
                &config.tools,
                config.class_name.clone(),
                config.file_stem(),
            )),
        }
    }

    pub fn mode(&self) -> FontMode {
        match self {
            FontStrategy::Monochrome(_) => FontMode::Monochrome,
            FontStrategy::Color(_) => FontMode::Color,
        }
    }

    /// Probes the external toolchain. Generation is only reachable through
    /// the returned [`ReadyStrategy`].
    pub fn check_prerequisites<'a>(
        &'a self,
        runner: &'a ProcessRunner,
    ) -> Result<ReadyStrategy<'a>> {
        let versions = match self {
            FontStrategy::Monochrome(s) => s.check(runner)?,
            FontStrategy::Color(s) => s.check(runner)?,
        };
        for v in &versions {
            info!("found {} {}", v.tool, v.version);
        }
        Ok(ReadyStrategy {
            strategy: self,
            runner,
            versions,
        })
    }
}

/// A strategy whose prerequisites have been verified.
pub struct ReadyStrategy<'a> {
    strategy: &'a FontStrategy,
    runner: &'a ProcessRunner,
    versions: Vec<ToolVersion>,
}

impl ReadyStrategy<'_> {
    pub fn versions(&self) -> &[ToolVersion] {
        &self.versions
    }

    pub fn generate(&self, input: &PreparedInput, workspace: &Workspace) -> Result<FontArtifact> {
        info!(
            "building {:?} font from {} icons",
            self.strategy.mode(),
            input.files.len()
        );
        match self.strategy {
            FontStrategy::Monochrome(s) => s.generate(self.runner, input, workspace),
            FontStrategy::Color(s) => s.generate(self.runner, input, workspace),
        }
    }
}

/// Reads a produced font, rejecting missing or implausibly small files.
pub(crate) fn read_font(path: &Path) -> Result<Vec<u8>> {
    let size = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => return Err(ToolError::MissingOutput(path.to_path_buf()).into()),
    };
    if size < MIN_FONT_BYTES {
        return Err(ToolError::ImplausibleOutput {
            path: path.to_path_buf(),
            size,
        }
        .into());
    }
    Ok(std::fs::read(path)?)
}

/// Executable name inside a tool installation directory.
pub(crate) fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn read_font_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_font(&dir.path().join("nope.ttf")).unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::MissingOutput(_))));
    }

    #[test]
    fn read_font_rejects_tiny_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.ttf");
        std::fs::write(&path, [0u8; 12]).unwrap();
        let err = read_font(&path).unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::ImplausibleOutput { size: 12, .. })
        ));
    }

    #[test]
    fn read_font_accepts_plausible_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.ttf");
        std::fs::write(&path, vec![1u8; MIN_FONT_BYTES as usize]).unwrap();
        assert_eq!(read_font(&path).unwrap().len(), MIN_FONT_BYTES as usize);
    }

    #[test]
    fn strategy_follows_config_mode() {
        let mut config = Config {
            class_name: "MyIcons".into(),
            ..Config::default()
        };
        assert_eq!(FontStrategy::for_config(&config).mode(), FontMode::Monochrome);
        config.mode = FontMode::Color;
        assert_eq!(FontStrategy::for_config(&config).mode(), FontMode::Color);
    }

    #[cfg(unix)]
    #[test]
    fn missing_tool_fails_prerequisite_check() {
        let config = Config {
            class_name: "MyIcons".into(),
            mode: FontMode::Color,
            tools: crate::config::ToolConfig {
                python: "iconforge-no-such-python".into(),
                ..Default::default()
            },
            ..Config::default()
        };
        let strategy = FontStrategy::for_config(&config);
        let runner = config.runner();
        let err = strategy.check_prerequisites(&runner).err().unwrap();
        assert!(
            matches!(&err, Error::Prerequisite { tool, .. } if tool == "iconforge-no-such-python"),
            "{err}"
        );
    }
}
