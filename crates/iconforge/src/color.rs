//! Multi color icon fonts via nanoemoji.
//!
//! nanoemoji and its build system (ninja) are installed into a Python virtual
//! environment inside the workspace. nanoemoji reads code points from file
//! names, so every icon is copied under a name encoding its assigned code
//! point. The glyph map returned is that assignment; the produced font is not
//! inspected for it.
use crate::{
    config::ToolConfig,
    error::{InputError, Result, ToolError},
    glyph::{FontArtifact, GlyphMap, PUA_END, PUA_START},
    input::{IconSource, PreparedInput},
    process::{Invocation, ProcessRunner},
    strategy::{executable, read_font, ToolVersion},
    workspace::Workspace,
};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const PYTHON_GUIDANCE: &str = "install Python 3 with the venv module (https://www.python.org)";

// Fixed metrics so fonts render identically across platforms.
pub const UPEM: u32 = 1024;
pub const ASCENDER: i32 = 896;
pub const DESCENDER: i32 = -128;
pub const ADVANCE_WIDTH: u32 = 1024;
/// COLRv0 with glyf outlines: vector only, and the widest platform support.
pub const COLOR_FORMAT: &str = "glyf_colr_0";
/// nanoemoji needs ninja on its search path.
const BUILD_SYSTEM: &str = "ninja";

pub struct ColorStrategy {
    python: String,
    package: String,
    family: String,
    font_name: String,
}

impl ColorStrategy {
    pub fn new(tools: &ToolConfig, family: String, font_name: String) -> Self {
        Self {
            python: tools.python.clone(),
            package: tools.nanoemoji.clone(),
            family,
            font_name,
        }
    }

    pub(crate) fn check(&self, runner: &ProcessRunner) -> Result<Vec<ToolVersion>> {
        let version = runner.probe(&self.python, PYTHON_GUIDANCE)?;
        Ok(vec![ToolVersion {
            tool: self.python.clone(),
            version,
        }])
    }

    pub(crate) fn generate(
        &self,
        runner: &ProcessRunner,
        input: &PreparedInput,
        workspace: &Workspace,
    ) -> Result<FontArtifact> {
        let bin = self.install(runner, workspace)?;

        let glyph_map = assign_code_points(&input.files)?;
        let glyph_dir = workspace.subdir("glyphs")?;
        let mut glyph_files = Vec::with_capacity(glyph_map.len());
        for glyph in &glyph_map {
            let source = input.name_map.get(&glyph.name).ok_or_else(|| {
                ToolError::InvalidGlyphMap(format!("no source file for `{}`", glyph.name))
            })?;
            let target = glyph_dir.join(glyph_file_name(glyph.code_point));
            fs::copy(source, &target)?;
            glyph_files.push(target);
        }

        let build_dir = workspace.subdir("build")?;
        let output_file = format!("{}.ttf", self.font_name);
        info!("running nanoemoji");
        runner.execute(
            &Invocation::new(bin.join(executable("nanoemoji")))
                .args(self.tool_args(&build_dir, &output_file))
                .args(&glyph_files)
                .prepend_path(&bin)
                .current_dir(workspace.path()),
        )?;

        let font = read_font(&build_dir.join(&output_file))?;
        Ok(FontArtifact { font, glyph_map })
    }

    /// Creates the virtual environment and returns its executable directory.
    fn install(&self, runner: &ProcessRunner, workspace: &Workspace) -> Result<PathBuf> {
        let venv = workspace.join("venv");
        info!("creating virtual environment");
        runner.execute(
            &Invocation::new(&self.python)
                .args(["-m", "venv"])
                .arg(&venv)
                .current_dir(workspace.path()),
        )?;

        let bin = venv_bin(&venv);
        info!("installing {} and {BUILD_SYSTEM} into virtual environment", self.package);
        runner.execute(
            &Invocation::new(bin.join(executable("python")))
                .args(["-m", "pip", "install", "--disable-pip-version-check"])
                .args([self.package.as_str(), BUILD_SYSTEM])
                .current_dir(workspace.path()),
        )?;
        Ok(bin)
    }

    // `--flag=value` keeps the negative descender from being read as a flag.
    fn tool_args(&self, build_dir: &Path, output_file: &str) -> Vec<String> {
        vec![
            format!("--family={}", self.family),
            format!("--upem={UPEM}"),
            format!("--ascender={ASCENDER}"),
            format!("--descender={DESCENDER}"),
            format!("--width={ADVANCE_WIDTH}"),
            format!("--color_format={COLOR_FORMAT}"),
            format!("--build_dir={}", build_dir.display()),
            format!("--output_file={output_file}"),
        ]
    }
}

/// Assigns private use code points from [`PUA_START`] upwards in canonical
/// name order. The same input set always yields the same map.
pub fn assign_code_points(files: &[IconSource]) -> Result<GlyphMap> {
    let capacity = (PUA_END - PUA_START + 1) as usize;
    if files.len() > capacity {
        return Err(InputError::TooManyIcons(files.len()).into());
    }

    let mut sorted: Vec<&IconSource> = files.iter().collect();
    sorted.sort_by(|a, b| a.canonical_name.cmp(&b.canonical_name));

    let mut glyph_map = GlyphMap::new();
    let mut code_point = PUA_START;
    for (i, file) in sorted.iter().enumerate() {
        if !glyph_map.insert(file.canonical_name.clone(), code_point) {
            return Err(InputError::DuplicateName {
                name: file.canonical_name.clone(),
                first: sorted[i - 1].relative_path.clone(),
                second: file.relative_path.clone(),
            }
            .into());
        }
        code_point += 1;
    }
    Ok(glyph_map)
}

/// File name nanoemoji decodes back into `code_point`.
pub fn glyph_file_name(code_point: u32) -> String {
    format!("emoji_u{code_point:04x}.svg")
}

fn venv_bin(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts")
    } else {
        venv.join("bin")
    }
}
