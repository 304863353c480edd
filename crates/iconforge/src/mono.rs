//! Monochrome icon fonts via fantasticon.
//!
//! fantasticon is installed into the run's workspace with npm (never
//! globally) and driven through a JSON config file. It assigns code points
//! itself and reports them in a JSON asset next to the font.
use crate::{
    config::ToolConfig,
    error::{Result, ToolError},
    glyph::{FontArtifact, GlyphMap},
    input::PreparedInput,
    process::{Invocation, ProcessRunner},
    strategy::{read_font, ToolVersion},
    workspace::Workspace,
};
use log::info;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const NODE_GUIDANCE: &str = "install Node.js (https://nodejs.org), it ships with npm";

pub struct MonochromeStrategy {
    node: String,
    npm: String,
    package: String,
    font_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FantasticonConfig<'a> {
    name: &'a str,
    input_dir: &'a Path,
    output_dir: &'a Path,
    font_types: [&'static str; 1],
    asset_types: [&'static str; 1],
    format_options: FormatOptions,
    normalize: bool,
}

#[derive(Serialize)]
struct FormatOptions {
    json: JsonAssetOptions,
}

#[derive(Serialize)]
struct JsonAssetOptions {
    indent: u8,
}

impl MonochromeStrategy {
    pub fn new(tools: &ToolConfig, font_name: String) -> Self {
        Self {
            node: tools.node.clone(),
            npm: tools.npm.clone(),
            package: tools.fantasticon.clone(),
            font_name,
        }
    }

    pub(crate) fn check(&self, runner: &ProcessRunner) -> Result<Vec<ToolVersion>> {
        let mut versions = Vec::new();
        for tool in [&self.node, &self.npm] {
            let version = runner.probe(tool, NODE_GUIDANCE)?;
            versions.push(ToolVersion {
                tool: tool.clone(),
                version,
            });
        }
        Ok(versions)
    }

    pub(crate) fn generate(
        &self,
        runner: &ProcessRunner,
        input: &PreparedInput,
        workspace: &Workspace,
    ) -> Result<FontArtifact> {
        self.install(runner, workspace)?;

        let icons_dir = workspace.subdir("icons")?;
        for file in &input.files {
            fs::copy(
                &file.original_path,
                icons_dir.join(format!("{}.svg", file.canonical_name)),
            )?;
        }

        let out_dir = workspace.subdir("out")?;
        let config_path = workspace.join("fantasticon.json");
        let config = FantasticonConfig {
            name: &self.font_name,
            input_dir: &icons_dir,
            output_dir: &out_dir,
            font_types: ["ttf"],
            asset_types: ["json"],
            format_options: FormatOptions {
                json: JsonAssetOptions { indent: 2 },
            },
            normalize: true,
        };
        fs::write(&config_path, serde_json::to_vec_pretty(&config)?)?;

        info!("running fantasticon");
        runner.execute(
            &Invocation::new(self.bin(workspace))
                .arg("--config")
                .arg(&config_path)
                .current_dir(workspace.path()),
        )?;

        // Exit code 0 alone proves nothing, both outputs have to exist.
        let font_path = out_dir.join(format!("{}.ttf", self.font_name));
        let map_path = out_dir.join(format!("{}.json", self.font_name));
        if !map_path.is_file() {
            return Err(ToolError::MissingOutput(map_path).into());
        }
        let font = read_font(&font_path)?;
        let codepoints = parse_codepoints(&fs::read_to_string(&map_path)?)?;
        let glyph_map = glyph_map_for(input.names(), &codepoints)?;
        Ok(FontArtifact { font, glyph_map })
    }

    fn install(&self, runner: &ProcessRunner, workspace: &Workspace) -> Result<()> {
        // A local manifest keeps npm from walking up into an enclosing project.
        fs::write(
            workspace.join("package.json"),
            br#"{ "name": "iconforge-workspace", "private": true }"#,
        )?;
        info!("installing {} into workspace", self.package);
        runner.execute(
            &Invocation::new(&self.npm)
                .arg("install")
                .arg("--prefix")
                .arg(workspace.path())
                .args(["--no-save", "--no-audit", "--no-fund"])
                .arg(&self.package)
                .current_dir(workspace.path()),
        )?;
        Ok(())
    }

    fn bin(&self, workspace: &Workspace) -> PathBuf {
        let name = if cfg!(windows) {
            "fantasticon.cmd"
        } else {
            "fantasticon"
        };
        workspace.join(Path::new("node_modules").join(".bin").join(name))
    }
}

fn parse_codepoints(json: &str) -> Result<BTreeMap<String, u32>> {
    serde_json::from_str(json).map_err(|e| ToolError::InvalidGlyphMap(e.to_string()).into())
}

/// Checks the tool's map against the expected names and orders it by code point.
pub(crate) fn glyph_map_for<'a>(
    expected: impl IntoIterator<Item = &'a str>,
    codepoints: &BTreeMap<String, u32>,
) -> Result<GlyphMap> {
    let expected: BTreeSet<&str> = expected.into_iter().collect();
    let found: BTreeSet<&str> = codepoints.keys().map(String::as_str).collect();
    if expected != found {
        return Err(ToolError::GlyphMapMismatch {
            missing: expected.difference(&found).map(|s| s.to_string()).collect(),
            unexpected: found.difference(&expected).map(|s| s.to_string()).collect(),
        }
        .into());
    }

    let mut ordered: Vec<(&String, u32)> = codepoints.iter().map(|(n, c)| (n, *c)).collect();
    ordered.sort_by_key(|&(name, cp)| (cp, name));
    let mut glyph_map = GlyphMap::new();
    for pair in ordered.windows(2) {
        if pair[0].1 == pair[1].1 {
            return Err(ToolError::InvalidGlyphMap(format!(
                "`{}` and `{}` share code point {:#x}",
                pair[0].0, pair[1].0, pair[0].1
            ))
            .into());
        }
    }
    for (name, cp) in ordered {
        glyph_map.insert(name.clone(), cp);
    }
    Ok(glyph_map)
}
