//! End to end generation: input scan, font build, source emission, delivery.
use crate::{
    config::Config,
    emit::{emit, EmitRequest},
    error::{Error, Result},
    glyph::FontArtifact,
    input::{self, SkippedFile},
    strategy::{FontStrategy, ToolVersion},
    workspace::Workspace,
};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub font_path: PathBuf,
    pub source_path: PathBuf,
    pub glyph_count: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Runs a full generation for `config`.
///
/// Usage and input problems are reported before anything is written. The
/// scratch workspace is removed on every path out of this function unless
/// `config.keep_workspace` is set.
pub fn generate(config: &Config) -> Result<GenerationReport> {
    config.validate()?;
    let input = input::prepare(&config.input_dir)?;
    info!(
        "found {} icons in {} ({} skipped)",
        input.files.len(),
        config.input_dir.display(),
        input.skipped.len()
    );

    let runner = config.runner();
    let strategy = FontStrategy::for_config(config);
    let ready = strategy.check_prerequisites(&runner)?;

    let artifact = {
        let workspace =
            Workspace::create(config.workspace_root.as_deref(), config.keep_workspace)?;
        ready.generate(&input, &workspace)?
    };

    let source_paths = input.relative_paths();
    let source = emit(&EmitRequest {
        class_name: &config.class_name,
        package: config.package.as_deref(),
        glyph_map: &artifact.glyph_map,
        source_paths: &source_paths,
        include_aggregate: config.aggregate,
    })?;

    let (font_path, source_path) = deliver(config, &artifact, &source)?;
    Ok(GenerationReport {
        font_path,
        source_path,
        glyph_count: artifact.glyph_map.len(),
        skipped: input.skipped,
    })
}

/// Verifies the external toolchain for the configured mode without building.
pub fn check(config: &Config) -> Result<Vec<ToolVersion>> {
    let runner = config.runner();
    let strategy = FontStrategy::for_config(config);
    let ready = strategy.check_prerequisites(&runner)?;
    Ok(ready.versions().to_vec())
}

/// Writes the font and the generated source to their output directories.
///
/// Either both files are delivered or neither: a font written before a failed
/// source write is removed again.
pub fn deliver(
    config: &Config,
    artifact: &FontArtifact,
    source: &str,
) -> Result<(PathBuf, PathBuf)> {
    let font_path = config.font_out_dir.join(config.font_file_name());
    let source_path = config.source_out_dir.join(config.source_file_name());
    write_artifact(&font_path, &artifact.font)?;
    if let Err(err) = write_artifact(&source_path, source.as_bytes()) {
        if let Err(e) = fs::remove_file(&font_path) {
            warn!("failed to remove {}: {e}", font_path.display());
        }
        return Err(err);
    }
    info!("wrote {}", font_path.display());
    info!("wrote {}", source_path.display());
    Ok((font_path, source_path))
}

fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    let delivery = |source| Error::Delivery {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(delivery)?;
    }
    fs::write(path, contents).map_err(delivery)
}
