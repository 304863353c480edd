use iconforge::{GenerationReport, ToolVersion};

/// Warnings only unless `verbose`; `RUST_LOG` overrides either way.
pub fn init_logger(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

pub fn print_report(report: &GenerationReport) {
    println!(
        "Generated {} icons -> {}",
        report.glyph_count,
        report.font_path.display()
    );
    println!("Dart source -> {}", report.source_path.display());
    if !report.skipped.is_empty() {
        println!("Skipped {} files:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {} ({})", skipped.path.display(), skipped.reason);
        }
    }
}

pub fn print_versions(versions: &[ToolVersion]) {
    for v in versions {
        println!("{:<12} {}", v.tool, v.version);
    }
}

/// One line by default, one line per cause with `verbose`.
pub fn print_error(err: &anyhow::Error, verbose: bool) {
    if verbose {
        eprintln!("error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    } else {
        eprintln!("error: {err:#}");
    }
}
