//! Command-line interface for callscan.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use walkdir::WalkDir;

use crate::analysis::{walker, CompilationContext, IndexResolver};
use crate::config::AnalyzerConfig;
use crate::fault::{self, Breadcrumbs, FaultLog};
use crate::references::ReferenceSet;
use crate::report::ReportWriter;
use crate::syntax;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;

/// Token switching to single-file mode; accepted in any argument position,
/// case-insensitively.
pub const SINGLE_SOURCE_FLAG: &str = "/singlesource";

/// Batch call-site report generator for C# sources.
///
/// Walks every class declaration (nested classes included) of the given
/// sources, reports each constructor and method with an approximate
/// logical line count, and classifies every outward method call as
/// "Specified" (resolved) or "Non-specified" (inferred from syntax).
#[derive(Parser)]
#[command(name = "callscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// <sourcePath> <binDirectoryPath>, plus the optional /singlesource
    /// token in any position.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Split raw arguments into the mode flag and the positional paths.
fn split_invocation(args: &[String]) -> (bool, Vec<&String>) {
    let single_source = args
        .iter()
        .any(|a| a.eq_ignore_ascii_case(SINGLE_SOURCE_FLAG));
    let positional = args
        .iter()
        .filter(|a| !a.eq_ignore_ascii_case(SINGLE_SOURCE_FLAG))
        .collect();
    (single_source, positional)
}

/// Run the tool. Usage and path-validation problems exit here without any
/// analysis; everything after validation runs under the fatal boundary.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    syntax::init();
    write_preamble(&cli.args);

    let (single_source, positional) = split_invocation(&cli.args);
    if positional.len() < 2 {
        eprintln!("usage: callscan <sourceDirectoryPath> <binDirectoryPath>");
        eprintln!(
            "usage: callscan <sourceFilePath> <binDirectoryPath> {}",
            SINGLE_SOURCE_FLAG
        );
        return Ok(EXIT_SUCCESS);
    }

    let source_path = PathBuf::from(positional[0]);
    let bin_path = PathBuf::from(positional[1]);

    if !single_source && !source_path.is_dir() {
        eprintln!(
            "Error: source directory not found ({})",
            source_path.display()
        );
        return Ok(EXIT_FATAL);
    }
    if single_source && !source_path.is_file() {
        eprintln!("Error: source file not found ({})", source_path.display());
        return Ok(EXIT_FATAL);
    }
    if !bin_path.is_dir() {
        eprintln!("Error: bin directory not found ({})", bin_path.display());
        return Ok(EXIT_FATAL);
    }

    let faults = FaultLog::beside_executable();
    match run_analysis(&source_path, &bin_path, single_source, &faults) {
        Ok(()) => Ok(EXIT_SUCCESS),
        Err(error) => {
            faults.record(&Breadcrumbs::default(), &error);
            Ok(EXIT_FATAL)
        }
    }
}

/// Execution stamp and argument echo, ahead of the report proper.
fn write_preamble(args: &[String]) {
    println!(
        "ExecutionDateTime: {}",
        Local::now().format("%Y/%m/%d %H:%M:%S")
    );
    println!("[parameters]");
    for (i, arg) in args.iter().enumerate() {
        println!("p{}: {}", i, arg);
    }
    println!();
}

fn run_analysis(
    source_path: &Path,
    bin_path: &Path,
    single_source: bool,
    faults: &FaultLog,
) -> anyhow::Result<()> {
    let config = AnalyzerConfig::discover().context("failed to load configuration")?;
    let references = ReferenceSet::load(bin_path, &config.reference_dirs)
        .context("failed to load reference metadata")?;

    let files = if single_source {
        vec![source_path.to_path_buf()]
    } else {
        collect_files(source_path, &config)?
    };

    // Every unit is parsed before any is analyzed; the shared context must
    // contain the whole batch for cross-file resolution.
    let provider = syntax::for_extension(".cs")
        .ok_or_else(|| anyhow::anyhow!("no syntax provider registered for .cs files"))?;
    let mut units = Vec::with_capacity(files.len());
    for path in &files {
        let source = fs::read(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        units.push(provider.parse(path, &source)?);
    }

    let ctx = CompilationContext::build(units, references);
    let resolver = IndexResolver::new(&ctx);

    let mut writer = ReportWriter::new(io::stdout().lock());
    for unit in ctx.units() {
        let crumbs = Breadcrumbs::for_file(unit.path.clone());
        let _ = fault::guard(faults, &crumbs, || {
            walker::analyze_unit(unit, &resolver, &config, &mut writer, faults, &crumbs)
                .map(|_records| ())
        });
    }
    writer.run_trailer()?;
    Ok(())
}

/// Recursively collect `.cs` files under the source directory, excluding
/// paths the configuration filters out. Sorted for deterministic order.
fn collect_files(root: &Path, config: &AnalyzerConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("cs"))
            .unwrap_or(false);
        if !is_source || config.is_path_excluded(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}
