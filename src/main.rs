//! Command-line front end.
//!
//! Converts a single `.java` file, or every `.java` file under a
//! directory, writing `.cs` output. Exit codes: 0 on success, 1 when any
//! unit fails to convert, 2 for usage or IO problems.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use walkdir::WalkDir;

use sharpkit::{transpile, TranspileError};

/// Convert PaintCode-generated StyleKit Java sources to C#.
#[derive(Debug, Parser)]
#[command(name = "sharpkit", version, about)]
struct Cli {
    /// Java source file, or a directory to convert recursively.
    input: PathBuf,

    /// Output file (single-file mode) or output directory (directory
    /// mode). Defaults to stdout for a file and to `.cs` siblings for a
    /// directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a JSON conversion report to stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    input: PathBuf,
    output: Option<PathBuf>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    converted: usize,
    failed: usize,
    files: Vec<FileReport>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(message) => {
            error!("{message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, String> {
    let mut report = Report {
        converted: 0,
        failed: 0,
        files: Vec::new(),
    };

    if cli.input.is_dir() {
        convert_tree(cli, &mut report)?;
    } else {
        convert_file(cli, &mut report)?;
    }

    if cli.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("cannot serialize report: {err}"))?;
        println!("{rendered}");
    }

    if report.failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn convert_file(cli: &Cli, report: &mut Report) -> Result<(), String> {
    let source = read_source(&cli.input)?;
    match transpile(&source) {
        Ok(converted) => {
            match &cli.output {
                Some(path) => {
                    fs::write(path, &converted)
                        .map_err(|err| format!("cannot write {}: {err}", path.display()))?;
                    info!(output = %path.display(), "converted");
                }
                None => {
                    if !cli.json {
                        print!("{converted}");
                    }
                }
            }
            report.converted += 1;
            report.files.push(FileReport {
                input: cli.input.clone(),
                output: cli.output.clone(),
                status: "ok",
                error: None,
            });
        }
        Err(err) => {
            report_failure(report, &cli.input, &source, err);
        }
    }
    Ok(())
}

fn convert_tree(cli: &Cli, report: &mut Report) -> Result<(), String> {
    for entry in WalkDir::new(&cli.input) {
        let entry = entry.map_err(|err| format!("cannot walk {}: {err}", cli.input.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension() != Some(std::ffi::OsStr::new("java")) {
            continue;
        }
        let target = output_path(cli, path)?;
        let source = read_source(path)?;
        match transpile(&source) {
            Ok(converted) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|err| format!("cannot create {}: {err}", parent.display()))?;
                }
                fs::write(&target, &converted)
                    .map_err(|err| format!("cannot write {}: {err}", target.display()))?;
                info!(input = %path.display(), output = %target.display(), "converted");
                report.converted += 1;
                report.files.push(FileReport {
                    input: path.to_path_buf(),
                    output: Some(target),
                    status: "ok",
                    error: None,
                });
            }
            Err(err) => {
                report_failure(report, path, &source, err);
            }
        }
    }
    Ok(())
}

/// Mirror the input tree under `--output` when given, otherwise place the
/// `.cs` file next to its source.
fn output_path(cli: &Cli, input: &Path) -> Result<PathBuf, String> {
    let with_cs = input.with_extension("cs");
    match &cli.output {
        None => Ok(with_cs),
        Some(out_dir) => {
            let relative = with_cs
                .strip_prefix(&cli.input)
                .map_err(|err| format!("cannot relativize {}: {err}", with_cs.display()))?;
            Ok(out_dir.join(relative))
        }
    }
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("cannot read {}: {err}", path.display()))
}

fn report_failure(report: &mut Report, path: &Path, source: &str, err: TranspileError) {
    let label = path.display().to_string();
    let message = match &err {
        TranspileError::Parse(parse_err) => {
            sharpkit_java_cst::prettify_error(source, parse_err, &label)
        }
        other => other.to_string(),
    };
    error!(input = %label, "conversion failed:\n{message}");
    report.failed += 1;
    report.files.push(FileReport {
        input: path.to_path_buf(),
        output: None,
        status: "error",
        error: Some(err.to_string()),
    });
}
