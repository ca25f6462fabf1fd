//! Checksum utility for Churnguard pipeline artifacts.
//!
//! Validates a pipeline JSON file and writes its SHA-256 digest to
//! `<artifact>.sha256`, which the application checks at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin checksum_model -- <artifact.json> [--check]
//! ```
//!
//! With `--check` the existing checksum file is verified instead of written.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use churnguard::adapters::pipeline::{checksum_path, sha256_hex, TreePipeline};
use churnguard::ports::Predictor;
use churnguard::ChurnError;

fn usage() -> &'static str {
    "Usage: checksum_model <artifact.json> [--check]"
}

fn run(artifact: PathBuf, check: bool) -> churnguard::Result<()> {
    let bytes = fs::read(&artifact)?;
    let sidecar = checksum_path(&artifact);

    if check {
        // `load` enforces the checksum when the sidecar exists.
        if !sidecar.exists() {
            return Err(ChurnError::ModelLoad(format!("No checksum file at {sidecar:?}")));
        }
        let pipeline = TreePipeline::load(&artifact)?;
        println!("OK {} ({})", artifact.display(), pipeline.model_family());
        return Ok(());
    }

    // Refuse to bless an artifact the application could not load.
    let pipeline = TreePipeline::from_slice(&bytes)?;

    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let digest = sha256_hex(&bytes);
    fs::write(&sidecar, format!("{digest}  {file_name}\n"))?;

    println!(
        "Wrote {} for {} pipeline ({digest})",
        sidecar.display(),
        pipeline.model_family()
    );
    Ok(())
}

fn main() -> ExitCode {
    let mut artifact: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => {
                println!("{}", usage());
                return ExitCode::SUCCESS;
            }
            _ if artifact.is_none() => artifact = Some(PathBuf::from(&arg)),
            _ => {
                eprintln!("{}", usage());
                return ExitCode::from(2);
            }
        }
    }

    let Some(artifact) = artifact else {
        eprintln!("{}", usage());
        return ExitCode::from(2);
    };

    match run(artifact, check) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
