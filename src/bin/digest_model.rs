//! Model digest utility.
//!
//! Validates a classifier artifact against the serving feature schema and
//! writes the `<artifact>.sha256` sidecar checked at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin digest_model -- <model.json> [--check]
//! ```
//!
//! With `--check` the existing sidecar is verified instead of written.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use readmit::adapters::model::{digest_sidecar_path, sha256_hex, JsonClassifier};
use readmit::domain::FeatureSchema;

fn parse_args() -> Result<(PathBuf, bool)> {
    let mut path: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => {
                println!("Usage: digest_model <model.json> [--check]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("Unknown argument: {other}"),
            other => {
                if path.replace(PathBuf::from(other)).is_some() {
                    bail!("Only one model path may be given");
                }
            }
        }
    }

    let path = path.context("Missing model path (usage: digest_model <model.json> [--check])")?;
    Ok((path, check))
}

fn main() -> Result<()> {
    let (model_path, check) = parse_args()?;

    let bytes = fs::read(&model_path)
        .with_context(|| format!("Failed to read {}", model_path.display()))?;

    // Refuse to bless an artifact the service would reject anyway.
    let schema = FeatureSchema::readmission_v1();
    JsonClassifier::from_bytes(&bytes, &schema)
        .with_context(|| format!("{} is not a valid model artifact", model_path.display()))?;

    let digest = sha256_hex(&bytes);
    let sidecar = digest_sidecar_path(&model_path);

    if check {
        let content = fs::read_to_string(&sidecar)
            .with_context(|| format!("Failed to read {}", sidecar.display()))?;
        let expected = content.split_whitespace().next().unwrap_or_default();
        if !expected.eq_ignore_ascii_case(&digest) {
            bail!("Digest mismatch: sidecar {expected}, artifact {digest}");
        }
        println!("OK {digest}");
        return Ok(());
    }

    let file_name = model_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Model path has no file name")?;
    fs::write(&sidecar, format!("{digest}  {file_name}\n"))
        .with_context(|| format!("Failed to write {}", sidecar.display()))?;

    println!("Wrote digest: {}", sidecar.display());
    println!("SHA256={digest}");
    Ok(())
}
