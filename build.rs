//! Build script for ytplaylist.
//!
//! Copies the `.env.example` configuration template into the user's local data
//! directory so the expected `.env` location ships with a ready example.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to the local data directory.
///
/// Destination by platform:
/// - Linux: `~/.local/share/ytplaylist/.env.example`
/// - macOS: `~/Library/Application Support/ytplaylist/.env.example`
/// - Windows: `%LOCALAPPDATA%/ytplaylist/.env.example`
///
/// A missing template only emits a cargo warning. Failing to create the
/// directory or write the file fails the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("ytplaylist");
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
