//! Installs the configuration template next to the data sporlhist keeps at
//! runtime.
//!
//! `.env.example` from the crate root is copied to
//! `<local data dir>/sporlhist/.env.example`, the directory whose `.env` is
//! read by `config::load_env`. Rename it to `.env` and fill in the client
//! credentials of your Spotify app.
//!
//! An existing `.env` is never touched. A missing template only produces a
//! cargo warning.

use std::{env, fs, path::PathBuf};

const TEMPLATE: &str = ".env.example";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={}", TEMPLATE);

    let template = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join(TEMPLATE);
    if !template.is_file() {
        println!("cargo:warning={} not found at {}", TEMPLATE, template.display());
        return Ok(());
    }

    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sporlhist");
    fs::create_dir_all(&data_dir)?;
    fs::copy(&template, data_dir.join(TEMPLATE))?;

    Ok(())
}
