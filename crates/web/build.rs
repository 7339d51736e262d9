//! Build script for the web crate.
//!
//! Exposes `CSS_HASH`, a short digest of `static/css/main.css`, so the
//! stylesheet link changes whenever the file does.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const HASH_LEN: usize = 8;

fn main() {
    let css = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default())
        .join("static")
        .join("css")
        .join("main.css");
    println!("cargo:rerun-if-changed={}", css.display());

    let hash = match std::fs::read(&css) {
        Ok(bytes) => short_digest(&bytes),
        Err(e) => {
            println!("cargo:warning=stylesheet not hashed ({e}); using \"dev\"");
            "dev".to_string()
        }
    };
    println!("cargo:rustc-env=CSS_HASH={hash}");
}

fn short_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}
