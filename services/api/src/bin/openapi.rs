//! services/api/src/bin/openapi.rs
//!
//! Dumps the course assistant's OpenAPI document.
//!
//! Usage: `openapi [OUTPUT_PATH]` (defaults to `openapi.json`).

use api_lib::{error::ApiError, web::rest::openapi_json};
use std::path::PathBuf;

fn main() -> Result<(), ApiError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let document = openapi_json()
        .map_err(|e| ApiError::Internal(format!("Could not render the API document: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, document)?;
    println!("Wrote the course assistant API description to {}", path.display());
    Ok(())
}
