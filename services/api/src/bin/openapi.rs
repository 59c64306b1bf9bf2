//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 specification for the REST API to disk, so the
//! frontend can regenerate its client without a running server.
//!
//! Usage: `cargo run --bin openapi [output-path]` (default `openapi.json`).

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    let spec = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, spec)?;
    println!("OpenAPI specification written to {}", path);
    Ok(())
}
