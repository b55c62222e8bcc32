//! Content types for files the dev server hands to the browser.
//!
//! Covers the page shell, its scripts and source maps, and the media a
//! canvas game typically loads at runtime. Anything else is served as bytes.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const WASM: &str = "application/wasm";
    pub const OCTET_STREAM: &str = "application/octet-stream";

    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    pub const MP3: &str = "audio/mpeg";
    pub const WAV: &str = "audio/wav";
    pub const OGG: &str = "audio/ogg";

    pub const WOFF2: &str = "font/woff2";
}

/// Content type for `path`, keyed on its extension (case-insensitive).
pub fn from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(types::OCTET_STREAM, |ext| {
            from_extension(&ext.to_ascii_lowercase())
        })
}

fn from_extension(ext: &str) -> &'static str {
    use types::*;

    match ext {
        "html" | "htm" => HTML,
        "js" | "mjs" | "cjs" => JAVASCRIPT,
        // devtools fetch source maps as JSON
        "json" | "map" => JSON,
        "css" => CSS,
        "txt" => PLAIN,
        "wasm" => WASM,
        "png" => PNG,
        "jpg" | "jpeg" => JPEG,
        "svg" => SVG,
        "ico" => ICO,
        "mp3" => MP3,
        "wav" => WAV,
        "ogg" | "oga" => OGG,
        "woff2" => WOFF2,
        _ => OCTET_STREAM,
    }
}
