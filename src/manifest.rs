//! Web app manifest icon listing.
//!
//! Mirrors the `icons` member of the W3C Web Application Manifest format so
//! the generated PNGs can be referenced from a `manifest.json` without
//! hand-editing. Maskable variants are tagged with the `purpose` member.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize, Debug, Clone)]
pub struct Manifest {
    pub icons: Vec<IconEntry>,
}

/// One entry of the manifest `icons` array.
#[derive(Serialize, Debug, Clone)]
pub struct IconEntry {
    /// Path to the icon file, relative to the manifest.
    pub src: String,

    /// Space-separated size list; a single "WxH" token here.
    pub sizes: String,

    /// MIME type of the icon file.
    #[serde(rename = "type")]
    pub mime_type: String,

    /// Icon purpose (e.g. "maskable"); omitted for plain icons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl IconEntry {
    pub fn new(src: String, size: u32) -> Self {
        let purpose = src.contains("maskable").then(|| "maskable".to_string());
        IconEntry {
            sizes: format!("{size}x{size}"),
            mime_type: "image/png".to_string(),
            src,
            purpose,
        }
    }
}

/// Write manifest.json listing the generated PNG icons. ICO outputs are
/// skipped; browsers pick those up from the conventional favicon path.
pub fn write_manifest(out_dir: &Path, written: &[(u32, String)]) -> Result<()> {
    let icons = written
        .iter()
        .filter(|(_, path)| path.ends_with(".png"))
        .map(|(size, path)| IconEntry::new(path.clone(), *size))
        .collect();

    let manifest = Manifest { icons };
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest.json")?;

    std::fs::write(out_dir.join("manifest.json"), manifest_json)
        .context("Failed to write manifest.json file")?;

    println!("  ✓ Generated manifest.json");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maskable_paths_get_a_purpose() {
        let entry = IconEntry::new("icons/Icon-maskable-192.png".to_string(), 192);
        assert_eq!(entry.purpose.as_deref(), Some("maskable"));
        assert_eq!(entry.sizes, "192x192");
        assert_eq!(entry.mime_type, "image/png");
    }

    #[test]
    fn plain_entries_omit_purpose_in_json() {
        let entry = IconEntry::new("favicon-32x32.png".to_string(), 32);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("purpose"));
        assert!(json.contains("\"type\":\"image/png\""));
    }

    #[test]
    fn ico_outputs_are_excluded() {
        let written = vec![
            (16, "favicon.ico".to_string()),
            (32, "favicon-32x32.png".to_string()),
        ];
        let icons: Vec<IconEntry> = written
            .iter()
            .filter(|(_, path)| path.ends_with(".png"))
            .map(|(size, path)| IconEntry::new(path.clone(), *size))
            .collect();
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].src, "favicon-32x32.png");
    }
}
