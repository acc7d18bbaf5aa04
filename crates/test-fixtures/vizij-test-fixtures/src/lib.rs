//! Manifest-driven access to the shared files under `fixtures/`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    clips: HashMap<String, ClipEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClipEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        expect: Option<ClipExpectations>,
    },
}

impl ClipEntry {
    fn as_path(&self) -> &str {
        match self {
            ClipEntry::Path(path) => path,
            ClipEntry::Detailed { path, .. } => path,
        }
    }
}

/// Shape a fixture clip is known to have once parsed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClipExpectations {
    pub joints: usize,
    pub channels: usize,
    pub frames: usize,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod clips {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.clips.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// BVH text of a clip
    pub fn text(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        read_to_string(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        Ok(resolve_path(entry.as_path()))
    }

    /// Recorded shape of a clip, if the manifest carries one
    pub fn expectations(name: &str) -> Result<Option<ClipExpectations>> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        Ok(match entry {
            ClipEntry::Path(_) => None,
            ClipEntry::Detailed { expect, .. } => expect.clone(),
        })
    }
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.configs.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        super::load_json(rel)
    }
}
