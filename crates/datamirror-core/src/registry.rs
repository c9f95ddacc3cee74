//! Dataset descriptors and the name → descriptor registry.
//!
//! Every dataset runs through the same pipeline; they differ only in data.
//! Built-ins are a static table. Extra descriptors may come from config.

use crate::error::{MirrorError, MirrorResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Component, Path};

/// Where to fetch one dataset and what its extraction should look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: Cow<'static, str>,
    pub source_url: Cow<'static, str>,
    /// Hex-encoded SHA-256 of the archive.
    pub expected_checksum: Cow<'static, str>,
    /// Directory (relative to the download root) the archive must produce.
    pub byproduct_relative_path: Cow<'static, str>,
    /// Incidental path (relative to the download root) removed after extraction.
    #[serde(default)]
    pub cleanup_relative_path: Option<Cow<'static, str>>,
}

const SHA256_HEX_LEN: usize = 64;

impl DatasetDescriptor {
    /// Checks the digest shape and that both relative paths stay inside the
    /// download root. A digest of the wrong length is reported, never trimmed.
    pub fn validate(&self) -> MirrorResult<()> {
        let invalid = |field, reason| MirrorError::InvalidDescriptor {
            name: self.name.to_string(),
            field,
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("name", "is empty"));
        }
        let checksum = self.expected_checksum.trim();
        if checksum.len() != SHA256_HEX_LEN {
            return Err(invalid("expected_checksum", "must be 64 hex characters"));
        }
        if !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("expected_checksum", "must be hex"));
        }
        if !is_contained_relative(&self.byproduct_relative_path) {
            return Err(invalid(
                "byproduct_relative_path",
                "must be a non-empty relative path without '..'",
            ));
        }
        if let Some(cleanup) = &self.cleanup_relative_path {
            if !is_contained_relative(cleanup) {
                return Err(invalid(
                    "cleanup_relative_path",
                    "must be a non-empty relative path without '..'",
                ));
            }
            if Path::new(&*self.byproduct_relative_path).starts_with(&**cleanup) {
                return Err(invalid("cleanup_relative_path", "must not contain the byproduct"));
            }
        }
        Ok(())
    }
}

fn is_contained_relative(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Built-in datasets.
pub static DATASETS: &[DatasetDescriptor] = &[
    DatasetDescriptor {
        name: Cow::Borrowed("nerf_synthetic"),
        source_url: Cow::Borrowed(
            "https://github.com/yxlao/nerfmirror/releases/download/20220618/nerf_synthetic.zip",
        ),
        expected_checksum: Cow::Borrowed(
            "f01fd1b4ab045b0d453917346f26f898657bb5bec4834b95fdad1f361826e45e",
        ),
        byproduct_relative_path: Cow::Borrowed("nerf_synthetic"),
        cleanup_relative_path: Some(Cow::Borrowed("__MACOSX")),
    },
    DatasetDescriptor {
        name: Cow::Borrowed("nerf_llff"),
        source_url: Cow::Borrowed(
            "https://github.com/yxlao/nerfmirror/releases/download/20220618/nerf_llff_data.zip",
        ),
        expected_checksum: Cow::Borrowed(
            "5794b432feaf4f25bcd603addc6ad0270cec588fed6a364b7952001f07466635",
        ),
        byproduct_relative_path: Cow::Borrowed("nerf_llff_data"),
        cleanup_relative_path: None,
    },
];

/// Built-in descriptor by name.
pub fn lookup(name: &str) -> Option<&'static DatasetDescriptor> {
    DATASETS.iter().find(|d| d.name == name)
}

/// Built-in dataset names, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = DATASETS.iter().map(|d| &*d.name).collect();
    names.sort_unstable();
    names
}

/// Built-ins plus descriptors declared in config.
#[derive(Debug, Clone)]
pub struct Registry {
    datasets: Vec<DatasetDescriptor>,
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            datasets: DATASETS.to_vec(),
        }
    }

    /// Adds `extra` to the built-ins. Each must validate and use a fresh name.
    pub fn with_extra(extra: &[DatasetDescriptor]) -> MirrorResult<Self> {
        let mut registry = Self::builtin();
        for descriptor in extra {
            descriptor.validate()?;
            if registry.get(&descriptor.name).is_some() {
                return Err(MirrorError::InvalidDescriptor {
                    name: descriptor.name.to_string(),
                    field: "name",
                    reason: "is already registered",
                });
            }
            registry.datasets.push(descriptor.clone());
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&DatasetDescriptor> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.iter().map(|d| &*d.name).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        let mut sorted: Vec<&DatasetDescriptor> = self.datasets.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted.into_iter()
    }
}
