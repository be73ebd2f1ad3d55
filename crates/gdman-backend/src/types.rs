use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// A release record as returned by the release API, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelease {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<RawAsset>,
}

impl RawRelease {
    /// The release name, falling back to the tag for unnamed releases.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseSource {
    #[default]
    Github,
    Mirror,
}

impl fmt::Display for ReleaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseSource::Github => write!(f, "GitHub"),
            ReleaseSource::Mirror => write!(f, "Mirror"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineAsset {
    pub name: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVersion {
    pub name: String,
    pub tag: String,
    pub source: ReleaseSource,
    pub published_at: Option<DateTime<Utc>>,
    pub standard: Option<EngineAsset>,
    pub mono: Option<EngineAsset>,
}

impl RemoteVersion {
    pub fn asset(&self, mono: bool) -> Option<&EngineAsset> {
        if mono {
            self.mono.as_ref()
        } else {
            self.standard.as_ref()
        }
    }

    pub fn display_name(&self, mono: bool) -> String {
        display_name(&self.name, mono)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledVersion {
    pub id: Uuid,
    pub tag: String,
    pub location: PathBuf,
    pub cache_location: PathBuf,
    pub is_mono: bool,
    #[serde(default)]
    pub remote: Option<RemoteVersion>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
}

impl InstalledVersion {
    pub fn display_name(&self) -> String {
        display_name(&self.tag, self.is_mono)
    }

    /// True for builds the user registered by path rather than downloaded.
    pub fn is_local_reference(&self) -> bool {
        self.remote.is_none()
    }

    pub fn source_is_location(&self) -> bool {
        PathBuf::from(&self.source) == self.location
    }
}

fn display_name(tag: &str, mono: bool) -> String {
    if mono {
        format!("{} (mono)", tag)
    } else {
        tag.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReference {
    pub id: Uuid,
    pub name: String,
    pub location: PathBuf,
    #[serde(default)]
    pub engine: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallPromptKind {
    RemoveReference,
    Uninstall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UninstallPrompt {
    pub kind: UninstallPromptKind,
    pub title: String,
    pub message: String,
}

impl UninstallPrompt {
    pub fn for_version(version: &InstalledVersion) -> Self {
        let title = "Remove Godot Install".to_string();
        if version.source_is_location() {
            Self {
                kind: UninstallPromptKind::RemoveReference,
                title,
                message: format!(
                    "You are about to remove the reference to {}, are you sure you want to continue?",
                    version.tag
                ),
            }
        } else {
            Self {
                kind: UninstallPromptKind::Uninstall,
                title,
                message: format!(
                    "You are about to uninstall {}, are you sure you want to continue?",
                    version.tag
                ),
            }
        }
    }
}
