//! Font registry.
//!
//! Registration is two-phase: [`FontRegistry::begin`] sniffs the bytes and
//! records a pending load, the host decodes the face asynchronously, then
//! [`FontRegistry::finish`] makes the family available in one step. A
//! failed or pending load never disturbs the scene; text keeps rendering
//! with the fallback font.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tk_core::error::EditError;

/// Families every host is assumed to provide.
pub const BUILTIN_FAMILIES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Georgia",
    "Verdana",
    "Impact",
];

/// Container formats accepted for uploaded fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    TrueType,
    OpenType,
    Woff,
    Woff2,
}

impl FontFormat {
    /// Identify a font file from its magic number.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..4)? {
            [0x00, 0x01, 0x00, 0x00] | b"true" => Some(Self::TrueType),
            b"OTTO" => Some(Self::OpenType),
            b"wOFF" => Some(Self::Woff),
            b"wOF2" => Some(Self::Woff2),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::TrueType => "font/ttf",
            Self::OpenType => "font/otf",
            Self::Woff => "font/woff",
            Self::Woff2 => "font/woff2",
        }
    }
}

/// Family name for an uploaded file: the file stem with spaces replaced by
/// underscores (`"My Font.ttf"` → `"My_Font"`).
pub fn font_name_from_file(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    };
    stem.trim().replace(' ', "_")
}

#[derive(Debug, Clone)]
pub struct FontRegistry {
    families: Vec<String>,
    pending: HashMap<String, FontFormat>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self {
            families: BUILTIN_FAMILIES.iter().map(|s| s.to_string()).collect(),
            pending: HashMap::new(),
        }
    }

    /// Families usable by text elements, built-ins first.
    pub fn families(&self) -> &[String] {
        &self.families
    }

    pub fn is_available(&self, family: &str) -> bool {
        self.families.iter().any(|f| f == family)
    }

    pub fn is_pending(&self, family: &str) -> bool {
        self.pending.contains_key(family)
    }

    /// Validate font bytes and record a pending load under `name`.
    pub fn begin(&mut self, name: &str, bytes: &[u8]) -> Result<FontFormat, EditError> {
        let fail = |reason: &str| EditError::FontLoad {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if name.trim().is_empty() {
            return Err(fail("font name is empty"));
        }
        let format = FontFormat::sniff(bytes).ok_or_else(|| fail("unrecognized font data"))?;
        self.pending.insert(name.to_string(), format);
        log::debug!("font `{name}` pending ({format:?}, {} bytes)", bytes.len());
        Ok(format)
    }

    /// Complete a pending load. On success the family becomes available;
    /// returns `true` when it was not available before.
    pub fn finish(&mut self, name: &str, outcome: Result<(), String>) -> Result<bool, EditError> {
        if self.pending.remove(name).is_none() {
            return Err(EditError::FontLoad {
                name: name.to_string(),
                reason: "no pending load".into(),
            });
        }
        if let Err(reason) = outcome {
            log::warn!("font `{name}` failed to load: {reason}");
            return Err(EditError::FontLoad {
                name: name.to_string(),
                reason,
            });
        }
        if self.is_available(name) {
            return Ok(false);
        }
        self.families.push(name.to_string());
        log::debug!("font `{name}` registered");
        Ok(true)
    }
}

// ─── Font cache ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFont {
    pub name: String,
    pub format: FontFormat,
    pub bytes: Vec<u8>,
}

/// Uploaded font blobs, persisted by the host as one MessagePack blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontCache {
    fonts: Vec<CachedFont>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the font stored under `name`.
    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), EditError> {
        let format = FontFormat::sniff(&bytes).ok_or_else(|| EditError::FontLoad {
            name: name.to_string(),
            reason: "unrecognized font data".into(),
        })?;
        self.fonts.retain(|f| f.name != name);
        self.fonts.push(CachedFont {
            name: name.to_string(),
            format,
            bytes,
        });
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<CachedFont> {
        let index = self.fonts.iter().position(|f| f.name == name)?;
        Some(self.fonts.remove(index))
    }

    pub fn fonts(&self) -> &[CachedFont] {
        &self.fonts
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EditError> {
        rmp_serde::to_vec_named(self).map_err(|e| EditError::FontLoad {
            name: "<cache>".into(),
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EditError> {
        rmp_serde::from_slice(bytes).map_err(|e| EditError::FontLoad {
            name: "<cache>".into(),
            reason: e.to_string(),
        })
    }
}
