use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    /// `meta`, or a string `description` when `meta` is absent.
    pub fn short_description(&self) -> Option<&str> {
        self.meta
            .as_deref()
            .or_else(|| self.extra.get("description").and_then(|v| v.as_str()))
    }
}

/// A post as read from disk, before its body is serialized.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub file_path: PathBuf,
    pub front_matter: FrontMatter,
    pub body: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub meta: String,
}

impl From<&FrontMatter> for PostSummary {
    fn from(fm: &FrontMatter) -> Self {
        PostSummary {
            slug: fm.slug.clone(),
            title: fm.title.clone(),
            meta: fm.short_description().unwrap_or_default().to_string(),
        }
    }
}

/// Pre-processed post body. Only the page renderer looks inside.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SerializedBody {
    pub compiled_source: String,
    pub frontmatter: serde_json::Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RenderedPost {
    pub title: String,
    pub content: SerializedBody,
}

/// What to do with slugs that were not enumerated at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub slugs: Vec<String>,
    pub fallback: Fallback,
}
