use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::ContentError;
use crate::front_matter::parse_post;
use crate::markdown::serialize_body;
use crate::models::{Fallback, PostRecord, PostSummary, RenderedPost, StaticPaths};

/// A directory of Markdown posts, one `<slug>.md` file per post.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ContentStore { root: root.into() }
    }

    /// Markdown files in directory-listing order.
    async fn post_files(&self) -> Result<Vec<PathBuf>, ContentError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ContentError::io(&self.root, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ContentError::io(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "md") && !is_temp_file(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn read_record(&self, path: &Path) -> Result<PostRecord, ContentError> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| ContentError::io(path, e))?;
        parse_post(path, &raw)
    }

    async fn read_all_records(&self) -> Result<Vec<PostRecord>, ContentError> {
        let mut records = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for path in self.post_files().await? {
            let record = self.read_record(&path).await?;
            let slug = &record.front_matter.slug;
            if let Some(first) = seen.get(slug) {
                return Err(ContentError::DuplicateSlug {
                    slug: slug.clone(),
                    first: first.clone(),
                    second: path,
                });
            }
            seen.insert(slug.clone(), path);
            records.push(record);
        }
        Ok(records)
    }

    /// Slugs that get a pre-rendered detail page. Anything else is resolved on request.
    pub async fn static_paths(&self) -> Result<StaticPaths, ContentError> {
        let records = self.read_all_records().await?;
        let slugs = records
            .into_iter()
            .map(|record| {
                let stem = record.file_path.file_stem().and_then(|s| s.to_str());
                if stem != Some(record.front_matter.slug.as_str()) {
                    // The resolver looks up `<slug>.md`, so this post will not resolve.
                    warn!(
                        "{} declares slug '{}' which does not match its file name",
                        record.file_path.display(),
                        record.front_matter.slug
                    );
                }
                record.front_matter.slug
            })
            .collect();

        Ok(StaticPaths {
            slugs,
            fallback: Fallback::Blocking,
        })
    }

    /// Front matter of every post, without rendering any bodies.
    pub async fn read_posts_info(&self) -> Result<Vec<PostSummary>, ContentError> {
        let records = self.read_all_records().await?;
        Ok(records
            .iter()
            .map(|record| PostSummary::from(&record.front_matter))
            .collect())
    }

    pub async fn resolve_post(&self, slug: &str) -> Result<RenderedPost, ContentError> {
        if !is_plain_slug(slug) {
            return Err(ContentError::NotFound {
                slug: slug.to_string(),
            });
        }

        let path = self.root.join(format!("{slug}.md"));
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound {
                    slug: slug.to_string(),
                })
            }
            Err(e) => return Err(ContentError::io(&path, e)),
        };

        let record = parse_post(&path, &raw)?;
        let content = serialize_body(&record)?;
        debug!("resolved post '{}' from {}", slug, path.display());

        Ok(RenderedPost {
            title: record.front_matter.title,
            content,
        })
    }
}

/// Editor droppings: Emacs lock files (`.#foo.md`) and backups (`foo.md~`).
pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |s| s.starts_with(".#") || s.ends_with('~'))
}

fn is_plain_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && slug != "." && slug != ".."
}
