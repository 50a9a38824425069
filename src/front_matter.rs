use std::path::Path;

use gray_matter::{engine::YAML, Matter};

use crate::error::ContentError;
use crate::models::{FrontMatter, PostRecord};

const REQUIRED_FIELDS: [&str; 2] = ["slug", "title"];

/// Splits a raw post file into its front matter and Markdown body.
pub fn parse_post(path: &Path, raw: &str) -> Result<PostRecord, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<serde_json::Value>(raw)
        .map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let data = match parsed.data {
        Some(serde_json::Value::Object(map)) => map,
        Some(other) => {
            return Err(ContentError::FrontMatter {
                path: path.to_path_buf(),
                message: format!("expected a mapping, found {other}"),
            })
        }
        None => {
            return Err(ContentError::MissingField {
                path: path.to_path_buf(),
                field: REQUIRED_FIELDS[0],
            })
        }
    };

    for field in REQUIRED_FIELDS {
        if data.get(field).map_or(true, |v| v.is_null()) {
            return Err(ContentError::MissingField {
                path: path.to_path_buf(),
                field,
            });
        }
    }

    let front_matter: FrontMatter = serde_json::from_value(serde_json::Value::Object(data))
        .map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(PostRecord {
        file_path: path.to_path_buf(),
        front_matter,
        body: parsed.content,
    })
}
