use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub content_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub port: u16,
    pub is_development: bool,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            posts_dir: Path::new(DEFAULT_CONTENT_DIR).join("posts"),
            port: DEFAULT_PORT,
            is_development: false,
            export_dir: None,
        }
    }
}

// Every key is optional; whatever is absent keeps its default.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    content_dir: Option<PathBuf>,
    posts_dir: Option<PathBuf>,
    port: Option<u16>,
    development: Option<bool>,
    export_dir: Option<PathBuf>,
}

impl Config {
    /// Defaults, then the TOML file named by `BLOG_CONFIG`, then env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("BLOG_CONFIG") {
            Ok(path) => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path, source })?;
                Some(raw)
            }
            Err(_) => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        // Set only when some layer names the posts dir; otherwise it follows content_dir.
        let mut posts_dir: Option<PathBuf> = None;

        if let Some(raw) = file {
            let file: FileConfig = toml::from_str(raw)?;
            if let Some(dir) = file.content_dir {
                config.content_dir = dir;
            }
            posts_dir = file.posts_dir;
            if let Some(port) = file.port {
                config.port = port;
            }
            if let Some(dev) = file.development {
                config.is_development = dev;
            }
            config.export_dir = file.export_dir.or(config.export_dir);
        }

        if let Some(dir) = env("CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env("POSTS_DIR") {
            posts_dir = Some(PathBuf::from(dir));
        }
        config.posts_dir = posts_dir.unwrap_or_else(|| config.content_dir.join("posts"));

        if let Some(port) = env("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Env {
                var: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(mode) = env("RUST_ENV") {
            config.is_development = mode == "development";
        }
        if let Some(dir) = env("EXPORT_DIR") {
            config.export_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.content_dir.join("static")
    }

    pub fn layout_path(&self) -> PathBuf {
        self.content_dir.join("layout.html")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(None, env_of(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.posts_dir, PathBuf::from("content/posts"));
    }

    #[test]
    fn file_values_apply() {
        let raw = r#"
content_dir = "site"
port = 3000
development = true
"#;
        let config = Config::from_sources(Some(raw), env_of(&[])).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("site"));
        assert_eq!(config.posts_dir, PathBuf::from("site/posts"));
        assert_eq!(config.port, 3000);
        assert!(config.is_development);
    }

    #[test]
    fn env_overrides_file() {
        let raw = "port = 3000\nposts_dir = \"articles\"";
        let config = Config::from_sources(
            Some(raw),
            env_of(&[("PORT", "9000"), ("RUST_ENV", "development")]),
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.posts_dir, PathBuf::from("articles"));
        assert!(config.is_development);
    }

    #[test]
    fn env_content_dir_keeps_posts_dir_from_file() {
        let raw = "posts_dir = \"articles\"";
        let config = Config::from_sources(Some(raw), env_of(&[("CONTENT_DIR", "site")])).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("site"));
        assert_eq!(config.posts_dir, PathBuf::from("articles"));
    }

    #[test]
    fn env_content_dir_moves_derived_posts_dir() {
        let raw = "content_dir = \"from-file\"";
        let config = Config::from_sources(Some(raw), env_of(&[("CONTENT_DIR", "site")])).unwrap();
        assert_eq!(config.posts_dir, PathBuf::from("site/posts"));
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = Config::from_sources(None, env_of(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn unknown_file_key_is_rejected() {
        let err = Config::from_sources(Some("colour = \"red\""), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
