use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub relational: Option<RelationalConfig>,
    pub document: Option<DocumentConfig>,
    pub graph: Option<GraphConfig>,
    pub runtime: Option<RuntimeConfig>,
    pub fixture: Option<FixtureConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationalConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub uri: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub store_timeout_secs: Option<u64>,
    pub min_year: Option<i32>,
    pub bind: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureConfig {
    pub path: Option<String>,
}

/// Platform config directory path: `<config_dir>/scholarboard/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholarboard").join("config.toml"))
}

/// Load config by cascading CWD `.scholarboard.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".scholarboard.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<S, T: Clone>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> &Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(|s| field(s).clone())
        .or_else(|| base.as_ref().and_then(|s| field(s).clone()))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        relational: Some(RelationalConfig {
            path: pick(&overlay.relational, &base.relational, |r| &r.path),
        }),
        document: Some(DocumentConfig {
            uri: pick(&overlay.document, &base.document, |d| &d.uri),
            database: pick(&overlay.document, &base.document, |d| &d.database),
        }),
        graph: Some(GraphConfig {
            uri: pick(&overlay.graph, &base.graph, |g| &g.uri),
            user: pick(&overlay.graph, &base.graph, |g| &g.user),
            password: pick(&overlay.graph, &base.graph, |g| &g.password),
            database: pick(&overlay.graph, &base.graph, |g| &g.database),
        }),
        runtime: Some(RuntimeConfig {
            store_timeout_secs: pick(&overlay.runtime, &base.runtime, |r| &r.store_timeout_secs),
            min_year: pick(&overlay.runtime, &base.runtime, |r| &r.min_year),
            bind: pick(&overlay.runtime, &base.runtime, |r| &r.bind),
            log_level: pick(&overlay.runtime, &base.runtime, |r| &r.log_level),
        }),
        fixture: Some(FixtureConfig {
            path: pick(&overlay.fixture, &base.fixture, |f| &f.path),
        }),
    }
}

impl ConfigFile {
    /// Copy every value set in this file onto `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(path) = self.relational.as_ref().and_then(|r| r.path.as_ref()) {
            config.sqlite_path = Some(PathBuf::from(path));
        }
        if let Some(document) = &self.document {
            if let Some(uri) = &document.uri {
                config.mongodb_uri = uri.clone();
            }
            if let Some(database) = &document.database {
                config.mongodb_database = database.clone();
            }
        }
        if let Some(graph) = &self.graph {
            if let Some(uri) = &graph.uri {
                config.neo4j_uri = uri.clone();
            }
            if let Some(user) = &graph.user {
                config.neo4j_user = user.clone();
            }
            if graph.password.is_some() {
                config.neo4j_password = graph.password.clone();
            }
            if graph.database.is_some() {
                config.neo4j_database = graph.database.clone();
            }
        }
        if let Some(runtime) = &self.runtime {
            if let Some(secs) = runtime.store_timeout_secs.filter(|s| *s > 0) {
                config.store_timeout = Duration::from_secs(secs);
            }
            if let Some(min_year) = runtime.min_year {
                config.min_year = min_year;
            }
            if let Some(bind) = &runtime.bind {
                config.bind_addr = bind.clone();
            }
            if let Some(level) = &runtime.log_level {
                config.log_level = level.clone();
            }
        }
        if let Some(path) = self.fixture.as_ref().and_then(|f| f.path.as_ref()) {
            config.fixture_path = Some(PathBuf::from(path));
        }
    }
}
