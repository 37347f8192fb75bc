use crate::config::RulewareConfig;
use crate::package::HttpPackage;
use ruleware_engine::{loader, CorePackage, EngineError, LoadError, PackageManager, RuleEngine};
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

/// Package name stamped on rules loaded from the application's rules
/// directory, as opposed to rules shipped by a package.
pub const APP_PACKAGE: &str = "app";

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("rule file {path}: {source}")]
    RuleFile { path: String, source: LoadError },
}

/// The wired-up adapter: configuration, registered packages, and a loaded
/// engine. Shared with the middleware as `Arc` state; immutable once built.
pub struct Ruleware {
    pub config: RulewareConfig,
    pub packages: PackageManager,
    pub engine: RuleEngine,
}

impl Ruleware {
    /// Register the built-in packages, load them, and read every `*.toml`
    /// rule file under the configured rules directory.
    pub fn new(config: RulewareConfig) -> Result<Self, BootstrapError> {
        let mut packages = PackageManager::new();
        packages.register(Box::new(CorePackage));
        packages.register(Box::new(HttpPackage));

        let mut engine = packages.load(&["http"])?;
        load_rule_files(&mut engine, Path::new(&config.rules_dir))?;

        Ok(Ruleware {
            config,
            packages,
            engine,
        })
    }
}

fn load_rule_files(engine: &mut RuleEngine, rules_dir: &Path) -> Result<(), BootstrapError> {
    if !rules_dir.is_dir() {
        return Ok(());
    }

    let mut paths: Vec<_> = WalkDir::new(rules_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "toml"))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    paths.sort();

    for path in paths {
        let rules = loader::rules_from_file(&path).map_err(|source| BootstrapError::RuleFile {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(file = %path.display(), count = rules.len(), "loaded rule file");
        engine.add_rules(APP_PACKAGE, rules);
    }
    Ok(())
}
