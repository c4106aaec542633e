//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use cart_storage::FileStore;
use cart_store::{CartProvider, CartStore, RecordingNotifier};

use crate::config::CliConfig;
use crate::output::Output;

/// File names searched for, in order, in each directory.
const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

/// An opened cart plus the notices it produced.
pub struct Session {
    /// Provider owning the store.
    pub provider: CartProvider,
    /// Notices emitted by the store during this run.
    pub notices: Arc<RecordingNotifier>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, Path::new(path));
                (CliConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        config.apply_env();

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Open the catalog and the persisted cart.
    pub fn open_session(&self) -> Result<Session> {
        let mut catalog_config = self.config.catalog.clone();
        catalog_config.fixture = catalog_config
            .fixture
            .as_deref()
            .map(|path| self.resolve_path(path));
        let catalog = cart_catalog::open(&catalog_config).context("Failed to open catalog")?;

        let storage_dir = self.resolve_path(&self.config.storage.dir);
        let storage = FileStore::open(storage_dir.clone())
            .with_context(|| format!("Failed to open storage: {}", storage_dir.display()))?;
        self.output
            .debug(&format!("Using storage at {}", storage_dir.display()));

        let notices = Arc::new(RecordingNotifier::new());
        let store = CartStore::builder(catalog, Arc::new(storage))
            .config(self.config.store.clone())
            .notifier(notices.clone())
            .build()
            .context("Failed to load saved cart")?;

        Ok(Session {
            provider: CartProvider::new(store),
            notices,
        })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        resolve(&self.cwd, path)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join(".cart.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(root.path().join(".cart.toml")));
    }

    #[test]
    fn test_find_config_prefers_nearest_and_name_order() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("shop");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("cart.toml"), "").unwrap();
        std::fs::write(nested.join("cart.json"), "{}").unwrap();
        std::fs::write(nested.join("cart.toml"), "").unwrap();

        assert_eq!(find_config(&nested), Some(nested.join("cart.toml")));
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let base = Path::new("/work");
        assert_eq!(resolve(base, Path::new(".cart")), PathBuf::from("/work/.cart"));
        assert_eq!(resolve(base, Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }

    #[tokio::test]
    async fn test_session_uses_fixture_and_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("catalog.json"),
            r#"{
                "products": [{"id": 3, "title": "Trail", "price": 249.9, "image": "t.jpg"}],
                "stock": [{"id": 3, "amount": 2}]
            }"#,
        )
        .unwrap();

        let mut config = CliConfig::default();
        config.catalog.fixture = Some(PathBuf::from("catalog.json"));
        config.storage.dir = PathBuf::from("state");

        let ctx = Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: dir.path().to_path_buf(),
        };

        let session = ctx.open_session().unwrap();
        let store = session.provider.store().clone();
        store
            .add_product(cart_store::ProductId::new(3))
            .await
            .unwrap();
        assert!(session.notices.notices().is_empty());
        assert!(dir.path().join("state").is_dir());

        // A fresh session sees the persisted cart.
        let reopened = ctx.open_session().unwrap();
        assert_eq!(reopened.provider.store().cart().item_count(), 1);
    }
}
