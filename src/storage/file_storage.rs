use crate::{
    domain::{Change, Dataset, Ticket},
    error::{DeskError, Result},
    storage::EntityStore,
};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// File-based storage keeping the dataset as one JSON document
pub struct FileStorage {
    root_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    const DESK_DIR: &'static str = ".pharmadesk";
    const DATASET_FILE: &'static str = "dataset.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DESK_DIR),
            write_lock: Mutex::new(()),
        }
    }

    fn dataset_file(&self) -> PathBuf {
        self.root_path.join(Self::DATASET_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Dataset> {
        let file_path = self.dataset_file();

        if !file_path.exists() {
            return Err(DeskError::StorageError(format!(
                "Dataset not initialized at {}",
                file_path.display()
            )));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let mut dataset: Dataset = serde_json::from_str(&contents)?;

        let refreshed = dataset.refresh_denormalized_names();
        if refreshed > 0 {
            tracing::warn!(refreshed, "stale cached names refreshed on read");
        }

        Ok(dataset)
    }

    async fn save(&self, dataset: &Dataset) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(dataset)?;

        // Write then rename so readers never see a half-written file
        let tmp = self.root_path.join(format!("{}.tmp", Self::DATASET_FILE));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.dataset_file()).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FileStorage {
    async fn initialize(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.dataset_file().exists() {
            tracing::info!(path = %self.dataset_file().display(), "seeding demo dataset");
            self.save(&Dataset::demo(Utc::now())).await?;
        }

        self.load().await?.validate()
    }

    async fn snapshot(&self) -> Result<Dataset> {
        self.load().await
    }

    async fn apply(&self, change: Change) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut dataset = self.load().await?;
        dataset.apply(change)?;
        self.save(&dataset).await
    }

    async fn insert_new_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        let _guard = self.write_lock.lock().await;

        let mut dataset = self.load().await?;
        let stored = dataset.insert_new_ticket(ticket)?;
        self.save(&dataset).await?;
        Ok(stored)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.dataset_file().exists()
    }
}
