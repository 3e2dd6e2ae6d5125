use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::TestCaseStore;

/// How long to wait for another process to release the lock file
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Saves and loads the test case store as YAML, guarded by a lock file
/// so two processes never write at the same time
pub struct Storage {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    /// Creates a new Storage instance
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let mut lock_name = file_path.as_os_str().to_owned();
        lock_name.push(".lock");
        Self {
            file_path,
            lock_file_path: PathBuf::from(lock_name),
        }
    }

    /// Returns the path to the storage file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Acquire an exclusive lock for writing.
    /// The returned handle must be held for the duration of the write.
    fn acquire_write_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to create lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_exclusive(f))?;
        Ok(lock_file)
    }

    /// Acquire a shared lock for reading
    fn acquire_read_lock(&self) -> Result<Option<File>> {
        if !self.lock_file_path.exists() {
            return Ok(None);
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to open lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_shared(f))?;
        Ok(Some(lock_file))
    }

    fn wait_for_lock<F>(&self, lock_file: &File, try_lock: F) -> Result<()>
    where
        F: Fn(&File) -> std::io::Result<()>,
    {
        let start = Instant::now();

        loop {
            match try_lock(lock_file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        anyhow::bail!(
                            "Timeout waiting for file lock - another process may be writing: {:?}",
                            self.file_path
                        );
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to acquire lock on {:?}", self.lock_file_path)
                    })
                }
            }
        }
    }

    /// Loads the store from the YAML file, creating an empty one if missing
    pub fn load(&self) -> Result<TestCaseStore> {
        if !self.file_path.exists() {
            let store = TestCaseStore::new();
            self.save(&store)?;
            return Ok(store);
        }

        let _lock = self.acquire_read_lock()?;

        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        let reader = BufReader::new(file);

        let store: TestCaseStore = serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))?;

        Ok(store)
    }

    /// Saves the store to the YAML file
    pub fn save(&self, store: &TestCaseStore) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut lock_file = self.acquire_write_lock()?;

        // Lock holder info, handy when a lock goes stale
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );

        let yaml = serde_yaml::to_string(store)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write {:?}", self.file_path))?;

        Ok(())
    }

    /// Reloads the file, applies `update_fn` and saves, all under one lock
    pub fn update_atomically<F>(&self, update_fn: F) -> Result<TestCaseStore>
    where
        F: FnOnce(&mut TestCaseStore),
    {
        if !self.file_path.exists() {
            self.save(&TestCaseStore::new())?;
        }

        let mut lock_file = self.acquire_write_lock()?;
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );

        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        let mut store: TestCaseStore = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))?;

        update_fn(&mut store);

        let yaml = serde_yaml::to_string(&store)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write {:?}", self.file_path))?;

        Ok(store)
    }
}
