use std::path::{Path, PathBuf};

/// The flat local directory shared by the file tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Joins a caller-supplied file name onto the directory. The name is used
    /// as given: absolute names and `..` components are not confined.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new("data")
    }
}
