//! # File store
//!
//! The host app's category-keyed file store. The editor adds finished documents to the front of a
//! category, and reads the will category back as its list of repository documents, newest first. It's the
//! source of ownership for everything that outlives an editing session!

/// Descriptor of a stored file.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub name: String,
    /// Display date, already formatted.
    pub date: String,
    /// Display size, already formatted.
    pub size: String,
    #[serde(default)]
    pub is_new: bool,
}

/// Category-keyed store of file descriptors. Files are only ever added, never removed.
pub trait FileStore: Send + Sync {
    /// Add a file to the front of a category, creating it if needed.
    fn add_file_to_category(&self, category: &str, file: FileItem);
    /// Snapshot of the files in a category, newest first. Unknown categories are empty.
    fn category_files(&self, category: &str) -> Vec<FileItem>;
}

/// A store that keeps everything in-memory.
#[derive(Default)]
pub struct InMemoryFileStore {
    // Only locked for writing on add. Each list is newest first.
    categories: parking_lot::RwLock<hashbrown::HashMap<String, Vec<FileItem>>>,
}
impl InMemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Build a store pre-populated with some categories.
    #[must_use]
    pub fn with_categories(categories: hashbrown::HashMap<String, Vec<FileItem>>) -> Self {
        Self {
            categories: parking_lot::RwLock::new(categories),
        }
    }
    /// Iterate over all the category names.
    pub fn category_iter(&self) -> impl Iterator<Item = String> {
        let names: Vec<_> = self.categories.read().keys().cloned().collect();
        names.into_iter()
    }
}
impl FileStore for InMemoryFileStore {
    fn add_file_to_category(&self, category: &str, file: FileItem) {
        log::debug!("storing {:?} into {category:?}", file.name);
        self.categories
            .write()
            .entry_ref(category)
            .or_default()
            .insert(0, file);
    }
    fn category_files(&self, category: &str) -> Vec<FileItem> {
        self.categories
            .read()
            .get(category)
            .cloned()
            .unwrap_or_default()
    }
}
