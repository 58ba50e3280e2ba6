//! # Documents
//!
//! Which will document is being worked on, and its text. Exactly one document is active at a time.
//!
//! Documents come from three places: the built-in blank template, a fresh placeholder for a new upload,
//! and the will category of the host's [file store](crate::store). Only the most recent stored will
//! carries full text - older entries get a read-only preview stub.

use crate::store::FileItem;

/// The blank will every fresh document starts from.
pub const DEFAULT_WILL_TEMPLATE: &str = "本人，[請輸入您的姓名] (以下稱「立遺囑人」)，茲在此鄭重聲明，此為本人之最終遺囑，並以此撤銷先前所有遺囑及遺囑附錄。

第一條：遺囑執行人
本人指定 [請輸入遺囑執行人姓名] 為本遺囑之執行人。

第二條：數位資產處理
關於本人名下所有數位資產，本人指示如下：
1. 社群帳號 (Facebook, Instagram, LINE)： [請輸入處理方式]
2. 雲端檔案 (Google Drive, iCloud)： [請輸入處理方式]

第三條：法律效力
本遺囑依據中華民國法律作成。";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DocumentId {
    Template,
    NewUpload,
    /// Index into the will category of the store.
    Repository(usize),
}
impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template => f.write_str("default"),
            Self::NewUpload => f.write_str("new"),
            Self::Repository(idx) => write!(f, "repo-{idx}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized document id {0:?}")]
pub struct ParseDocumentIdError(String);

impl std::str::FromStr for DocumentId {
    type Err = ParseDocumentIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Self::Template),
            "new" => Ok(Self::NewUpload),
            other => other
                .strip_prefix("repo-")
                .and_then(|idx| idx.parse().ok())
                .map(Self::Repository)
                .ok_or_else(|| ParseDocumentIdError(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::AsRefStr)]
pub enum Provenance {
    BlankTemplate,
    NewUploadPlaceholder,
    Repository,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Document {
    pub id: DocumentId,
    pub display_name: String,
    /// Display date of the last modification, for stored documents.
    pub last_modified: Option<String>,
    pub text_content: String,
    pub provenance: Provenance,
    /// Generated stubs can't be edited.
    pub editable: bool,
}
impl Document {
    #[must_use]
    pub fn blank_template() -> Self {
        Self {
            id: DocumentId::Template,
            display_name: "空白遺囑範本".to_owned(),
            last_modified: None,
            text_content: DEFAULT_WILL_TEMPLATE.to_owned(),
            provenance: Provenance::BlankTemplate,
            editable: true,
        }
    }
    #[must_use]
    pub fn new_upload() -> Self {
        Self {
            id: DocumentId::NewUpload,
            display_name: "新增上傳文件".to_owned(),
            provenance: Provenance::NewUploadPlaceholder,
            ..Self::blank_template()
        }
    }
    /// Build the document for the `index`th entry of the will category.
    #[must_use]
    pub fn from_repository(index: usize, file: &FileItem) -> Self {
        // Only the newest entry has its text on hand.
        let (text_content, editable) = if index == 0 {
            (DEFAULT_WILL_TEMPLATE.to_owned(), true)
        } else {
            (format!("[{}] 的文件內容預覽...", file.name), false)
        };
        Self {
            id: DocumentId::Repository(index),
            display_name: file.name.clone(),
            last_modified: Some(file.date.clone()),
            text_content,
            provenance: Provenance::Repository,
            editable,
        }
    }
}

/// The selectable list of stored wills.
#[must_use]
pub fn repository_documents(files: &[FileItem]) -> Vec<Document> {
    files
        .iter()
        .enumerate()
        .map(|(idx, file)| Document::from_repository(idx, file))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("document {0} not found")]
    NotFound(DocumentId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("document {0} is read-only")]
    ReadOnly(DocumentId),
}

/// The active document. Does *not* know about signatures - switching documents must be paired with a
/// signature clear by the owner, see [`crate::editor::WillEditor`].
#[derive(Clone, Debug)]
pub struct DocumentSelection {
    active: Document,
}
impl Default for DocumentSelection {
    fn default() -> Self {
        Self {
            active: Document::blank_template(),
        }
    }
}
impl DocumentSelection {
    #[must_use]
    pub fn active(&self) -> &Document {
        &self.active
    }
    /// Activate the blank template, with its text reset.
    pub fn select_template(&mut self) {
        self.activate(Document::blank_template());
    }
    /// Activate a fresh new-upload placeholder.
    pub fn select_new_upload(&mut self) {
        self.activate(Document::new_upload());
    }
    /// Activate a stored will by ID. `files` is the current will category.
    ///
    /// # Errors
    /// [`SelectError::NotFound`] if `id` isn't in `files`, in which case the active document is untouched.
    pub fn select_repository_document(
        &mut self,
        id: DocumentId,
        files: &[FileItem],
    ) -> Result<(), SelectError> {
        let DocumentId::Repository(idx) = id else {
            return Err(SelectError::NotFound(id));
        };
        let file = files.get(idx).ok_or(SelectError::NotFound(id))?;
        self.activate(Document::from_repository(idx, file));
        Ok(())
    }
    /// Replace the active document's text wholesale. No validation.
    ///
    /// # Errors
    /// [`EditError::ReadOnly`] for generated preview stubs.
    pub fn edit_content(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        if !self.active.editable {
            return Err(EditError::ReadOnly(self.active.id));
        }
        self.active.text_content = text.into();
        Ok(())
    }
    fn activate(&mut self, document: Document) {
        log::debug!("active document {} -> {}", self.active.id, document.id);
        self.active = document;
    }
}
