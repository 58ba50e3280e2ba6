//! # Will editor
//!
//! Screen-level owner of a document-editing session. Composes document selection, the signature pad and
//! the preview, and talks to the host's collaborators (file store, navigation, clock).
//!
//! The one cross-cutting rule lives here: a signature belongs to one document. Every switch of the active
//! document clears the signature, confirmed or not.

use std::sync::Arc;

pub use chrono::NaiveDate;

use crate::config::EditorConfig;
use crate::document::{repository_documents, Document, DocumentId, DocumentSelection, EditError, SelectError};
use crate::preview::Preview;
use crate::recorder::StrokeRecorder;
use crate::signature::{ConfirmError, RasterizedSignature, SignatureEvent, SignaturePad};
use crate::store::{FileItem, FileStore};
use crate::stroke::{PointerEvent, SurfaceBounds};
use crate::surface::SurfaceGeometry;

/// Shortest password accepted for sealed storage, in characters.
pub const MIN_PASSWORD_CHARS: usize = 4;
/// Civil-code reminder shown before signing.
pub const LEGAL_REMINDER: &str = "此數位簽署流程旨在符合《民法》自書遺囑之要件，請確認為本人親簽。";

/// Performs screen transitions in the host. Identifiers are opaque to the editor.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: &str);
}

/// Source of "today" for file descriptors.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
/// The local wall clock.
pub struct SystemClock;
impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
/// A clock stuck on one day.
pub struct FixedClock(pub NaiveDate);
impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SealError {
    #[error("password must be at least {MIN_PASSWORD_CHARS} characters")]
    PasswordTooShort,
}

/// Kind of stored output, deciding its file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum StoredKind {
    /// A downloaded, unsealed draft.
    Draft,
    /// A password-sealed signed will.
    Sealed,
}
impl StoredKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Draft => "Will_Draft",
            Self::Sealed => "Signed_Will",
        }
    }
}

pub struct WillEditor {
    config: EditorConfig,
    documents: DocumentSelection,
    signature: SignaturePad,
    store: Arc<dyn FileStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    legal_reminder_pending: bool,
}
impl WillEditor {
    /// Open a session on the blank template, with an unmounted signature surface.
    #[must_use]
    pub fn new(
        config: EditorConfig,
        store: Arc<dyn FileStore>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let signature = SignaturePad::new(StrokeRecorder::new(config.stroke, config.sizing));
        Self {
            config,
            documents: DocumentSelection::default(),
            signature,
            store,
            navigator,
            clock,
            legal_reminder_pending: true,
        }
    }
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
    /// Is the legal reminder still waiting to be acknowledged?
    #[must_use]
    pub fn legal_reminder_pending(&self) -> bool {
        self.legal_reminder_pending
    }
    pub fn acknowledge_legal_reminder(&mut self) {
        self.legal_reminder_pending = false;
    }
    /// Measure (or re-measure) the signature surface. See [`StrokeRecorder::mount`].
    pub fn mount_signature_surface(
        &mut self,
        measured: SurfaceGeometry,
        bounds: SurfaceBounds,
    ) -> bool {
        self.signature.mount(measured, bounds)
    }
    pub fn subscribe_signature(&mut self) -> bus::BusReader<SignatureEvent> {
        self.signature.subscribe()
    }
    #[must_use]
    pub fn signature(&self) -> &SignaturePad {
        &self.signature
    }
    #[must_use]
    pub fn active_document(&self) -> &Document {
        self.documents.active()
    }
    /// The selectable stored wills, freshly read from the store.
    #[must_use]
    pub fn repository_documents(&self) -> Vec<Document> {
        repository_documents(&self.store.category_files(&self.config.will_category))
    }

    pub fn select_template(&mut self) {
        self.documents.select_template();
        self.signature.clear();
    }
    pub fn select_new_upload(&mut self) {
        self.documents.select_new_upload();
        self.signature.clear();
    }
    /// # Errors
    /// [`SelectError::NotFound`] if the ID isn't among the stored wills. Nothing changes in that case,
    /// including the signature.
    pub fn select_repository_document(&mut self, id: DocumentId) -> Result<(), SelectError> {
        let files = self.store.category_files(&self.config.will_category);
        self.documents.select_repository_document(id, &files)?;
        self.signature.clear();
        Ok(())
    }
    /// Replace the active text. Preview edits land here.
    ///
    /// # Errors
    /// [`EditError::ReadOnly`] if the active document is a generated stub.
    pub fn edit_content(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.documents.edit_content(text)
    }

    pub fn pointer(&mut self, event: &PointerEvent) {
        self.signature.pointer(event);
    }
    pub fn begin_stroke(&mut self, pos: [f32; 2]) {
        self.signature.begin_stroke(pos);
    }
    pub fn extend_stroke(&mut self, pos: [f32; 2]) {
        self.signature.extend_stroke(pos);
    }
    pub fn end_stroke(&mut self) {
        self.signature.end_stroke();
    }
    /// # Errors
    /// See [`SignaturePad::confirm`]
    pub fn confirm_signature(&mut self) -> Result<RasterizedSignature, ConfirmError> {
        self.signature.confirm()
    }
    pub fn clear_signature(&mut self) {
        self.signature.clear();
    }
    #[must_use]
    pub fn preview(&self) -> Preview<'_> {
        Preview::compose(self.documents.active(), self.signature.rasterized())
    }

    /// Hand the document to the store as a draft. Never fails - the store reports its own failures.
    pub fn finalize_and_store(&self, category: &str) -> FileItem {
        self.store_as(category, StoredKind::Draft)
    }
    /// Store the document as a sealed, signed will, gated by a password.
    ///
    /// Password length is counted in `char`s (Unicode scalar values), so `"🔑🔑"` is two characters
    /// even though it takes four UTF-16 units.
    ///
    /// # Errors
    /// [`SealError::PasswordTooShort`], in which case nothing is stored.
    pub fn seal_and_store(&self, category: &str, password: &str) -> Result<FileItem, SealError> {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SealError::PasswordTooShort);
        }
        Ok(self.store_as(category, StoredKind::Sealed))
    }
    fn store_as(&self, category: &str, kind: StoredKind) -> FileItem {
        let today = self.clock.today();
        let stem = format!("{}_{}", kind.prefix(), today.format("%Y-%m-%d"));
        let existing = self.store.category_files(category);
        let file = FileItem {
            name: unique_name(&stem, ".pdf", &existing),
            date: today.format("%Y/%m/%d").to_string(),
            size: self.estimated_size(),
            is_new: true,
        };
        log::info!("storing {} {:?} into {category:?}", kind.as_ref(), file.name);
        self.store.add_file_to_category(category, file.clone());
        file
    }
    /// Size of what would be written: text plus signature image.
    fn estimated_size(&self) -> String {
        let text = self.documents.active().text_content.len();
        let image = self.signature.rasterized().map_or(0, |sig| sig.png().len());
        human_bytes::human_bytes((text + image) as f64)
    }

    pub fn go_back(&self) {
        self.navigator.navigate(&self.config.home_screen);
    }
    pub fn open_assistant(&self) {
        self.navigator.navigate(&self.config.assistant_screen);
    }
}

/// `<stem><ext>`, or `<stem> (n)<ext>` with the smallest `n >= 2` not already taken.
fn unique_name(stem: &str, ext: &str, existing: &[FileItem]) -> String {
    let taken = |candidate: &str| existing.iter().any(|file| file.name == candidate);
    let mut candidate = format!("{stem}{ext}");
    let mut n = 2u32;
    while taken(&candidate) {
        candidate = format!("{stem} ({n}){ext}");
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{FixedClock, NaiveDate, Navigator, SealError, WillEditor};
    use crate::config::EditorConfig;
    use crate::document::{DocumentId, SelectError};
    use crate::signature::{ConfirmError, SignatureState};
    use crate::store::{FileItem, FileStore, InMemoryFileStore};
    use crate::stroke::SurfaceBounds;
    use crate::surface::SurfaceGeometry;

    const WILLS: &str = "遺囑文件";

    #[derive(Default)]
    struct RecordingNavigator(parking_lot::Mutex<Vec<String>>);
    impl Navigator for RecordingNavigator {
        fn navigate(&self, screen: &str) {
            self.0.lock().push(screen.to_owned());
        }
    }

    fn stored(name: &str) -> FileItem {
        FileItem {
            name: name.to_owned(),
            date: "2024/05/20".to_owned(),
            size: "1.8 MB".to_owned(),
            is_new: false,
        }
    }
    fn editor(store: Arc<InMemoryFileStore>) -> (WillEditor, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let mut editor = WillEditor::new(
            EditorConfig::default(),
            store,
            navigator.clone(),
            Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())),
        );
        assert!(editor.mount_signature_surface(
            SurfaceGeometry::new(300.0, 128.0, 2.0),
            SurfaceBounds::default()
        ));
        (editor, navigator)
    }
    fn sign(editor: &mut WillEditor) {
        editor.begin_stroke([20.0, 60.0]);
        for x in [60.0, 100.0, 140.0, 180.0] {
            editor.extend_stroke([x, 60.0 + (x / 20.0)]);
        }
        editor.end_stroke();
    }

    #[test]
    fn five_point_signature_shows_in_preview() {
        let (mut editor, _) = editor(Arc::default());
        assert!(!editor.preview().is_signed());
        sign(&mut editor);
        assert!(editor.signature().has_ink());
        editor.confirm_signature().unwrap();

        let preview = editor.preview();
        assert!(preview.is_signed());
        assert!(!preview.render_text().contains(crate::preview::UNSIGNED_PLACEHOLDER));
    }
    #[test]
    fn confirm_needs_ink() {
        let (mut editor, _) = editor(Arc::default());
        assert!(matches!(
            editor.confirm_signature(),
            Err(ConfirmError::NothingToConfirm)
        ));
    }
    #[test]
    fn switching_document_drops_signature() {
        let store = Arc::new(InMemoryFileStore::new());
        store.add_file_to_category(WILLS, stored("Signed_Will_2024-05-20.pdf"));
        let (mut editor, _) = editor(store);

        sign(&mut editor);
        editor.confirm_signature().unwrap();
        editor
            .select_repository_document(DocumentId::Repository(0))
            .unwrap();
        assert!(!editor.signature().has_ink());
        assert!(editor.signature().rasterized().is_none());
        assert!(!editor.preview().is_signed());

        // And back again, with an unconfirmed signature this time.
        sign(&mut editor);
        editor.select_template();
        assert!(!editor.signature().has_ink());
        assert_eq!(editor.signature().state(), SignatureState::Empty);

        sign(&mut editor);
        editor.select_new_upload();
        assert!(!editor.signature().has_ink());
    }
    #[test]
    fn failed_selection_keeps_everything() {
        let (mut editor, _) = editor(Arc::default());
        assert!(editor.repository_documents().is_empty());
        editor.edit_content("my will").unwrap();
        sign(&mut editor);
        editor.confirm_signature().unwrap();

        assert_eq!(
            editor.select_repository_document(DocumentId::Repository(0)),
            Err(SelectError::NotFound(DocumentId::Repository(0)))
        );
        assert_eq!(editor.active_document().text_content, "my will");
        assert!(editor.preview().is_signed());
    }
    #[test]
    fn finalize_twice_stores_distinct_files() {
        let store = Arc::new(InMemoryFileStore::new());
        let (editor, _) = editor(store.clone());

        let first = editor.finalize_and_store(WILLS);
        let second = editor.finalize_and_store(WILLS);

        let files = store.category_files(WILLS);
        assert_eq!(files, [second.clone(), first.clone()]);
        assert!(files.iter().all(|file| file.is_new));
        assert_eq!(first.name, "Will_Draft_2026-10-19.pdf");
        assert_eq!(second.name, "Will_Draft_2026-10-19 (2).pdf");
        assert_eq!(first.date, "2026/10/19");
        // Newly stored wills are selectable.
        assert_eq!(editor.repository_documents().len(), 2);
    }
    #[test]
    fn stored_will_becomes_latest_document() {
        let store = Arc::new(InMemoryFileStore::new());
        store.add_file_to_category(WILLS, stored("2023_old.pdf"));
        let (mut editor, _) = editor(store);

        let new = editor.finalize_and_store(WILLS);
        let docs = editor.repository_documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].display_name, new.name);
        assert!(docs[0].editable);
        assert_eq!(docs[1].display_name, "2023_old.pdf");
        assert!(!docs[1].editable);

        editor
            .select_repository_document(DocumentId::Repository(0))
            .unwrap();
        editor.edit_content("revised").unwrap();
        assert_eq!(editor.active_document().display_name, new.name);
    }
    #[test]
    fn sealing_is_password_gated() {
        let store = Arc::new(InMemoryFileStore::new());
        let (editor, _) = editor(store.clone());

        assert_eq!(
            editor.seal_and_store(WILLS, "123"),
            Err(SealError::PasswordTooShort)
        );
        assert_eq!(
            editor.seal_and_store(WILLS, "🔑🔑"),
            Err(SealError::PasswordTooShort)
        );
        assert!(store.category_files(WILLS).is_empty());

        let sealed = editor.seal_and_store(WILLS, "密碼密碼").unwrap();
        assert_eq!(sealed.name, "Signed_Will_2026-10-19.pdf");
        assert!(sealed.is_new);
    }
    #[test]
    fn navigation_and_reminder() {
        let (mut editor, navigator) = editor(Arc::default());
        assert!(editor.legal_reminder_pending());
        editor.acknowledge_legal_reminder();
        editor.acknowledge_legal_reminder();
        assert!(!editor.legal_reminder_pending());

        editor.open_assistant();
        editor.go_back();
        assert_eq!(*navigator.0.lock(), ["lawyer", "home"]);
    }
}
