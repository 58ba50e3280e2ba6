//! # Session scripts
//!
//! A script is a TOML file describing one signing session as an ordered list of steps - what a user would
//! have done on the will screen. Replaying it drives a [`WillEditor`] exactly as a UI would.
//!
//! ```toml
//! [surface]
//! width = 300.0
//! height = 128.0
//! dpr = 2.0
//!
//! [[seed."遺囑文件"]]
//! name = "Signed_Will_2024-05-20.pdf"
//! date = "2024/05/20"
//! size = "1.8 MB"
//!
//! [[step]]
//! action = "stroke"
//! points = [[10.0, 60.0], [80.0, 70.0], [150.0, 55.0]]
//!
//! [[step]]
//! action = "confirm"
//! ```

use std::sync::Arc;

use willpad_core::document::DocumentId;
use willpad_core::editor::{Clock, Navigator, WillEditor};
use willpad_core::store::{FileItem, InMemoryFileStore};
use willpad_core::stroke::{PointerEvent, PointerInput, PointerPhase, SurfaceBounds};
use willpad_core::surface::SurfaceGeometry;
use willpad_core::EditorConfig;

#[derive(Clone, Copy, Debug, serde::Deserialize)]
pub struct SurfaceLayout {
    pub width: f32,
    pub height: f32,
    #[serde(default = "SurfaceLayout::default_dpr")]
    pub dpr: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
}
impl SurfaceLayout {
    fn default_dpr() -> f32 {
        1.0
    }
    fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry::new(self.width, self.height, self.dpr)
    }
    fn bounds(&self) -> SurfaceBounds {
        SurfaceBounds {
            left: self.left,
            top: self.top,
        }
    }
}
impl Default for SurfaceLayout {
    /// The signature card of the will screen.
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 128.0,
            dpr: Self::default_dpr(),
            left: 0.0,
            top: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Down,
    Move,
    Up,
    Leave,
}
impl From<Phase> for PointerPhase {
    fn from(value: Phase) -> Self {
        match value {
            Phase::Down => Self::Down,
            Phase::Move => Self::Move,
            Phase::Up => Self::Up,
            Phase::Leave => Self::Leave,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    AcknowledgeReminder,
    /// Re-measure the signature surface.
    Mount(SurfaceLayout),
    SelectTemplate,
    SelectNewUpload,
    SelectRepository {
        id: String,
    },
    Edit {
        text: String,
    },
    /// A whole gesture: press on the first point, drag through the rest, release.
    /// Points are surface-local.
    Stroke {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        touch: bool,
    },
    /// A single raw event, in client coordinates.
    Pointer {
        phase: Phase,
        x: f32,
        y: f32,
        #[serde(default)]
        touch: bool,
    },
    Confirm,
    Clear,
    Finalize {
        category: Option<String>,
    },
    Seal {
        password: String,
        category: Option<String>,
    },
    Back,
    Assistant,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct Script {
    /// Directory for outputs, relative to the script. Defaults to the script's own directory.
    pub output: Option<std::path::PathBuf>,
    pub surface: SurfaceLayout,
    /// Files present in the store before the session starts, by category.
    pub seed: hashbrown::HashMap<String, Vec<FileItem>>,
    #[serde(rename = "step")]
    pub steps: Vec<Step>,
}
impl Script {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Logs transitions, there's no screen to go to.
pub struct LogNavigator;
impl Navigator for LogNavigator {
    fn navigate(&self, screen: &str) {
        log::info!("navigate -> {screen}");
    }
}

/// The outcome of a replayed session.
pub struct Report {
    pub preview: String,
    pub signature_png: Option<Vec<u8>>,
    /// Everything the session appended to the store.
    pub stored: Vec<FileItem>,
    /// Steps that were rejected, with the reason. Rejections don't stop the replay.
    pub rejected: Vec<(usize, String)>,
}

pub fn replay(script: &Script, config: &EditorConfig, clock: Arc<dyn Clock>) -> Report {
    let store = Arc::new(InMemoryFileStore::with_categories(script.seed.clone()));
    let mut editor = WillEditor::new(config.clone(), store, Arc::new(LogNavigator), clock);
    let mut bounds = script.surface.bounds();
    editor.mount_signature_surface(script.surface.geometry(), bounds);

    let mut stored = Vec::new();
    let mut rejected = Vec::new();
    for (idx, step) in script.steps.iter().enumerate() {
        let result: Result<(), String> = match step {
            Step::AcknowledgeReminder => {
                editor.acknowledge_legal_reminder();
                Ok(())
            }
            Step::Mount(surface) => {
                bounds = surface.bounds();
                if editor.mount_signature_surface(surface.geometry(), bounds) {
                    Ok(())
                } else {
                    Err("surface not laid out, sizing deferred".to_owned())
                }
            }
            Step::SelectTemplate => {
                editor.select_template();
                Ok(())
            }
            Step::SelectNewUpload => {
                editor.select_new_upload();
                Ok(())
            }
            Step::SelectRepository { id } => id
                .parse::<DocumentId>()
                .map_err(|e| e.to_string())
                .and_then(|id| {
                    editor
                        .select_repository_document(id)
                        .map_err(|e| e.to_string())
                }),
            Step::Edit { text } => editor.edit_content(text.as_str()).map_err(|e| e.to_string()),
            Step::Stroke { points, touch } => {
                gesture(points, *touch, bounds)
                    .iter()
                    .for_each(|event| editor.pointer(event));
                Ok(())
            }
            Step::Pointer { phase, x, y, touch } => {
                editor.pointer(&PointerEvent::new(
                    (*phase).into(),
                    make_input(*x, *y, *touch),
                ));
                Ok(())
            }
            Step::Confirm => editor
                .confirm_signature()
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Step::Clear => {
                editor.clear_signature();
                Ok(())
            }
            Step::Finalize { category } => {
                let category = category.as_deref().unwrap_or(&config.will_category);
                stored.push(editor.finalize_and_store(category));
                Ok(())
            }
            Step::Seal { password, category } => {
                let category = category.as_deref().unwrap_or(&config.will_category);
                editor
                    .seal_and_store(category, password)
                    .map(|file| stored.push(file))
                    .map_err(|e| e.to_string())
            }
            Step::Back => {
                editor.go_back();
                Ok(())
            }
            Step::Assistant => {
                editor.open_assistant();
                Ok(())
            }
        };
        if let Err(reason) = result {
            log::warn!("step {idx} ({step:?}) rejected: {reason}");
            rejected.push((idx, reason));
        }
    }

    Report {
        preview: editor.preview().render_text(),
        signature_png: editor
            .signature()
            .rasterized()
            .map(|signature| signature.png().to_vec()),
        stored,
        rejected,
    }
}

fn make_input(x: f32, y: f32, touch: bool) -> PointerInput {
    if touch {
        PointerInput::touch(x, y)
    } else {
        PointerInput::mouse(x, y)
    }
}

/// Expand surface-local points into client-space press, drags and release.
fn gesture(points: &[[f32; 2]], touch: bool, bounds: SurfaceBounds) -> Vec<PointerEvent> {
    let client = |[x, y]: [f32; 2]| make_input(x + bounds.left, y + bounds.top, touch);
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut events = Vec::with_capacity(points.len() + 1);
    events.push(PointerEvent::new(PointerPhase::Down, client(*first)));
    events.extend(
        rest.iter()
            .map(|point| PointerEvent::new(PointerPhase::Move, client(*point))),
    );
    let last = rest.last().unwrap_or(first);
    events.push(PointerEvent::new(PointerPhase::Up, client(*last)));
    events
}

/// Replay a script file and write its outputs.
pub fn run_path(
    path: &std::path::Path,
    config: &EditorConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Report> {
    use anyhow::Context;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let script = Script::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
    let report = replay(&script, config, clock);

    let base = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let out_dir = script
        .output
        .as_ref()
        .map_or_else(|| base.to_path_buf(), |output| base.join(output));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let stem = path
        .file_stem()
        .map_or_else(|| "session".into(), |stem| stem.to_string_lossy());

    std::fs::write(out_dir.join(format!("{stem}.preview.txt")), &report.preview)?;
    if let Some(png) = &report.signature_png {
        std::fs::write(out_dir.join(format!("{stem}.signature.png")), png)?;
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{replay, Script};
    use willpad_core::editor::{FixedClock, NaiveDate};
    use willpad_core::store::FileItem;
    use willpad_core::EditorConfig;

    const SESSION: &str = r#"
        [surface]
        width = 300.0
        height = 128.0
        dpr = 2.0
        left = 16.0
        top = 400.0

        [[seed."遺囑文件"]]
        name = "Signed_Will_2024-05-20.pdf"
        date = "2024/05/20"
        size = "1.8 MB"

        [[seed."遺囑文件"]]
        name = "Will_Draft_2024-01-02.pdf"
        date = "2024/01/02"
        size = "1.2 MB"
        isNew = true

        [[step]]
        action = "acknowledge_reminder"

        [[step]]
        action = "select_repository"
        id = "repo-7"

        [[step]]
        action = "select_repository"
        id = "repo-1"

        [[step]]
        action = "edit"
        text = "cannot edit a stub"

        [[step]]
        action = "select_template"

        [[step]]
        action = "confirm"

        [[step]]
        action = "stroke"
        touch = true
        points = [[10.0, 60.0], [60.0, 70.0], [110.0, 55.0], [160.0, 65.0], [210.0, 60.0]]

        [[step]]
        action = "confirm"

        [[step]]
        action = "finalize"

        [[step]]
        action = "seal"
        password = "12"

        [[step]]
        action = "seal"
        password = "1234"
    "#;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()))
    }

    #[test]
    fn parses_seed_and_steps() {
        let script = Script::parse(SESSION).unwrap();
        assert_eq!(script.steps.len(), 11);
        let seeded = &script.seed["遺囑文件"];
        assert_eq!(seeded.len(), 2);
        assert!(!seeded[0].is_new);
        assert!(seeded[1].is_new);
    }
    #[test]
    fn replays_session() {
        let script = Script::parse(SESSION).unwrap();
        let report = replay(&script, &EditorConfig::default(), clock());

        // Unknown repo id, stub edit, confirm with no ink, short password.
        let rejected: Vec<_> = report.rejected.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(rejected, [1, 3, 5, 9]);

        let png = report.signature_png.unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(!report.preview.contains("尚未簽署"));

        let names: Vec<_> = report.stored.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(
            names,
            ["Will_Draft_2026-10-19.pdf", "Signed_Will_2026-10-19.pdf"]
        );
    }
    #[test]
    fn empty_script() {
        let report = replay(&Script::default(), &EditorConfig::default(), clock());
        assert!(report.rejected.is_empty());
        assert!(report.signature_png.is_none());
        assert!(report.preview.contains("尚未簽署"));
    }
    #[test]
    fn descriptor_field_names() {
        let file = FileItem {
            name: "a.pdf".to_owned(),
            date: "2026/10/19".to_owned(),
            size: "1 KB".to_owned(),
            is_new: true,
        };
        let text = toml::to_string(&file).unwrap();
        assert!(text.contains("isNew = true"));
    }
}
