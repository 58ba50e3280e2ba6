use willpad_core::EditorConfig;

const DOCUMENTATION: &str = r#"# willpad preferences. You may edit this file, but be aware that formatting and comments will not
# be preserved. Every key is optional, missing keys take their default value.

# Examples:
# will_category = "遺囑文件"
# [stroke]
# color = [0, 0, 0, 255]
# width = 2.5
# [sizing]
# fallback_css_size = [320.0, 128.0]

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

pub struct Preferences {
    failed_to_load: bool,
    pub editor: EditorConfig,
}
impl Preferences {
    const FILENAME: &'static str = "willpad.toml";
    /// Load from the user's preferences directory, or default if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        match preferences_dir() {
            None => Self::no_path(),
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        }
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("Preferences weren't available, defaulting.");
        Self {
            failed_to_load: true,
            editor: EditorConfig::default(),
        }
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        let editor: anyhow::Result<EditorConfig> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let editor : EditorConfig = toml::from_str(&string)?;
            Ok(editor)
        };

        match editor {
            Ok(editor) => Self {
                failed_to_load: false,
                editor,
            },
            Err(e) => {
                log::debug!("Couldn't read {}: {e:#}", path.display());
                Self::no_path()
            }
        }
    }
    /// Return true if loading user's settings failed. In that case the defaults are in use, and saving
    /// them gives the user something to edit.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &Self::serialize(&self.editor)?;
        std::fs::write(preferences, string)?;
        Ok(())
    }
    fn serialize(editor: &EditorConfig) -> anyhow::Result<String> {
        Ok(toml::ser::to_string_pretty(editor)?)
    }
}
