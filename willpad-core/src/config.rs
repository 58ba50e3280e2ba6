//! Editor configuration. Every field has a default, so a partial (or empty) config file is fine.

use crate::raster::StrokeStyle;
use crate::surface::SizingPolicy;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Ink used for signatures.
    pub stroke: StrokeStyle,
    pub sizing: SizingPolicy,
    /// The store category holding will documents.
    pub will_category: String,
    /// Screen navigated to by "back".
    pub home_screen: String,
    /// Screen navigated to by "ask the assistant".
    pub assistant_screen: String,
}
impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle::default(),
            sizing: SizingPolicy::default(),
            will_category: "遺囑文件".to_owned(),
            home_screen: "home".to_owned(),
            assistant_screen: "lawyer".to_owned(),
        }
    }
}
