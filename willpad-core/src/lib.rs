#![warn(clippy::pedantic)]

pub mod assistant;
pub mod config;
pub mod document;
pub mod editor;
pub mod preview;
pub mod raster;
pub mod recorder;
pub mod signature;
pub mod store;
pub mod stroke;
pub mod surface;

pub use config::EditorConfig;
pub use editor::WillEditor;
