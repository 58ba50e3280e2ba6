//! Process-wide setup, loaded once at startup and passed down explicitly.

pub mod preferences;
