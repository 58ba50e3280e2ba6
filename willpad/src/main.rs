#![warn(clippy::pedantic)]

use std::sync::Arc;

pub mod global;
pub mod script;

use willpad_core::editor::SystemClock;

use anyhow::Result as AnyResult;

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let preferences = global::preferences::Preferences::load();
    if preferences.did_fail_to_load() {
        // Give the user a file to edit next time.
        if let Err(e) = preferences.save() {
            log::warn!("failed to write default preferences: {e:#}");
        }
    }
    log::debug!("editor config: {:?}", preferences.editor);

    let replay_succeeded = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        // Args are a simple list of session scripts to replay.
        let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
        // Did we have at least one success? No paths is a success.
        let had_success: std::sync::atomic::AtomicBool = paths.is_empty().into();
        paths.into_par_iter().for_each(|path| {
            match script::run_path(&path, &preferences.editor, Arc::new(SystemClock)) {
                Err(e) => {
                    log::error!("failed to replay {path:?}: {e:#}");
                }
                Ok(report) => {
                    had_success.store(true, std::sync::atomic::Ordering::Relaxed);
                    for file in &report.stored {
                        log::info!("{path:?}: stored {} ({}, {})", file.name, file.date, file.size);
                    }
                    for (idx, reason) in &report.rejected {
                        log::warn!("{path:?}: step {idx} rejected: {reason}");
                    }
                    if report.signature_png.is_none() {
                        log::info!("{path:?}: ended unsigned");
                    }
                }
            }
        });

        had_success.into_inner()
    };
    if !replay_succeeded {
        log::warn!("every script failed to replay");
    }
    Ok(())
}
