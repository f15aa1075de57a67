use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{self, CONFIG_FILE};
use crate::io::lock::FileLock;
use crate::io::state::{AppState, write_app_state};
use crate::io::store::{self, Store, atomic_write};
use crate::model::task::{emoji_hint, palette_hint};
use crate::util::locale::Locale;

/// Create the data directory: config.toml, an empty store with the pinned
/// category, and state with onboarding done.
pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let locale: Locale = args.locale.parse()?;

    if store::is_initialized(data_dir) && !args.force {
        return Err(format!(
            "pulse data already exists in {} (use --force to start over)",
            data_dir.display()
        )
        .into());
    }

    fs::create_dir_all(data_dir)?;
    let _lock = FileLock::acquire_default(data_dir)?;

    let config_path = data_dir.join(CONFIG_FILE);
    if args.force || !config_path.exists() {
        atomic_write(&config_path, config_io::initial_config(locale).as_bytes())?;
    }

    store::save_store(data_dir, &Store::fresh(locale))?;

    let mut state = AppState::default();
    state.mark_onboarding_shown();
    write_app_state(data_dir, &state)?;

    tracing::info!(dir = %data_dir.display(), %locale, "initialized");
    println!("Initialized pulse in {}", data_dir.display());
    println!("colors: {}", palette_hint());
    println!("emoji: {}", emoji_hint());
    Ok(())
}
