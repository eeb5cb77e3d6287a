// Inputbind CLI
// Loads bind documents and user overrides, lists them, and replays recorded input

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;

use inputbind_core::{
    decode_event, default_settings_content, BindEngine, BindRegistry, DirBindSource,
    JsonConfigStore, Settings,
};

/// Input binding engine front end
#[derive(Parser, Debug)]
#[command(name = "inputbind")]
#[command(version)]
#[command(about = "Resolve and replay input binds", long_about = None)]
struct Args {
    /// TOML settings file
    #[arg(short, long, value_name = "SETTINGS")]
    config: Option<PathBuf>,

    /// Directory scanned for bind documents
    #[arg(short, long, value_name = "DIR")]
    binds: Option<PathBuf>,

    /// User bind override file (JSON)
    #[arg(short, long, value_name = "FILE")]
    user_config: Option<PathBuf>,

    /// Validate bind documents and overrides, then exit
    #[arg(long)]
    check_config: bool,

    /// Write a commented settings file to --config (or the default path), then exit
    #[arg(long)]
    init_config: bool,

    /// Print every bind entry with its active binds
    #[arg(long)]
    list_binds: bool,

    /// Replay a recorded event script (JSON array of frames)
    #[arg(long, value_name = "SCRIPT")]
    replay: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// One scripted event, optionally marked as consumed by the host
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptItem {
    Wrapped {
        event: Value,
        #[serde(default)]
        consumed: bool,
    },
    Bare(Value),
}

impl ScriptItem {
    fn parts(&self) -> (&Value, bool) {
        match self {
            ScriptItem::Wrapped { event, consumed } => (event, *consumed),
            ScriptItem::Bare(event) => (event, false),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_default().context("failed to load default settings")?,
    };
    if let Some(dir) = &args.binds {
        settings.set_binds_dir(dir);
    }
    if let Some(path) = &args.user_config {
        settings.set_user_config(path);
    }
    Ok(settings)
}

/// Write the default settings file, refusing to replace an existing one
fn init_config(path: &Path) -> Result<Settings> {
    if path.exists() {
        bail!("settings file {} already exists", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, default_settings_content())
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Settings: wrote defaults to {}", path.display());
    Settings::from_file(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

fn open_store(settings: &Settings) -> Result<JsonConfigStore> {
    let path = settings
        .user_config()
        .map(Path::to_path_buf)
        .or_else(JsonConfigStore::default_path);
    match path {
        Some(path) => JsonConfigStore::open(&path)
            .with_context(|| format!("failed to open user config {}", path.display())),
        None => Ok(JsonConfigStore::new()),
    }
}

fn build_engine(settings: &Settings) -> Result<BindEngine> {
    let Some(dir) = settings.binds_dir() else {
        bail!("no bind directory configured (use --binds or [paths] binds_dir)");
    };
    if !dir.is_dir() {
        bail!("bind directory {} does not exist", dir.display());
    }
    let source = DirBindSource::new(dir).with_extension(settings.binds_extension());
    let store = open_store(settings)?;
    Ok(BindEngine::new(source, store)?)
}

fn print_binds(registry: &BindRegistry) {
    for category in registry.categories() {
        println!("[{}] {}", category.id(), category.name());
        for entry in category.entries() {
            let binds: Vec<String> = entry.custom_binds().iter().map(ToString::to_string).collect();
            let marker = if entry.custom_binds() == entry.default_binds() {
                ""
            } else {
                " (custom)"
            };
            println!(
                "  {}.{} \"{}\": {}{}",
                category.id(),
                entry.id(),
                entry.name(),
                binds.join(", "),
                marker
            );
        }
    }
}

fn replay(engine: &mut BindEngine, script: &Path) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read replay script {}", script.display()))?;
    let frames: Vec<Vec<ScriptItem>> = serde_json::from_str(&content)
        .with_context(|| format!("invalid replay script {}", script.display()))?;

    let entries: Vec<(String, String)> = engine
        .registry()
        .iter_entries()
        .map(|(_, entry)| (entry.category_id().to_string(), entry.id().to_string()))
        .collect();

    for (index, frame) in frames.iter().enumerate() {
        for item in frame {
            let (json, consumed) = item.parts();
            match decode_event(json)
                .with_context(|| format!("frame {}: bad event {}", index, json))?
            {
                Some(event) => {
                    engine.handle_input(&event, consumed);
                }
                None => log::warn!("frame {}: skipping event {}", index, json),
            }
        }

        println!("Frame {}: {} event(s)", index, engine.events_this_frame().len());
        for (category, id) in &entries {
            let down = engine.bind_down(category, id);
            let up = engine.bind_up(category, id);
            let held = engine.bind_held(category, id);
            if down.is_none() && up.is_none() && !held {
                continue;
            }
            let mut activity = Vec::new();
            if let Some(n) = down {
                activity.push(format!("down x{}", n));
            }
            if let Some(n) = up {
                activity.push(format!("up x{}", n));
            }
            if held {
                activity.push("held".to_string());
            }
            println!("  {}.{}: {}", category, id, activity.join(", "));
        }

        engine.update();
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.init_config {
        let Some(path) = args.config.clone().or_else(Settings::default_path) else {
            bail!("no settings path given and no config directory found");
        };
        init_config(&path)?;
        println!("Wrote settings to {}", path.display());
        return Ok(());
    }

    let settings = load_settings(&args)?;
    let mut engine = build_engine(&settings)?;

    if args.check_config {
        if let Some(path) = settings.source_path() {
            println!("Settings: {}", path.display());
        }
        let registry = engine.registry();
        println!(
            "Configuration is valid: {} categories, {} bind entries",
            registry.categories().count(),
            registry.entry_count()
        );
        return Ok(());
    }

    if args.list_binds {
        print_binds(engine.registry());
    }

    if let Some(script) = &args.replay {
        replay(&mut engine, script)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["inputbind", "--binds", "/tmp/binds"]);

        assert_eq!(args.binds, Some(PathBuf::from("/tmp/binds")));
        assert_eq!(args.config, None);
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.init_config);
        assert!(!args.list_binds);
        assert!(args.replay.is_none());
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "inputbind",
            "--config",
            "/tmp/settings.toml",
            "--user-config",
            "/tmp/config.json",
            "--list-binds",
            "--replay",
            "/tmp/script.json",
            "--verbose",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/settings.toml")));
        assert_eq!(args.user_config, Some(PathBuf::from("/tmp/config.json")));
        assert_eq!(args.replay, Some(PathBuf::from("/tmp/script.json")));
        assert!(args.list_binds);
        assert!(args.verbose);
    }

    #[test]
    fn test_script_items() {
        let frames: Vec<Vec<ScriptItem>> = serde_json::from_str(
            r#"[[
                { "event": { "type": "KeyUp", "data": { "key": "A" } }, "consumed": true },
                { "type": "KeyUp", "data": { "key": "B" } }
            ]]"#,
        )
        .unwrap();
        let (first, consumed) = frames[0][0].parts();
        assert!(consumed);
        assert_eq!(first["data"]["key"], "A");
        let (second, consumed) = frames[0][1].parts();
        assert!(!consumed);
        assert_eq!(second["type"], "KeyUp");
    }

    #[test]
    fn test_init_config_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputbind").join("settings.toml");

        let settings = init_config(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), default_settings_content());
        assert_eq!(settings.binds_extension(), "binds");
        assert_eq!(settings.source_path(), Some(path.as_path()));

        let err = init_config(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let args = Args::parse_from(["inputbind", "--init-config", "--config", "/tmp/s.toml"]);
        assert!(args.init_config);
    }

    #[test]
    fn test_missing_binds_dir() {
        let err = build_engine(&Settings::new()).unwrap_err();
        assert!(err.to_string().contains("no bind directory"));
    }
}
