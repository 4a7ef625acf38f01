//! Persistence layer for console configuration.
//!
//! Provides RON-based save/load of console settings and string globals, and
//! runs the init script for the current application kind at startup.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use bevy::color::Srgba;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConsoleConfig;
use crate::core::{CommandTable, Console};

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

/// Serializable console configuration.
///
/// Every setting is optional; missing ones leave the plugin's value alone.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConsoleConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Edit line color as RGBA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_color: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_render: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_to_debug_display: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Added to the configured hidden symbols.
    #[serde(default)]
    pub hidden_symbols: Vec<String>,
    /// String globals (name -> value).
    #[serde(default)]
    pub globals: BTreeMap<String, String>,
}

impl ConsoleConfigFile {
    /// Create a new empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a config's settings.
    pub fn from_config(config: &ConsoleConfig) -> Self {
        let color = config.input_color;
        Self {
            prompt: Some(config.prompt.clone()),
            input_color: Some([color.red, color.green, color.blue, color.alpha]),
            status_render: Some(config.status_render),
            mirror_to_debug_display: Some(config.mirror_to_debug_display),
            font_size: Some(config.font_size),
            hidden_symbols: config.hidden_symbols.clone(),
            globals: BTreeMap::new(),
        }
    }

    /// Overlay the settings present in this file onto `config`.
    pub fn apply_to(&self, config: &mut ConsoleConfig) {
        if let Some(prompt) = &self.prompt {
            config.prompt.clone_from(prompt);
        }
        if let Some([r, g, b, a]) = self.input_color {
            config.input_color = Srgba::new(r, g, b, a);
        }
        if let Some(status_render) = self.status_render {
            config.status_render = status_render;
        }
        if let Some(mirror) = self.mirror_to_debug_display {
            config.mirror_to_debug_display = mirror;
        }
        if let Some(font_size) = self.font_size {
            config.font_size = font_size;
        }
        for symbol in &self.hidden_symbols {
            if !config
                .hidden_symbols
                .iter()
                .any(|s| s.eq_ignore_ascii_case(symbol))
            {
                config.hidden_symbols.push(symbol.clone());
            }
        }
    }

    /// Set the file's globals on `table`, registering the ones it lacks.
    pub fn apply_globals(&self, table: &mut CommandTable) {
        for (name, value) in &self.globals {
            if table.set_global(name, value) {
                debug!("Loaded global: {} = \"{}\"", name, value);
            } else if table.contains(name) {
                warn!("Failed to set '{}': not a global", name);
            } else {
                table.register_global(name, "Loaded from config", value.as_str());
            }
        }
    }

    /// Load config from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;

        ron::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
    }

    /// Save config to a RON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Io(parent.display().to_string(), e.to_string()))?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);

        let contents = ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))
    }

    /// Load config from file, returning default if file doesn't exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

/// Errors that can occur during config operations.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error (path, message).
    Io(String, String),
    /// Parse error (path, message).
    Parse(String, String),
    /// Serialization error.
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, msg) => write!(f, "IO error for '{}': {}", path, msg),
            ConfigError::Parse(path, msg) => write!(f, "Parse error for '{}': {}", path, msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resource tracking the config file path.
#[derive(Resource, Debug, Clone)]
pub struct ConfigPath(pub String);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(DEFAULT_CONFIG_FILE.to_string())
    }
}

/// What kind of application is running; picks the init script.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationKind {
    #[default]
    Game,
    Editor,
    /// Command line tool.
    Tool,
    /// Interactive tool.
    Guerilla,
}

impl ApplicationKind {
    /// Init script file name.
    pub fn init_file_name(self) -> &'static str {
        match self {
            ApplicationKind::Game => "init.txt",
            ApplicationKind::Editor => "editor_init.txt",
            ApplicationKind::Tool => "tool_init.txt",
            ApplicationKind::Guerilla => "guerilla_init.txt",
        }
    }
}

/// Directory the init script is looked up in; the working directory when unset.
#[derive(Resource, Debug, Clone, Default)]
pub struct InitDirectory(pub Option<PathBuf>);

/// Run the init script for `kind` from `directory`.
///
/// Returns `Ok(None)` when there is no such script, otherwise the number of
/// commands that succeeded.
pub fn run_init_file(
    console: &mut Console,
    directory: Option<&Path>,
    kind: ApplicationKind,
) -> Result<Option<usize>, ConfigError> {
    let path = match directory {
        Some(directory) => directory.join(kind.init_file_name()),
        None => PathBuf::from(kind.init_file_name()),
    };
    let io_error = |e: io::Error| ConfigError::Io(path.display().to_string(), e.to_string());

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(e)),
    };

    console
        .execute_script(BufReader::new(file))
        .map(Some)
        .map_err(io_error)
}

/// System to load config on startup.
pub fn load_config_on_startup(
    mut console: NonSendMut<Console>,
    mut config: ResMut<ConsoleConfig>,
    config_path: Res<ConfigPath>,
) {
    let path = &config_path.0;

    if !Path::new(path).exists() {
        info!("No config file found at '{}', using defaults", path);
        return;
    }

    match ConsoleConfigFile::load(path) {
        Ok(file) => {
            info!("Loading config from '{}'", path);
            file.apply_to(&mut config);
            console.set_config(config.clone());

            if let Some(table) = console.host_mut::<CommandTable>() {
                file.apply_globals(table);
            }

            info!("Loaded {} globals", file.globals.len());
        }
        Err(e) => {
            error!("Failed to load config: {}", e);
        }
    }
}

/// System to run the init script on startup.
pub fn execute_init_file(
    mut console: NonSendMut<Console>,
    kind: Res<ApplicationKind>,
    directory: Option<Res<InitDirectory>>,
) {
    let directory = directory.and_then(|d| d.0.clone());
    match run_init_file(&mut console, directory.as_deref(), *kind) {
        Ok(Some(succeeded)) => info!("Ran {}: {} commands succeeded", kind.init_file_name(), succeeded),
        Ok(None) => debug!("No {} to run", kind.init_file_name()),
        Err(e) => error!("Failed to run init file: {}", e),
    }
}

/// Save the console's settings and its command table's globals to file.
pub fn save_config(console: &Console, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let mut file = ConsoleConfigFile::from_config(console.config());

    if let Some(table) = console.host::<CommandTable>() {
        for (name, value) in table.globals() {
            file.globals.insert(name.to_string(), value.to_string());
        }
    }

    file.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_file_roundtrip() {
        let mut config = ConsoleConfigFile::from_config(&ConsoleConfig::default());
        config.globals.insert("fov".to_string(), "90".to_string());

        let temp = NamedTempFile::new().unwrap();
        config.save(temp.path()).unwrap();

        let loaded = ConsoleConfigFile::load(temp.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.prompt.as_deref(), Some("donkey( "));
    }

    #[test]
    fn test_config_file_load_missing() {
        let result = ConsoleConfigFile::load("nonexistent_file.ron");
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_config_file_load_or_default() {
        let config = ConsoleConfigFile::load_or_default("nonexistent_file.ron");
        assert_eq!(config, ConsoleConfigFile::default());
    }

    #[test]
    fn test_config_parse_ron() {
        let ron_content = r#"(
    prompt: Some("] "),
    status_render: Some(false),
    hidden_symbols: ["secret"],
    globals: {
        "fov": "90",
    },
)"#;

        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(ron_content.as_bytes()).unwrap();
        temp.flush().unwrap();

        let file = ConsoleConfigFile::load(temp.path()).unwrap();
        let mut config = ConsoleConfig::default();
        file.apply_to(&mut config);

        assert_eq!(config.prompt, "] ");
        assert!(!config.status_render);
        assert_eq!(config.hidden_symbols, vec!["secret"]);
        // untouched settings keep their values
        assert_eq!(config.font_size, ConsoleConfig::default().font_size);
        assert_eq!(file.globals.get("fov").map(String::as_str), Some("90"));
    }

    #[test]
    fn test_config_parse_error() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"(prompt: 12)").unwrap();
        temp.flush().unwrap();

        let result = ConsoleConfigFile::load(temp.path());
        assert!(matches!(result, Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_apply_globals() {
        let mut table = CommandTable::with_builtins();
        table.register_global("fov", "Field of view", "70");

        let mut file = ConsoleConfigFile::new();
        file.globals.insert("fov".into(), "90".into());
        file.globals.insert("sensitivity".into(), "2".into());
        file.globals.insert("echo".into(), "x".into());
        file.apply_globals(&mut table);

        assert_eq!(table.global("fov"), Some("90"));
        assert_eq!(table.global("sensitivity"), Some("2"));
        // commands are not overwritten
        assert_eq!(table.global("echo"), None);
        assert!(table.contains("echo"));
    }

    #[test]
    fn test_save_config_includes_globals() {
        let mut console = Console::new(ConsoleConfig::default(), CommandTable::with_builtins());
        if let Some(table) = console.host_mut::<CommandTable>() {
            table.register_global("fov", "Field of view", "70");
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("console.ron");
        save_config(&console, &path).unwrap();

        let loaded = ConsoleConfigFile::load(&path).unwrap();
        assert_eq!(loaded.globals.get("fov").map(String::as_str), Some("70"));
        assert_eq!(loaded.status_render, Some(true));
    }

    #[test]
    fn test_init_file_names() {
        assert_eq!(ApplicationKind::Game.init_file_name(), "init.txt");
        assert_eq!(ApplicationKind::Editor.init_file_name(), "editor_init.txt");
        assert_eq!(ApplicationKind::Tool.init_file_name(), "tool_init.txt");
        assert_eq!(ApplicationKind::Guerilla.init_file_name(), "guerilla_init.txt");
    }

    #[test]
    fn test_run_init_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("editor_init.txt"), "echo ready\n; comment\nbogus\n").unwrap();

        let mut console = Console::new(ConsoleConfig::default(), CommandTable::with_builtins());
        let ran = run_init_file(&mut console, Some(dir.path()), ApplicationKind::Editor).unwrap();
        assert_eq!(ran, Some(1));
        assert_eq!(console.history().len(), 2);

        let missing = run_init_file(&mut console, Some(dir.path()), ApplicationKind::Game).unwrap();
        assert_eq!(missing, None);
    }
}
