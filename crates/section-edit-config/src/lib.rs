//! Configuration primitives and loader for section-edit.
//!
//! Settings are resolved from a stack of layers, lowest precedence first:
//! built-in defaults → git root → working directory → override flag.
//! Each resolved value remembers the layer it came from so validation
//! failures can point at the offending file.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use section_edit_core::{EditOptions, EditorOptions, MatchMode, SectionEditor, TemplateSyntax};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".section-edit.toml";

const NAME_PLACEHOLDER: &str = section_edit_core::syntax::NAME_PLACEHOLDER;

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub editor: EditorSettings,
    pub syntax: SyntaxSettings,
    pub sources: ConfigSources,
}

/// Defaults applied to every editor built from this configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EditorSettings {
    pub padding: bool,
    pub match_mode: MatchMode,
}

/// Sentinel templates; `{name}` is replaced with the section name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyntaxSettings {
    pub start: String,
    pub end: String,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn builtin() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::builtin();
        let mut merged = defaults_layer(&default_source);
        let mut source_layers = vec![default_source];

        let local_config_path = working_dir.join(CONFIG_FILE_NAME);
        let git_config_path = find_git_root(&working_dir).map(|root| root.join(CONFIG_FILE_NAME));

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, &source)?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, &source)?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, &source)?);
            source_layers.push(source);
        }

        let (editor, syntax) = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            editor,
            syntax,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Built-in defaults without consulting the filesystem.
    pub fn builtin() -> Self {
        let syntax = TemplateSyntax::default();
        Config {
            editor: EditorSettings {
                padding: false,
                match_mode: MatchMode::Literal,
            },
            syntax: SyntaxSettings {
                start: syntax.start,
                end: syntax.end,
            },
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![ConfigSource::builtin()],
            },
        }
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            padding: self.editor.padding,
            match_mode: self.editor.match_mode,
        }
    }

    pub fn template_syntax(&self) -> TemplateSyntax {
        TemplateSyntax::new(self.syntax.start.clone(), self.syntax.end.clone())
    }

    /// Engine options carrying the configured editor defaults and syntax.
    pub fn edit_options(&self) -> EditOptions {
        EditOptions {
            editor: self.editor_options(),
            syntax: self.template_syntax(),
            ..EditOptions::default()
        }
    }

    /// Splits `text` into a [`SectionEditor`] configured from these settings.
    pub fn build_editor(&self, text: &str) -> SectionEditor {
        SectionEditor::from_text(text)
            .with_options(self.editor_options())
            .with_syntax(self.template_syntax())
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn load_layer(path: &Path, source: &ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.into(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.into(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: &ConfigSource) -> PartialConfig {
    let syntax = TemplateSyntax::default();
    PartialConfig {
        padding: Some(Located::new(false, source)),
        match_mode: Some(Located::new(MatchMode::Literal.as_str().to_owned(), source)),
        start: Some(Located::new(syntax.start, source)),
        end: Some(Located::new(syntax.end, source)),
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: &ConfigSource) -> Self {
        Located {
            value,
            source: source.clone(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    padding: Option<Located<bool>>,
    match_mode: Option<Located<String>>,
    start: Option<Located<String>>,
    end: Option<Located<String>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        if other.padding.is_some() {
            self.padding = other.padding;
        }
        if other.match_mode.is_some() {
            self.match_mode = other.match_mode;
        }
        if other.start.is_some() {
            self.start = other.start;
        }
        if other.end.is_some() {
            self.end = other.end;
        }
    }

    fn finalize(self) -> Result<(EditorSettings, SyntaxSettings), ConfigValidationErrors> {
        let mut errors = Vec::new();

        let padding = self.padding.map(|located| located.value).unwrap_or(false);

        let match_mode = match self.match_mode {
            Some(located) => located.value.parse::<MatchMode>().unwrap_or_else(|()| {
                errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!(
                            "unknown match mode '{}' (expected 'literal' or 'regex')",
                            located.value
                        ),
                    )
                    .with_context("editor.match_mode"),
                );
                MatchMode::Literal
            }),
            None => MatchMode::Literal,
        };

        let defaults = TemplateSyntax::default();
        let start = validate_template(self.start, defaults.start, "syntax.start", &mut errors);
        let end = validate_template(self.end, defaults.end, "syntax.end", &mut errors);

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok((
            EditorSettings {
                padding,
                match_mode,
            },
            SyntaxSettings { start, end },
        ))
    }
}

fn validate_template(
    located: Option<Located<String>>,
    fallback: String,
    key: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> String {
    let Some(located) = located else {
        return fallback;
    };

    if located.value.trim().is_empty() {
        errors.push(
            ConfigValidationError::new(Some(located.source), "template cannot be empty".into())
                .with_context(key),
        );
        return fallback;
    }

    if !located.value.contains(NAME_PLACEHOLDER) {
        errors.push(
            ConfigValidationError::new(
                Some(located.source),
                format!(
                    "template '{}' must contain the {NAME_PLACEHOLDER} placeholder",
                    located.value
                ),
            )
            .with_context(key),
        );
        return fallback;
    }

    located.value
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    editor: Option<RawEditor>,
    #[serde(default)]
    syntax: Option<RawSyntax>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEditor {
    #[serde(default)]
    padding: Option<bool>,
    #[serde(default)]
    match_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSyntax {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

impl RawConfig {
    fn into_partial(self, source: &ConfigSource) -> PartialConfig {
        let mut partial = PartialConfig::default();
        if let Some(editor) = self.editor {
            partial.padding = editor.padding.map(|value| Located::new(value, source));
            partial.match_mode = editor.match_mode.map(|value| Located::new(value, source));
        }
        if let Some(syntax) = self.syntax {
            partial.start = syntax.start.map(|value| Located::new(value, source));
            partial.end = syntax.end.map(|value| Located::new(value, source));
        }
        partial
    }
}
