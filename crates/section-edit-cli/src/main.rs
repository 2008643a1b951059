use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, LevelFilter};
use regex::Regex;
use section_edit_config::{Config, LoadOptions};
use section_edit_core::syntax::NAME_PLACEHOLDER;
use section_edit_core::{
    apply_edit, read_section, EditError, EditOptions, EditOutcome, EditRequest, ExitCode,
    MatchMode, Operation, PayloadSource, ReplaceOptions,
};
use simple_logger::SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit sentinel-delimited sections of text files", long_about = None)]
struct Cli {
    /// Path to the document
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Operation to perform (replace, prepend, append, show)
    #[arg(value_name = "OPERATION")]
    operation: OperationArg,

    /// Name of the section
    #[arg(value_name = "SECTION")]
    section: String,

    /// Read payload from file (use '-' for stdin)
    #[arg(long = "with", value_name = "PATH", allow_hyphen_values = true)]
    with: Option<PathBuf>,

    /// Inline payload with escape sequences (\\n, \\t, \\\\ , \\")
    #[arg(long = "with-string", value_name = "TEXT", allow_hyphen_values = true)]
    with_string: Option<String>,

    /// Surround replaced content with blank lines
    #[arg(long = "padding")]
    padding: bool,

    /// Never pad replaced content, whatever the config says
    #[arg(long = "no-padding", conflicts_with = "padding")]
    no_padding: bool,

    /// Treat sentinel patterns as regular expressions
    #[arg(short = 'r', long = "regex")]
    regex: bool,

    /// Start sentinel template; `{name}` is replaced with the section name
    #[arg(long = "start", value_name = "TEMPLATE", allow_hyphen_values = true)]
    start: Option<String>,

    /// End sentinel template; `{name}` is replaced with the section name
    #[arg(long = "end", value_name = "TEMPLATE", allow_hyphen_values = true)]
    end: Option<String>,

    /// Explicit configuration file (takes precedence over discovered ones)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print diff without writing changes
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Force creation of backup (default behaviour)
    #[arg(long = "backup")]
    backup: bool,

    /// Disable backup creation
    #[arg(long = "no-backup", conflicts_with = "backup")]
    no_backup: bool,

    /// Suppress informational output (diffs, success messages)
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OperationArg {
    Replace,
    Prepend,
    Append,
    Show,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);
    match run(cli) {
        Ok(exit) | Err(exit) => std::process::ExitCode::from(exit as u8),
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    if let Err(err) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("failed to initialise logging: {err}");
    }
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    let options = build_options(&cli)?;

    if cli.operation == OperationArg::Show {
        ensure_no_payload(&cli)?;
        return match read_section(&cli.file, &cli.section, &options) {
            Ok(lines) => {
                let mut stdout = io::stdout().lock();
                for line in lines {
                    writeln!(stdout, "{line}").ok();
                }
                Ok(ExitCode::Success)
            }
            Err(err) => {
                let exit = err.exit_code();
                handle_error(&cli, &options, &err);
                Err(exit)
            }
        };
    }

    let operation = build_operation(&cli)?;
    let request = EditRequest {
        path: cli.file.clone(),
        section: cli.section.clone(),
        options: options.clone(),
        operation,
    };

    match apply_edit(request) {
        Ok(outcome) => {
            handle_success(&cli, &outcome);
            Ok(outcome.exit_code)
        }
        Err(err) => {
            let exit = err.exit_code();
            handle_error(&cli, &options, &err);
            Err(exit)
        }
    }
}

fn build_options(cli: &Cli) -> Result<EditOptions, ExitCode> {
    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }

    let config = Config::load(load).map_err(|err| {
        eprintln!("{err}");
        ExitCode::InvalidArguments
    })?;
    debug!("configuration layers: {:?}", config.sources.layers);

    let mut options = config.edit_options();

    if cli.padding {
        options.editor.padding = true;
    } else if cli.no_padding {
        options.editor.padding = false;
    }

    if cli.regex {
        options.editor.match_mode = MatchMode::Regex;
    }

    if let Some(start) = &cli.start {
        ensure_template("--start", start)?;
        options.syntax.start = start.clone();
    }
    if let Some(end) = &cli.end {
        ensure_template("--end", end)?;
        options.syntax.end = end.clone();
    }

    options.dry_run = cli.dry_run;
    options.backup = match (cli.backup, cli.no_backup) {
        (_, true) => false,
        (true, false) | (false, false) => true,
    };

    Ok(options)
}

fn ensure_template(flag: &str, template: &str) -> Result<(), ExitCode> {
    if template.contains(NAME_PLACEHOLDER) {
        return Ok(());
    }
    eprintln!("{flag} template '{template}' must contain {NAME_PLACEHOLDER}");
    Err(ExitCode::InvalidArguments)
}

fn build_operation(cli: &Cli) -> Result<Operation, ExitCode> {
    let payload = require_payload(cli)?;
    match cli.operation {
        OperationArg::Replace => Ok(Operation::Replace(ReplaceOptions {
            payload,
            // Config padding already lives in the editor options.
            padding: None,
        })),
        OperationArg::Prepend => Ok(Operation::Prepend(payload)),
        OperationArg::Append => Ok(Operation::Append(payload)),
        OperationArg::Show => Err(ExitCode::InvalidArguments),
    }
}

fn ensure_no_payload(cli: &Cli) -> Result<(), ExitCode> {
    if cli.with.is_some() || cli.with_string.is_some() {
        eprintln!("--with / --with-string cannot be used with 'show'");
        return Err(ExitCode::InvalidArguments);
    }
    Ok(())
}

fn require_payload(cli: &Cli) -> Result<PayloadSource, ExitCode> {
    match (&cli.with, &cli.with_string) {
        (Some(_), Some(_)) => {
            eprintln!("--with and --with-string cannot be used together");
            Err(ExitCode::InvalidArguments)
        }
        (Some(path), None) => {
            if path == Path::new("-") {
                Ok(PayloadSource::Stdin)
            } else {
                Ok(PayloadSource::File(path.clone()))
            }
        }
        (None, Some(text)) => Ok(PayloadSource::Inline(text.clone())),
        (None, None) => {
            eprintln!(
                "Operation '{}' requires --with or --with-string",
                cli.operation
            );
            Err(ExitCode::InvalidArguments)
        }
    }
}

fn handle_success(cli: &Cli, outcome: &EditOutcome) {
    if cli.quiet {
        return;
    }

    if cli.dry_run {
        if let Some(diff) = &outcome.diff {
            print!("{diff}");
            io::stdout().flush().ok();
        } else {
            println!("No changes (dry run)");
        }
        return;
    }

    if outcome.changed {
        if let Some(diff) = &outcome.diff {
            print!("{diff}");
        }
        println!("Updated {}", cli.file.display());
    } else {
        println!("No changes applied (section already up to date).");
    }
}

fn handle_error(cli: &Cli, options: &EditOptions, err: &EditError) {
    match err {
        EditError::SectionNotFound { name } => {
            eprintln!("Section '{name}' could not be identified in {}.", cli.file.display());
            if let Ok(known) = known_sections(&cli.file, &options.syntax.start) {
                if !known.is_empty() {
                    eprintln!("Known sections:");
                    for section in known.iter().take(20) {
                        eprintln!("  - {section}");
                    }
                }
            }
        }
        EditError::InvalidPattern { pattern, source } => {
            eprintln!("Invalid sentinel pattern '{pattern}': {source}");
        }
        EditError::InvalidRange { .. } => {
            eprintln!("{err}");
        }
        EditError::InvalidArguments(message) | EditError::InvalidContent(message) => {
            eprintln!("{message}");
        }
        EditError::Io(io_err) => {
            eprintln!("I/O error: {io_err}");
        }
    }
}

/// Names of sections whose start sentinel appears in `path`, in document order.
fn known_sections(path: &Path, start_template: &str) -> io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let Some(pattern) = template_regex(start_template) else {
        return Ok(Vec::new());
    };

    let mut names: Vec<String> = Vec::new();
    for line in content.split('\n') {
        if let Some(name) = pattern.captures(line).and_then(|caps| caps.get(1)) {
            let name = name.as_str().to_owned();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn template_regex(template: &str) -> Option<Regex> {
    let parts: Vec<String> = template
        .split(NAME_PLACEHOLDER)
        .map(regex::escape)
        .collect();
    if parts.len() < 2 {
        return None;
    }
    Regex::new(&parts.join(r"(\S+)")).ok()
}

impl std::fmt::Display for OperationArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperationArg::Replace => "replace",
            OperationArg::Prepend => "prepend",
            OperationArg::Append => "append",
            OperationArg::Show => "show",
        })
    }
}
