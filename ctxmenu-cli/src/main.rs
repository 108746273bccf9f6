//! ctxmenu CLI - editor context-menu actions for TypeScript and JavaScript files

#![deny(warnings)]

// Global invariants enforced:
// - Every command builds its own locator and config; nothing is shared
// - Machine output (--format json) goes to stdout, logs go to stderr

use anyhow::Context;
use clap::{Parser, Subcommand};
use ctxmenu_core::config::{self, ResolvedConfig};
use ctxmenu_core::terminal::Platform;
use ctxmenu_core::{
    find_compatible_files, plan_terminal, resolve_project, CodeRange, Cursor, FunctionLocator,
    FunctionSpan, Position, TerminalLaunch,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ctxmenu")]
#[command(about = "Locate, copy and move TypeScript/JavaScript functions from the command line")]
#[command(version)]
struct Cli {
    /// Log detection details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Cursor given on the command line
#[derive(clap::Args, Clone, Copy)]
struct CursorArgs {
    /// 1-based line of the cursor
    #[arg(long, required_unless_present = "offset")]
    line: Option<u32>,

    /// 0-based column of the cursor, in UTF-16 units
    #[arg(long, default_value_t = 0)]
    column: u32,

    /// Absolute cursor offset in UTF-16 units (instead of --line/--column)
    #[arg(long, conflicts_with = "line")]
    offset: Option<usize>,
}

impl CursorArgs {
    fn cursor(&self) -> Cursor {
        match (self.offset, self.line) {
            (Some(offset), _) => Cursor::Offset(offset),
            (None, line) => Cursor::Position(Position::new(
                line.unwrap_or(1).saturating_sub(1),
                self.column,
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the function enclosing a cursor
    Locate {
        /// Source file
        file: PathBuf,

        #[command(flatten)]
        cursor: CursorArgs,

        /// Print the function's full text
        #[arg(long)]
        code: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// List every function in a file
    List {
        /// Source file
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// List the import statements of a file
    Imports {
        /// Source file
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Detect the project type of a folder
    Project {
        /// Project root (default: current directory)
        path: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// List files that can receive code from a source file
    Targets {
        /// Source file
        file: PathBuf,

        /// Project root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Copy the function at a cursor into another file
    Copy {
        #[command(flatten)]
        transfer: TransferArgs,
    },
    /// Move the function at a cursor into another file
    Move {
        #[command(flatten)]
        transfer: TransferArgs,
    },
    /// Show how a terminal for a file would be opened (nothing is spawned)
    Terminal {
        /// File or folder the terminal is opened for
        file: PathBuf,

        /// Workspace root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the resolved configuration
    Config {
        /// Project root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct TransferArgs {
    /// Source file
    file: PathBuf,

    #[command(flatten)]
    cursor: CursorArgs,

    /// Target file
    #[arg(long)]
    to: PathBuf,

    /// Project root used for config discovery (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Locate {
            file,
            cursor,
            code,
            format,
        } => {
            let text = read_source(&file)?;
            let hint = file.to_string_lossy();
            let Some(function) = FunctionLocator::new().locate(&text, &hint, cursor.cursor()) else {
                anyhow::bail!("no function found at cursor in {}", file.display());
            };
            match format {
                OutputFormat::Text => {
                    println!("{}", describe(&function));
                    if code {
                        println!("{}", function.full_text);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&function)?),
            }
        }
        Commands::List { file, format } => {
            let text = read_source(&file)?;
            let functions = FunctionLocator::new().functions(&text, &file.to_string_lossy());
            match format {
                OutputFormat::Text => {
                    for function in &functions {
                        println!("{}", describe(function));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&functions)?),
            }
        }
        Commands::Imports { file, format } => {
            let text = read_source(&file)?;
            let imports = FunctionLocator::new().extract_imports(&text, &file.to_string_lossy());
            match format {
                OutputFormat::Text => {
                    for import in &imports {
                        println!("{}", import);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&imports)?),
            }
        }
        Commands::Project {
            path,
            config,
            format,
        } => {
            let root = resolve_root(path)?;
            let resolved = load_config(&root, config.as_deref())?;
            let project = resolve_project(&root, &resolved.settings);
            match format {
                OutputFormat::Text => {
                    let frameworks: Vec<&str> = project.frameworks.iter().map(|f| f.as_str()).collect();
                    println!(
                        "Node project: {} | TypeScript: {} | Frameworks: {} | Support: {:?}",
                        yes_no(project.is_node_project),
                        yes_no(project.has_typescript),
                        if frameworks.is_empty() {
                            "None".to_string()
                        } else {
                            frameworks.join(", ")
                        },
                        project.support_level
                    );
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "project": project,
                        "context": project.context_flags(),
                    });
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
            }
        }
        Commands::Targets {
            file,
            root,
            config,
            format,
        } => {
            let root = resolve_root(root)?;
            let resolved = load_config(&root, config.as_deref())?;
            let extension = file
                .extension()
                .and_then(|e| e.to_str())
                .with_context(|| format!("source file has no extension: {}", file.display()))?;

            let source = file.canonicalize().unwrap_or_else(|_| file.clone());
            let files: Vec<_> = find_compatible_files(&root, extension, &resolved)?
                .into_iter()
                .filter(|candidate| candidate.path.canonicalize().ok().as_ref() != Some(&source))
                .collect();
            match format {
                OutputFormat::Text => {
                    for candidate in &files {
                        println!("{}", candidate.relative_path.display());
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
            }
        }
        Commands::Copy { transfer } => run_transfer(transfer, false)?,
        Commands::Move { transfer } => run_transfer(transfer, true)?,
        Commands::Terminal {
            file,
            root,
            config,
            format,
        } => {
            let root = resolve_root(root)?;
            let resolved = load_config(&root, config.as_deref())?;
            let file = if file.is_relative() {
                std::env::current_dir()?.join(file)
            } else {
                file
            };
            let launch = plan_terminal(
                &file,
                Some(&root),
                &resolved.settings.terminal,
                Platform::current(),
            )?;
            match format {
                OutputFormat::Text => match &launch {
                    TerminalLaunch::Integrated { name, directory } => {
                        println!("Integrated terminal '{}' in {}", name, directory.display());
                    }
                    TerminalLaunch::Command { command_line, .. } => println!("{}", command_line),
                },
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&launch)?),
            }
        }
        Commands::Config { root, config } => {
            let root = resolve_root(root)?;
            let resolved = load_config(&root, config.as_deref())?;
            if let Some(path) = &resolved.config_path {
                eprintln!("Loaded config from {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&resolved.settings)?);
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "ctxmenu_core=debug,info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_transfer(args: TransferArgs, remove_from_source: bool) -> anyhow::Result<()> {
    let root = resolve_root(args.root)?;
    let resolved = load_config(&root, args.config.as_deref())?;
    let settings = &resolved.settings;

    if !settings.enabled {
        anyhow::bail!("context menus are disabled by configuration");
    }
    let extension = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if !settings.supports_extension(extension) {
        anyhow::bail!(
            "{} is not in supportedExtensions ({})",
            args.file.display(),
            settings.supported_extensions.join(", ")
        );
    }

    if resolved.excludes_target(&root, &args.to) {
        anyhow::bail!("{} is excluded by configuration", args.to.display());
    }

    let text = read_source(&args.file)?;
    let Some(function) =
        FunctionLocator::new().locate(&text, &args.file.to_string_lossy(), args.cursor.cursor())
    else {
        anyhow::bail!("no function found at cursor in {}", args.file.display());
    };

    tracing::debug!(
        function = %function.label(),
        start_line = function.start_line,
        end_line = function.end_line,
        "transferring function"
    );

    let range = CodeRange::from_function(&function);
    let outcome = if remove_from_source {
        ctxmenu_core::move_to_file(&args.file, range, &args.to, &settings.copy_code)?
    } else {
        ctxmenu_core::copy_to_file(&args.file, range, &args.to, &settings.copy_code)?
    };

    match args.format {
        OutputFormat::Text => {
            let target_name = args
                .to
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let verb = if outcome.moved { "moved" } else { "copied" };
            println!(
                "{} {} to {} (line {})",
                capitalize(&function.label()),
                verb,
                target_name,
                outcome.insertion_line + 1
            );
            for import in &outcome.imports_added {
                println!("  + {}", import);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(())
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Normalize an optional root to an absolute path
fn resolve_root(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = match path {
        Some(path) if path.is_relative() => cwd.join(path),
        Some(path) => path,
        None => cwd,
    };
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }
    Ok(root)
}

fn load_config(root: &Path, config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    config::load_and_resolve(root, config_path).context("failed to load configuration")
}

/// One-line summary, e.g. `hook 'useCart' lines 3-12 [exported]`
fn describe(function: &FunctionSpan) -> String {
    let mut flags = Vec::new();
    if function.is_exported {
        flags.push("exported");
    }
    if function.has_decorators {
        flags.push("decorated");
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    format!(
        "{} lines {}-{}{}",
        function.label(),
        function.start_line,
        function.end_line,
        flags
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}
