//! Terminal launch planning
//!
//! Works out which directory a terminal opened from a file should start in
//! and the command line that starts it. Nothing here spawns a process; the
//! caller (an editor host or a shell wrapper) carries out the plan.
//!
//! Global invariants:
//! - The planned directory always exists and is a directory
//! - A plan for an external or system terminal that cannot be built falls
//!   back to the integrated terminal

use crate::config::{OpenBehavior, TerminalConfig, TerminalKind};
use anyhow::Result;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder replaced by the directory in `externalTerminalCommand`
pub const DIRECTORY_PLACEHOLDER: &str = "{{directory}}";

/// Terminal emulators tried on Linux, in order of preference
pub const LINUX_TERMINALS: &[&str] = &["gnome-terminal", "konsole", "xfce4-terminal", "xterm"];

/// Operating system family a system-default command is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

/// How to open the terminal, ready for the host to execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TerminalLaunch {
    /// Open an editor terminal panel named `name` in `directory`
    Integrated { name: String, directory: PathBuf },
    /// Run `command` in a shell; it starts a terminal in `directory`
    #[serde(rename_all = "camelCase")]
    Command { command_line: String, directory: PathBuf },
}

impl TerminalLaunch {
    pub fn directory(&self) -> &Path {
        match self {
            TerminalLaunch::Integrated { directory, .. } | TerminalLaunch::Command { directory, .. } => {
                directory
            }
        }
    }
}

/// Directory a terminal opened for `file` starts in
///
/// `workspace-root` uses the first workspace folder, else the process's
/// working directory. `current-directory` uses the path as given, for menus
/// invoked on a folder.
pub fn target_directory(file: &Path, workspace_root: Option<&Path>, behavior: OpenBehavior) -> PathBuf {
    match behavior {
        OpenBehavior::ParentDirectory => parent_directory(file),
        OpenBehavior::WorkspaceRoot => match workspace_root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        },
        OpenBehavior::CurrentDirectory => file.to_path_buf(),
    }
}

fn parent_directory(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Backslash-escape single and double quotes
pub fn escape_path_for_shell(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '\'' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Command line for a user-configured terminal
///
/// The first `{{directory}}` in the template is replaced by the escaped
/// directory; without a placeholder the quoted directory is appended.
pub fn external_terminal_command(template: &str, directory: &Path) -> String {
    let escaped = escape_path_for_shell(&directory.to_string_lossy());
    if template.contains(DIRECTORY_PLACEHOLDER) {
        template.replacen(DIRECTORY_PLACEHOLDER, &escaped, 1)
    } else {
        format!("{} \"{}\"", template, escaped)
    }
}

/// Command line starting a Linux terminal emulator in `directory`
pub fn linux_terminal_command(terminal: &str, directory: &Path) -> String {
    let escaped = escape_path_for_shell(&directory.to_string_lossy());
    match terminal {
        "konsole" => format!("konsole --workdir \"{}\"", escaped),
        "xterm" => format!("cd \"{}\" && xterm", escaped),
        // gnome-terminal, xfce4-terminal and anything unknown
        _ => format!("{} --working-directory=\"{}\"", terminal, escaped),
    }
}

/// First of [`LINUX_TERMINALS`] found as a file in a `PATH`-style list
pub fn find_linux_terminal(search_path: &OsStr) -> Option<&'static str> {
    let dirs: Vec<PathBuf> = std::env::split_paths(search_path).collect();
    LINUX_TERMINALS
        .iter()
        .copied()
        .find(|terminal| dirs.iter().any(|dir| dir.join(terminal).is_file()))
}

/// Command line opening the platform's usual terminal in `directory`
///
/// `linux_terminal` is the emulator to use on Linux, see [`find_linux_terminal`].
pub fn system_terminal_command(
    platform: Platform,
    directory: &Path,
    linux_terminal: Option<&str>,
) -> Result<String> {
    let escaped = escape_path_for_shell(&directory.to_string_lossy());
    match platform {
        Platform::Windows => Ok(format!("start cmd /k \"cd /d {}\"", escaped)),
        Platform::MacOs => Ok(format!("open -a Terminal \"{}\"", escaped)),
        Platform::Linux => match linux_terminal {
            Some(terminal) => Ok(linux_terminal_command(terminal, directory)),
            None => anyhow::bail!("no suitable terminal found on this Linux system"),
        },
        Platform::Other => anyhow::bail!("unsupported platform for a system terminal"),
    }
}

/// Plan opening a terminal for `file` according to the terminal settings
///
/// Fails only when the target directory does not exist. On Linux the
/// emulator is looked up in `PATH`.
pub fn plan_terminal(
    file: &Path,
    workspace_root: Option<&Path>,
    settings: &TerminalConfig,
    platform: Platform,
) -> Result<TerminalLaunch> {
    let directory = target_directory(file, workspace_root, settings.open_behavior);
    if !directory.is_dir() {
        anyhow::bail!("invalid or inaccessible directory: {}", directory.display());
    }

    let command = match settings.kind {
        TerminalKind::Integrated => None,
        TerminalKind::External => {
            let template = settings.external_terminal_command.trim();
            if template.is_empty() {
                Some(Err(anyhow::anyhow!("no external terminal command configured")))
            } else {
                Some(Ok(external_terminal_command(template, &directory)))
            }
        }
        TerminalKind::SystemDefault => {
            let linux_terminal = match platform {
                Platform::Linux => std::env::var_os("PATH").and_then(|path| find_linux_terminal(&path)),
                _ => None,
            };
            Some(system_terminal_command(platform, &directory, linux_terminal))
        }
    };

    let launch = match command {
        Some(Ok(command_line)) => TerminalLaunch::Command {
            command_line,
            directory,
        },
        Some(Err(e)) => {
            warn!(error = %e, "falling back to integrated terminal");
            integrated(directory)
        }
        None => integrated(directory),
    };
    debug!(launch = ?launch, "terminal planned");
    Ok(launch)
}

fn integrated(directory: PathBuf) -> TerminalLaunch {
    let base = directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.to_string_lossy().into_owned());
    TerminalLaunch::Integrated {
        name: format!("Terminal - {}", base),
        directory,
    }
}
