//! sensei-yaml CLI tool
//!
//! Every subcommand that takes a file accepts `-` for stdin.
//!
//! Examples:
//!   sensei-yaml lint profile.yaml --hints        - typo warnings and missing keys
//!   sensei-yaml context profile.yaml --offset 42 - context path at a byte offset
//!   sensei-yaml complete - --offset 42 --json    - candidates as JSON
//!   sensei-yaml schema --path user.goals         - schema entries for a path
//!   sensei-yaml lsp                              - language server on stdio

use std::io::{self, Read};

use facet::Facet;
use figue as args;
use sensei_yaml::{
    Diagnostic, Severity, get_completions, lint_typos, required_hints, resolve_context,
};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_TYPOS_FOUND: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level CLI with optional subcommand
#[derive(Facet, Debug)]
struct Args {
    /// Show version
    #[facet(args::named, args::short = 'V', default)]
    version: bool,

    /// Subcommand to run
    #[facet(args::subcommand, default)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Report misspelled keys
    Lint {
        /// Input file (or "-" for stdin)
        #[facet(args::positional)]
        file: String,

        /// Also report missing required keys
        #[facet(args::named, default)]
        hints: bool,
    },

    /// Print the context path at a byte offset
    Context {
        /// Input file (or "-" for stdin)
        #[facet(args::positional)]
        file: String,

        /// Byte offset of the cursor
        #[facet(args::named)]
        offset: usize,
    },

    /// List completion candidates at a byte offset
    Complete {
        /// Input file (or "-" for stdin)
        #[facet(args::positional)]
        file: String,

        /// Byte offset of the cursor
        #[facet(args::named)]
        offset: usize,

        /// Print the full result as JSON
        #[facet(args::named, default)]
        json: bool,
    },

    /// Show schema entries for a context path
    Schema {
        /// Dotted context path (default: the document root)
        #[facet(args::named, default)]
        path: Option<String>,
    },

    /// Start language server (stdio)
    Lsp,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    // Handle empty args or help
    if raw_args.is_empty() || raw_args[0] == "--help" || raw_args[0] == "-h" {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--version" || raw_args[0] == "-V" {
        println!("sensei-yaml {VERSION}");
        std::process::exit(EXIT_SUCCESS);
    }

    match run(&raw_args) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            if !matches!(e, CliError::TyposFound(_)) {
                eprintln!("error: {e}");
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn print_help() {
    eprintln!("sensei-yaml {VERSION} - completion and linting for SENSEI profile YAML\n");
    eprintln!("USAGE:");
    eprintln!("    sensei-yaml <command> [args]\n");
    eprintln!("    Use '-' as the file to read from stdin.\n");
    eprintln!("SUBCOMMANDS:");
    eprintln!("    lint <file> [--hints]           Report misspelled keys (and missing keys)");
    eprintln!("    context <file> --offset <n>     Print the context path at a byte offset");
    eprintln!("    complete <file> --offset <n> [--json]");
    eprintln!("                                    List completion candidates");
    eprintln!("    schema [--path <path>]          Show schema entries for a context path");
    eprintln!("    lsp                             Start language server (stdio)\n");
    eprintln!("EXIT CODES:");
    eprintln!("    0 success, 1 typos found, 2 usage error, 3 I/O error\n");
    eprintln!("EXAMPLES:");
    eprintln!("    sensei-yaml lint profile.yaml --hints");
    eprintln!("    sensei-yaml complete profile.yaml --offset 120");
    eprintln!("    sensei-yaml schema --path user.goals");
}

fn run(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed: Args =
        figue::from_slice(&args_strs).map_err(|e| CliError::Usage(e.to_string()))?;

    if parsed.version {
        println!("sensei-yaml {VERSION}");
        return Ok(());
    }

    match parsed.command {
        Some(Command::Lint { file, hints }) => run_lint(&file, hints),
        Some(Command::Context { file, offset }) => {
            let source = read_input(&file)?;
            println!("{}", format_context(&source, offset));
            Ok(())
        }
        Some(Command::Complete { file, offset, json }) => {
            let source = read_input(&file)?;
            println!("{}", format_completions(&source, offset, json)?);
            Ok(())
        }
        Some(Command::Schema { path }) => {
            print!("{}", format_schema(path.as_deref().unwrap_or("")));
            Ok(())
        }
        Some(Command::Lsp) => run_lsp(),
        None => {
            print_help();
            Err(CliError::Usage("missing subcommand".into()))
        }
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Usage(String),
    /// Lint found this many misspelled keys.
    TyposFound(usize),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Usage(_) => EXIT_USAGE_ERROR,
            CliError::TyposFound(_) => EXIT_TYPOS_FOUND,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Usage(e) => write!(f, "{e}"),
            CliError::TyposFound(n) => write!(f, "{n} misspelled key(s)"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_lint(file: &str, hints: bool) -> Result<(), CliError> {
    let source = read_input(file)?;
    let filename = if file == "-" { "<stdin>" } else { file };

    let diagnostics = collect_diagnostics(&source, hints);
    let mut stderr = io::stderr();
    for diag in &diagnostics {
        diag.write_report(filename, &source, &mut stderr);
    }

    let typos = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if typos > 0 {
        eprintln!("{filename}: {typos} misspelled key(s)");
        return Err(CliError::TyposFound(typos));
    }
    Ok(())
}

fn collect_diagnostics(source: &str, hints: bool) -> Vec<Diagnostic> {
    let mut diagnostics = lint_typos(source);
    if hints {
        diagnostics.extend(required_hints(source));
    }
    diagnostics
}

fn format_context(source: &str, offset: usize) -> String {
    let context = resolve_context(source, offset);
    if context.is_empty() {
        "<root>".to_string()
    } else {
        context
    }
}

fn format_completions(source: &str, offset: usize, json: bool) -> Result<String, CliError> {
    let result = get_completions(source, offset, true);

    if json {
        return serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::Io(io::Error::other(e)));
    }

    let width = result
        .options
        .iter()
        .map(|c| c.entry.label.len())
        .max()
        .unwrap_or(0);
    let lines: Vec<String> = result
        .options
        .iter()
        .map(|c| {
            format!(
                "{:width$}  {:8}  {}",
                c.entry.label,
                c.entry.kind.as_str(),
                c.entry.info
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

fn format_schema(path: &str) -> String {
    let (matched, entries) = sensei_schema::builtin().lookup(path);
    let shown = if matched.is_empty() { "<root>" } else { matched };

    let mut out = String::new();
    if matched == path {
        out.push_str(&format!("{shown}\n"));
    } else {
        out.push_str(&format!("{shown} (no entries for {path})\n"));
    }

    let width = entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
    for entry in entries {
        out.push_str(&format!(
            "  {:width$}  {:8}  {}\n",
            entry.label,
            entry.kind.as_str(),
            entry.info
        ));
    }

    let required = sensei_schema::required().required_at(matched);
    if !required.is_empty() {
        out.push_str(&format!("required: {}\n", required.join(", ")));
    }
    out
}

fn run_lsp() -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new().map_err(CliError::Io)?;
    rt.block_on(async {
        sensei_lsp::run()
            .await
            .map_err(|e| CliError::Io(io::Error::other(e.to_string())))
    })
}

fn read_input(file: &str) -> Result<String, io::Error> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}
