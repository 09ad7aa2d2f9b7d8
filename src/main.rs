use clap::{Parser, ValueEnum};
use std::io::{BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use fakefs::commands::CommandResult;
use fakefs::seed::SeedListing;
use fakefs::shell::{Shell, ShellOptions};

#[derive(Parser, Debug)]
#[command(name = "fakefs")]
#[command(about = "A terminal over an in-memory virtual filesystem")]
#[command(version)]
struct Cli {
    /// Execute the command line given as argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Starting directory inside the virtual filesystem
    #[arg(long = "cwd")]
    cwd: Option<String>,

    /// Seed the filesystem from a directory on disk
    #[arg(long = "seed-dir")]
    seed_dir: Option<PathBuf>,

    /// Seed the filesystem from a JSON listing ({"dirs": [...], "files": [...]})
    #[arg(long = "seed")]
    seed: Option<PathBuf>,

    /// Start from a saved snapshot
    #[arg(long = "load")]
    load: Option<PathBuf>,

    /// Save a snapshot of the filesystem when done
    #[arg(long = "save")]
    save: Option<PathBuf>,

    /// Output results as JSON (stdout, stderr, exitCode)
    #[arg(long = "json")]
    json: bool,

    #[arg(long, short, default_value = "warn", value_enum)]
    log_level: LogLevel,

    /// Script file to execute, one command line per line
    #[arg()]
    script_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

fn setup_tracing(cli: &Cli) {
    if let Some(level) = cli.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn fail(message: String) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn read_file(path: &Path, what: &str) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Cannot read {}: {}: {}", what, path.display(), e)))
}

fn load_seed(cli: &Cli) -> Option<SeedListing> {
    let mut listing: Option<SeedListing> = None;

    if let Some(dir) = &cli.seed_dir {
        let found = SeedListing::from_dir(dir)
            .unwrap_or_else(|e| fail(format!("{}: {}", dir.display(), e)));
        listing = Some(found);
    }

    if let Some(file) = &cli.seed {
        let text = read_file(file, "seed listing");
        let found = SeedListing::from_json(&text)
            .unwrap_or_else(|e| fail(format!("{}: {}", file.display(), e)));
        let merged = listing.get_or_insert_with(SeedListing::default);
        merged.dirs.extend(found.dirs);
        merged.files.extend(found.files);
    }

    listing
}

fn print_result(result: &CommandResult) {
    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
}

/// Interactive loop on a terminal. Returns the last exit code.
fn repl(shell: &mut Shell) -> i32 {
    let stdin = std::io::stdin();
    let mut exit_code = 0;
    let mut line = String::new();

    loop {
        print!("{}$ ", shell.fs().cwd());
        let _ = std::io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => fail(format!("Cannot read input: {}", e)),
        }

        let trimmed = line.trim();
        if trimmed == "exit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let result = shell.exec(trimmed);
        print_result(&result);
        exit_code = result.exit_code;
    }

    exit_code
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(&cli);
    debug!("Parsed CLI arguments: {cli:?}");

    let options = ShellOptions {
        cwd: cli.cwd.clone(),
        seed: load_seed(&cli),
        snapshot: cli.load.as_ref().map(|file| read_file(file, "snapshot")),
    };
    let mut shell = Shell::new(options).unwrap_or_else(|e| fail(e.to_string()));

    // Determine script source: -c, file, stdin, or an interactive session
    let script = if let Some(s) = cli.script.clone() {
        Some(s)
    } else if let Some(file) = &cli.script_file {
        Some(read_file(file, "script file"))
    } else if std::io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_default();
        Some(buf)
    };

    let exit_code = match script {
        Some(script) => {
            let mut stdout = String::new();
            let mut stderr = String::new();
            let mut exit_code = 0;
            for line in script.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')) {
                let result = shell.exec(line);
                stdout.push_str(&result.stdout);
                stderr.push_str(&result.stderr);
                exit_code = result.exit_code;
            }

            if cli.json {
                println!("{}", serde_json::json!({
                    "stdout": stdout,
                    "stderr": stderr,
                    "exitCode": exit_code,
                }));
            } else {
                print_result(&CommandResult::with_exit_code(stdout, stderr, exit_code));
            }
            exit_code
        }
        None => repl(&mut shell),
    };

    if let Some(path) = &cli.save {
        let snapshot = shell.fs().serialize_pretty().unwrap_or_else(|e| fail(e.to_string()));
        if let Err(e) = std::fs::write(path, snapshot) {
            fail(format!("Cannot write snapshot: {}: {}", path.display(), e));
        }
        debug!(path = %path.display(), "saved snapshot");
    }

    std::process::exit(exit_code);
}
