//! Shell Session
//!
//! Ties the filesystem and the command registry together and runs command lines.
//!
//! A line is a `;`-separated list of commands. Words may be quoted with `'...'` or
//! `"..."` and single characters escaped with `\`. A command may end with
//! `> file` or `>> file`, which sends its stdout to the file instead.

use thiserror::Error;
use tracing::debug;

use crate::commands::{create_default_registry, fs_error_line, CommandContext, CommandRegistry, CommandResult};
use crate::fs::{FsError, SnapshotError, VirtualFilesystem};
use crate::seed::SeedListing;

/// Options for creating a [`Shell`].
#[derive(Debug, Default)]
pub struct ShellOptions {
    /// Starting directory, created if missing (defaults to `/`)
    pub cwd: Option<String>,
    /// Content to create on top of the initial tree
    pub seed: Option<SeedListing>,
    /// Snapshot JSON to start from instead of an empty tree
    pub snapshot: Option<String>,
}

#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("cannot use working directory: {0}")]
    Cwd(#[from] FsError),
}

/// A redirection of stdout into a file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Redirect {
    target: String,
    append: bool,
}

/// One command of a line: its words and where its stdout goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Statement {
    words: Vec<String>,
    redirect: Option<Redirect>,
}

/// A terminal session over one filesystem.
pub struct Shell {
    fs: VirtualFilesystem,
    registry: CommandRegistry,
}

impl Shell {
    pub fn new(options: ShellOptions) -> Result<Self, ShellError> {
        let mut fs = match &options.snapshot {
            Some(text) => VirtualFilesystem::from_snapshot(text)?,
            None => VirtualFilesystem::new(),
        };

        if let Some(seed) = &options.seed {
            let report = seed.apply(&mut fs);
            debug!(created = report.created, failed = report.failures.len(), "applied seed listing");
        }

        if let Some(cwd) = &options.cwd {
            fs.create_directory_all(cwd)?;
            fs.change_directory(cwd)?;
        }

        Ok(Self {
            fs,
            registry: create_default_registry(),
        })
    }

    pub fn fs(&self) -> &VirtualFilesystem {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut VirtualFilesystem {
        &mut self.fs
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run one command line. Output of all its commands is concatenated; the exit
    /// code is the last command's.
    pub fn exec(&mut self, line: &str) -> CommandResult {
        let statements = match parse_line(line) {
            Ok(statements) => statements,
            Err(message) => {
                return CommandResult::with_exit_code(
                    String::new(),
                    format!("fakefs: syntax error: {}\n", message),
                    2,
                )
            }
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for statement in statements {
            let result = self.run_statement(statement);
            stdout.push_str(&result.stdout);
            stderr.push_str(&result.stderr);
            exit_code = result.exit_code;
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }

    fn run_statement(&mut self, statement: Statement) -> CommandResult {
        let Statement { mut words, redirect } = statement;
        let name = words.remove(0);
        let mut args = words;

        // `help ls` is `ls --help`
        let name = if name == "help" && !args.is_empty() {
            if !self.registry.contains(&args[0]) {
                return CommandResult::error(format!("help: no help topics match '{}'\n", args[0]));
            }
            let topic = args.remove(0);
            args = vec!["--help".to_string()];
            topic
        } else {
            name
        };

        let Some(cmd) = self.registry.get(&name) else {
            return CommandResult::with_exit_code(
                String::new(),
                format!("fakefs: {}: command not found\n", name),
                127,
            );
        };

        let mut result = cmd.execute(CommandContext {
            args,
            fs: &mut self.fs,
        });
        debug!(command = %name, exit_code = result.exit_code, "ran command");

        if let Some(redirect) = redirect {
            let output = std::mem::take(&mut result.stdout);
            if let Err(e) = self.fs.write_file(&redirect.target, &output, redirect.append) {
                result.stderr.push_str(&fs_error_line("fakefs", &e));
                result.exit_code = 1;
            }
        }

        result
    }
}

#[derive(Default)]
struct LineParser {
    statements: Vec<Statement>,
    current: Statement,
    word: String,
    in_word: bool,
    /// Set after `>` / `>>` until the target word arrives; holds the append flag.
    pending_redirect: Option<bool>,
}

impl LineParser {
    fn finish_word(&mut self) -> Result<(), String> {
        if !self.in_word {
            return Ok(());
        }
        let word = std::mem::take(&mut self.word);
        self.in_word = false;

        match self.pending_redirect.take() {
            Some(append) => {
                self.current.redirect = Some(Redirect { target: word, append });
            }
            None if self.current.redirect.is_some() => {
                return Err(format!("unexpected word '{}' after redirection", word));
            }
            None => self.current.words.push(word),
        }
        Ok(())
    }

    fn finish_statement(&mut self) -> Result<(), String> {
        self.finish_word()?;
        if self.pending_redirect.is_some() {
            return Err("missing redirection target".to_string());
        }
        let statement = std::mem::take(&mut self.current);
        if statement.words.is_empty() {
            if statement.redirect.is_some() {
                return Err("redirection without a command".to_string());
            }
            return Ok(());
        }
        self.statements.push(statement);
        Ok(())
    }

    fn start_redirect(&mut self, append: bool) -> Result<(), String> {
        self.finish_word()?;
        if self.pending_redirect.is_some() || self.current.redirect.is_some() {
            return Err("unexpected token '>'".to_string());
        }
        self.pending_redirect = Some(append);
        Ok(())
    }
}

fn parse_line(line: &str) -> Result<Vec<Statement>, String> {
    let mut parser = LineParser::default();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ';' => parser.finish_statement()?,
            '>' => {
                let append = chars.next_if_eq(&'>').is_some();
                parser.start_redirect(append)?;
            }
            '\'' => {
                parser.in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => parser.word.push(ch),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            '"' => {
                parser.in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next_if(|ch| *ch == '"' || *ch == '\\') {
                            Some(ch) => parser.word.push(ch),
                            None => parser.word.push('\\'),
                        },
                        Some(ch) => parser.word.push(ch),
                        None => return Err("unterminated quote".to_string()),
                    }
                }
            }
            '\\' => {
                parser.in_word = true;
                parser.word.push(chars.next().unwrap_or('\\'));
            }
            ch if ch.is_whitespace() => parser.finish_word()?,
            ch => {
                parser.in_word = true;
                parser.word.push(ch);
            }
        }
    }

    parser.finish_statement()?;
    Ok(parser.statements)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{SeedDir, SeedFile};

    fn shell() -> Shell {
        Shell::new(ShellOptions::default()).unwrap()
    }

    fn words(line: &str) -> Vec<Vec<String>> {
        parse_line(line).unwrap().into_iter().map(|s| s.words).collect()
    }

    #[test]
    fn test_parse_words_and_quotes() {
        assert_eq!(words("ls -l  /docs"), vec![vec!["ls", "-l", "/docs"]]);
        assert_eq!(words("echo 'a b' \"c d\""), vec![vec!["echo", "a b", "c d"]]);
        assert_eq!(words("echo a\\ b \"say \\\"hi\\\"\""), vec![vec!["echo", "a b", "say \"hi\""]]);
        assert_eq!(words("echo ''"), vec![vec!["echo", ""]]);
        assert_eq!(words("echo 'x;y'"), vec![vec!["echo", "x;y"]]);
    }

    #[test]
    fn test_parse_separators() {
        assert_eq!(words("mkdir a; cd a ;pwd"), vec![vec!["mkdir", "a"], vec!["cd", "a"], vec!["pwd"]]);
        assert!(words(" ; ;").is_empty());
    }

    #[test]
    fn test_parse_redirects() {
        let statements = parse_line("echo hi > out.txt; echo more>>out.txt").unwrap();
        assert_eq!(
            statements[0].redirect,
            Some(Redirect { target: "out.txt".to_string(), append: false })
        );
        assert_eq!(statements[1].words, vec!["echo", "more"]);
        assert_eq!(
            statements[1].redirect,
            Some(Redirect { target: "out.txt".to_string(), append: true })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("echo 'open").is_err());
        assert!(parse_line("echo \"open").is_err());
        assert!(parse_line("echo >").is_err());
        assert!(parse_line("> out.txt").is_err());
        assert!(parse_line("echo > a > b").is_err());
        assert!(parse_line("echo > a extra").is_err());
    }

    #[test]
    fn test_exec_sequence() {
        let mut shell = shell();
        let result = shell.exec("mkdir docs; cd docs; pwd");
        assert_eq!(result.stdout, "/docs\n");
        assert_eq!(result.exit_code, 0);
        assert_eq!(shell.fs().cwd(), "/docs");
    }

    #[test]
    fn test_exec_redirect_writes_file() {
        let mut shell = shell();
        let result = shell.exec("echo hello > greeting.txt; echo world >> greeting.txt");
        assert_eq!(result.stdout, "");
        assert_eq!(shell.fs().read_file_content("/greeting.txt").unwrap(), "hello\nworld\n");

        let result = shell.exec("cat greeting.txt");
        assert_eq!(result.stdout, "hello\nworld\n");

        shell.exec("echo reset > greeting.txt");
        assert_eq!(shell.fs().read_file_content("/greeting.txt").unwrap(), "reset\n");
    }

    #[test]
    fn test_exec_redirect_errors() {
        let mut shell = shell();
        shell.exec("mkdir docs");
        let result = shell.exec("echo x > docs");
        assert_eq!(result.stderr, "fakefs: /docs: Not a regular file\n");
        assert_eq!(result.exit_code, 1);

        let result = shell.exec("echo x > ghost/file.txt");
        assert_eq!(result.stderr, "fakefs: /ghost: No such file or directory\n");
    }

    #[test]
    fn test_exec_unknown_command() {
        let mut shell = shell();
        let result = shell.exec("grep x");
        assert_eq!(result.stderr, "fakefs: grep: command not found\n");
        assert_eq!(result.exit_code, 127);
    }

    #[test]
    fn test_exec_keeps_going_after_failure() {
        let mut shell = shell();
        let result = shell.exec("cd ghost; mkdir here; ls");
        assert_eq!(result.stderr, "cd: /ghost: No such file or directory\n");
        assert_eq!(result.stdout, "here\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_exec_syntax_error() {
        let mut shell = shell();
        let result = shell.exec("echo 'oops");
        assert_eq!(result.stderr, "fakefs: syntax error: unterminated quote\n");
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn test_help_topic() {
        let mut shell = shell();
        let result = shell.exec("help mkdir");
        assert!(result.stdout.contains("Usage: mkdir"));

        let result = shell.exec("help grep");
        assert_eq!(result.stderr, "help: no help topics match 'grep'\n");
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_options_seed_and_cwd() {
        let seed = SeedListing {
            dirs: vec![SeedDir { path: "/".into(), name: "guide".into() }],
            files: vec![SeedFile { path: "/guide".into(), name: "intro.md".into(), content: "# intro".into() }],
        };
        let mut shell = Shell::new(ShellOptions {
            cwd: Some("/home/user".to_string()),
            seed: Some(seed),
            snapshot: None,
        })
        .unwrap();
        assert_eq!(shell.fs().cwd(), "/home/user");
        assert_eq!(shell.exec("cat /guide/intro.md").stdout, "# intro");
    }

    #[test]
    fn test_options_snapshot() {
        let mut source = shell();
        source.exec("mkdir a; touch a/b.txt");
        let text = source.fs().serialize().unwrap();

        let mut shell = Shell::new(ShellOptions {
            snapshot: Some(text),
            ..Default::default()
        })
        .unwrap();
        assert!(shell.fs().is_file("/a/b.txt"));
        assert_eq!(shell.exec("ls /a").stdout, "b.txt\n");

        assert!(matches!(
            Shell::new(ShellOptions { snapshot: Some("nope".into()), ..Default::default() }),
            Err(ShellError::Snapshot(_))
        ));
    }

    #[test]
    fn test_options_bad_cwd() {
        let seed = SeedListing {
            dirs: vec![],
            files: vec![SeedFile { path: "/".into(), name: "f".into(), content: String::new() }],
        };
        let result = Shell::new(ShellOptions {
            cwd: Some("/f/inside".into()),
            seed: Some(seed),
            snapshot: None,
        });
        assert!(matches!(result, Err(ShellError::Cwd(_))));
    }
}
