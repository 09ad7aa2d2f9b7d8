// src/commands/mkdir/mod.rs
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};

pub struct MkdirCommand;

impl Command for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: mkdir [OPTION]... DIRECTORY...\n\n\
                 Create the DIRECTORY(ies), if they do not already exist.\n\n\
                 Options:\n\
                   -p, --parents    no error if existing, make parent directories as needed\n\
                   -v, --verbose    print a message for each created directory\n\
                       --help       display this help and exit\n".to_string()
            );
        }

        let mut parents = false;
        let mut verbose = false;
        let mut dirs: Vec<String> = Vec::new();

        for arg in &ctx.args {
            match arg.as_str() {
                "-p" | "--parents" => parents = true,
                "-v" | "--verbose" => verbose = true,
                _ if !arg.starts_with('-') => dirs.push(arg.clone()),
                _ => {}
            }
        }

        if dirs.is_empty() {
            return CommandResult::error("mkdir: missing operand\n".to_string());
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for dir in &dirs {
            let created = if parents {
                ctx.fs.create_directory_all(dir).map(|node| node.path())
            } else {
                let parent = ctx.fs.parent_path(dir);
                let name = ctx.fs.basename(dir);
                ctx.fs.create_directory(&parent, &name).map(|node| node.path())
            };

            match created {
                Ok(path) => {
                    if verbose {
                        stdout.push_str(&format!("mkdir: created directory '{}'\n", path));
                    }
                }
                Err(e) => {
                    stderr.push_str(&fs_error_line("mkdir", &e));
                    exit_code = 1;
                }
            }
        }

        CommandResult::with_exit_code(stdout, stderr, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{run, sample_fs};

    #[test]
    fn test_mkdir_simple() {
        let mut fs = sample_fs();
        let result = run(&MkdirCommand, &mut fs, vec!["/newdir"]);
        assert_eq!(result.exit_code, 0);
        assert!(fs.is_directory("/newdir"));
    }

    #[test]
    fn test_mkdir_relative() {
        let mut fs = sample_fs();
        fs.change_directory("/docs").unwrap();
        run(&MkdirCommand, &mut fs, vec!["inner"]);
        assert!(fs.is_directory("/docs/inner"));
    }

    #[test]
    fn test_mkdir_parents() {
        let mut fs = sample_fs();
        let result = run(&MkdirCommand, &mut fs, vec!["-p", "/a/b/c", "/docs"]);
        assert_eq!(result.exit_code, 0);
        assert!(fs.is_directory("/a/b/c"));
    }

    #[test]
    fn test_mkdir_verbose() {
        let mut fs = sample_fs();
        let result = run(&MkdirCommand, &mut fs, vec!["-v", "/newdir"]);
        assert_eq!(result.stdout, "mkdir: created directory '/newdir'\n");
    }

    #[test]
    fn test_mkdir_missing_operand() {
        let mut fs = sample_fs();
        let result = run(&MkdirCommand, &mut fs, vec![]);
        assert!(result.stderr.contains("missing operand"));
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn test_mkdir_errors() {
        let mut fs = sample_fs();
        let result = run(&MkdirCommand, &mut fs, vec!["/nonexistent/dir"]);
        assert_eq!(result.stderr, "mkdir: /nonexistent: No such file or directory\n");

        let result = run(&MkdirCommand, &mut fs, vec!["/docs"]);
        assert_eq!(result.stderr, "mkdir: /docs: File or directory already exists\n");

        let result = run(&MkdirCommand, &mut fs, vec!["bad*name"]);
        assert!(result.stderr.starts_with("mkdir: bad*name: Invalid file name"));
        assert_eq!(result.exit_code, 1);
    }
}
