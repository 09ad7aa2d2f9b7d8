use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};
use crate::fs::NodeRef;

pub struct TreeCommand;

const HELP: &str = "tree - list contents of directories in a tree-like format

Usage: tree [OPTION]... [DIRECTORY]...

Options:
  -d          list directories only
  -L LEVEL    limit depth of directory tree
  -f          print full path prefix for each file
  --help      display this help and exit";

struct TreeOptions {
    directories_only: bool,
    max_depth: Option<usize>,
    full_path: bool,
}

#[derive(Default)]
struct TreeResult {
    output: String,
    dir_count: usize,
    file_count: usize,
}

impl Command for TreeCommand {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        let mut options = TreeOptions {
            directories_only: false,
            max_depth: None,
            full_path: false,
        };
        let mut directories = Vec::new();
        let mut i = 0;

        while i < ctx.args.len() {
            let arg = &ctx.args[i];
            match arg.as_str() {
                "--help" => return CommandResult::success(format!("{}\n", HELP)),
                "-d" => options.directories_only = true,
                "-f" => options.full_path = true,
                "-L" => {
                    i += 1;
                    match ctx.args.get(i).and_then(|level| level.parse().ok()) {
                        Some(level) if level > 0 => options.max_depth = Some(level),
                        _ => return CommandResult::error("tree: Invalid level, must be greater than 0.\n".to_string()),
                    }
                }
                _ => directories.push(arg.clone()),
            }
            i += 1;
        }

        if directories.is_empty() {
            directories.push(".".to_string());
        }

        let mut total = TreeResult::default();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for dir in &directories {
            let node = match ctx.fs.resolve(dir) {
                Ok(node) => node,
                Err(e) => {
                    stderr.push_str(&fs_error_line("tree", &e));
                    exit_code = 2;
                    continue;
                }
            };
            total.output.push_str(&format!("{}\n", dir));
            if node.is_directory() {
                build_tree(node, &options, "", 1, &mut total);
            } else {
                total.file_count += 1;
            }
        }

        total.output.push('\n');
        total.output.push_str(&format!(
            "{} director{}",
            total.dir_count,
            if total.dir_count == 1 { "y" } else { "ies" }
        ));
        if !options.directories_only {
            total.output.push_str(&format!(
                ", {} file{}",
                total.file_count,
                if total.file_count == 1 { "" } else { "s" }
            ));
        }
        total.output.push('\n');

        CommandResult::with_exit_code(total.output, stderr, exit_code)
    }
}

fn build_tree(dir: NodeRef<'_>, options: &TreeOptions, prefix: &str, depth: usize, result: &mut TreeResult) {
    if options.max_depth.is_some_and(|max| depth > max) {
        return;
    }

    let entries: Vec<NodeRef<'_>> = dir
        .children()
        .filter(|child| !options.directories_only || child.is_directory())
        .collect();

    for (idx, entry) in entries.iter().enumerate() {
        let is_last = idx == entries.len() - 1;
        let connector = if is_last { "`-- " } else { "|-- " };
        let display_name = if options.full_path { entry.path() } else { entry.name().to_string() };
        result.output.push_str(&format!("{}{}{}\n", prefix, connector, display_name));

        if entry.is_directory() {
            result.dir_count += 1;
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "|   " });
            build_tree(*entry, options, &child_prefix, depth + 1, result);
        } else {
            result.file_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{run, sample_fs};
    use crate::fs::VirtualFilesystem;

    #[test]
    fn test_help() {
        let mut fs = VirtualFilesystem::new();
        let result = run(&TreeCommand, &mut fs, vec!["--help"]);
        assert!(result.stdout.contains("tree"));
        assert!(result.stdout.contains("-L"));
    }

    #[test]
    fn test_empty_root() {
        let mut fs = VirtualFilesystem::new();
        let result = run(&TreeCommand, &mut fs, vec![]);
        assert_eq!(result.stdout, ".\n\n0 directories, 0 files\n");
    }

    #[test]
    fn test_full_tree() {
        let mut fs = sample_fs();
        let result = run(&TreeCommand, &mut fs, vec!["/"]);
        assert_eq!(
            result.stdout,
            "/\n\
             |-- docs\n\
             |   |-- a.txt\n\
             |   `-- sub\n\
             |       `-- deep.md\n\
             `-- notes.txt\n\
             \n\
             2 directories, 3 files\n"
        );
    }

    #[test]
    fn test_directories_only_and_depth() {
        let mut fs = sample_fs();
        let result = run(&TreeCommand, &mut fs, vec!["-d", "/"]);
        assert_eq!(result.stdout, "/\n`-- docs\n    `-- sub\n\n2 directories\n");

        let result = run(&TreeCommand, &mut fs, vec!["-L", "1", "/"]);
        assert_eq!(result.stdout, "/\n|-- docs\n`-- notes.txt\n\n1 directory, 1 file\n");
    }

    #[test]
    fn test_full_path_prefix() {
        let mut fs = sample_fs();
        let result = run(&TreeCommand, &mut fs, vec!["-f", "/docs/sub"]);
        assert!(result.stdout.contains("`-- /docs/sub/deep.md\n"));
    }

    #[test]
    fn test_missing_directory() {
        let mut fs = sample_fs();
        let result = run(&TreeCommand, &mut fs, vec!["/ghost"]);
        assert_eq!(result.stderr, "tree: ghost: No such file or directory\n");
        assert_eq!(result.exit_code, 2);
    }
}
