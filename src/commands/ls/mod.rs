// src/commands/ls/mod.rs
use chrono::{DateTime, Utc};
use crate::commands::{fs_error_line, Command, CommandContext, CommandResult};
use crate::fs::NodeRef;

pub struct LsCommand;

fn format_time(modified: DateTime<Utc>) -> String {
    let six_months_ago = Utc::now() - chrono::Duration::days(180);
    if modified > six_months_ago {
        modified.format("%b %e %H:%M").to_string()
    } else {
        modified.format("%b %e  %Y").to_string()
    }
}

fn format_entry(node: &NodeRef<'_>, long: bool, classify: bool) -> String {
    let mut name = node.name().to_string();
    if classify && node.is_directory() {
        name.push('/');
    }
    if !long {
        return name;
    }
    let (kind, size) = match node.content() {
        Some(content) => ('-', content.len()),
        None => ('d', node.children().count()),
    };
    format!("{} {:>6} {} {}", kind, size, format_time(node.modified()), name)
}

impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help") {
            return CommandResult::success(
                "Usage: ls [OPTION]... [FILE]...\n\n\
                 List directory contents in creation order.\n\n\
                 Options:\n\
                   -l           use a long listing format\n\
                   -F           append / to directory names\n\
                   -r           reverse order\n\
                       --help   display this help and exit\n".to_string()
            );
        }

        let mut long = false;
        let mut classify = false;
        let mut reverse = false;
        let mut paths: Vec<String> = Vec::new();

        for arg in &ctx.args {
            if arg.starts_with('-') && arg.len() > 1 {
                for c in arg[1..].chars() {
                    match c {
                        'l' => long = true,
                        'F' => classify = true,
                        'r' => reverse = true,
                        _ => {}
                    }
                }
            } else {
                paths.push(arg.clone());
            }
        }

        if paths.is_empty() {
            paths.push(".".to_string());
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;
        let show_headers = paths.len() > 1;

        for (i, path) in paths.iter().enumerate() {
            let node = match ctx.fs.resolve(path) {
                Ok(node) => node,
                Err(e) => {
                    stderr.push_str(&format!(
                        "ls: cannot access '{}': {}\n",
                        ctx.fs.normalize(path),
                        e.kind()
                    ));
                    exit_code = 2;
                    continue;
                }
            };

            if node.is_file() {
                stdout.push_str(&format_entry(&node, long, classify));
                stdout.push('\n');
                continue;
            }

            if show_headers {
                if i > 0 {
                    stdout.push('\n');
                }
                stdout.push_str(&format!("{}:\n", path));
            }

            let mut children: Vec<NodeRef> = match ctx.fs.read_directory_content(path) {
                Ok(children) => children,
                Err(e) => {
                    stderr.push_str(&fs_error_line("ls", &e));
                    exit_code = 2;
                    continue;
                }
            };
            if reverse {
                children.reverse();
            }
            for child in &children {
                stdout.push_str(&format_entry(child, long, classify));
                stdout.push('\n');
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
    fn test_ls_creation_order() {
        let mut fs = sample_fs();
        fs.create_file("/docs", "0-first-by-name.txt", "").unwrap();
        let result = run(&LsCommand, &mut fs, vec!["/docs"]);
        assert_eq!(result.stdout, "a.txt\nsub\n0-first-by-name.txt\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn test_ls_current_directory() {
        let mut fs = sample_fs();
        fs.change_directory("/docs").unwrap();
        let result = run(&LsCommand, &mut fs, vec![]);
        assert_eq!(result.stdout, "a.txt\nsub\n");
    }

    #[test]
    fn test_ls_classify_and_reverse() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["-rF", "/docs"]);
        assert_eq!(result.stdout, "sub/\na.txt\n");
    }

    #[test]
    fn test_ls_long() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["-l", "/docs"]);
        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("-      2 "));
        assert!(lines[0].ends_with(" a.txt"));
        assert!(lines[1].starts_with("d      1 "));
    }

    #[test]
    fn test_ls_single_file() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["/docs/a.txt"]);
        assert_eq!(result.stdout, "a.txt\n");
    }

    #[test]
    fn test_ls_multiple_directories() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["/docs", "/docs/sub"]);
        assert_eq!(result.stdout, "/docs:\na.txt\nsub\n\n/docs/sub:\ndeep.md\n");
    }

    #[test]
    fn test_ls_nonexistent() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["ghost"]);
        assert_eq!(result.stderr, "ls: cannot access '/ghost': No such file or directory\n");
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn test_ls_through_file() {
        let mut fs = sample_fs();
        let result = run(&LsCommand, &mut fs, vec!["/docs/a.txt/x"]);
        assert_eq!(result.stderr, "ls: cannot access '/docs/a.txt/x': Not a directory\n");
        assert_eq!(result.exit_code, 2);
    }
}
