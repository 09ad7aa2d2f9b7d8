use crate::commands::{Command, CommandContext, CommandResult};

pub struct HelpCommand;

const CATEGORIES: &[(&str, &[&str])] = &[
    ("File operations", &["ls", "cat", "touch", "mkdir", "rm", "cp", "mv"]),
    ("Navigation", &["cd", "pwd", "tree"]),
    ("Shell", &["echo", "help"]),
];

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        if ctx.args.iter().any(|a| a == "--help" || a == "-h") {
            return CommandResult::success(
                "help - display available commands\n\nUsage: help [command]\n\nOptions:\n  -h, --help    Show this help message\n".to_string()
            );
        }

        let mut stdout = String::from("Available commands:\n\n");

        for (category, cmds) in CATEGORIES {
            stdout.push_str(&format!("  {}:\n", category));
            stdout.push_str(&format!("    {}\n\n", cmds.join(", ")));
        }

        stdout.push_str("Separate commands with ';' and redirect output with '>' or '>>'.\n");
        stdout.push_str("Use '<command> --help' for details on a specific command.\n");

        CommandResult::success(stdout)
    }
}
