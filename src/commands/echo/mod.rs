// src/commands/echo/mod.rs
use crate::commands::{Command, CommandContext, CommandResult};

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(&self, ctx: CommandContext) -> CommandResult {
        let args = &ctx.args;
        let mut no_newline = false;
        let mut interpret_escapes = false;
        let mut start_index = 0;

        while start_index < args.len() {
            match args[start_index].as_str() {
                "-n" => no_newline = true,
                "-e" => interpret_escapes = true,
                "-E" => interpret_escapes = false,
                "-ne" | "-en" => {
                    no_newline = true;
                    interpret_escapes = true;
                }
                _ => break,
            }
            start_index += 1;
        }

        let mut output = args[start_index..].join(" ");

        if interpret_escapes {
            let (expanded, stop) = process_escapes(&output);
            output = expanded;
            if stop {
                // \c suppresses everything after it, newline included
                return CommandResult::success(output);
            }
        }

        if !no_newline {
            output.push('\n');
        }

        CommandResult::success(output)
    }
}

/// Expand `echo -e` escapes. The flag is set when `\c` cut the output short.
fn process_escapes(input: &str) -> (String, bool) {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('c') => return (result, true),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    (result, false)
}
