// src/commands/registry.rs
use std::collections::HashMap;
use super::types::Command;

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use super::cat::CatCommand;
use super::cd::CdCommand;
use super::cp::CpCommand;
use super::echo::EchoCommand;
use super::help_cmd::HelpCommand;
use super::ls::LsCommand;
use super::mkdir::MkdirCommand;
use super::mv::MvCommand;
use super::pwd::PwdCommand;
use super::rm::RmCommand;
use super::touch::TouchCommand;
use super::tree_cmd::TreeCommand;

/// Register every terminal command.
pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(Box::new(CdCommand));
    registry.register(Box::new(PwdCommand));
    registry.register(Box::new(LsCommand));
    registry.register(Box::new(CatCommand));
    registry.register(Box::new(MkdirCommand));
    registry.register(Box::new(TouchCommand));
    registry.register(Box::new(RmCommand));
    registry.register(Box::new(CpCommand));
    registry.register(Box::new(MvCommand));
    registry.register(Box::new(EchoCommand));
    registry.register(Box::new(TreeCommand));
    registry.register(Box::new(HelpCommand));
}

/// Registry holding every terminal command.
pub fn create_default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_all(&mut registry);
    registry
}
