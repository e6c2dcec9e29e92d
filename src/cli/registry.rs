//! Named shell commands in the order they are listed by `help`.

use std::collections::HashMap;

use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Suggestions further away than this are not worth showing.
const MAX_SUGGESTION_DISTANCE: usize = 3;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    /// Builds the registry; a later entry with a taken name replaces the earlier
    /// one but keeps its position.
    pub fn from_entries(entries: impl IntoIterator<Item = CommandEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            match registry.by_name.get(entry.name) {
                Some(&slot) => registry.entries[slot] = entry,
                None => {
                    registry.by_name.insert(entry.name, registry.entries.len());
                    registry.entries.push(entry);
                }
            }
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.by_name.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// The registered name closest to `input`, if it is near enough to be a typo.
    pub fn closest(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::from_entries([
            CommandEntry::new("next", "", "next", noop),
            CommandEntry::new("back", "", "back", noop),
            CommandEntry::new("next", "again", "next", noop),
        ])
    }

    #[test]
    fn duplicates_replace_in_place() {
        let registry = registry();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["next", "back"]);
        assert_eq!(registry.get("next").map(|e| e.description), Some("again"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn closest_only_suggests_near_misses() {
        let registry = registry();
        assert_eq!(registry.closest("NXET"), Some("next"));
        assert_eq!(registry.closest("confirmation"), None);
    }
}
