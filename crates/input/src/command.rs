/// A command an operator can issue into the running multiverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Delete one arbitrary live universe outright. No black hole is formed.
    CollapseOne,
    /// Trigger a burst creation (a cluster of new universes).
    SpawnCluster,
    /// Stop the run.
    Quit,
}

impl ConsoleCommand {
    /// Parse one line of console input. Surrounding whitespace and case are
    /// ignored; `destroy` and `create` are accepted as aliases.
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "collapse-one" | "destroy" => Self::CollapseOne,
            "spawn-cluster" | "create" => Self::SpawnCluster,
            "quit" | "exit" => Self::Quit,
            "" => return None,
            other => {
                tracing::debug!(input = other, "ignoring unrecognized console input");
                return None;
            }
        };
        Some(command)
    }

    /// Prompt text listing the accepted commands.
    pub const PROMPT: &'static str =
        "Type 'collapse-one' to destroy a universe, 'spawn-cluster' for a Big Bang, or 'quit':";
}
