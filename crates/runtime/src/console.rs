use multiverse_common::{SimRng, UniverseId};
use multiverse_input::ConsoleCommand;
use multiverse_kernel::Lifeline;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::{Population, Shutdown};

/// What an operator command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    /// A universe was deleted outright; `None` if there were none.
    Destroyed(Option<UniverseId>),
    Spawned(Vec<Lifeline>),
    Quit,
}

/// Apply one operator command.
///
/// `CollapseOne` is a direct deletion: no black hole forms and the universe's
/// lifecycle task ends at its next step.
pub fn apply_command(
    command: ConsoleCommand,
    population: &Population,
    shutdown: &Shutdown,
    rng: &mut SimRng,
) -> CommandEffect {
    match command {
        ConsoleCommand::CollapseOne => {
            let destroyed = population.registry().destroy_any().map(|u| u.id);
            match destroyed {
                Some(id) => info!(universe = %id, "universe destroyed by the operator"),
                None => info!("no universe left to destroy"),
            }
            CommandEffect::Destroyed(destroyed)
        }
        ConsoleCommand::SpawnCluster => CommandEffect::Spawned(population.burst_create(rng)),
        ConsoleCommand::Quit => {
            info!("operator requested shutdown");
            shutdown.trigger();
            CommandEffect::Quit
        }
    }
}

/// Read operator commands line by line until EOF, `quit` or shutdown.
pub async fn run_console<R>(
    reader: R,
    population: Population,
    mut rng: SimRng,
    shutdown: Shutdown,
) where
    R: AsyncBufRead + Unpin,
{
    info!("{}", ConsoleCommand::PROMPT);
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.wait() => return,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) => {
                let Some(command) = ConsoleCommand::parse(&line) else {
                    continue;
                };
                if apply_command(command, &population, &shutdown, &mut rng) == CommandEffect::Quit {
                    return;
                }
            }
            Ok(None) => {
                info!("console input closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "console read failed; ignoring further input");
                return;
            }
        }
    }
}
