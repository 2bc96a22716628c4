use clap::{Parser, Subcommand};
use multiverse_kernel::Physics;
use multiverse_runtime::{Multiverse, RuntimeConfig};
use multiverse_tools::MultiverseInspector;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "multiverse",
    about = "A concurrent multiverse of universes and black holes"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default physics
    Info,
    /// Run the multiverse until Ctrl-C, `quit`, or the optional duration
    Run {
        /// RNG seed; every random stream in the run derives from it
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Universes created at start
        #[arg(short, long, default_value = "10")]
        population: u32,
        /// Stop after this many seconds
        #[arg(short, long)]
        duration: Option<u64>,
        /// Do not read operator commands from stdin
        #[arg(long)]
        no_console: bool,
        /// Insert universes without starting their lifecycle tasks
        #[arg(long)]
        inspect: bool,
        /// Print the final registry as JSON
        #[arg(long)]
        dump: bool,
        /// List every live universe and black hole at shutdown
        #[arg(long)]
        list: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("multiverse v{}", env!("CARGO_PKG_VERSION"));
            println!("tools: {}", multiverse_tools::crate_info());
            println!("physics: {:?}", Physics::default());
        }
        Commands::Run {
            seed,
            population,
            duration,
            no_console,
            inspect,
            dump,
            list,
        } => {
            let config = RuntimeConfig {
                seed,
                initial_population: population,
                spawn_tasks: !inspect,
                ..RuntimeConfig::default()
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(run(config, duration, !no_console, list));
            // Stdin reads sit on a blocking thread that would otherwise keep
            // the runtime alive until the next line arrives.
            runtime.shutdown_timeout(Duration::from_millis(100));

            let report = result?;
            println!("{}", report.summary);
            if dump {
                println!("{}", report.dump.to_json()?);
            }
        }
    }

    Ok(())
}

async fn run(
    config: RuntimeConfig,
    duration: Option<u64>,
    console: bool,
    list: bool,
) -> anyhow::Result<multiverse_runtime::RunReport> {
    let multiverse = Multiverse::new(config)?;
    multiverse.seed_population()?;
    multiverse.start_drivers();
    if console {
        multiverse.attach_console(tokio::io::BufReader::new(tokio::io::stdin()));
    }

    let shutdown = multiverse.shutdown_handle();
    tokio::spawn(async move {
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                        tracing::info!(secs, "run duration elapsed");
                    }
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "could not listen for Ctrl-C");
                    return;
                }
            }
        }
        shutdown.trigger();
    });

    let report = multiverse.run().await?;
    if list {
        let listing = multiverse
            .registry()
            .with(|r| MultiverseInspector::listing(r));
        for line in listing {
            println!("{line}");
        }
    }
    Ok(report)
}
