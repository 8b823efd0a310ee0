mod config;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::{ClientConfig, HostConfig};
use console::{ConsoleChat, ConsoleRenderer};
use tankwar::{
    ClientSession, DEFAULT_PORT, HostListener, HostSession, SessionTiming, Side, Simulation,
    TileMap, connect, run_session,
};

#[derive(Parser)]
#[command(name = "tankwar")]
#[command(about = "Two-player tank duel over TCP")]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Wait for one peer and run the authoritative match
    Host {
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[arg(long, help = "Seed for spawn positions")]
        seed: Option<u64>,
    },
    /// Connect to a host and play the peer tank
    Client {
        #[arg(short, long, help = "Host address to connect to")]
        address: String,

        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.role {
        Role::Host { bind, port, seed } => {
            let config = HostConfig {
                bind,
                port,
                seed,
                ..Default::default()
            };
            run_host(config).await
        }
        Role::Client { address, port } => {
            let config = ClientConfig {
                port,
                ..ClientConfig::new(address)
            };
            run_client(config).await
        }
    }
}

async fn run_host(config: HostConfig) -> Result<()> {
    let map = TileMap::battlefield();
    let simulation = match config.seed {
        Some(seed) => Simulation::with_seed(map, config.simulation.clone(), seed)?,
        None => Simulation::new(map, config.simulation.clone())?,
    };

    let listener = HostListener::bind(&config.bind_addr()).await?;
    log::info!("Hosting on {}", listener.local_addr());
    let mut connection = listener.accept().await?;

    println!("{}", console::HELP);
    let mut events = console::spawn(config.simulation.host_bindings);
    let mut session = HostSession::new(simulation);

    let end = run_session(
        &mut session,
        &mut connection,
        &mut events,
        &mut ConsoleChat::new(Side::Host),
        &mut ConsoleRenderer::default(),
        SessionTiming::from(&config.simulation),
    )
    .await;

    log::info!("Host session ended: {:?}", end);
    Ok(())
}

async fn run_client(config: ClientConfig) -> Result<()> {
    let mut connection = connect(&config.server_addr()).await?;

    println!("{}", console::HELP);
    let mut events = console::spawn(config.simulation.peer_bindings);
    let mut session = ClientSession::new(TileMap::battlefield(), config.simulation.clone());

    let end = run_session(
        &mut session,
        &mut connection,
        &mut events,
        &mut ConsoleChat::new(Side::Peer),
        &mut ConsoleRenderer::default(),
        SessionTiming::from(&config.simulation),
    )
    .await;

    log::info!("Client session ended: {:?}", end);
    Ok(())
}
