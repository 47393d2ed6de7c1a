use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::time::Duration;

use seabattle::{
    init_logging, render_boards, Board, CliPlayer, LoopbackTransport, MoveSource, Outcome,
    RandomPlayer, Role, Rules, Session, TcpTransport, Transport, UdpTransport,
};

#[derive(Parser)]
#[command(author, version, about = "Peer-to-peer battleship over TCP, UDP or in-process loopback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
enum PlayerKind {
    Human,
    Random,
}

#[derive(Subcommand)]
enum Commands {
    /// Play two random players against each other in-process.
    Local {
        #[arg(long, help = "Fix RNG seed for a reproducible game")]
        seed: Option<u64>,
    },
    /// Host a TCP game and wait for the guest to connect.
    TcpServer {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        opts: MatchOpts,
    },
    /// Join a TCP game. The guest fires first.
    TcpClient {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[command(flatten)]
        opts: MatchOpts,
    },
    /// Host a UDP game (at-least-once delivery over datagrams).
    UdpServer {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, help = "Peer address, e.g. 192.168.0.2:8081")]
        peer: String,
        #[arg(long, default_value_t = 2, help = "Retransmission cooldown in seconds")]
        cooldown_secs: u64,
        #[command(flatten)]
        opts: MatchOpts,
    },
    /// Join a UDP game. The guest fires first.
    UdpClient {
        #[arg(long, default_value = "0.0.0.0:8081")]
        bind: String,
        #[arg(long, help = "Peer address, e.g. 192.168.0.1:8080")]
        peer: String,
        #[arg(long, default_value_t = 2, help = "Retransmission cooldown in seconds")]
        cooldown_secs: u64,
        #[command(flatten)]
        opts: MatchOpts,
    },
}

#[derive(Args)]
struct MatchOpts {
    /// Board file: board-size lines of '0'/'1'. A random fleet is generated
    /// if omitted.
    #[arg(long)]
    board: Option<PathBuf>,
    /// JSON rules file overriding the classic rule set.
    #[arg(long)]
    rules: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = PlayerKind::Human)]
    player: PlayerKind,
    /// Fix RNG seed for a reproducible game.
    #[arg(long)]
    seed: Option<u64>,
    /// Per-operation transport deadline in seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local { seed } => run_local(seed).await,
        Commands::TcpServer { bind, opts } => {
            let listener = TcpListener::bind(&bind).await?;
            println!("Waiting for the guest to connect on {}...", bind);
            let (stream, addr) = listener.accept().await?;
            println!("Guest connected from {}.", addr);
            let transport = Box::new(TcpTransport::with_timeout(
                stream,
                Duration::from_secs(opts.timeout_secs),
            ));
            run_match(transport, opts, Role::Host).await
        }
        Commands::TcpClient { connect, opts } => {
            println!("Connecting to {}...", connect);
            let stream = TcpStream::connect(&connect).await?;
            println!("Connected. You start.");
            let transport = Box::new(TcpTransport::with_timeout(
                stream,
                Duration::from_secs(opts.timeout_secs),
            ));
            run_match(transport, opts, Role::Guest).await
        }
        Commands::UdpServer {
            bind,
            peer,
            cooldown_secs,
            opts,
        } => {
            let transport = udp_transport(&bind, &peer, cooldown_secs, opts.timeout_secs).await?;
            println!("Waiting for the guest's opening move...");
            run_match(transport, opts, Role::Host).await
        }
        Commands::UdpClient {
            bind,
            peer,
            cooldown_secs,
            opts,
        } => {
            let transport = udp_transport(&bind, &peer, cooldown_secs, opts.timeout_secs).await?;
            println!("You start.");
            run_match(transport, opts, Role::Guest).await
        }
    }
}

async fn udp_transport(
    bind: &str,
    peer: &str,
    cooldown_secs: u64,
    timeout_secs: u64,
) -> anyhow::Result<Box<UdpTransport>> {
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(peer).await?;
    Ok(Box::new(UdpTransport::with_config(
        socket,
        Duration::from_secs(timeout_secs),
        Duration::from_secs(cooldown_secs),
    )))
}

async fn run_local(seed: Option<u64>) -> anyhow::Result<()> {
    let rules = Rules::default();
    let mut rng1 = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let mut rng2 = match seed {
        Some(s) => SmallRng::seed_from_u64(s.wrapping_add(1)),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let board1 = Board::random(&rules, &mut rng1)?;
    let board2 = Board::random(&rules, &mut rng2)?;
    let (t1, t2) = LoopbackTransport::pair();
    let mut guest = Session::new(
        &rules,
        board1,
        Box::new(t1),
        Box::new(RandomPlayer::new(rng1)),
        Role::Guest,
    );
    let mut host = Session::new(
        &rules,
        board2,
        Box::new(t2),
        Box::new(RandomPlayer::new(rng2)),
        Role::Host,
    );
    let (guest_outcome, host_outcome) = tokio::join!(guest.run(), host.run());
    println!(
        "guest: {:?} after {} moves, host: {:?} after {} moves",
        guest_outcome,
        guest.moves_made(),
        host_outcome,
        host.moves_made()
    );
    Ok(())
}

async fn run_match(
    transport: Box<dyn Transport>,
    opts: MatchOpts,
    role: Role,
) -> anyhow::Result<()> {
    let rules = match &opts.rules {
        Some(path) => Rules::from_file(path)?,
        None => Rules::default(),
    };
    let mut rng = match opts.seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let board = match &opts.board {
        Some(path) => Board::from_file(path, &rules)?,
        None => {
            let board = Board::random(&rules, &mut rng)?;
            println!("Generated fleet:\n{}", board);
            board
        }
    };
    let mover: Box<dyn MoveSource> = match opts.player {
        PlayerKind::Human => Box::new(CliPlayer::new()),
        PlayerKind::Random => Box::new(RandomPlayer::new(rng)),
    };

    let mut session = Session::new(&rules, board, transport, mover, role);
    let outcome = session.run().await;

    let (own, enemy) = session.boards();
    println!("{}", render_boards(own, enemy));
    match outcome {
        Outcome::Won => println!("You destroyed the whole enemy fleet. Congratulations."),
        Outcome::Lost => println!("All your ships are lost. Game over."),
        Outcome::Aborted(err) => println!("Session aborted: {}", err),
    }
    Ok(())
}
