use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;

use seabattle::{Board, LoopbackTransport, Outcome, RandomPlayer, Role, Rules, Session};

fn label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Won => "won",
        Outcome::Lost => "lost",
        Outcome::Aborted(_) => "aborted",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let rules = Rules::default();
    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);
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

    let winner = match (&guest_outcome, &host_outcome) {
        (Outcome::Won, Outcome::Lost) => Some("guest"),
        (Outcome::Lost, Outcome::Won) => Some("host"),
        _ => None,
    };

    let result = json!({
        "guest": {"outcome": label(&guest_outcome), "moves": guest.moves_made(), "health": guest.own_health()},
        "host": {"outcome": label(&host_outcome), "moves": host.moves_made(), "health": host.own_health()},
        "winner": winner,
    });
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
