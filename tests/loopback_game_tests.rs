use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{Board, LoopbackTransport, Outcome, RandomPlayer, Role, Rules, Session};

#[tokio::test(flavor = "multi_thread")]
async fn full_match_over_loopback() {
    let rules = Rules::default();
    let mut rng1 = SmallRng::seed_from_u64(7);
    let mut rng2 = SmallRng::seed_from_u64(99);
    let board1 = Board::random(&rules, &mut rng1).unwrap();
    let board2 = Board::random(&rules, &mut rng2).unwrap();

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
    match (guest_outcome, host_outcome) {
        (Outcome::Won, Outcome::Lost) => {
            assert_eq!(host.own_health(), 0);
            assert_eq!(guest.enemy_health(), 0);
            assert!(guest.own_health() > 0);
        }
        (Outcome::Lost, Outcome::Won) => {
            assert_eq!(guest.own_health(), 0);
            assert_eq!(host.enemy_health(), 0);
            assert!(host.own_health() > 0);
        }
        other => panic!("unexpected outcomes: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn seeded_matches_are_reproducible() {
    let mut winners = Vec::new();
    for _ in 0..2 {
        let rules = Rules::default();
        let mut rng1 = SmallRng::seed_from_u64(1234);
        let mut rng2 = SmallRng::seed_from_u64(5678);
        let board1 = Board::random(&rules, &mut rng1).unwrap();
        let board2 = Board::random(&rules, &mut rng2).unwrap();
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
        let (g, h) = tokio::join!(guest.run(), host.run());
        winners.push((
            matches!(g, Outcome::Won),
            matches!(h, Outcome::Won),
            guest.moves_made(),
            host.moves_made(),
        ));
    }
    assert_eq!(winners[0], winners[1]);
}
