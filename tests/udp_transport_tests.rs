use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{
    Board, Frame, Move, Outcome, RandomPlayer, Role, Rules, Session, Transport, TransportError,
    UdpTransport,
};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout, Duration, Instant};

async fn transport_pair(deadline: Duration, cooldown: Duration) -> (UdpTransport, UdpTransport) {
    let a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let a_addr = a.local_addr().unwrap();
    let b_addr = b.local_addr().unwrap();
    a.connect(b_addr).await.unwrap();
    b.connect(a_addr).await.unwrap();
    (
        UdpTransport::with_config(a, deadline, cooldown),
        UdpTransport::with_config(b, deadline, cooldown),
    )
}

/// A raw socket wired to a transport under test, so the test controls
/// exactly what hits the wire.
async fn raw_and_transport(deadline: Duration, cooldown: Duration) -> (UdpSocket, UdpTransport) {
    let raw = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let raw_addr = raw.local_addr().unwrap();
    let sock_addr = sock.local_addr().unwrap();
    raw.connect(sock_addr).await.unwrap();
    sock.connect(raw_addr).await.unwrap();
    (raw, UdpTransport::with_config(sock, deadline, cooldown))
}

#[tokio::test(flavor = "multi_thread")]
async fn index_advances_once_per_operation() {
    let (mut a, mut b) =
        transport_pair(Duration::from_secs(2), Duration::from_millis(50)).await;
    for round in 0..3u8 {
        a.send(Frame::Miss(Move::new(round, round))).await.unwrap();
        assert_eq!(b.recv().await.unwrap(), Frame::Miss(Move::new(round, round)));
        b.send(Frame::Hit).await.unwrap();
        assert_eq!(a.recv().await.unwrap(), Frame::Hit);
    }
    // one increment per send and one per accepted datagram, no gaps
    assert_eq!(a.exchanges(), 6);
    assert_eq!(b.exchanges(), 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicated_datagrams_are_absorbed() {
    let (raw, mut transport) =
        raw_and_transport(Duration::from_millis(300), Duration::from_millis(50)).await;

    let packet = Frame::Miss(Move::new(1, 2)).encode_indexed(1);
    raw.send(&packet).await.unwrap();
    raw.send(&packet).await.unwrap();

    assert_eq!(transport.recv().await.unwrap(), Frame::Miss(Move::new(1, 2)));
    assert_eq!(transport.exchanges(), 1);

    // the duplicate is stale now; it must be discarded, never surfaced
    assert!(matches!(
        transport.recv().await,
        Err(TransportError::Timeout(_))
    ));
    assert_eq!(transport.exchanges(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn runt_and_misindexed_datagrams_are_discarded() {
    let (raw, mut transport) =
        raw_and_transport(Duration::from_millis(500), Duration::from_millis(50)).await;

    raw.send(&[9u8, 9]).await.unwrap();
    raw.send(&Frame::Hit.encode_indexed(42)).await.unwrap();
    raw.send(&Frame::Miss(Move::new(7, 7)).encode_indexed(1))
        .await
        .unwrap();

    assert_eq!(transport.recv().await.unwrap(), Frame::Miss(Move::new(7, 7)));
    assert_eq!(transport.exchanges(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unacknowledged_sends_are_retransmitted() {
    let (raw, mut transport) =
        raw_and_transport(Duration::from_millis(500), Duration::from_millis(50)).await;

    transport.send(Frame::Miss(Move::new(0, 0))).await.unwrap();

    let mut buf = [0u8; 16];
    let mut copies = 0;
    let deadline = Instant::now() + Duration::from_millis(260);
    while Instant::now() < deadline {
        if let Ok(Ok(n)) = timeout(Duration::from_millis(100), raw.recv(&mut buf)).await {
            assert_eq!(n, 4);
            assert_eq!(buf[3], 1);
            copies += 1;
        }
    }
    assert!(copies >= 2, "expected retransmissions, saw {}", copies);
}

#[tokio::test(flavor = "multi_thread")]
async fn accepting_the_reply_cancels_retransmission() {
    let (raw, mut transport) =
        raw_and_transport(Duration::from_millis(500), Duration::from_millis(50)).await;

    transport.send(Frame::Miss(Move::new(0, 0))).await.unwrap();

    let mut buf = [0u8; 16];
    let n = raw.recv(&mut buf).await.unwrap();
    assert_eq!(n, 4);

    // answer with the reply the transport expects; accepting it advances
    // the counter and with it kills the retransmitter
    raw.send(&Frame::Hit.encode_indexed(2)).await.unwrap();
    assert_eq!(transport.recv().await.unwrap(), Frame::Hit);
    assert_eq!(transport.exchanges(), 2);

    // allow at most one more cooldown tick, then drain stragglers
    sleep(Duration::from_millis(120)).await;
    while timeout(Duration::from_millis(10), raw.recv(&mut buf))
        .await
        .is_ok()
    {}

    assert!(
        timeout(Duration::from_millis(150), raw.recv(&mut buf))
            .await
            .is_err(),
        "retransmissions continued after acknowledgment"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn recv_times_out_when_nothing_arrives() {
    let (mut a, _b) = transport_pair(Duration::from_millis(200), Duration::from_millis(50)).await;
    let started = Instant::now();
    assert!(matches!(a.recv().await, Err(TransportError::Timeout(_))));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test(flavor = "multi_thread")]
async fn full_match_over_udp() {
    let (ta, tb) = transport_pair(Duration::from_secs(5), Duration::from_millis(100)).await;
    let rules = Rules::default();
    let mut rng1 = SmallRng::seed_from_u64(11);
    let mut rng2 = SmallRng::seed_from_u64(22);
    let board1 = Board::random(&rules, &mut rng1).unwrap();
    let board2 = Board::random(&rules, &mut rng2).unwrap();

    let mut guest = Session::new(
        &rules,
        board1,
        Box::new(ta),
        Box::new(RandomPlayer::new(rng1)),
        Role::Guest,
    );
    let mut host = Session::new(
        &rules,
        board2,
        Box::new(tb),
        Box::new(RandomPlayer::new(rng2)),
        Role::Host,
    );

    let (guest_outcome, host_outcome) = tokio::join!(guest.run(), host.run());
    match (guest_outcome, host_outcome) {
        (Outcome::Won, Outcome::Lost) => assert_eq!(host.own_health(), 0),
        (Outcome::Lost, Outcome::Won) => assert_eq!(guest.own_health(), 0),
        other => panic!("unexpected outcomes: {:?}", other),
    }
}
