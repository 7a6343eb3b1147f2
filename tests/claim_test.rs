use bj_engine::{Claim, ClaimRequest, ClaimResolver, Player, RoundError, Tile};

fn player_with(seat: u8, tiles: &[Tile]) -> Player {
    let mut player = Player::new(seat);
    player.receive(tiles).unwrap();
    player
}

/// 两家同时碰：离打牌者顺时针最近的得牌
#[test]
fn test_two_pongs_nearest_clockwise_wins() {
    let requests = [
        ClaimRequest { seat: 3, claim: Claim::Pong },
        ClaimRequest { seat: 2, claim: Claim::Pong },
    ];
    let winner = ClaimResolver::resolve(&requests, 1).expect("应该有人得牌");
    assert_eq!(winner.seat, 2, "打牌者 1 时座位 2 更近");

    // 绕过 0 号座位
    let requests = [
        ClaimRequest { seat: 2, claim: Claim::Pong },
        ClaimRequest { seat: 1, claim: Claim::Pong },
    ];
    assert_eq!(ClaimResolver::resolve(&requests, 3).unwrap().seat, 1, "打牌者 3 时座位 1 更近");
}

/// 请求的提交顺序不影响结果
#[test]
fn test_resolution_ignores_request_order() {
    let mut requests = vec![
        ClaimRequest { seat: 0, claim: Claim::Pong },
        ClaimRequest { seat: 3, claim: Claim::Chow { start: Tile::Tiao(2) } },
        ClaimRequest { seat: 1, claim: Claim::Pass },
    ];
    let forward = ClaimResolver::resolve(&requests, 2);
    requests.reverse();
    assert_eq!(forward, ClaimResolver::resolve(&requests, 2));
    assert_eq!(forward.unwrap().seat, 0);
}

/// 打牌者自己的请求被忽略
#[test]
fn test_discarder_cannot_claim_own_tile() {
    let requests = [ClaimRequest { seat: 2, claim: Claim::Pong }];
    assert_eq!(ClaimResolver::resolve(&requests, 2), None);

    let player = player_with(2, &[Tile::Wan(5), Tile::Wan(5)]);
    assert!(ClaimResolver::available_claims(&player, Tile::Wan(5), 2).is_empty());
}

/// 字牌不能吃，边张只能吃一种
#[test]
fn test_chow_starts() {
    let player = player_with(1, &[Tile::Feng(1), Tile::Feng(2), Tile::Feng(4)]);
    assert!(ClaimResolver::available_claims(&player, Tile::Feng(3), 0).is_empty());

    let player = player_with(1, &[Tile::Tong(8), Tile::Tong(7)]);
    assert_eq!(
        ClaimResolver::available_claims(&player, Tile::Tong(9), 0),
        vec![Claim::Chow { start: Tile::Tong(7) }]
    );

    // 手里 346，吃 5 可以组 345 或 456
    let player = player_with(1, &[Tile::Tiao(3), Tile::Tiao(4), Tile::Tiao(6)]);
    assert_eq!(
        ClaimResolver::available_claims(&player, Tile::Tiao(5), 0),
        vec![Claim::Chow { start: Tile::Tiao(3) }, Claim::Chow { start: Tile::Tiao(4) }]
    );
}

/// 胡不能作为普通请求提交
#[test]
fn test_hu_is_not_a_plain_claim() {
    let player = player_with(3, &[Tile::Jian(1), Tile::Jian(1)]);
    assert_eq!(
        ClaimResolver::validate(&player, Claim::Hu, Tile::Jian(1), 2),
        Err(RoundError::InvalidClaim { seat: 3, claim: Claim::Hu })
    );
    assert!(ClaimResolver::validate(&player, Claim::Pong, Tile::Jian(1), 2).is_ok());
}
