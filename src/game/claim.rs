use crate::error::{RoundError, RoundResult};
use crate::game::constants::NUM_SEATS;
use crate::game::kong::KongHandler;
use crate::game::player::Player;
use crate::tile::Tile;

/// 对一张弃牌（或自己回合）的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Claim {
    /// 胡
    Hu,
    /// 杠（弃牌，或自己回合的暗杠/加杠）
    Gong { tile: Tile },
    /// 碰
    Pong,
    /// 吃，`start` 是顺子的第一张
    Chow { start: Tile },
    /// 过
    Pass,
}

impl Claim {
    /// 优先级：胡 > 杠 > 碰 > 吃 > 过
    pub fn priority(&self) -> u8 {
        match self {
            Claim::Hu => 4,
            Claim::Gong { .. } => 3,
            Claim::Pong => 2,
            Claim::Chow { .. } => 1,
            Claim::Pass => 0,
        }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Claim::Pass)
    }
}

/// 某个座位提交的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    pub seat: u8,
    pub claim: Claim,
}

/// 吃碰杠胡仲裁器
pub struct ClaimResolver;

impl ClaimResolver {
    /// 从打牌者开始顺时针的距离（1-3），打牌者自己是 0
    #[inline]
    pub fn distance(discarder: u8, seat: u8) -> usize {
        (seat as usize + NUM_SEATS - discarder as usize) % NUM_SEATS
    }

    /// 打牌者的下家（唯一可以吃的座位）
    #[inline]
    pub fn left_of(discarder: u8) -> u8 {
        ((discarder as usize + 1) % NUM_SEATS) as u8
    }

    /// 某座位对这张弃牌可以提出的杠/碰/吃请求
    ///
    /// 胡单独判断（需要番数），这里不包含
    pub fn available_claims(player: &Player, discard: Tile, discarder: u8) -> Vec<Claim> {
        let mut claims = Vec::new();
        if player.seat == discarder {
            return claims;
        }
        if KongHandler::kong_on_discard(player, discard).is_some() {
            claims.push(Claim::Gong { tile: discard });
        }
        if player.hand.tile_count(discard) >= 2 {
            claims.push(Claim::Pong);
        }
        if player.seat == Self::left_of(discarder) {
            for start in Self::chow_starts(player, discard) {
                claims.push(Claim::Chow { start });
            }
        }
        claims
    }

    /// 用这张弃牌可以组成的顺子起点
    fn chow_starts(player: &Player, discard: Tile) -> Vec<Tile> {
        let mut starts = Vec::new();
        if !discard.suit().is_numeral() {
            return starts;
        }
        let rank = discard.rank();
        for offset in 0..3u8 {
            if rank <= offset {
                continue;
            }
            let Some(start) = Tile::new(discard.suit(), rank - offset) else {
                continue;
            };
            if start.rank() > 7 {
                continue;
            }
            let mut next = Some(start);
            let mut ok = true;
            for _ in 0..3 {
                match next {
                    Some(t) => {
                        if t != discard && !player.hand.has_tile(t) {
                            ok = false;
                        }
                        next = t.next();
                    }
                    None => ok = false,
                }
            }
            if ok {
                starts.push(start);
            }
        }
        starts.sort();
        starts
    }

    /// 重新校验一个请求能否用手牌 + 弃牌完成
    ///
    /// 不合法返回 `InvalidClaim`，调用方将其当作过
    pub fn validate(player: &Player, claim: Claim, discard: Tile, discarder: u8) -> RoundResult<()> {
        let legal = match claim {
            Claim::Pass => true,
            // 胡由番数检查单独确认
            Claim::Hu => false,
            other => Self::available_claims(player, discard, discarder).contains(&other),
        };
        if legal {
            Ok(())
        } else {
            Err(RoundError::InvalidClaim { seat: player.seat, claim })
        }
    }

    /// 仲裁一张弃牌上的所有请求
    ///
    /// 优先级高的先得；同优先级取离打牌者顺时针最近的座位。
    /// 吃只有下家有效，打牌者自己的请求忽略
    pub fn resolve(requests: &[ClaimRequest], discarder: u8) -> Option<ClaimRequest> {
        requests
            .iter()
            .filter(|r| !r.claim.is_pass())
            .filter(|r| r.seat != discarder && (r.seat as usize) < NUM_SEATS)
            .filter(|r| !matches!(r.claim, Claim::Chow { .. }) || r.seat == Self::left_of(discarder))
            .min_by_key(|r| (std::cmp::Reverse(r.claim.priority()), Self::distance(discarder, r.seat)))
            .copied()
    }
}
