use crate::error::{RoundError, RoundResult};
use crate::game::constants::{NUM_SEATS, RISK_FLOOR};
use crate::tile::{Suit, Tile};

/// 最近一张弃牌
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardRecord {
    pub seat: u8,
    pub tile: Tile,
    /// 被哪个座位吃碰杠胡（None 表示无人认领）
    pub claimed_by: Option<u8>,
}

/// 对策略公开的局面
///
/// 只含公开信息：牌墙余量、轮次、庄家和各家弃牌。
/// 按花色统计的弃牌只供策略参考，引擎的正确性不依赖它
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    /// 牌墙剩余张数
    pub wall_remaining: usize,
    /// 轮次（每打出一张牌 +1）
    pub turn: u32,
    /// 庄家座位
    pub dealer: u8,
    /// 当前行动的座位
    pub current_seat: u8,
    /// 各家弃牌（按打出顺序）
    pub discard_piles: [Vec<Tile>; NUM_SEATS],
    /// 各家按花色统计的弃牌数：[座位][花色]
    suit_discards: [[u32; 5]; NUM_SEATS],
    /// 被吃碰杠胡拿走的弃牌数
    claimed_discards: usize,
    last_discard: Option<DiscardRecord>,
}

impl RoundState {
    pub fn new(dealer: u8, wall_remaining: usize) -> Self {
        Self {
            wall_remaining,
            turn: 0,
            dealer,
            current_seat: dealer,
            discard_piles: Default::default(),
            suit_discards: [[0; 5]; NUM_SEATS],
            claimed_discards: 0,
            last_discard: None,
        }
    }

    /// 是否是庄家
    #[inline]
    pub fn is_dealer(&self, seat: u8) -> bool {
        self.dealer == seat
    }

    /// 记录一张弃牌
    pub fn record_discard(&mut self, seat: u8, tile: Tile) {
        let seat_index = seat as usize % NUM_SEATS;
        self.discard_piles[seat_index].push(tile);
        self.suit_discards[seat_index][tile.suit() as usize] += 1;
        self.last_discard = Some(DiscardRecord { seat, tile, claimed_by: None });
        self.turn += 1;
    }

    /// 最近一张弃牌
    pub fn last_discard(&self) -> Option<&DiscardRecord> {
        self.last_discard.as_ref()
    }

    /// 标记最近一张弃牌被认领
    ///
    /// 同一张弃牌只能被认领一次，否则是内部错误
    pub fn mark_claimed(&mut self, claimer: u8) -> RoundResult<Tile> {
        let record = self
            .last_discard
            .as_mut()
            .ok_or_else(|| RoundError::InvariantViolation("claim without a discard".to_string()))?;
        if let Some(previous) = record.claimed_by {
            return Err(RoundError::InvariantViolation(format!(
                "discard {} already claimed by seat {}",
                record.tile, previous
            )));
        }
        record.claimed_by = Some(claimer);
        self.claimed_discards += 1;
        Ok(record.tile)
    }

    /// 仍留在桌面上的弃牌数
    pub fn unclaimed_discards(&self) -> usize {
        self.total_discards() - self.claimed_discards
    }

    /// 所有座位的弃牌总数
    pub fn total_discards(&self) -> usize {
        self.discard_piles.iter().map(Vec::len).sum()
    }

    /// 某张牌在弃牌中出现的次数
    pub fn seen_count(&self, tile: Tile) -> usize {
        self.discard_piles
            .iter()
            .flat_map(|pile| pile.iter())
            .filter(|&&t| t == tile)
            .count()
    }

    /// 某座位按花色统计的弃牌数
    pub fn suit_discards(&self, seat: u8) -> [u32; 5] {
        self.suit_discards[seat as usize % NUM_SEATS]
    }

    /// 其他三家按花色统计的弃牌数之和
    pub fn opponent_suit_counts(&self, seat: u8) -> [u32; 5] {
        let mut counts = [0u32; 5];
        for (other, row) in self.suit_discards.iter().enumerate() {
            if other == seat as usize {
                continue;
            }
            for suit in Suit::all() {
                counts[suit as usize] += row[suit as usize];
            }
        }
        counts
    }

    /// 放炮风险估计：弃牌数 / max(100, 牌墙余量 + 弃牌数)
    pub fn risk(&self) -> f64 {
        let discards = self.total_discards();
        let denominator = RISK_FLOOR.max(self.wall_remaining + discards);
        discards as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_counts() {
        let mut state = RoundState::new(0, 83);
        state.record_discard(0, Tile::Wan(1));
        state.record_discard(1, Tile::Feng(2));
        state.record_discard(2, Tile::Wan(9));

        assert_eq!(state.turn, 3);
        assert_eq!(state.total_discards(), 3);
        assert_eq!(state.suit_discards(1)[Suit::Feng as usize], 1);

        let counts = state.opponent_suit_counts(0);
        assert_eq!(counts[Suit::Wan as usize], 1);
        assert_eq!(counts[Suit::Feng as usize], 1);
        assert_eq!(state.seen_count(Tile::Wan(9)), 1);
    }

    #[test]
    fn test_double_claim_is_invariant_violation() {
        let mut state = RoundState::new(0, 83);
        assert!(state.mark_claimed(1).is_err());

        state.record_discard(0, Tile::Tong(5));
        assert_eq!(state.mark_claimed(2), Ok(Tile::Tong(5)));
        assert_eq!(state.unclaimed_discards(), 0);
        assert!(matches!(state.mark_claimed(3), Err(RoundError::InvariantViolation(_))));
    }

    #[test]
    fn test_risk() {
        let mut state = RoundState::new(0, 83);
        assert_eq!(state.risk(), 0.0);
        for _ in 0..10 {
            state.record_discard(1, Tile::Wan(2));
        }
        state.wall_remaining = 40;
        // 分母取下限 100
        assert!((state.risk() - 0.1).abs() < 1e-9);

        state.wall_remaining = 140;
        assert!((state.risk() - 10.0 / 150.0).abs() < 1e-9);
    }
}
