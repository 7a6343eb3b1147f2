use super::tile::Tile;
use crate::error::{RoundError, RoundResult};
use crate::game::constants::{DEAL_BLOCK, DEAL_BLOCK_PASSES, HAND_SIZE, NUM_SEATS};
use rand::seq::SliceRandom;
use rand::Rng;

/// 牌墙（Wall）
///
/// 存储所有 136 张牌，支持洗牌、发牌和顺序摸牌
///
/// 不变量：已发牌数 + 已摸牌数 + 剩余牌数 = 136
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wall {
    /// 牌堆（从前往后摸取）
    tiles: Box<[Tile]>,
    /// 游标：已离开牌墙的牌数
    cursor: usize,
    /// 发牌阶段取走的牌数
    dealt_count: usize,
}

impl Wall {
    /// 创建一副完整的牌墙（136 张，未洗牌）
    pub fn new() -> Self {
        let mut tiles = Vec::with_capacity(Tile::TOTAL_COUNT);

        // 34 种牌，每种 4 张
        for tile in Tile::all_kinds() {
            for _ in 0..Tile::COPIES {
                tiles.push(tile);
            }
        }

        Self {
            tiles: tiles.into_boxed_slice(),
            cursor: 0,
            dealt_count: 0,
        }
    }

    /// 按给定顺序创建牌墙（用于复现牌局）
    ///
    /// 必须正好是 34 种牌各 4 张
    pub fn from_tiles(tiles: Vec<Tile>) -> RoundResult<Self> {
        let mut counts = [0u8; Tile::KINDS];
        for tile in &tiles {
            let index = tile.checked_index().ok_or(RoundError::InvalidTile(*tile))?;
            let count = &mut counts[index];
            if *count >= Tile::COPIES {
                return Err(RoundError::TileOverflow(*tile));
            }
            *count += 1;
        }
        if tiles.len() != Tile::TOTAL_COUNT {
            return Err(RoundError::InvariantViolation(format!(
                "wall built from {} tiles",
                tiles.len()
            )));
        }
        Ok(Self {
            tiles: tiles.into_boxed_slice(),
            cursor: 0,
            dealt_count: 0,
        })
    }

    /// 创建并洗好一副牌墙
    ///
    /// 随机源由调用方提供，保证多局并行时互不共享状态
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut wall = Self::new();
        wall.shuffle(rng);
        wall
    }

    /// 洗牌（Fisher-Yates），同时重置游标
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
        self.cursor = 0;
        self.dealt_count = 0;
    }

    /// 发牌
    ///
    /// 从庄家开始按座位顺序：先发三轮每人 4 张，再每人 1 张，最后庄家多摸 1 张。
    /// 返回按座位号索引的起手牌（庄家 14 张，其余 13 张）
    pub fn deal(&mut self, dealer: u8) -> RoundResult<[Vec<Tile>; 4]> {
        if dealer as usize >= NUM_SEATS {
            return Err(RoundError::InvalidSeat(dealer));
        }
        if self.cursor != 0 {
            return Err(RoundError::InvariantViolation(format!(
                "deal on a wall with {} tiles already taken",
                self.cursor
            )));
        }

        let mut hands: [Vec<Tile>; 4] = Default::default();
        let order: Vec<usize> = (0..NUM_SEATS).map(|i| (dealer as usize + i) % NUM_SEATS).collect();

        for _ in 0..DEAL_BLOCK_PASSES {
            for &seat in &order {
                for _ in 0..DEAL_BLOCK {
                    let tile = self.take()?;
                    hands[seat].push(tile);
                }
            }
        }
        for &seat in &order {
            let tile = self.take()?;
            hands[seat].push(tile);
        }
        let tile = self.take()?;
        hands[dealer as usize].push(tile);

        self.dealt_count = self.cursor;
        debug_assert_eq!(self.dealt_count, HAND_SIZE * NUM_SEATS + 1);
        Ok(hands)
    }

    /// 摸一张牌
    ///
    /// 牌墙为空时返回 `WallExhausted`（流局，不是致命错误）
    pub fn draw(&mut self) -> RoundResult<Tile> {
        self.take()
    }

    fn take(&mut self) -> RoundResult<Tile> {
        let tile = *self.tiles.get(self.cursor).ok_or(RoundError::WallExhausted)?;
        self.cursor += 1;
        Ok(tile)
    }

    /// 剩余牌数
    pub fn remaining(&self) -> usize {
        self.tiles.len() - self.cursor
    }

    /// 检查牌堆是否为空
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 发牌阶段取走的牌数
    pub fn dealt_count(&self) -> usize {
        self.dealt_count
    }

    /// 发牌之后摸走的牌数
    pub fn drawn_count(&self) -> usize {
        self.cursor - self.dealt_count
    }

    /// 总牌数（应该是 136）
    pub fn total_count(&self) -> usize {
        self.tiles.len()
    }

    /// 检查牌数守恒
    pub fn check_conservation(&self) -> RoundResult<()> {
        let sum = self.dealt_count() + self.drawn_count() + self.remaining();
        if sum != Tile::TOTAL_COUNT {
            return Err(RoundError::InvariantViolation(format!(
                "wall accounts for {} tiles instead of {}",
                sum,
                Tile::TOTAL_COUNT
            )));
        }
        Ok(())
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn test_wall_creation() {
        let wall = Wall::new();
        assert_eq!(wall.total_count(), Tile::TOTAL_COUNT);
        assert_eq!(wall.remaining(), Tile::TOTAL_COUNT);
        assert!(!wall.is_empty());
    }

    #[test]
    fn test_wall_tile_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let wall = Wall::shuffled(&mut rng);
        let mut counts = HashMap::new();
        for tile in wall.tiles.iter() {
            *counts.entry(*tile).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), Tile::KINDS);
        assert!(counts.values().all(|&c| c == 4));
    }

    #[test]
    fn test_same_seed_same_wall() {
        let a = Wall::shuffled(&mut ChaCha8Rng::seed_from_u64(42));
        let b = Wall::shuffled(&mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_deal() {
        let mut wall = Wall::shuffled(&mut ChaCha8Rng::seed_from_u64(1));
        let hands = wall.deal(2).unwrap();
        for (seat, hand) in hands.iter().enumerate() {
            let expected = if seat == 2 { 14 } else { 13 };
            assert_eq!(hand.len(), expected);
        }
        assert_eq!(wall.dealt_count(), 53);
        assert_eq!(wall.drawn_count(), 0);
        assert_eq!(wall.remaining(), 136 - 53);
        wall.check_conservation().unwrap();

        // 不能重复发牌
        assert!(matches!(wall.deal(0), Err(RoundError::InvariantViolation(_))));
    }

    #[test]
    fn test_from_tiles() {
        let tiles: Vec<Tile> = Wall::new().tiles.to_vec();
        let wall = Wall::from_tiles(tiles.clone()).unwrap();
        assert_eq!(wall.remaining(), 136);

        let mut short = tiles.clone();
        short.pop();
        assert!(matches!(Wall::from_tiles(short), Err(RoundError::InvariantViolation(_))));

        let mut doubled = tiles;
        doubled[4] = Tile::Wan(1);
        assert_eq!(Wall::from_tiles(doubled), Err(RoundError::TileOverflow(Tile::Wan(1))));
    }

    #[test]
    fn test_deal_invalid_dealer() {
        let mut wall = Wall::new();
        assert_eq!(wall.deal(4), Err(RoundError::InvalidSeat(4)));
    }

    #[test]
    fn test_draw_until_exhausted() {
        let mut wall = Wall::shuffled(&mut ChaCha8Rng::seed_from_u64(3));
        wall.deal(0).unwrap();
        let mut drawn = 0;
        while wall.draw().is_ok() {
            drawn += 1;
            wall.check_conservation().unwrap();
        }
        assert_eq!(drawn, 136 - 53);
        assert!(wall.is_empty());
        assert_eq!(wall.draw(), Err(RoundError::WallExhausted));
    }
}
