use super::tile::Tile;
use crate::error::{RoundError, RoundResult};
use smallvec::SmallVec;

/// 手牌（暗牌部分）
///
/// 使用定长计数数组存储每种牌的数量，遍历顺序固定，
/// 同样的随机种子总能得到同样的一局
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    /// 牌的数量：索引 -> 数量（0-4）
    counts: [u8; Tile::KINDS],
    /// 总牌数（用于快速查询）
    total_count: usize,
}

impl Hand {
    /// 创建空手牌
    pub fn new() -> Self {
        Self {
            counts: [0; Tile::KINDS],
            total_count: 0,
        }
    }

    /// 从一组牌创建手牌
    pub fn from_tiles(tiles: &[Tile]) -> RoundResult<Self> {
        let mut hand = Self::new();
        for &tile in tiles {
            hand.add_tile(tile)?;
        }
        Ok(hand)
    }

    /// 添加一张牌
    ///
    /// 同一种牌最多 4 张，超出返回 `TileOverflow`；不存在的牌返回 `InvalidTile`
    pub fn add_tile(&mut self, tile: Tile) -> RoundResult<()> {
        let index = tile.checked_index().ok_or(RoundError::InvalidTile(tile))?;
        let count = &mut self.counts[index];
        if *count >= Tile::COPIES {
            return Err(RoundError::TileOverflow(tile));
        }
        *count += 1;
        self.total_count += 1;
        Ok(())
    }

    /// 移除一张牌
    ///
    /// 只移除一张，即使手里有多张相同的牌；点数越界的牌同样返回 `TileNotHeld`
    pub fn remove_tile(&mut self, tile: Tile) -> RoundResult<()> {
        let index = tile.checked_index().ok_or(RoundError::TileNotHeld(tile))?;
        let count = &mut self.counts[index];
        if *count == 0 {
            return Err(RoundError::TileNotHeld(tile));
        }
        *count -= 1;
        self.total_count -= 1;
        Ok(())
    }

    /// 原子地移除一组牌：任何一张不足则整体不变
    pub fn remove_tiles(&mut self, tiles: &[Tile]) -> RoundResult<()> {
        let mut needed = [0u8; Tile::KINDS];
        for &tile in tiles {
            let index = tile.checked_index().ok_or(RoundError::TileNotHeld(tile))?;
            needed[index] = needed[index].saturating_add(1);
        }
        for (index, &n) in needed.iter().enumerate() {
            if n > self.counts[index] {
                let tile = Tile::from_index(index).ok_or(RoundError::MalformedMeld)?;
                return Err(RoundError::TileNotHeld(tile));
            }
        }
        for (index, &n) in needed.iter().enumerate() {
            self.counts[index] -= n;
        }
        self.total_count -= tiles.len();
        Ok(())
    }

    /// 检查是否有某张牌
    #[inline]
    pub fn has_tile(&self, tile: Tile) -> bool {
        self.tile_count(tile) > 0
    }

    /// 查询某张牌的数量
    #[inline]
    pub fn tile_count(&self, tile: Tile) -> u8 {
        tile.checked_index().map_or(0, |index| self.counts[index])
    }

    /// 获取总牌数
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// 检查手牌是否为空
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// 转换为排序后的牌向量
    ///
    /// 排序规则：万、筒、条、风、箭，各自按点数
    pub fn to_sorted_vec(&self) -> Vec<Tile> {
        let mut result = Vec::with_capacity(self.total_count);
        for (index, &count) in self.counts.iter().enumerate() {
            if let Some(tile) = Tile::from_index(index) {
                for _ in 0..count {
                    result.push(tile);
                }
            }
        }
        result
    }

    /// 获取所有不同的牌（按索引顺序）
    pub fn distinct_tiles(&self) -> SmallVec<[Tile; 14]> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .filter_map(|(index, _)| Tile::from_index(index))
            .collect()
    }

    /// 计数数组（拆解算法使用）
    pub fn counts(&self) -> &[u8; Tile::KINDS] {
        &self.counts
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}
