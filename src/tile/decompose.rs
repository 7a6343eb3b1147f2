use super::hand::Hand;
use super::meld::{Meld, MeldKind};
use super::tile::Tile;
use crate::error::{RoundError, RoundResult};
use crate::game::constants::MELDS_PER_WIN;
use smallvec::SmallVec;

/// 一种胡牌拆解：4 个面子 + 1 个雀头
///
/// `melds` 已经排序，所以两个拆解可以直接比较是否相同
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct Decomposition {
    /// 雀头（对子）
    pub pair: Tile,
    /// 面子（包含已经亮出的面子）
    pub melds: SmallVec<[Meld; 4]>,
}

impl Decomposition {
    /// 所有牌（面子 + 雀头），杠算 4 张
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.melds.iter().flat_map(|m| m.tiles()).collect();
        tiles.push(self.pair);
        tiles.push(self.pair);
        tiles
    }

    /// 杠的数量
    pub fn kong_count(&self) -> usize {
        self.melds.iter().filter(|m| m.is_kong()).count()
    }

    /// 是否有亮出的面子
    pub fn has_exposed(&self) -> bool {
        self.melds.iter().any(|m| m.is_exposed())
    }
}

/// 面子拆解器
///
/// 穷举回溯：每一步取当前最小的一种牌，尝试作雀头、刻子、杠或顺子的起点。
/// 所有合法拆解都会保留，取哪一种由番数计算决定
pub struct MeldDecomposer;

impl MeldDecomposer {
    /// 拆解手牌
    ///
    /// # 参数
    ///
    /// - `hand`: 暗牌（通常 14 张，亮出面子后相应减少）
    /// - `exposed`: 已经固定的面子（碰、吃、杠），不参与拆解
    ///
    /// # 返回
    ///
    /// 所有拆解（去重、排序后），没有拆解说明不能胡
    pub fn decompose(hand: &Hand, exposed: &[Meld]) -> RoundResult<Vec<Decomposition>> {
        Self::decompose_counts(hand.counts(), exposed)
    }

    /// 在手牌之外再加一张牌后拆解（判断能否胡别人打出的牌）
    pub fn decompose_with(hand: &Hand, exposed: &[Meld], extra: Tile) -> RoundResult<Vec<Decomposition>> {
        let index = extra.checked_index().ok_or(RoundError::InvalidTile(extra))?;
        let mut counts = *hand.counts();
        counts[index] += 1;
        Self::decompose_counts(&counts, exposed)
    }

    /// 按计数数组拆解
    pub fn decompose_counts(counts: &[u8; Tile::KINDS], exposed: &[Meld]) -> RoundResult<Vec<Decomposition>> {
        // 同一种牌（暗牌加亮出的面子）最多 4 张
        let mut total = *counts;
        for meld in exposed {
            meld.validate()?;
            for tile in meld.tiles() {
                total[tile.index()] += 1;
            }
        }
        for (index, &count) in total.iter().enumerate() {
            if count > Tile::COPIES {
                let tile = Tile::from_index(index).ok_or(RoundError::MalformedMeld)?;
                return Err(RoundError::TileOverflow(tile));
            }
        }

        if exposed.len() > MELDS_PER_WIN {
            return Ok(Vec::new());
        }

        let mut search = Search {
            counts: *counts,
            needed: MELDS_PER_WIN - exposed.len(),
            pair: None,
            groups: SmallVec::new(),
            results: Vec::new(),
        };
        search.run(0);

        let mut results: Vec<Decomposition> = search
            .results
            .into_iter()
            .map(|(pair, groups)| {
                let mut melds: SmallVec<[Meld; 4]> = exposed.iter().copied().collect();
                melds.extend(groups);
                melds.sort();
                Decomposition { pair, melds }
            })
            .collect();
        results.sort();
        results.dedup();
        Ok(results)
    }
}

/// 回溯搜索的状态
struct Search {
    counts: [u8; Tile::KINDS],
    /// 还需要从暗牌中拆出的面子数
    needed: usize,
    pair: Option<Tile>,
    groups: SmallVec<[Meld; 4]>,
    results: Vec<(Tile, SmallVec<[Meld; 4]>)>,
}

impl Search {
    fn run(&mut self, from: usize) {
        let Some(index) = (from..Tile::KINDS).find(|&i| self.counts[i] > 0) else {
            if let Some(pair) = self.pair {
                if self.groups.len() == self.needed {
                    self.results.push((pair, self.groups.clone()));
                }
            }
            return;
        };
        let Some(tile) = Tile::from_index(index) else {
            return;
        };
        let count = self.counts[index];
        let room = self.groups.len() < self.needed;

        // 雀头
        if self.pair.is_none() && count >= 2 {
            self.counts[index] -= 2;
            self.pair = Some(tile);
            self.run(index);
            self.pair = None;
            self.counts[index] += 2;
        }

        // 刻子
        if room && count >= 3 {
            self.take_group(index, 3, MeldKind::Pung, tile);
        }

        // 杠（归一为一个面子）
        if room && count == 4 {
            self.take_group(index, 4, MeldKind::Kong, tile);
        }

        // 顺子
        if room && tile.suit().is_numeral() && tile.rank() <= 7 {
            if self.counts[index + 1] > 0 && self.counts[index + 2] > 0 {
                for offset in 0..3 {
                    self.counts[index + offset] -= 1;
                }
                self.groups.push(Meld::hidden(MeldKind::Chow, tile));
                self.run(index);
                self.groups.pop();
                for offset in 0..3 {
                    self.counts[index + offset] += 1;
                }
            }
        }
    }

    fn take_group(&mut self, index: usize, size: u8, kind: MeldKind, tile: Tile) {
        self.counts[index] -= size;
        self.groups.push(Meld::hidden(kind, tile));
        self.run(index);
        self.groups.pop();
        self.counts[index] += size;
    }
}

/// 拆解手牌（便捷函数）
#[inline]
pub fn decompose(hand: &Hand, exposed: &[Meld]) -> RoundResult<Vec<Decomposition>> {
    MeldDecomposer::decompose(hand, exposed)
}

/// 是否构成胡牌牌型（不考虑番数）
///
/// 牌数溢出或亮出的面子不合法时返回错误
#[inline]
pub fn is_win(hand: &Hand, exposed: &[Meld]) -> RoundResult<bool> {
    Ok(!MeldDecomposer::decompose(hand, exposed)?.is_empty())
}
