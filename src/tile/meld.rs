use super::tile::Tile;
use crate::error::{RoundError, RoundResult};
use smallvec::SmallVec;

/// 面子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum MeldKind {
    /// 刻子（三张相同）
    Pung,
    /// 顺子（同花色连续三张数牌）
    Chow,
    /// 杠（四张相同）
    Kong,
}

/// 面子来源（影响番数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum MeldSource {
    /// 自己摸到的牌组成
    SelfDrawn,
    /// 吃/碰/杠了别人打出的牌
    Claimed { from: u8 },
}

/// 面子
///
/// `tile` 是刻子/杠的牌，或顺子的第一张（最小的一张）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tile: Tile,
    /// 是否为暗（暗杠、或拆解出的手牌面子）
    pub concealed: bool,
    pub source: MeldSource,
}

impl Meld {
    /// 创建面子并验证形状
    pub fn new(kind: MeldKind, tile: Tile, concealed: bool, source: MeldSource) -> RoundResult<Self> {
        let meld = Self { kind, tile, concealed, source };
        meld.validate()?;
        Ok(meld)
    }

    /// 碰出的明刻
    pub fn claimed_pung(tile: Tile, from: u8) -> Self {
        Self { kind: MeldKind::Pung, tile, concealed: false, source: MeldSource::Claimed { from } }
    }

    /// 吃出的顺子
    pub fn claimed_chow(start: Tile, from: u8) -> RoundResult<Self> {
        Self::new(MeldKind::Chow, start, false, MeldSource::Claimed { from })
    }

    /// 暗杠
    pub fn concealed_kong(tile: Tile) -> Self {
        Self { kind: MeldKind::Kong, tile, concealed: true, source: MeldSource::SelfDrawn }
    }

    /// 手牌中拆解出的暗面子
    pub(crate) fn hidden(kind: MeldKind, tile: Tile) -> Self {
        Self { kind, tile, concealed: true, source: MeldSource::SelfDrawn }
    }

    /// 验证面子形状：牌必须存在，顺子必须是数牌且起点不超过 7
    pub fn validate(&self) -> RoundResult<()> {
        if !self.tile.is_valid() {
            return Err(RoundError::MalformedMeld);
        }
        if self.kind == MeldKind::Chow && (!self.tile.suit().is_numeral() || self.tile.rank() > 7) {
            return Err(RoundError::MalformedMeld);
        }
        Ok(())
    }

    /// 组成面子的所有牌
    pub fn tiles(&self) -> SmallVec<[Tile; 4]> {
        match self.kind {
            MeldKind::Pung => SmallVec::from_slice(&[self.tile; 3]),
            MeldKind::Kong => SmallVec::from_slice(&[self.tile; 4]),
            MeldKind::Chow => {
                let mut tiles = SmallVec::new();
                let mut next = Some(self.tile);
                for _ in 0..3 {
                    if let Some(t) = next {
                        tiles.push(t);
                        next = t.next();
                    }
                }
                tiles
            }
        }
    }

    /// 牌数（杠是 4，其余是 3）
    pub fn tile_count(&self) -> usize {
        match self.kind {
            MeldKind::Kong => 4,
            MeldKind::Pung | MeldKind::Chow => 3,
        }
    }

    /// 刻子或杠
    #[inline]
    pub fn is_triplet_like(&self) -> bool {
        matches!(self.kind, MeldKind::Pung | MeldKind::Kong)
    }

    #[inline]
    pub fn is_kong(&self) -> bool {
        self.kind == MeldKind::Kong
    }

    /// 是否亮在桌面上
    #[inline]
    pub fn is_exposed(&self) -> bool {
        !self.concealed
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.tiles().contains(&tile)
    }
}
