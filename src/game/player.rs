use crate::error::{RoundError, RoundResult};
use crate::game::constants::HAND_SIZE;
use crate::tile::{Decomposition, Hand, Meld, MeldDecomposer, Tile};

/// 座位状态：暗牌 + 亮出的面子
///
/// 只由 `RoundEngine` 代表当前行动的座位修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// 座位号（0-3）
    pub seat: u8,
    /// 暗牌
    pub hand: Hand,
    /// 亮出的面子（按亮出顺序）
    pub melds: Vec<Meld>,
    /// 放弃合法胡牌的次数
    pub missed_hu: u32,
}

impl Player {
    /// 创建新玩家
    pub fn new(seat: u8) -> Self {
        Self {
            seat,
            hand: Hand::new(),
            melds: Vec::new(),
            missed_hu: 0,
        }
    }

    /// 接收起手牌
    pub fn receive(&mut self, tiles: &[Tile]) -> RoundResult<()> {
        for &tile in tiles {
            self.hand.add_tile(tile)?;
        }
        Ok(())
    }

    /// 摸牌
    pub fn draw(&mut self, tile: Tile) -> RoundResult<()> {
        self.hand.add_tile(tile)
    }

    /// 打出一张牌
    ///
    /// 手里没有这张牌时返回 `TileNotHeld`，手牌不变
    pub fn discard(&mut self, tile: Tile) -> RoundResult<()> {
        self.hand.remove_tile(tile)
    }

    /// 亮出一个面子
    ///
    /// # 参数
    ///
    /// - `meld`: 要亮出的面子
    /// - `claimed`: 从别人弃牌中拿到的那张（暗杠时为 None）
    ///
    /// 面子中除 `claimed` 外的牌必须都在手里，否则手牌不变并返回错误
    pub fn expose(&mut self, meld: Meld, claimed: Option<Tile>) -> RoundResult<()> {
        meld.validate()?;
        let mut needed = meld.tiles();
        if let Some(tile) = claimed {
            let pos = needed.iter().position(|&t| t == tile).ok_or(RoundError::MalformedMeld)?;
            needed.remove(pos);
        }
        self.hand.remove_tiles(&needed)?;
        self.melds.push(meld);
        Ok(())
    }

    /// 是否门前清（没有亮出的明面子，暗杠不算）
    pub fn is_concealed(&self) -> bool {
        self.melds.iter().all(|m| m.concealed)
    }

    /// 杠的数量
    pub fn kong_count(&self) -> usize {
        self.melds.iter().filter(|m| m.is_kong()).count()
    }

    /// 归属于本座位的牌数：暗牌 + 每个面子 3 张
    ///
    /// 杠的第 4 张由补牌抵消，所以这里只算 3 张
    pub fn attributable_count(&self) -> usize {
        self.hand.total_count() + 3 * self.melds.len()
    }

    /// 检查牌数：任何检查点都应是 13 或 14
    pub fn check_tile_count(&self) -> RoundResult<()> {
        let count = self.attributable_count();
        if count != HAND_SIZE && count != HAND_SIZE + 1 {
            return Err(RoundError::InvariantViolation(format!(
                "seat {} holds {} attributable tiles",
                self.seat, count
            )));
        }
        Ok(())
    }

    /// 当前手牌（已经 14 张）的所有胡牌拆解
    pub fn decompositions(&self) -> RoundResult<Vec<Decomposition>> {
        MeldDecomposer::decompose(&self.hand, &self.melds)
    }

    /// 加上别人打出的一张牌后的所有胡牌拆解
    pub fn decompositions_with(&self, tile: Tile) -> RoundResult<Vec<Decomposition>> {
        MeldDecomposer::decompose_with(&self.hand, &self.melds, tile)
    }
}
