use crate::error::{RoundError, RoundResult};
use crate::game::player::Player;
use crate::tile::{Meld, MeldKind, MeldSource, Tile};

/// 杠类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum KongType {
    /// 直杠（手里三张，杠别人打出的第四张）
    Direct,
    /// 加杠（已经碰出的刻子补上第四张）
    Added,
    /// 暗杠（手牌中有四张相同的牌）
    Concealed,
}

/// 杠操作器
///
/// 每种杠之后都要从牌墙补一张牌，由 `RoundEngine` 负责
pub struct KongHandler;

impl KongHandler {
    /// 检查是否可以暗杠
    pub fn can_concealed_kong(player: &Player, tile: Tile) -> bool {
        player.hand.tile_count(tile) == 4
    }

    /// 检查是否可以用手里的牌加杠
    ///
    /// 加杠条件：
    /// 1. 已经碰出这张牌的明刻
    /// 2. 手牌中有第四张
    pub fn can_added_kong(player: &Player, tile: Tile) -> bool {
        Self::exposed_pung_position(player, tile).is_some() && player.hand.has_tile(tile)
    }

    /// 检查别人打出的牌能否开杠
    ///
    /// 手里三张是直杠，已经碰出明刻是加杠
    pub fn kong_on_discard(player: &Player, tile: Tile) -> Option<KongType> {
        if player.hand.tile_count(tile) >= 3 {
            Some(KongType::Direct)
        } else if Self::exposed_pung_position(player, tile).is_some() {
            Some(KongType::Added)
        } else {
            None
        }
    }

    /// 自己回合可以开的杠（按牌的索引顺序）
    pub fn self_turn_options(player: &Player) -> Vec<(KongType, Tile)> {
        let mut options = Vec::new();
        for tile in player.hand.distinct_tiles() {
            if Self::can_concealed_kong(player, tile) {
                options.push((KongType::Concealed, tile));
            } else if Self::can_added_kong(player, tile) {
                options.push((KongType::Added, tile));
            }
        }
        options
    }

    /// 执行暗杠
    pub fn concealed_kong(player: &mut Player, tile: Tile) -> RoundResult<()> {
        if !Self::can_concealed_kong(player, tile) {
            return Err(RoundError::TileNotHeld(tile));
        }
        player.expose(Meld::concealed_kong(tile), None)
    }

    /// 执行加杠（第四张来自手牌）
    pub fn added_kong(player: &mut Player, tile: Tile) -> RoundResult<()> {
        let pos = Self::exposed_pung_position(player, tile).ok_or(RoundError::MalformedMeld)?;
        player.hand.remove_tile(tile)?;
        player.melds[pos].kind = MeldKind::Kong;
        Ok(())
    }

    /// 杠别人打出的牌
    ///
    /// 直杠从手牌移除三张；加杠把已碰出的明刻升级为杠，手牌不变
    pub fn kong_discard(player: &mut Player, tile: Tile, from: u8) -> RoundResult<KongType> {
        match Self::kong_on_discard(player, tile) {
            Some(KongType::Direct) => {
                let meld = Meld::new(MeldKind::Kong, tile, false, MeldSource::Claimed { from })?;
                player.expose(meld, Some(tile))?;
                Ok(KongType::Direct)
            }
            Some(KongType::Added) => {
                let pos = Self::exposed_pung_position(player, tile).ok_or(RoundError::MalformedMeld)?;
                player.melds[pos].kind = MeldKind::Kong;
                Ok(KongType::Added)
            }
            _ => Err(RoundError::TileNotHeld(tile)),
        }
    }

    fn exposed_pung_position(player: &Player, tile: Tile) -> Option<usize> {
        player
            .melds
            .iter()
            .position(|m| m.kind == MeldKind::Pung && m.tile == tile && m.is_exposed())
    }
}
