use crate::tile::{Decomposition, MeldKind, Suit, Tile};
use smallvec::SmallVec;

/// 番种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FanPattern {
    /// 自摸
    SelfDraw,
    /// 门前清
    Concealed,
    /// 断幺九
    AllSimples,
    /// 碰碰胡
    AllPungs,
    /// 三色同顺
    MixedTripleChow,
    /// 清一色
    PureFlush,
    /// 小三元
    LittleDragons,
    /// 杠（每个 +1）
    Kong,
    /// 杠上开花
    KongReplacementWin,
}

impl FanPattern {
    pub fn name(&self) -> &'static str {
        match self {
            FanPattern::SelfDraw => "self_draw",
            FanPattern::Concealed => "concealed",
            FanPattern::AllSimples => "all_simples",
            FanPattern::AllPungs => "all_pungs",
            FanPattern::MixedTripleChow => "mixed_triple_chow",
            FanPattern::PureFlush => "pure_flush",
            FanPattern::LittleDragons => "little_dragons",
            FanPattern::Kong => "kong",
            FanPattern::KongReplacementWin => "kong_replacement_win",
        }
    }
}

/// 胡牌时的场况
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct WinContext {
    /// 胡的牌是自己摸的
    pub self_draw: bool,
    /// 没有亮出明面子（暗杠不影响）
    pub fully_concealed: bool,
    /// 本座位开过的杠数，只随终局记录带出
    ///
    /// 杠番按拆解中的杠计算；杠总是固定面子，两者相同
    pub kong_count: u32,
    /// 胡的是杠后补牌
    pub kong_replacement_win: bool,
}

/// 番数明细
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FanBreakdown {
    /// 命中的番种及番数
    pub items: SmallVec<[(FanPattern, u32); 8]>,
    /// 总番数（已按上限截断）
    pub total: u32,
}

impl FanBreakdown {
    /// 是否包含某个番种
    pub fn has(&self, pattern: FanPattern) -> bool {
        self.items.iter().any(|(p, _)| *p == pattern)
    }

    /// 某个番种的番数（没有命中为 0）
    pub fn fan_of(&self, pattern: FanPattern) -> u32 {
        self.items
            .iter()
            .find(|(p, _)| *p == pattern)
            .map(|(_, f)| *f)
            .unwrap_or(0)
    }
}

/// 番数计算器
///
/// 纯函数：同样的拆解和场况总是得到同样的番数
pub struct FanCalculator;

impl FanCalculator {
    /// 计算一种拆解的番数
    ///
    /// # 参数
    ///
    /// - `decomp`: 胡牌拆解（面子 + 雀头）
    /// - `ctx`: 胡牌场况
    /// - `cap`: 番数上限
    pub fn evaluate(decomp: &Decomposition, ctx: &WinContext, cap: u32) -> FanBreakdown {
        let mut items: SmallVec<[(FanPattern, u32); 8]> = SmallVec::new();
        let tiles = decomp.tiles();
        let concealed_bonus = |exposed: u32, concealed: u32| if ctx.fully_concealed { concealed } else { exposed };

        if ctx.self_draw {
            items.push((FanPattern::SelfDraw, 1));
        }
        if ctx.fully_concealed {
            items.push((FanPattern::Concealed, 1));
        }
        if tiles.iter().all(Tile::is_simple) {
            items.push((FanPattern::AllSimples, 1));
        }
        if decomp.melds.iter().all(|m| m.is_triplet_like()) {
            items.push((FanPattern::AllPungs, 2));
        }
        if Self::has_mixed_triple_chow(decomp) {
            items.push((FanPattern::MixedTripleChow, 2));
        }
        if Self::is_pure_flush(&tiles) {
            items.push((FanPattern::PureFlush, concealed_bonus(4, 6)));
        }
        if Self::is_little_dragons(decomp) {
            items.push((FanPattern::LittleDragons, concealed_bonus(4, 6)));
        }
        let kongs = decomp.kong_count() as u32;
        if kongs > 0 {
            items.push((FanPattern::Kong, kongs));
        }
        if ctx.kong_replacement_win {
            items.push((FanPattern::KongReplacementWin, 1));
        }

        let sum: u32 = items.iter().map(|(_, f)| f).sum();
        FanBreakdown {
            items,
            total: sum.min(cap),
        }
    }

    /// 从多种拆解中选番数最高的
    ///
    /// 番数相同时取排在前面的拆解（拆解列表已排序，结果是确定的）
    pub fn best<'a>(
        decomps: &'a [Decomposition],
        ctx: &WinContext,
        cap: u32,
    ) -> Option<(&'a Decomposition, FanBreakdown)> {
        let mut best: Option<(&'a Decomposition, FanBreakdown)> = None;
        for decomp in decomps {
            let breakdown = Self::evaluate(decomp, ctx, cap);
            let better = match &best {
                Some((_, current)) => breakdown.total > current.total,
                None => true,
            };
            if better {
                best = Some((decomp, breakdown));
            }
        }
        best
    }

    /// 三色同顺：同一数字的顺子在万、筒、条中都有
    fn has_mixed_triple_chow(decomp: &Decomposition) -> bool {
        let mut seen = [[false; 3]; 7];
        for meld in decomp.melds.iter().filter(|m| m.kind == MeldKind::Chow) {
            let suit = match meld.tile.suit() {
                Suit::Wan => 0,
                Suit::Tong => 1,
                Suit::Tiao => 2,
                Suit::Feng | Suit::Jian => continue,
            };
            if let Some(row) = seen.get_mut(meld.tile.rank() as usize - 1) {
                row[suit] = true;
            }
        }
        seen.iter().any(|row| row.iter().all(|&s| s))
    }

    /// 清一色：全是同一种数牌花色
    fn is_pure_flush(tiles: &[Tile]) -> bool {
        let Some(first) = tiles.first() else {
            return false;
        };
        first.suit().is_numeral() && tiles.iter().all(|t| t.suit() == first.suit())
    }

    /// 小三元：两副箭牌刻子（或杠）+ 第三种箭牌作雀头
    fn is_little_dragons(decomp: &Decomposition) -> bool {
        if !decomp.pair.is_dragon() {
            return false;
        }
        let dragon_sets = decomp
            .melds
            .iter()
            .filter(|m| m.is_triplet_like() && m.tile.is_dragon() && m.tile != decomp.pair)
            .count();
        dragon_sets == 2
    }
}
