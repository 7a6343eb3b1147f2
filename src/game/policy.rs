use crate::game::claim::Claim;
use crate::game::constants::DEFAULT_FAN_THRESHOLD;
use crate::game::player::Player;
use crate::game::state::RoundState;
use crate::tile::{Suit, Tile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

/// 决策策略
///
/// 引擎只依赖这个 trait，不关心具体策略。
/// 策略的每个选择都会被引擎重新校验
pub trait DecisionPolicy: Send {
    /// 策略名称（用于日志）
    fn name(&self) -> &str;

    /// 选择要打出的牌
    ///
    /// 必须是手里有的牌，返回 None 或不在手里的牌都视为非法打牌
    fn choose_discard(&mut self, player: &Player, state: &RoundState) -> Option<Tile>;

    /// 在可选的请求中选一个，或者过
    fn decide_claim(&mut self, options: &[Claim], state: &RoundState) -> Claim;

    /// 是否宣布胡牌
    ///
    /// 只在牌型完整且番数达到下限时询问
    fn should_declare_hu(&mut self, state: &RoundState, fan: u32) -> bool;
}

/// 弃牌评分权重
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardWeights {
    /// 对子/刻子潜力
    pub pair: f64,
    /// 每张相邻（差 1 或 2）的同花色牌
    pub sequence: f64,
    /// 字牌
    pub honor: f64,
    /// 非主花色的惩罚
    pub suit_penalty: f64,
    /// 安全度（已见张数）的权重
    pub safety: f64,
}

impl Default for DiscardWeights {
    fn default() -> Self {
        Self {
            pair: 3.0,
            sequence: 0.5,
            honor: 0.8,
            suit_penalty: 2.0,
            safety: 0.3,
        }
    }
}

impl DiscardWeights {
    /// 成面子潜力：越低越该打出
    pub fn meld_potential(&self, tile: Tile, hand: &[Tile]) -> f64 {
        let mut score = 0.0;
        if hand.iter().filter(|&&t| t == tile).count() >= 2 {
            score += self.pair;
        }
        if tile.suit().is_numeral() {
            let rank = tile.rank() as i16;
            for delta in [-2i16, -1, 1, 2] {
                let near = hand
                    .iter()
                    .filter(|t| t.suit() == tile.suit() && t.rank() as i16 == rank + delta)
                    .count();
                score += self.sequence * near as f64;
            }
        }
        if tile.is_honor() {
            score += self.honor;
        }
        score
    }
}

/// 手牌中数量最多的花色（数量相同取靠前的花色）
fn dominant_suit(hand: &[Tile]) -> Option<Suit> {
    let mut best: Option<(Suit, usize)> = None;
    for suit in Suit::all() {
        let count = hand.iter().filter(|t| t.suit() == suit).count();
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((suit, count));
        }
    }
    best.map(|(suit, _)| suit)
}

/// 第一个满足条件的请求
fn first_matching(options: &[Claim], pred: impl Fn(&Claim) -> bool) -> Option<Claim> {
    options.iter().copied().find(|c| pred(c))
}

/// 防守型策略
///
/// - 达到最低番数就胡
/// - 只在风险低时吃碰杠
/// - 先打成面子潜力低的牌，其次打安全的牌
#[derive(Debug, Clone)]
pub struct Defensive {
    pub fan_min: u32,
    pub gong_risk: f64,
    pub pong_risk: f64,
    pub chow_risk: f64,
    pub weights: DiscardWeights,
}

impl Default for Defensive {
    fn default() -> Self {
        Self {
            fan_min: 1,
            gong_risk: 0.35,
            pong_risk: 0.5,
            chow_risk: 0.35,
            weights: DiscardWeights::default(),
        }
    }
}

impl DecisionPolicy for Defensive {
    fn name(&self) -> &str {
        "defensive"
    }

    fn choose_discard(&mut self, player: &Player, state: &RoundState) -> Option<Tile> {
        let tiles = player.hand.to_sorted_vec();
        tiles
            .iter()
            .map(|&t| (self.weights.meld_potential(t, &tiles), state.seen_count(t), t))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, _, t)| t)
    }

    fn decide_claim(&mut self, options: &[Claim], state: &RoundState) -> Claim {
        let risk = state.risk();
        first_matching(options, |c| match c {
            Claim::Hu => true,
            Claim::Gong { .. } => risk < self.gong_risk,
            Claim::Pong => risk < self.pong_risk,
            Claim::Chow { .. } => risk < self.chow_risk,
            Claim::Pass => false,
        })
        .unwrap_or(Claim::Pass)
    }

    fn should_declare_hu(&mut self, _state: &RoundState, fan: u32) -> bool {
        fan >= self.fan_min
    }
}

/// 进攻型策略
///
/// - 番数达到门槛才胡，风险过高时退回最低番数
/// - 积极碰杠，牌墙还多且风险不高时吃
/// - 先打非主花色、成面子潜力低的牌
#[derive(Debug, Clone)]
pub struct Aggressive {
    pub fan_min: u32,
    pub fan_threshold: u32,
    pub bailout_risk: f64,
    pub chow_risk: f64,
    pub chow_wall: usize,
    pub weights: DiscardWeights,
}

impl Default for Aggressive {
    fn default() -> Self {
        Self {
            fan_min: 1,
            fan_threshold: DEFAULT_FAN_THRESHOLD,
            bailout_risk: 0.65,
            chow_risk: 0.7,
            chow_wall: 25,
            weights: DiscardWeights::default(),
        }
    }
}

impl DecisionPolicy for Aggressive {
    fn name(&self) -> &str {
        "aggressive"
    }

    fn choose_discard(&mut self, player: &Player, state: &RoundState) -> Option<Tile> {
        let tiles = player.hand.to_sorted_vec();
        let dominant = dominant_suit(&tiles);
        let keep_score = |t: Tile| {
            let penalty = match dominant {
                Some(suit) if t.suit() != suit && t.suit().is_numeral() => self.weights.suit_penalty,
                _ => 0.0,
            };
            self.weights.meld_potential(t, &tiles) - penalty
                + state.seen_count(t) as f64 * self.weights.safety
        };
        tiles
            .iter()
            .map(|&t| (keep_score(t), t))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, t)| t)
    }

    fn decide_claim(&mut self, options: &[Claim], state: &RoundState) -> Claim {
        let risk = state.risk();
        let wall = state.wall_remaining;
        first_matching(options, |c| match c {
            Claim::Hu | Claim::Gong { .. } | Claim::Pong => true,
            Claim::Chow { .. } => wall > self.chow_wall && risk < self.chow_risk,
            Claim::Pass => false,
        })
        .unwrap_or(Claim::Pass)
    }

    fn should_declare_hu(&mut self, state: &RoundState, fan: u32) -> bool {
        if state.risk() > self.bailout_risk {
            return fan >= self.fan_min;
        }
        fan >= self.fan_threshold.max(self.fan_min)
    }
}

/// 中立型策略
///
/// 风险高于 0.4 或有番就胡，否则 20% 的概率放弃。
/// 自带随机源，同样的种子得到同样的选择
#[derive(Debug, Clone)]
pub struct Neutral {
    rng: ChaCha8Rng,
    pub hu_risk: f64,
    pub decline_chance: f64,
    pub claim_risk: f64,
    pub chow_wall: usize,
    pub weights: DiscardWeights,
}

impl Neutral {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            hu_risk: 0.4,
            decline_chance: 0.2,
            claim_risk: 0.45,
            chow_wall: 25,
            weights: DiscardWeights::default(),
        }
    }
}

impl DecisionPolicy for Neutral {
    fn name(&self) -> &str {
        "neutral"
    }

    fn choose_discard(&mut self, player: &Player, state: &RoundState) -> Option<Tile> {
        let tiles = player.hand.to_sorted_vec();
        let scored: Vec<(f64, usize, Tile)> = tiles
            .iter()
            .map(|&t| (self.weights.meld_potential(t, &tiles), state.seen_count(t), t))
            .collect();
        let lowest = scored.iter().map(|s| s.0).min_by(f64::total_cmp)?;

        // 潜力最低的牌中随机打一张
        let candidates: Vec<Tile> = scored
            .iter()
            .filter(|s| s.0.total_cmp(&lowest) == Ordering::Equal)
            .map(|s| s.2)
            .collect();
        let pick = self.rng.gen_range(0..candidates.len());
        candidates.get(pick).copied()
    }

    fn decide_claim(&mut self, options: &[Claim], state: &RoundState) -> Claim {
        let risk = state.risk();
        let wall = state.wall_remaining;
        first_matching(options, |c| match c {
            Claim::Hu | Claim::Gong { .. } => true,
            Claim::Pong => risk < self.claim_risk,
            Claim::Chow { .. } => risk < self.claim_risk && wall > self.chow_wall,
            Claim::Pass => false,
        })
        .unwrap_or(Claim::Pass)
    }

    fn should_declare_hu(&mut self, state: &RoundState, fan: u32) -> bool {
        if state.risk() > self.hu_risk || fan >= 1 {
            return true;
        }
        self.rng.gen::<f64>() >= self.decline_chance
    }
}

/// 按名称创建策略：defensive / aggressive / neutral
pub fn policy_by_name(name: &str, seed: u64) -> Option<Box<dyn DecisionPolicy>> {
    match name {
        "defensive" | "def" => Some(Box::new(Defensive::default())),
        "aggressive" | "agg" => Some(Box::new(Aggressive::default())),
        "neutral" | "neu" => Some(Box::new(Neutral::new(seed))),
        _ => None,
    }
}
