use log::{debug, error, info, warn};
use rand::Rng;

use crate::config::RuleConfig;
use crate::error::{ConfigError, RoundError, RoundResult};
use crate::game::claim::{Claim, ClaimRequest, ClaimResolver};
use crate::game::constants::NUM_SEATS;
use crate::game::fan::{FanBreakdown, FanCalculator, WinContext};
use crate::game::kong::{KongHandler, KongType};
use crate::game::player::Player;
use crate::game::policy::DecisionPolicy;
use crate::game::settlement::Settlement;
use crate::game::state::RoundState;
use crate::tile::{Decomposition, Meld, Tile, Wall};

/// 一局的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 等待发牌
    Deal,
    /// 等待摸牌（`replacement` 表示杠后补牌）
    AwaitDraw { seat: u8, replacement: bool },
    /// 等待打牌
    AwaitDiscard { seat: u8 },
    /// 等待其他座位对弃牌的请求
    AwaitClaims { discarder: u8, tile: Tile },
    /// 本局结束
    RoundEnd,
}

/// 终局记录
///
/// 每局只产生一次，之后不再改变
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Outcome {
    /// 胡牌座位（流局为 None）
    pub winner: Option<u8>,
    /// 胡牌拆解（番数最高的那种）
    pub decomposition: Option<Decomposition>,
    /// 总番数
    pub fan: u32,
    /// 番数明细
    pub breakdown: FanBreakdown,
    /// 是否自摸
    pub self_draw: bool,
    /// 点炮座位
    pub discarder: Option<u8>,
    /// 胡牌座位的杠数
    pub kong_count: u32,
    /// 各座位得分变化
    pub score_delta: [i64; NUM_SEATS],
    /// 各座位放弃合法胡牌的次数
    pub missed_hu: [u32; NUM_SEATS],
    /// 打出的牌数
    pub turns: u32,
}

impl Outcome {
    /// 流局
    pub fn drawn(turns: u32) -> Self {
        Self {
            winner: None,
            decomposition: None,
            fan: 0,
            breakdown: FanBreakdown::default(),
            self_draw: false,
            discarder: None,
            kong_count: 0,
            score_delta: [0; NUM_SEATS],
            missed_hu: [0; NUM_SEATS],
            turns,
        }
    }

    #[inline]
    pub fn is_drawn(&self) -> bool {
        self.winner.is_none()
    }
}

/// 一次合法胡牌的评估结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinEvaluation {
    pub decomposition: Decomposition,
    pub breakdown: FanBreakdown,
    pub context: WinContext,
}

/// 单局引擎
///
/// 状态机：发牌 → 摸牌 → 打牌 → 等待请求 → （吃碰杠后回到对应座位 | 下家摸牌）→ … → 结束。
/// 策略的每个选择都会在修改状态前重新校验
pub struct RoundEngine {
    config: RuleConfig,
    wall: Wall,
    players: [Player; NUM_SEATS],
    state: RoundState,
    phase: Phase,
    outcome: Option<Outcome>,
}

impl RoundEngine {
    /// 单局步数上限，超过说明状态机出了问题
    const MAX_STEPS: usize = 10_000;

    /// 创建引擎并洗牌
    ///
    /// 随机源由调用方提供，不同局之间不共享状态
    pub fn new<R: Rng + ?Sized>(config: RuleConfig, dealer: u8, rng: &mut R) -> Result<Self, ConfigError> {
        Self::with_wall(config, dealer, Wall::shuffled(rng))
    }

    /// 用指定的牌墙创建引擎（用于复现牌局）
    pub fn with_wall(config: RuleConfig, dealer: u8, wall: Wall) -> Result<Self, ConfigError> {
        config.validate()?;
        let remaining = wall.remaining();
        Ok(Self {
            config,
            wall,
            players: [Player::new(0), Player::new(1), Player::new(2), Player::new(3)],
            state: RoundState::new(dealer, remaining),
            phase: Phase::Deal,
            outcome: None,
        })
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn players(&self) -> &[Player; NUM_SEATS] {
        &self.players
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    /// 终局记录（未结束时为 None）
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// 打完一整局
    ///
    /// # 返回
    ///
    /// 终局记录；只有内部不变量被破坏或策略反复非法打牌时返回错误
    pub fn run(&mut self, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<Outcome> {
        if self.phase == Phase::RoundEnd {
            return Err(RoundError::InvariantViolation("round already finished".to_string()));
        }
        for _ in 0..Self::MAX_STEPS {
            if self.step(policies)? {
                return self
                    .outcome
                    .clone()
                    .ok_or_else(|| RoundError::InvariantViolation("round ended without an outcome".to_string()));
            }
        }
        error!("round did not finish within {} steps", Self::MAX_STEPS);
        Err(RoundError::InvariantViolation("round did not terminate".to_string()))
    }

    /// 推进一步
    ///
    /// # 返回
    ///
    /// 本局是否已经结束
    pub fn step(&mut self, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<bool> {
        match self.phase {
            Phase::Deal => self.deal(policies)?,
            Phase::AwaitDraw { seat, replacement } => self.draw(seat, replacement, policies)?,
            Phase::AwaitDiscard { seat } => self.discard(seat, policies)?,
            Phase::AwaitClaims { discarder, tile } => self.claims(discarder, tile, policies)?,
            Phase::RoundEnd => return Ok(true),
        }
        if let Err(e) = self.check_invariants() {
            error!("{}", e);
            return Err(e);
        }
        Ok(self.phase == Phase::RoundEnd)
    }

    fn deal(&mut self, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<()> {
        let dealer = self.state.dealer;
        let hands = self.wall.deal(dealer)?;
        for (player, tiles) in self.players.iter_mut().zip(hands.iter()) {
            player.receive(tiles)?;
        }
        self.state.wall_remaining = self.wall.remaining();
        debug!("dealt {} tiles, dealer is seat {}", self.wall.dealt_count(), dealer);

        // 庄家起手 14 张，直接进入自己的回合
        self.self_turn(dealer, false, policies)
    }

    fn draw(&mut self, seat: u8, replacement: bool, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<()> {
        let tile = match self.wall.draw() {
            Ok(tile) => tile,
            Err(RoundError::WallExhausted) => {
                return self.finish_drawn();
            }
            Err(e) => return Err(e),
        };
        let seat_index = seat as usize % NUM_SEATS;
        self.players[seat_index].draw(tile).map_err(invariant)?;
        self.state.wall_remaining = self.wall.remaining();
        self.state.current_seat = seat;
        debug!("seat {} draws {}{}", seat, tile, if replacement { " (replacement)" } else { "" });

        self.self_turn(seat, replacement, policies)
    }

    /// 摸牌后的自己回合：先看能否自摸，再看能否开杠，最后打牌
    fn self_turn(&mut self, seat: u8, replacement: bool, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<()> {
        let seat_index = seat as usize % NUM_SEATS;

        if let Some(win) = self.offer_hu(seat, None, replacement, policies)? {
            return self.finish_win(seat, win, None);
        }

        let kongs = KongHandler::self_turn_options(&self.players[seat_index]);
        if !kongs.is_empty() && !self.wall.is_empty() {
            let options: Vec<Claim> = kongs.iter().map(|&(_, tile)| Claim::Gong { tile }).collect();
            let choice = policies[seat_index].decide_claim(&options, &self.state);
            if let Claim::Gong { tile } = choice {
                if let Some(&(kind, _)) = kongs.iter().find(|&&(_, t)| t == tile) {
                    let player = &mut self.players[seat_index];
                    let result = match kind {
                        KongType::Concealed => KongHandler::concealed_kong(player, tile),
                        _ => KongHandler::added_kong(player, tile),
                    };
                    result.map_err(invariant)?;
                    debug!("seat {} declares {:?} kong on {}", seat, kind, tile);
                    self.phase = Phase::AwaitDraw { seat, replacement: true };
                    return Ok(());
                }
            }
            if !choice.is_pass() {
                warn!("{}", RoundError::InvalidClaim { seat, claim: choice });
            }
        }

        self.phase = Phase::AwaitDiscard { seat };
        Ok(())
    }

    fn discard(&mut self, seat: u8, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<()> {
        let seat_index = seat as usize % NUM_SEATS;
        let mut last_choice = None;

        for attempt in 0..=self.config.max_discard_retries {
            let choice = policies[seat_index].choose_discard(&self.players[seat_index], &self.state);
            last_choice = choice;
            let Some(tile) = choice else {
                warn!("seat {} chose no discard (attempt {})", seat, attempt + 1);
                continue;
            };
            match self.players[seat_index].discard(tile) {
                Ok(()) => {
                    self.state.record_discard(seat, tile);
                    debug!("seat {} discards {}", seat, tile);
                    self.phase = Phase::AwaitClaims { discarder: seat, tile };
                    return Ok(());
                }
                Err(e) => warn!("seat {} discard rejected: {} (attempt {})", seat, e, attempt + 1),
            }
        }

        let e = RoundError::InvalidDiscard { seat, tile: last_choice };
        error!("{}, aborting round", e);
        Err(e)
    }

    fn claims(&mut self, discarder: u8, tile: Tile, policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS]) -> RoundResult<()> {
        let mut requests: Vec<ClaimRequest> = Vec::with_capacity(NUM_SEATS - 1);
        let mut hu_wins: Vec<(u8, WinEvaluation)> = Vec::new();

        // 按顺时针顺序依次询问
        for offset in 1..NUM_SEATS {
            let seat = ((discarder as usize + offset) % NUM_SEATS) as u8;
            let seat_index = seat as usize;

            if let Some(win) = self.offer_hu(seat, Some(tile), false, policies)? {
                requests.push(ClaimRequest { seat, claim: Claim::Hu });
                hu_wins.push((seat, win));
                continue;
            }

            let mut options = ClaimResolver::available_claims(&self.players[seat_index], tile, discarder);
            if self.wall.is_empty() {
                options.retain(|c| !matches!(c, Claim::Gong { .. }));
            }
            if options.is_empty() {
                continue;
            }
            let claim = policies[seat_index].decide_claim(&options, &self.state);
            if claim.is_pass() {
                continue;
            }
            match ClaimResolver::validate(&self.players[seat_index], claim, tile, discarder) {
                Ok(()) => requests.push(ClaimRequest { seat, claim }),
                Err(e) => warn!("{}, treated as pass", e),
            }
        }

        let Some(winner) = ClaimResolver::resolve(&requests, discarder) else {
            self.phase = Phase::AwaitDraw {
                seat: ClaimResolver::left_of(discarder),
                replacement: false,
            };
            return Ok(());
        };

        let claimed = self.state.mark_claimed(winner.seat)?;
        if claimed != tile {
            return Err(RoundError::InvariantViolation(format!(
                "claim window for {} resolved against {}",
                tile, claimed
            )));
        }
        let seat = winner.seat;
        let seat_index = seat as usize;
        self.state.current_seat = seat;
        debug!("seat {} claims {:?} on {} from seat {}", seat, winner.claim, tile, discarder);

        match winner.claim {
            Claim::Hu => {
                let win = hu_wins
                    .into_iter()
                    .find(|(s, _)| *s == seat)
                    .map(|(_, win)| win)
                    .ok_or_else(|| RoundError::InvariantViolation("hu claim without evaluation".to_string()))?;
                self.players[seat_index].draw(tile).map_err(invariant)?;
                self.finish_win(seat, win, Some(discarder))?;
            }
            Claim::Gong { .. } => {
                KongHandler::kong_discard(&mut self.players[seat_index], tile, discarder).map_err(invariant)?;
                self.phase = Phase::AwaitDraw { seat, replacement: true };
            }
            Claim::Pong => {
                self.players[seat_index]
                    .expose(Meld::claimed_pung(tile, discarder), Some(tile))
                    .map_err(invariant)?;
                self.phase = Phase::AwaitDiscard { seat };
            }
            Claim::Chow { start } => {
                let meld = Meld::claimed_chow(start, discarder).map_err(invariant)?;
                self.players[seat_index].expose(meld, Some(tile)).map_err(invariant)?;
                self.phase = Phase::AwaitDiscard { seat };
            }
            Claim::Pass => {
                return Err(RoundError::InvariantViolation("pass resolved as a claim".to_string()));
            }
        }
        Ok(())
    }

    /// 判断能否胡，能胡就询问策略
    ///
    /// 策略放弃时记一次放弃胡牌
    fn offer_hu(
        &mut self,
        seat: u8,
        discard: Option<Tile>,
        replacement: bool,
        policies: &mut [Box<dyn DecisionPolicy>; NUM_SEATS],
    ) -> RoundResult<Option<WinEvaluation>> {
        let seat_index = seat as usize % NUM_SEATS;
        let win = match Self::evaluate_hu(&self.players[seat_index], discard, replacement, &self.config) {
            Ok(Some(win)) => win,
            Ok(None) => return Ok(None),
            Err(e @ RoundError::FanBelowMinimum { .. }) => {
                debug!("seat {} hu rejected: {}", seat, e);
                return Ok(None);
            }
            Err(e) => return Err(invariant(e)),
        };

        let fan = win.breakdown.total;
        if policies[seat_index].should_declare_hu(&self.state, fan) {
            Ok(Some(win))
        } else {
            self.players[seat_index].missed_hu += 1;
            debug!("seat {} ({}) declines a {} fan hu", seat, policies[seat_index].name(), fan);
            Ok(None)
        }
    }

    /// 评估一个座位能否胡牌
    ///
    /// # 参数
    ///
    /// - `player`: 座位（自摸时手牌已经 14 张）
    /// - `discard`: 点炮的那张牌（自摸为 None）
    /// - `replacement`: 胡的是否是杠后补牌
    ///
    /// # 返回
    ///
    /// - `Ok(None)`: 牌型不完整
    /// - `Err(FanBelowMinimum)`: 牌型完整但番数不够
    /// - `Ok(Some(..))`: 番数最高的拆解
    pub fn evaluate_hu(
        player: &Player,
        discard: Option<Tile>,
        replacement: bool,
        config: &RuleConfig,
    ) -> RoundResult<Option<WinEvaluation>> {
        let decomps = match discard {
            Some(tile) => player.decompositions_with(tile)?,
            None => player.decompositions()?,
        };
        let context = WinContext {
            self_draw: discard.is_none(),
            fully_concealed: player.is_concealed(),
            kong_count: player.kong_count() as u32,
            kong_replacement_win: replacement && discard.is_none(),
        };
        let Some((decomposition, breakdown)) = FanCalculator::best(&decomps, &context, config.fan_cap) else {
            return Ok(None);
        };
        if breakdown.total < config.fan_min {
            return Err(RoundError::FanBelowMinimum {
                fan: breakdown.total,
                min: config.fan_min,
            });
        }
        Ok(Some(WinEvaluation {
            decomposition: decomposition.clone(),
            breakdown,
            context,
        }))
    }

    fn finish_win(&mut self, winner: u8, win: WinEvaluation, discarder: Option<u8>) -> RoundResult<()> {
        let mut outcome = Outcome {
            winner: Some(winner),
            fan: win.breakdown.total,
            breakdown: win.breakdown,
            decomposition: Some(win.decomposition),
            self_draw: discarder.is_none(),
            discarder,
            kong_count: win.context.kong_count,
            ..Outcome::drawn(self.state.turn)
        };
        self.finish(&mut outcome)
    }

    fn finish_drawn(&mut self) -> RoundResult<()> {
        let mut outcome = Outcome::drawn(self.state.turn);
        self.finish(&mut outcome)
    }

    fn finish(&mut self, outcome: &mut Outcome) -> RoundResult<()> {
        for (missed, player) in outcome.missed_hu.iter_mut().zip(self.players.iter()) {
            *missed = player.missed_hu;
        }
        let settlement = Settlement::settle(outcome, &self.config).map_err(invariant)?;
        outcome.score_delta = settlement.score_delta;
        match outcome.winner {
            Some(winner) => info!(
                "round over: seat {} wins with {} fan after {} turns ({})",
                winner, outcome.fan, outcome.turns, settlement.description
            ),
            None => info!("round over: wall exhausted after {} turns", outcome.turns),
        }
        self.outcome = Some(outcome.clone());
        self.phase = Phase::RoundEnd;
        Ok(())
    }

    /// 检查牌数守恒
    ///
    /// 手牌 + 面子 + 桌面弃牌 + 牌墙 = 136，且每个座位归属 13 或 14 张
    pub fn check_invariants(&self) -> RoundResult<()> {
        self.wall.check_conservation()?;
        if self.phase == Phase::Deal {
            return Ok(());
        }

        let mut held = 0;
        for player in &self.players {
            player.check_tile_count()?;
            held += player.hand.total_count();
            held += player.melds.iter().map(Meld::tile_count).sum::<usize>();
        }
        let total = held + self.state.unclaimed_discards() + self.wall.remaining();
        if total != Tile::TOTAL_COUNT {
            return Err(RoundError::InvariantViolation(format!(
                "table accounts for {} tiles instead of {}",
                total,
                Tile::TOTAL_COUNT
            )));
        }
        Ok(())
    }
}

/// 校验之后仍然失败的修改说明内部状态不一致
fn invariant(e: RoundError) -> RoundError {
    match e {
        RoundError::InvariantViolation(_) => e,
        other => RoundError::InvariantViolation(other.to_string()),
    }
}
