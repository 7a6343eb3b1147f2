/// 北京麻将单局引擎
///
/// 牌墙、摸打吃碰杠的回合状态机、胡牌拆解与番数计算、单局结算。
/// 决策策略通过 `DecisionPolicy` 接入，随机源由调用方提供

pub mod tile;
pub mod game;
pub mod config;
pub mod error;

// 重新导出常用类型
pub use tile::{Tile, Suit, Wall, Hand, Meld, MeldKind, MeldSource, MeldDecomposer, Decomposition};
pub use game::player::Player;
pub use game::kong::{KongHandler, KongType};
pub use game::fan::{FanCalculator, FanBreakdown, FanPattern, WinContext};
pub use game::claim::{Claim, ClaimRequest, ClaimResolver};
pub use game::state::{RoundState, DiscardRecord};
pub use game::policy::{DecisionPolicy, Defensive, Aggressive, Neutral, DiscardWeights, policy_by_name};
pub use game::settlement::{Settlement, SettlementResult};
pub use game::engine::{RoundEngine, Outcome, Phase, WinEvaluation};
pub use config::RuleConfig;
pub use error::{RoundError, ConfigError, RoundResult};
