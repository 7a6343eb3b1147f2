use thiserror::Error;

use crate::game::claim::Claim;
use crate::tile::Tile;

/// 单局错误
///
/// 除 `InvariantViolation` 外都可以在局内吸收：
/// 牌墙摸完转为流局，非法请求被拒绝后继续
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// 牌墙已空
    #[error("wall exhausted")]
    WallExhausted,
    /// 手牌中没有这张牌
    #[error("tile {0} is not held")]
    TileNotHeld(Tile),
    /// 点数超出花色范围的牌
    #[error("{0:?} is not a tile")]
    InvalidTile(Tile),
    /// 同一种牌超过 4 张
    #[error("more than four copies of {0}")]
    TileOverflow(Tile),
    /// 牌组不合法（不是刻子/顺子/杠）
    #[error("malformed meld")]
    MalformedMeld,
    /// 吃碰杠胡请求无法用手牌完成
    #[error("seat {seat} cannot make claim {claim:?}")]
    InvalidClaim { seat: u8, claim: Claim },
    /// 策略打出了手里没有的牌（或没有给出牌）
    #[error("seat {seat} chose an invalid discard {tile:?}")]
    InvalidDiscard { seat: u8, tile: Option<Tile> },
    /// 牌型完整但番数不足
    #[error("fan {fan} is below the minimum of {min}")]
    FanBelowMinimum { fan: u32, min: u32 },
    /// 无效的座位号
    #[error("invalid seat {0}")]
    InvalidSeat(u8),
    /// 内部不变量被破坏（牌数不守恒、同一张弃牌被重复认领等）
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl RoundError {
    /// 是否必须中止本局
    pub fn is_fatal(&self) -> bool {
        matches!(self, RoundError::InvariantViolation(_) | RoundError::InvalidDiscard { .. })
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base_points must be positive")]
    ZeroBasePoints,
    #[error("fan_min must be at least 1, got {0}")]
    FanMinTooLow(u32),
    #[error("penalty_deal_in must be at least 1, got {0}")]
    PenaltyTooLow(u32),
    #[error("fan_cap {cap} is below fan_min {min}")]
    CapBelowMinimum { cap: u32, min: u32 },
    #[error("fan_cap {0} would overflow the score")]
    CapTooHigh(u32),
    #[error("base_points {base_points} × 2^{fan_cap} × penalty {penalty_deal_in} does not fit in a score")]
    ScoreOverflow { base_points: u32, penalty_deal_in: u32, fan_cap: u32 },
}

pub type RoundResult<T> = Result<T, RoundError>;
