use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::constants::{DEFAULT_FAN_CAP, DEFAULT_PENALTY_DEAL_IN};

/// 规则配置
///
/// 所有可识别的选项都列在这里，缺省字段取默认值。
/// 在 `RoundEngine::new` 中校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// 底分 B：得分 = B × 2^番
    pub base_points: u32,
    /// 胡牌最低番数（规则固定为 1）
    pub fan_min: u32,
    /// 点炮时放炮者支付的倍数
    pub penalty_deal_in: u32,
    /// 番数上限
    pub fan_cap: u32,
    /// 策略打出非法牌后重新询问的次数，用完后中止本局
    pub max_discard_retries: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            base_points: 1,
            fan_min: 1,
            penalty_deal_in: DEFAULT_PENALTY_DEAL_IN,
            fan_cap: DEFAULT_FAN_CAP,
            max_discard_retries: 3,
        }
    }
}

impl RuleConfig {
    /// 单次结算的上限必须能放进 i64：B × 2^cap × penalty × 3
    const MAX_FAN_CAP: u32 = 24;

    /// 单次结算中最大的一笔分数：B × 2^cap × max(点炮倍数, 3)
    fn max_payment(&self) -> u128 {
        let unit = (self.base_points as u128) << self.fan_cap.min(Self::MAX_FAN_CAP);
        unit * (self.penalty_deal_in.max(3) as u128)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_points == 0 {
            return Err(ConfigError::ZeroBasePoints);
        }
        if self.fan_min < 1 {
            return Err(ConfigError::FanMinTooLow(self.fan_min));
        }
        if self.penalty_deal_in < 1 {
            return Err(ConfigError::PenaltyTooLow(self.penalty_deal_in));
        }
        if self.fan_cap < self.fan_min {
            return Err(ConfigError::CapBelowMinimum {
                cap: self.fan_cap,
                min: self.fan_min,
            });
        }
        if self.fan_cap > Self::MAX_FAN_CAP {
            return Err(ConfigError::CapTooHigh(self.fan_cap));
        }
        if self.max_payment() > i64::MAX as u128 {
            return Err(ConfigError::ScoreOverflow {
                base_points: self.base_points,
                penalty_deal_in: self.penalty_deal_in,
                fan_cap: self.fan_cap,
            });
        }
        Ok(())
    }
}
