use crate::config::RuleConfig;
use crate::error::{RoundError, RoundResult};
use crate::game::constants::NUM_SEATS;
use crate::game::engine::Outcome;

/// 结算结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementResult {
    /// 按座位号索引的得分变化（正数收入，负数支出）
    pub score_delta: [i64; NUM_SEATS],
    /// 结算说明
    pub description: String,
}

/// 单局结算器
///
/// 每局只结算一次，结果只取决于终局记录和规则配置
pub struct Settlement;

impl Settlement {
    /// 一次胡牌的单位分：B × 2^番，超出 i64 时饱和
    #[inline]
    pub fn unit(base_points: u32, fan: u32) -> i64 {
        (base_points as i64).saturating_mul(2i64.saturating_pow(fan))
    }

    /// 结算一局
    ///
    /// - 自摸：其他三家各付 B × 2^番
    /// - 点炮：放炮者付 B × 2^番 × 点炮倍数，其他人不变
    /// - 流局：全部为 0
    ///
    /// 番数按 `fan_cap` 封顶；座位号越界或放炮者就是胡牌者时返回 `InvalidSeat`
    pub fn settle(outcome: &Outcome, config: &RuleConfig) -> RoundResult<SettlementResult> {
        let mut score_delta = [0i64; NUM_SEATS];

        let Some(winner) = outcome.winner else {
            return Ok(SettlementResult {
                score_delta,
                description: "流局，不结算".to_string(),
            });
        };
        let winner_index = seat_index(winner)?;
        let unit = Self::unit(config.base_points, outcome.fan.min(config.fan_cap));

        let description = match (outcome.self_draw, outcome.discarder) {
            (false, Some(discarder)) => {
                if discarder == winner {
                    return Err(RoundError::InvalidSeat(discarder));
                }
                let amount = unit.saturating_mul(config.penalty_deal_in as i64);
                score_delta[seat_index(discarder)?] = -amount;
                score_delta[winner_index] = amount;
                format!("玩家 {} 点炮，付给玩家 {} {} 分", discarder, winner, amount)
            }
            _ => {
                // 三家各付 unit，胡牌者收入封顶到 i64::MAX / 3 以保证零和
                let unit = unit.min(i64::MAX / (NUM_SEATS as i64 - 1));
                for (seat, delta) in score_delta.iter_mut().enumerate() {
                    if seat != winner_index {
                        *delta = -unit;
                    }
                }
                score_delta[winner_index] = unit * (NUM_SEATS as i64 - 1);
                format!("玩家 {} 自摸，每人付 {} 分", winner, unit)
            }
        };

        Ok(SettlementResult {
            score_delta,
            description,
        })
    }
}

fn seat_index(seat: u8) -> RoundResult<usize> {
    let index = seat as usize;
    if index < NUM_SEATS {
        Ok(index)
    } else {
        Err(RoundError::InvalidSeat(seat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(winner: u8, fan: u32, self_draw: bool, discarder: Option<u8>) -> Outcome {
        Outcome {
            winner: Some(winner),
            fan,
            self_draw,
            discarder,
            ..Outcome::drawn(0)
        }
    }

    #[test]
    fn test_self_draw() {
        let config = RuleConfig { base_points: 2, ..Default::default() };
        let result = Settlement::settle(&win(1, 3, true, None), &config).unwrap();
        // 2 × 2^3 = 16
        assert_eq!(result.score_delta, [-16, 48, -16, -16]);
    }

    #[test]
    fn test_deal_in() {
        let config = RuleConfig::default();
        let result = Settlement::settle(&win(3, 2, false, Some(0)), &config).unwrap();
        // 1 × 2^2 × 3 = 12
        assert_eq!(result.score_delta, [-12, 0, 0, 12]);
    }

    #[test]
    fn test_drawn_round() {
        let result = Settlement::settle(&Outcome::drawn(30), &RuleConfig::default()).unwrap();
        assert_eq!(result.score_delta, [0; 4]);
    }

    #[test]
    fn test_zero_sum() {
        let config = RuleConfig::default();
        for outcome in [win(0, 16, true, None), win(2, 1, false, Some(1))] {
            let result = Settlement::settle(&outcome, &config).unwrap();
            assert_eq!(result.score_delta.iter().sum::<i64>(), 0);
        }
    }

    #[test]
    fn test_invalid_seats_rejected() {
        let config = RuleConfig::default();
        assert_eq!(
            Settlement::settle(&win(4, 1, true, None), &config),
            Err(RoundError::InvalidSeat(4))
        );
        assert_eq!(
            Settlement::settle(&win(0, 1, false, Some(7)), &config),
            Err(RoundError::InvalidSeat(7))
        );
        assert_eq!(
            Settlement::settle(&win(2, 1, false, Some(2)), &config),
            Err(RoundError::InvalidSeat(2))
        );
    }

    #[test]
    fn test_fan_is_capped() {
        let config = RuleConfig { fan_cap: 4, ..Default::default() };
        let result = Settlement::settle(&win(0, 200, true, None), &config).unwrap();
        assert_eq!(result.score_delta, [48, -16, -16, -16]);
    }

    #[test]
    fn test_unvalidated_config_saturates() {
        let config = RuleConfig {
            base_points: u32::MAX,
            penalty_deal_in: u32::MAX,
            fan_cap: 64,
            ..Default::default()
        };
        assert_eq!(Settlement::unit(u32::MAX, 64), i64::MAX);

        let result = Settlement::settle(&win(1, 64, false, Some(0)), &config).unwrap();
        assert_eq!(result.score_delta, [-i64::MAX, i64::MAX, 0, 0]);

        let result = Settlement::settle(&win(1, 64, true, None), &config).unwrap();
        assert_eq!(result.score_delta.iter().sum::<i64>(), 0);
        assert!(result.score_delta[1] > 0);
    }
}
