/// 游戏常量定义
///
/// 集中管理所有魔法数字

/// 座位数量
pub const NUM_SEATS: usize = 4;

/// 起手牌张数（庄家多 1 张）
pub const HAND_SIZE: usize = 13;

/// 发牌时每次发给一个座位的张数
pub const DEAL_BLOCK: usize = 4;

/// 按块发牌的轮数
pub const DEAL_BLOCK_PASSES: usize = 3;

/// 胡牌需要的面子数（4 面子 + 1 雀头）
pub const MELDS_PER_WIN: usize = 4;

/// 默认番数上限
pub const DEFAULT_FAN_CAP: u32 = 16;

/// 默认点炮倍数
pub const DEFAULT_PENALTY_DEAL_IN: u32 = 3;

/// 默认激进策略的胡牌番数门槛
pub const DEFAULT_FAN_THRESHOLD: u32 = 3;

/// 风险估计的最小分母
pub const RISK_FLOOR: usize = 100;
