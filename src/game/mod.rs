/// 游戏逻辑模块
///
/// 包含座位状态、杠、番数、吃碰杠胡仲裁、公开局面、决策策略、结算和单局引擎

pub mod constants;
pub mod player;
pub mod kong;
pub mod fan;
pub mod claim;
pub mod state;
pub mod policy;
pub mod settlement;
pub mod engine;
