/// 牌相关模块
///
/// 包含牌（Tile）、牌墙（Wall）、手牌（Hand）、面子（Meld）和胡牌拆解

pub mod tile;
pub mod wall;
pub mod hand;
pub mod meld;
pub mod decompose;

// 重新导出常用类型
pub use tile::{Tile, Suit};
pub use wall::Wall;
pub use hand::Hand;
pub use meld::{Meld, MeldKind, MeldSource};
pub use decompose::{MeldDecomposer, Decomposition, decompose, is_win};
