use std::fmt;

/// 麻将牌
///
/// 北京麻将使用 136 张牌：万、筒、条各 36 张（1-9 各 4 张），
/// 风牌 16 张（东南西北各 4 张），箭牌 12 张（中发白各 4 张）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Tile {
    /// 万子（1-9）
    Wan(u8),
    /// 筒子（1-9）
    Tong(u8),
    /// 条子（1-9）
    Tiao(u8),
    /// 风牌（1=东 2=南 3=西 4=北）
    Feng(u8),
    /// 箭牌（1=中 2=发 3=白）
    Jian(u8),
}

impl Tile {
    /// 总牌数：136 张
    pub const TOTAL_COUNT: usize = 136;

    /// 牌的种类数：27 种数牌 + 4 种风牌 + 3 种箭牌
    pub const KINDS: usize = 34;

    /// 每种牌的张数
    pub const COPIES: u8 = 4;

    /// 数牌的数字范围：1-9
    pub const MIN_RANK: u8 = 1;
    pub const MAX_RANK: u8 = 9;

    /// 创建一张牌，验证输入有效性
    pub fn new(suit: Suit, rank: u8) -> Option<Self> {
        if rank < Self::MIN_RANK || rank > suit.max_rank() {
            return None;
        }
        Some(match suit {
            Suit::Wan => Tile::Wan(rank),
            Suit::Tong => Tile::Tong(rank),
            Suit::Tiao => Tile::Tiao(rank),
            Suit::Feng => Tile::Feng(rank),
            Suit::Jian => Tile::Jian(rank),
        })
    }

    /// 获取花色
    pub fn suit(&self) -> Suit {
        match self {
            Tile::Wan(_) => Suit::Wan,
            Tile::Tong(_) => Suit::Tong,
            Tile::Tiao(_) => Suit::Tiao,
            Tile::Feng(_) => Suit::Feng,
            Tile::Jian(_) => Suit::Jian,
        }
    }

    /// 获取点数
    pub fn rank(&self) -> u8 {
        match self {
            Tile::Wan(r) | Tile::Tong(r) | Tile::Tiao(r) | Tile::Feng(r) | Tile::Jian(r) => *r,
        }
    }

    /// 转换为种类索引（0-33）
    ///
    /// 映射规则：
    /// - 万子：0-8
    /// - 筒子：9-17
    /// - 条子：18-26
    /// - 风牌：27-30
    /// - 箭牌：31-33
    ///
    /// 只对合法的牌有意义，外部传入的牌先用 `checked_index`
    pub fn index(&self) -> usize {
        self.suit().base_index() + (self.rank() - 1) as usize
    }

    /// 点数在该花色范围内（数牌 1-9，风牌 1-4，箭牌 1-3）
    #[inline]
    pub fn is_valid(&self) -> bool {
        (Self::MIN_RANK..=self.suit().max_rank()).contains(&self.rank())
    }

    /// 合法的牌返回种类索引，否则 None
    #[inline]
    pub fn checked_index(&self) -> Option<usize> {
        self.is_valid().then(|| self.index())
    }

    /// 从种类索引创建牌
    pub fn from_index(index: usize) -> Option<Self> {
        let tile = match index {
            0..=8 => Tile::Wan(index as u8 + 1),
            9..=17 => Tile::Tong((index - 9) as u8 + 1),
            18..=26 => Tile::Tiao((index - 18) as u8 + 1),
            27..=30 => Tile::Feng((index - 27) as u8 + 1),
            31..=33 => Tile::Jian((index - 31) as u8 + 1),
            _ => return None,
        };
        Some(tile)
    }

    /// 所有 34 种牌（按索引顺序）
    pub fn all_kinds() -> impl Iterator<Item = Tile> {
        (0..Self::KINDS).filter_map(Tile::from_index)
    }

    /// 是否为字牌（风牌或箭牌）
    #[inline]
    pub fn is_honor(&self) -> bool {
        !self.suit().is_numeral()
    }

    /// 是否为幺九（数牌 1 或 9）
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.suit().is_numeral() && (self.rank() == 1 || self.rank() == 9)
    }

    /// 是否为中张（数牌 2-8）
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.suit().is_numeral() && !self.is_terminal()
    }

    #[inline]
    pub fn is_dragon(&self) -> bool {
        self.suit() == Suit::Jian
    }

    /// 同花色的下一张数牌（9 和字牌没有下一张）
    pub fn next(&self) -> Option<Tile> {
        if !self.suit().is_numeral() {
            return None;
        }
        Tile::new(self.suit(), self.rank().checked_add(1)?)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Wan(r) => write!(f, "{}万", r),
            Tile::Tong(r) => write!(f, "{}筒", r),
            Tile::Tiao(r) => write!(f, "{}条", r),
            Tile::Feng(r) => {
                let name = ["东", "南", "西", "北"].get((*r as usize).wrapping_sub(1)).copied().unwrap_or("?");
                f.write_str(name)
            }
            Tile::Jian(r) => {
                let name = ["中", "发", "白"].get((*r as usize).wrapping_sub(1)).copied().unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}

/// 花色枚举
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Suit {
    Wan = 0,
    Tong = 1,
    Tiao = 2,
    Feng = 3,
    Jian = 4,
}

impl Suit {
    /// 所有花色
    pub fn all() -> [Suit; 5] {
        [Suit::Wan, Suit::Tong, Suit::Tiao, Suit::Feng, Suit::Jian]
    }

    /// 是否为数牌花色
    #[inline]
    pub fn is_numeral(&self) -> bool {
        matches!(self, Suit::Wan | Suit::Tong | Suit::Tiao)
    }

    /// 该花色的最大点数
    pub fn max_rank(&self) -> u8 {
        match self {
            Suit::Wan | Suit::Tong | Suit::Tiao => 9,
            Suit::Feng => 4,
            Suit::Jian => 3,
        }
    }

    fn base_index(&self) -> usize {
        match self {
            Suit::Wan => 0,
            Suit::Tong => 9,
            Suit::Tiao => 18,
            Suit::Feng => 27,
            Suit::Jian => 31,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_creation() {
        let tile = Tile::new(Suit::Wan, 1).unwrap();
        assert_eq!(tile.suit(), Suit::Wan);
        assert_eq!(tile.rank(), 1);

        let tile = Tile::new(Suit::Jian, 3).unwrap();
        assert_eq!(tile, Tile::Jian(3));

        // 无效的 rank
        assert!(Tile::new(Suit::Wan, 0).is_none());
        assert!(Tile::new(Suit::Wan, 10).is_none());
        assert!(Tile::new(Suit::Feng, 5).is_none());
        assert!(Tile::new(Suit::Jian, 4).is_none());
    }

    #[test]
    fn test_tile_index_conversion() {
        for index in 0..Tile::KINDS {
            let tile = Tile::from_index(index).unwrap();
            assert_eq!(tile.index(), index);
        }
        assert!(Tile::from_index(Tile::KINDS).is_none());
        assert_eq!(Tile::Feng(1).index(), 27);
        assert_eq!(Tile::Jian(3).index(), 33);
        assert_eq!(Tile::all_kinds().count(), Tile::KINDS);
    }

    #[test]
    fn test_classification() {
        assert!(Tile::Wan(1).is_terminal());
        assert!(Tile::Tiao(9).is_terminal());
        assert!(!Tile::Feng(1).is_terminal());
        assert!(Tile::Feng(2).is_honor());
        assert!(Tile::Jian(1).is_dragon());
        assert!(Tile::Tong(5).is_simple());
        assert!(!Tile::Jian(2).is_simple());
    }

    #[test]
    fn test_next() {
        assert_eq!(Tile::Wan(3).next(), Some(Tile::Wan(4)));
        assert_eq!(Tile::Wan(9).next(), None);
        assert_eq!(Tile::Feng(1).next(), None);
    }

    #[test]
    fn test_out_of_range_tiles() {
        assert!(Tile::Wan(9).is_valid());
        assert!(!Tile::Wan(0).is_valid());
        assert!(!Tile::Wan(13).is_valid());
        assert!(!Tile::Feng(5).is_valid());
        assert!(!Tile::Jian(4).is_valid());
        assert_eq!(Tile::Jian(3).checked_index(), Some(33));
        assert_eq!(Tile::Feng(9).checked_index(), None);
        assert_eq!(Tile::Tiao(0).checked_index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Tile::Wan(5).to_string(), "5万");
        assert_eq!(Tile::Feng(1).to_string(), "东");
        assert_eq!(Tile::Jian(2).to_string(), "发");
    }
}
