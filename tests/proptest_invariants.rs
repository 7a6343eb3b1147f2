//! 随机性质测试
//!
//! 用 proptest 生成随机种子、随机手牌和构造出的胡牌型，
//! 检查牌数守恒、拆解正确性、番数计算的纯函数性和结算零和

use bj_engine::{
    policy_by_name, DecisionPolicy, FanCalculator, Hand, MeldDecomposer, RoundEngine, RuleConfig, Tile, Wall,
    WinContext,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// 一副完整的牌（未洗）
fn full_set() -> Vec<Tile> {
    Tile::all_kinds().flat_map(|t| std::iter::repeat(t).take(4)).collect()
}

/// 独立的胡牌判断：枚举雀头，剩下的从最小的牌开始贪心取刻子或顺子
///
/// 只适用于没有亮出面子的 14 张手牌（这时不可能有杠）
fn oracle_is_win(tiles: &[Tile]) -> bool {
    if tiles.len() != 14 {
        return false;
    }
    let mut counts = [0u8; Tile::KINDS];
    for t in tiles {
        counts[t.index()] += 1;
    }
    (0..Tile::KINDS).any(|pair| {
        if counts[pair] < 2 {
            return false;
        }
        let mut rest = counts;
        rest[pair] -= 2;
        greedy_melds(&mut rest)
    })
}

fn greedy_melds(counts: &mut [u8; Tile::KINDS]) -> bool {
    for i in 0..Tile::KINDS {
        while counts[i] > 0 {
            if counts[i] >= 3 {
                counts[i] -= 3;
                continue;
            }
            // 顺子只在同一数牌花色内
            let numeral = i < 27 && i % 9 <= 6;
            if !numeral || counts[i + 1] == 0 || counts[i + 2] == 0 {
                return false;
            }
            counts[i] -= 1;
            counts[i + 1] -= 1;
            counts[i + 2] -= 1;
        }
    }
    true
}

/// 一个面子的牌：刻子（任意牌）或顺子（数牌起点 1-7）
fn meld_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop_oneof![
        (0..Tile::KINDS).prop_map(|i| vec![i, i, i]),
        (0..3usize, 0..7usize).prop_map(|(suit, rank)| {
            let start = suit * 9 + rank;
            vec![start, start + 1, start + 2]
        }),
    ]
}

/// 4 个面子 + 1 个雀头，每种牌不超过 4 张
fn winning_hand_strategy() -> impl Strategy<Value = Vec<Tile>> {
    (prop::collection::vec(meld_strategy(), 4), 0..Tile::KINDS).prop_filter_map(
        "每种牌最多 4 张",
        |(melds, pair)| {
            let mut indices: Vec<usize> = melds.into_iter().flatten().collect();
            indices.push(pair);
            indices.push(pair);
            let mut counts = [0u8; Tile::KINDS];
            for &i in &indices {
                counts[i] += 1;
            }
            if counts.iter().any(|&c| c > 4) {
                return None;
            }
            indices.into_iter().map(Tile::from_index).collect()
        },
    )
}

fn policies(seed: u64) -> [Box<dyn DecisionPolicy>; 4] {
    let make = |name: &str, offset: u64| {
        policy_by_name(name, seed.wrapping_add(offset)).unwrap_or_else(|| panic!("未知策略 {}", name))
    };
    [make("defensive", 0), make("aggressive", 1), make("neutral", 2), make("neutral", 3)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// 发牌、摸牌之后牌墙仍然守恒
    #[test]
    fn wall_conservation(seed in any::<u64>(), dealer in 0..4u8, draws in 0..84usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut wall = Wall::shuffled(&mut rng);
        let hands = wall.deal(dealer).unwrap();

        prop_assert_eq!(hands[dealer as usize].len(), 14);
        prop_assert_eq!(hands.iter().map(Vec::len).sum::<usize>(), 53);
        for _ in 0..draws {
            wall.draw().unwrap();
        }
        prop_assert!(wall.check_conservation().is_ok());
        prop_assert_eq!(wall.dealt_count() + wall.drawn_count() + wall.remaining(), 136);
    }

    /// 随机 14 张：拆解器与独立判断一致
    #[test]
    fn decomposer_matches_oracle(tiles in prop::sample::subsequence(full_set(), 14)) {
        let hand = Hand::from_tiles(&tiles).unwrap();
        let results = MeldDecomposer::decompose(&hand, &[]).unwrap();
        prop_assert_eq!(!results.is_empty(), oracle_is_win(&tiles));
    }

    /// 构造出的胡牌型一定能拆解，且每种拆解恰好用完所有牌
    #[test]
    fn constructed_hands_decompose(tiles in winning_hand_strategy()) {
        let hand = Hand::from_tiles(&tiles).unwrap();
        let results = MeldDecomposer::decompose(&hand, &[]).unwrap();
        prop_assert!(!results.is_empty(), "构造的胡牌型必须能拆解");
        prop_assert!(oracle_is_win(&tiles));

        let mut expected = tiles.clone();
        expected.sort();
        for d in &results {
            let mut used = d.tiles();
            used.sort();
            prop_assert_eq!(&used, &expected);
        }
    }

    /// 番数计算是纯函数，结果在 [0, cap] 内
    #[test]
    fn fan_is_pure_and_capped(
        tiles in winning_hand_strategy(),
        self_draw in any::<bool>(),
        cap in 1..=24u32,
    ) {
        let hand = Hand::from_tiles(&tiles).unwrap();
        let decomps = MeldDecomposer::decompose(&hand, &[]).unwrap();
        let ctx = WinContext { self_draw, fully_concealed: true, ..Default::default() };

        let first = FanCalculator::best(&decomps, &ctx, cap).map(|(d, f)| (d.clone(), f));
        let second = FanCalculator::best(&decomps, &ctx, cap).map(|(d, f)| (d.clone(), f));
        prop_assert_eq!(&first, &second);

        let (_, fan) = first.unwrap();
        prop_assert!(fan.total <= cap);
        // 门清至少 1 番
        prop_assert!(fan.total >= 1);
        for d in &decomps {
            prop_assert!(FanCalculator::evaluate(d, &ctx, cap).total <= fan.total);
        }
    }

    /// 整局：每一步守恒，结算零和，番数在范围内
    #[test]
    fn full_round_invariants(seed in any::<u64>(), dealer in 0..4u8) {
        let config = RuleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut engine = RoundEngine::new(config.clone(), dealer, &mut rng).unwrap();
        let mut policies = policies(seed);

        let outcome = engine.run(&mut policies).unwrap();
        prop_assert!(engine.check_invariants().is_ok());
        prop_assert_eq!(outcome.score_delta.iter().sum::<i64>(), 0);

        match outcome.winner {
            Some(winner) => {
                prop_assert!(outcome.fan >= config.fan_min && outcome.fan <= config.fan_cap);
                prop_assert!(outcome.score_delta[winner as usize] > 0);
                prop_assert!(outcome.decomposition.is_some());
                if !outcome.self_draw {
                    prop_assert!(outcome.discarder.is_some());
                }
            }
            None => {
                prop_assert_eq!(outcome.score_delta, [0i64; 4]);
                prop_assert_eq!(engine.wall().remaining(), 0);
            }
        }
    }
}
