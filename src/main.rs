/// 可执行文件入口：用固定种子打一局并打印终局记录
///
/// 用法：bj_engine [seed] [策略0] [策略1] [策略2] [策略3]
/// 策略可选 defensive / aggressive / neutral，日志级别由 RUST_LOG 控制

use bj_engine::{policy_by_name, DecisionPolicy, RoundEngine, RuleConfig};
use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = match args.first().map(|s| s.parse::<u64>()) {
        None => 0,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            error!("invalid seed {:?}: {}", args[0], e);
            return ExitCode::FAILURE;
        }
    };
    let defaults = ["defensive", "aggressive", "neutral", "defensive"];
    let names: Vec<&str> = (0..4)
        .map(|i| args.get(i + 1).map(String::as_str).unwrap_or(defaults[i]))
        .collect();

    let mut built: Vec<Box<dyn DecisionPolicy>> = Vec::with_capacity(4);
    for (seat, name) in names.iter().enumerate() {
        match policy_by_name(name, seed.wrapping_add(seat as u64)) {
            Some(policy) => built.push(policy),
            None => {
                error!("unknown policy {:?} for seat {}", name, seat);
                return ExitCode::FAILURE;
            }
        }
    }
    let Ok(mut policies) = <[Box<dyn DecisionPolicy>; 4]>::try_from(built) else {
        error!("expected four policies");
        return ExitCode::FAILURE;
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut engine = match RoundEngine::new(RuleConfig::default(), 0, &mut rng) {
        Ok(engine) => engine,
        Err(e) => {
            error!("bad configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("seed {} with policies {:?}", seed, names);
    match engine.run(&mut policies) {
        Ok(outcome) => {
            match outcome.winner {
                Some(winner) => println!(
                    "seat {} wins, {} fan, self draw: {}, discarder: {:?}",
                    winner, outcome.fan, outcome.self_draw, outcome.discarder
                ),
                None => println!("drawn round"),
            }
            for (pattern, fan) in &outcome.breakdown.items {
                println!("  {:<22} {}", pattern.name(), fan);
            }
            println!("score delta: {:?}", outcome.score_delta);
            println!("missed hu:   {:?}", outcome.missed_hu);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("round aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
