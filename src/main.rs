use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info};

use hiscore_progress::activity::TrackerPeriod;
use hiscore_progress::calculators::alchemy::NATURE_RUNE;
use hiscore_progress::calculators::{AgilityCalculator, AlchemyCalculator, TrainingCost};
use hiscore_progress::combat::CombatLevels;
use hiscore_progress::config::Config;
use hiscore_progress::snapshot::ActivityScore;
use hiscore_progress::source::{ActivitySource, FileSource, FixedPriceSource, HiscoreSource};
use hiscore_progress::{
    ExperienceTable, LevelGap, PlayerSnapshot, Skill, TierRegistry, next_level_gap,
};

type BoxError = Box<dyn std::error::Error>;

const USAGE: &str = "usage: hiscore-progress <command> <player name...> [--json]

commands:
  stats                 all skills and the closest level up
  <skill>               one skill, e.g. attack, att, wc, agil
  combat | cmb          combat level
  99s | max             level 99 skills
  kc | boss             boss kill counts
  course | rooftop      rooftop agility course progress
  alch                  high alchemy cost to level up and to 99
  xp | mxp | yxp        weekly, monthly or yearly gains
  <tier set id>         progress against a tier set from the data directory";

struct Invocation {
    command: String,
    player: String,
    json: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Option<Invocation> {
    let mut json = false;
    let mut words = Vec::new();
    for arg in args {
        if arg == "--json" {
            json = true;
        } else {
            words.push(arg);
        }
    }
    if words.len() < 2 {
        return None;
    }
    let command = words.remove(0).to_lowercase();
    Some(Invocation {
        command,
        player: words.join(" "),
        json,
    })
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<(), BoxError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn gap_text(gap: LevelGap) -> String {
    match gap {
        LevelGap::Remaining(xp) => format!("{} xp to next level", xp),
        LevelGap::Capped => "max level".to_string(),
    }
}

fn count_text(count: Option<i64>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn cost_text(label: &str, cost: Option<TrainingCost>) -> String {
    match cost {
        Some(c) => format!(
            "{}: {} casts, {} gp, {:.1} hours",
            label, c.casts, c.coins, c.hours
        ),
        None => format!("{}: done", label),
    }
}

fn stats(snapshot: &PlayerSnapshot, json: bool) -> Result<(), BoxError> {
    let table = ExperienceTable::standard();
    let closest = snapshot.closest_level_up(table);
    emit(json, snapshot, || {
        let mut out = format!("{}\n", snapshot.player);
        for (skill, entry) in snapshot.iter() {
            let rank = entry
                .rank
                .position()
                .map_or_else(|| "unranked".to_string(), |r| r.to_string());
            out.push_str(&format!(
                "{:<13} {:>5} {:>11} {:>10}\n",
                skill.name(),
                entry.level,
                entry.experience,
                rank
            ));
        }
        match closest {
            Some((skill, gap)) => {
                out.push_str(&format!("Closest level up: {} ({} xp)", skill, gap))
            }
            None => out.push_str("Closest level up: none, all skills maxed"),
        }
        out
    })
}

fn skill(snapshot: &PlayerSnapshot, skill: Skill, json: bool) -> Result<(), BoxError> {
    let entry = snapshot
        .get(skill)
        .copied()
        .ok_or_else(|| format!("{} has no {} entry", snapshot.player, skill))?;
    if skill.is_overall() {
        return emit(json, &entry, || {
            format!(
                "{} {}: total {} ({} xp)",
                snapshot.player, skill, entry.level, entry.experience
            )
        });
    }
    let gap = next_level_gap(ExperienceTable::standard(), entry.experience)?;
    emit(json, &entry, || {
        format!(
            "{} {}: level {} ({} xp), {}",
            snapshot.player,
            skill,
            entry.level,
            entry.experience,
            gap_text(gap)
        )
    })
}

fn kill_counts(snapshot: &PlayerSnapshot, json: bool) -> Result<(), BoxError> {
    let kills: Vec<&ActivityScore> = snapshot.kill_counts().collect();
    emit(json, &kills, || {
        if kills.is_empty() {
            return format!("{}: no kill counts on the hiscore page", snapshot.player);
        }
        let mut out = format!("Boss kill counts for {}\n", snapshot.player);
        for kc in &kills {
            out.push_str(&format!("{:<34} {:>6}\n", kc.name, kc.score));
        }
        out
    })
}

fn run(invocation: Invocation, config: &Config) -> Result<(), BoxError> {
    let mut registry = TierRegistry::with_builtin();
    registry.load_from_directory(&config.data_dir)?;

    let source = FileSource::new(&config.snapshot_dir);
    let Invocation { command, player, json } = invocation;

    match command.as_str() {
        "stats" | "stat" | "hiscore" | "hiscores" => stats(&source.lookup(&player)?, json),
        "combat" | "cmb" => {
            let levels = CombatLevels::from_snapshot(&source.lookup(&player)?);
            emit(json, &levels, || {
                format!(
                    "{} combat {:.1} ({})",
                    player,
                    levels.combat_level(),
                    levels.discipline().as_str()
                )
            })
        }
        "kc" | "killcount" | "boss" => kill_counts(&source.lookup(&player)?, json),
        "99s" | "99" | "max" => {
            let maxed = source.lookup(&player)?.maxed_skills();
            emit(json, &maxed, || {
                let names: Vec<&str> = maxed.iter().map(|s| s.name()).collect();
                format!(
                    "{} has {} / 23 level 99s: {}",
                    player,
                    maxed.len(),
                    names.join(", ")
                )
            })
        }
        "course" | "rooftop" => {
            let report = AgilityCalculator::new(&source).lookup(&player)?;
            emit(json, &report, || {
                format!(
                    "{} agility {}: course {}, next {}, {} laps to level, {} laps to next course",
                    player,
                    report.level,
                    report.course.as_deref().unwrap_or("none"),
                    report.next_course.as_deref().unwrap_or("level 99"),
                    count_text(report.laps_to_level_up),
                    count_text(report.laps_to_next_course)
                )
            })
        }
        "alch" | "alching" => {
            let prices = FixedPriceSource::new().with_price(NATURE_RUNE, config.nature_rune_price);
            let calc = AlchemyCalculator::with_settings(&source, prices, config.alchemy_settings());
            let estimate = calc.estimate(&player)?;
            emit(json, &estimate, || {
                format!(
                    "{} magic {}\n{}\n{}",
                    player,
                    estimate.level,
                    cost_text("next level", estimate.to_next_level),
                    cost_text("level 99", estimate.to_level_99)
                )
            })
        }
        other => {
            if let Some(period) = TrackerPeriod::from_command(other) {
                let series = source.activity(&player, period)?;
                let overall = series.overall();
                let top = series.top_gains(period.top_count());
                return emit(json, &series, || {
                    let mut out = format!(
                        "{} for {}: +{} xp, {} levels\n",
                        period.title(),
                        player,
                        overall.experience_gained,
                        overall.levels_gained
                    );
                    for (skill, gain) in &top {
                        out.push_str(&format!(
                            "{:<13} +{}\n",
                            skill.name(),
                            gain.experience_gained
                        ));
                    }
                    let kills = series.recent_kills();
                    if !kills.is_empty() {
                        out.push_str("Boss kills\n");
                        for (boss, count) in kills {
                            out.push_str(&format!("{:<34} +{}\n", boss, count));
                        }
                    }
                    out
                });
            }
            if let Some(skill_id) = Skill::from_alias(other) {
                return skill(&source.lookup(&player)?, skill_id, json);
            }
            if let Some(set) = registry.get(other) {
                let snapshot = source.lookup(&player)?;
                let result = snapshot.tier_progression(set, ExperienceTable::standard())?;
                return emit(json, &result, || {
                    format!(
                        "{} {}: {} ({}), {} {}s to level, {} {}s to {}",
                        player,
                        set.display_name,
                        result.current_tier.as_deref().unwrap_or("none"),
                        gap_text(result.next_level),
                        count_text(result.actions_to_level_up),
                        set.action_name,
                        count_text(result.actions_to_next_tier),
                        set.action_name,
                        result.next_tier.as_deref().unwrap_or("level 99")
                    )
                });
            }
            Err(format!("unknown command '{}'\n{}", other, USAGE).into())
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hiscore_progress=info".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(invocation) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Running '{}' for {}", invocation.command, invocation.player);
    match run(invocation, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
