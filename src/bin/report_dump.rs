use anyhow::{Context, Result};

use player_report::aggregate;
use player_report::config::ReportConfig;
use player_report::error::ReportError;
use player_report::logging;
use player_report::match_cache::MatchCache;
use player_report::report::{
    ReportOptions, build_player_report, format_average_length, format_match_date,
    format_optional, format_xg, pass_outcome_label,
};
use player_report::statsbomb;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = ReportConfig::from_env();
    let verbose = args.iter().any(|a| a == "--verbose");
    let _log_guard = logging::setup_logging(config.log_dir.as_deref(), verbose)?;

    if let Some(raw) = arg_value(&args, "--match") {
        config.match_id = raw
            .parse()
            .map_err(|_| ReportError::Config(format!("invalid --match value: {raw}")))?;
    }
    if let Some(raw) = arg_value(&args, "--competition") {
        config.competition_id = raw
            .parse()
            .map_err(|_| ReportError::Config(format!("invalid --competition value: {raw}")))?;
    }
    if let Some(raw) = arg_value(&args, "--season") {
        config.season_id = raw
            .parse()
            .map_err(|_| ReportError::Config(format!("invalid --season value: {raw}")))?;
    }
    if let Some(name) = arg_value(&args, "--player") {
        config.set_player(&name);
    }

    let mut cache = MatchCache::new();
    let data = cache
        .get_or_load(config.match_id, || {
            statsbomb::load_match_data(
                &config.source,
                config.competition_id,
                config.season_id,
                config.match_id,
            )
        })
        .with_context(|| format!("unable to load match {}", config.match_id))?;

    if args.iter().any(|a| a == "--list-players") {
        for row in aggregate::summaries_by_player(&data.events) {
            println!(
                "{:<32} passes {:>3}  shots {:>2}  goals {:>2}  xG {}",
                row.player,
                row.passes,
                row.shots,
                row.goals,
                format_xg(row.total_xg)
            );
        }
        return Ok(());
    }

    let report = build_player_report(&data, &ReportOptions::from(&config));

    match &data.info {
        Some(info) => println!(
            "{} vs {} | {} {} | {}",
            info.home_team,
            info.away_team,
            info.competition_name,
            info.season_name,
            format_match_date(&info.match_date, info.kick_off.as_deref())
        ),
        None => println!("Match {}", data.match_id),
    }
    println!("Events: {}", data.events.len());
    println!();

    let summary = &report.summary;
    println!(
        "{} ({})",
        report.player,
        report.team.as_deref().unwrap_or("unknown team")
    );
    println!("Total passes:    {}", summary.passes);
    println!(
        "Avg pass length: {}",
        format_average_length(summary.average_pass_length)
    );
    println!("Total shots:     {}", summary.shots);
    println!("Goals:           {}", summary.goals);
    println!("Total xG:        {}", format_xg(summary.total_xg));
    println!();

    if report.pass_rows.is_empty() {
        println!("No passes recorded");
    } else {
        println!(
            "Passes (first {} of {}):",
            report.pass_rows.len(),
            report.total_pass_rows
        );
        for row in &report.pass_rows {
            println!(
                "  {:>3}:{:02}  {:<28} {:>6}  {:<12} {}",
                row.minute,
                row.second,
                format_optional(row.recipient.as_deref()),
                row.length
                    .map(|l| format!("{l:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
                format_optional(row.height.as_deref()),
                pass_outcome_label(row.outcome.as_deref())
            );
        }
    }
    println!();

    if !report.height_distribution.is_empty() {
        println!("Pass height distribution:");
        for entry in &report.height_distribution {
            println!("  {:<12} {}", entry.category, entry.count);
        }
        println!();
    }

    if report.shot_markers.is_empty() {
        println!("No shots recorded");
    } else {
        println!("Shots:");
        for shot in &report.shot_markers {
            println!(
                "  ({:>5.1}, {:>4.1})  xG {}  {}",
                shot.location.x,
                shot.location.y,
                format_xg(shot.xg),
                if shot.is_goal { "GOAL" } else { "" }
            );
        }
    }
    println!();

    println!("Comparison:");
    println!("  {:<32} {:>6} {:>5}", "Player", "Passes", "Goals");
    for row in &report.comparison {
        println!("  {:<32} {:>6} {:>5}", row.player, row.passes, row.goals);
    }

    Ok(())
}

/// Value of `--name=value` or `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
