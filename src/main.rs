use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use ftm_scenarios::config;
use ftm_scenarios::io::{self, CsvWriter, Manifest, ResultBundle};
use ftm_scenarios::reference::ReferenceFactory;
use ftm_scenarios::{
    apply_timeline_override, ParameterSet, ParameterSetBuilder, ParameterTable, ScenarioGroup,
    ScenarioGroupRunner, ScenarioRunner, SweepMode, TimelineKind, DYNAMIC_END_TIME,
};

#[derive(Parser, Debug)]
#[command(name = "ftm")]
#[command(version)]
#[command(about = "FTM - Scenario sweeps for the full takeoff model")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to TOML run configuration
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output path (CSV; JSON is written next to it)
    #[arg(short, long, global = true)]
    out: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the normal group and every timeline group
    Run {
        /// Also write a JSON result bundle
        #[arg(long)]
        json: bool,
    },
    /// Print the Conservative/Best guess/Aggressive parameter sets
    Params {
        /// Show the sets for this timeline variant instead of the normal table
        #[arg(long)]
        timeline: Option<String>,
    },
    /// Vary a single parameter, holding everything else at best guess
    Explore {
        /// Parameter to explore
        #[arg(long)]
        target: String,
    },
    /// Validate a configuration file
    Validate,
    /// Print version information
    Version,
}

fn run_all(cfg: &config::Root, cfg_text: &str, out_path: &str, json_output: bool) -> Result<()> {
    let table = cfg.parameter_table()?;
    let timelines = cfg.timeline_overrides();
    let mut runner = ScenarioRunner::new(ReferenceFactory::new(cfg.model), table, timelines);

    let start = Instant::now();
    let sweep = runner.simulate_all_scenarios()?;
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut w = CsvWriter::create(out_path)?;
    w.write_header()?;
    for group in &sweep.groups {
        w.write_group(group)?;
    }
    w.flush()?;

    eprintln!(
        "[ftm] sweep complete: {} groups x 3 scenarios, {} metrics in {:.1}ms",
        sweep.groups.len(),
        sweep.metrics.len(),
        wall_time_ms
    );
    for group in &sweep.groups {
        print_group(group);
    }
    eprintln!("[ftm] CSV: {}", out_path);

    if json_output {
        let json_path = io::json_path_for(out_path);
        let bundle = ResultBundle::new(Manifest::new(cfg, cfg_text), sweep);
        io::write_json(&json_path, &bundle)?;
        eprintln!("[ftm] JSON bundle: {}", json_path.display());
    }

    Ok(())
}

fn print_group<M>(group: &ScenarioGroup<M>) {
    eprintln!();
    eprintln!("  {} (full automation reqs: {})", group.name, group.reqs_label());
    eprint!("  {:24}", "metric");
    for scenario in group.iter() {
        eprint!(" {:>14}", scenario.name);
    }
    eprintln!();
    eprintln!("  {}", "-".repeat(24 + 15 * group.len()));

    let names = group[1].metrics.iter().map(|m| m.name.as_str());
    for name in names {
        eprint!("  {:24}", name);
        for scenario in group.iter() {
            match scenario.metric(name) {
                Some(v) => eprint!(" {:>14.3}", v),
                None => eprint!(" {:>14}", "-"),
            }
        }
        eprintln!();
    }
}

fn show_params(cfg: &config::Root, timeline: Option<&str>) -> Result<()> {
    let base = cfg.parameter_table()?;
    let table: ParameterTable = match timeline {
        Some(name) => {
            let overrides = cfg.timeline_overrides();
            let t = overrides
                .get(name)
                .with_context(|| format!("no [[timelines]] entry named \"{}\"", name))?;
            apply_timeline_override(&base, t)?
        }
        None => base,
    };

    let (low, med, high) = ParameterSetBuilder::build(&table, &SweepMode::Compare)?;
    print_sets(timeline.unwrap_or("normal"), &table, [&low, &med, &high]);
    Ok(())
}

fn print_sets(title: &str, table: &ParameterTable, sets: [&ParameterSet; 3]) {
    eprintln!("[ftm] parameter sets: {}", title);
    eprintln!(
        "  {:40} {:>14} {:>14} {:>14} {:>8}",
        "parameter", "Conservative", "Best guess", "Aggressive", "compare"
    );
    eprintln!("  {}", "-".repeat(94));
    for row in table.rows() {
        eprint!("  {:40}", row.name);
        for set in sets {
            eprint!(" {:>14.4e}", set.get(&row.name).unwrap_or(f64::NAN));
        }
        eprintln!(" {:>8}", if row.compare { "Y" } else { "N" });
    }
    eprintln!(
        "  {:40} {:>14} {:>14} {:>14}",
        DYNAMIC_END_TIME,
        sets[0].dynamic_end_time(),
        sets[1].dynamic_end_time(),
        sets[2].dynamic_end_time()
    );
}

fn run_explore(cfg: &config::Root, out_path: &str, target: &str) -> Result<()> {
    let table = cfg.parameter_table()?;
    let factory = ReferenceFactory::new(cfg.model);
    let mode = SweepMode::Explore {
        target: target.to_string(),
    };

    let scenarios = ScenarioGroupRunner::new(&factory).run(target, &table, &mode)?;
    let group = ScenarioGroup::new(target, scenarios, table, None);

    let mut w = CsvWriter::create(out_path)?;
    w.write_header()?;
    w.write_group(&group)?;
    w.flush()?;

    eprintln!("[ftm] exploration of {} complete", target);
    print_group(&group);
    eprintln!("[ftm] CSV: {}", out_path);
    Ok(())
}

fn validate_config(cfg_path: &str) -> Result<()> {
    let (cfg, _) = config::load(cfg_path)?;

    eprintln!("[ftm] config valid: {}", cfg_path);
    eprintln!("  program: {} v{}", cfg.ftm.program, cfg.ftm.version);
    eprintln!(
        "  model: t_start={}, t_end={}, t_step={}, max_t_end={}",
        cfg.model.t_start, cfg.model.t_end, cfg.model.t_step, cfg.model.max_t_end
    );
    let compared = cfg.parameters.iter().filter(|r| r.compare).count();
    eprintln!(
        "  parameters: {} ({} compared)",
        cfg.parameters.len(),
        compared
    );
    for t in &cfg.timelines {
        eprintln!(
            "  timeline: {} (reqs={:.0e}, flop gap long/med/short={}/{}/{})",
            t.name, t.full_automation_requirements, t.long_flop_gap, t.med_flop_gap, t.short_flop_gap
        );
    }

    Ok(())
}

fn print_version() {
    eprintln!("FTM - Full Takeoff Model scenario sweeps");
    eprintln!();
    eprintln!("  Tool Version:      {}", io::TOOL_VERSION);
    eprintln!("  Schema Version:    {}", io::SCHEMA_VERSION);
    eprintln!("  Platform:          {}", std::env::consts::OS);
    eprintln!("  Architecture:      {}", std::env::consts::ARCH);
    eprintln!();
    eprintln!("Sweep modes:");
    eprintln!("  - compare: compared parameters move to their bounds together");
    eprintln!("  - explore: a single parameter moves, the rest stay at best guess");
    eprintln!();
    eprintln!("Timelines:");
    for kind in [TimelineKind::VeryShort, TimelineKind::Med, TimelineKind::VeryLong] {
        eprintln!(
            "  - {:22} runtime reqs from the {} column",
            format!("{}:", kind.name()),
            kind.runtime_column()
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Version => {
            print_version();
            Ok(())
        }
        Commands::Validate => {
            let cfg_path = args.config.context("--config required for validate")?;
            validate_config(&cfg_path)
        }
        Commands::Params { timeline } => {
            let cfg_path = args.config.context("--config required")?;
            let (cfg, _) = config::load(&cfg_path)?;
            show_params(&cfg, timeline.as_deref())
        }
        Commands::Explore { target } => {
            let cfg_path = args.config.context("--config required")?;
            let out_path = args
                .out
                .unwrap_or_else(|| format!("results/explore_{}.csv", target));

            let (cfg, _) = config::load(&cfg_path)?;
            eprintln!("[ftm] {} v{} - {}", cfg.ftm.program, cfg.ftm.version, cfg.ftm.module);
            run_explore(&cfg, &out_path, &target)
        }
        Commands::Run { json } => {
            let cfg_path = args.config.context("--config required")?;
            let out_path = args.out.unwrap_or_else(|| "results/scenarios.csv".to_string());

            let (cfg, cfg_text) = config::load(&cfg_path)?;
            eprintln!("[ftm] {} v{} - {}", cfg.ftm.program, cfg.ftm.version, cfg.ftm.module);
            run_all(&cfg, &cfg_text, &out_path, json)
        }
    }
}
