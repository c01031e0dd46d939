mod config;
mod http;
mod mcp;
mod narrator;
mod service;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use saju_core::{
    BirthInput, CalendarKind, ChartReport, CivilDate, Element, KnowledgeTables, OhengAnalysis,
    SajuResult, analyze, compute_chart, export_json,
};

use crate::config::Config;
use crate::narrator::Narrator;
use crate::service::AppState;

#[derive(Parser)]
#[command(name = "saju", about = "Four Pillars (사주) chart engine: CLI, HTTP API and MCP server")]
struct Cli {
    /// Config file (TOML); defaults to $SAJU_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with elements.{json,toml} and toppings.{json,toml}
    #[arg(long, global = true)]
    tables_dir: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and print a chart
    Chart {
        year: i32,
        month: u32,
        day: u32,

        /// Birth hour 0-23
        #[arg(long)]
        hour: Option<u32>,

        /// The date is lunar (computed as solar)
        #[arg(long)]
        lunar: bool,

        /// Day to compute the boost element for, YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        today: Option<CivilDate>,

        /// Print the JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },

    /// Start MCP server on stdio transport
    Mcp,

    /// Validate and summarize the active knowledge tables
    Tables,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.tables_dir {
        config.tables.dir = Some(dir.clone());
    }
    Ok(config)
}

fn load_tables(config: &Config) -> Result<KnowledgeTables> {
    let dir = config.tables.dir.as_deref();
    saju_tables::load(dir).with_context(|| match dir {
        Some(dir) => format!("failed to load knowledge tables from {}", dir.display()),
        None => "embedded knowledge tables are invalid".to_string(),
    })
}

fn app_state(config: &Config) -> Result<Arc<AppState>> {
    let tables = load_tables(config)?;
    let narrator = Narrator::new(config.narrator.clone())?;
    if !narrator.is_active() {
        tracing::info!("narrator inactive (no API key or disabled); using fallback commentary");
    }
    Ok(Arc::new(AppState::new(tables, narrator)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Chart {
            year,
            month,
            day,
            hour,
            lunar,
            today,
            json,
        } => {
            let calendar = if *lunar {
                CalendarKind::Lunar
            } else {
                CalendarKind::Solar
            };
            let input = BirthInput::new(*year, *month, *day, *hour)?.with_calendar(calendar);
            cmd_chart(&config, input, today.unwrap_or_else(CivilDate::today_utc), *json)
        }
        Commands::Serve { bind } => {
            let bind = bind.clone().unwrap_or_else(|| config.server.bind.clone());
            cmd_serve(&config, &bind).await
        }
        Commands::Mcp => cmd_mcp(&config).await,
        Commands::Tables => cmd_tables(&config),
    }
}

fn cmd_chart(config: &Config, input: BirthInput, today: CivilDate, json: bool) -> Result<()> {
    let tables = load_tables(config)?;
    if input.calendar == CalendarKind::Lunar {
        tracing::warn!("no lunar conversion available; computing {} as solar", input.date);
    }

    let saju = compute_chart(&input);
    let analysis = analyze(&saju, today, &tables);

    if json {
        let report = ChartReport::build(&saju, &analysis, &tables, today);
        println!("{}", export_json(&report).context("failed to render report")?);
    } else {
        print_chart(&input, &saju, &analysis, &tables, today);
    }
    Ok(())
}

fn label(element: Element, tables: &KnowledgeTables) -> String {
    let info = tables.element(element);
    format!("{}({})", info.name, info.hanja)
}

fn print_chart(
    input: &BirthInput,
    saju: &SajuResult,
    analysis: &OhengAnalysis,
    tables: &KnowledgeTables,
    today: CivilDate,
) {
    let hour = match input.hour {
        Some(h) => format!(" {h:02}시"),
        None => String::new(),
    };
    let calendar = match input.calendar {
        CalendarKind::Solar => "양력",
        CalendarKind::Lunar => "음력(양력으로 계산)",
    };
    println!("사주 {}{hour} ({calendar})", input.date);

    for (kind, pillar) in saju.pillars() {
        println!(
            "  {}  {} ({})  {}/{}  60갑자 {}번째",
            kind.label(),
            pillar.name(),
            pillar.hanja(),
            pillar.elements[0],
            pillar.elements[1],
            pillar.cycle_index() + 1
        );
    }
    match saju.hour {
        Some(pillar) => {
            let (start, end) = pillar.branch.sijin_hours();
            println!("  시진  {} ({start:02}-{end:02}시)", pillar.branch.sijin_name());
        }
        None => println!("  시주  미상"),
    }

    println!();
    let percentages = analysis.balance.percentages();
    for element in Element::ALL {
        println!(
            "  {:<8} {} ({:>3}%)",
            label(element, tables),
            analysis.balance.count(element),
            percentages[element]
        );
    }
    println!("{}", analysis.balance_description);

    println!();
    println!("오늘({today})의 보충 오행: {}", label(analysis.boost, tables));
    println!("추천 음식:");
    for food in &analysis.recommended_foods {
        println!("  - {}: {}", food.name, food.reason);
    }
    println!("피할 음식:");
    for food in &analysis.avoid_foods {
        println!("  - {}: {}", food.name, food.reason);
    }
    let topping = &analysis.today_topping;
    println!(
        "오늘의 피자: {} {} ({}) - {}",
        topping.emoji, topping.pizza_name, topping.topping, topping.description
    );
}

async fn cmd_serve(config: &Config, bind: &str) -> Result<()> {
    let state = app_state(config)?;
    http::serve(state, bind).await
}

async fn cmd_mcp(config: &Config) -> Result<()> {
    let state = app_state(config)?;
    tracing::info!("starting MCP server on stdio");

    let service = mcp::SajuServer::new(state)
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

fn cmd_tables(config: &Config) -> Result<()> {
    let tables = load_tables(config)?;
    match &config.tables.dir {
        Some(dir) => println!("source: {}", dir.display()),
        None => println!("source: embedded defaults"),
    }
    for element in Element::ALL {
        let info = tables.element(element);
        let topping = tables.topping(element);
        println!(
            "{:<6} {}  foods={} avoid={}  topping={} {}",
            element.as_str(),
            label(element, &tables),
            info.foods.len(),
            info.avoid_foods.len(),
            topping.emoji,
            topping.topping
        );
    }
    println!("ok: all 5 elements present");
    Ok(())
}
