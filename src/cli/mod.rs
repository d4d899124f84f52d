use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::core::catalog::Catalog;
use crate::core::config::load_config;
use crate::core::session::Session;
use crate::gateway::HttpGateway;
use crate::ledger::TokenLedger;
use crate::orchestrator::Orchestrator;

#[derive(Parser)]
#[command(
    name = "viking-roleplay",
    version,
    about = "Practice guest conversations against simulated personas and get a scored report"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Scenario id (see `viking-roleplay list`)
    #[arg(long)]
    scenario: Option<String>,

    /// Persona id (see `viking-roleplay list`)
    #[arg(long)]
    persona: Option<String>,

    /// Route guest replies through the live gateway instead of the simulator
    #[arg(long)]
    live: bool,

    /// Seed for the reply simulator (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Gateway endpoint override
    #[arg(long, env = "VIKING_GATEWAY_URL")]
    gateway_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the scenario and persona catalogs
    List,
}

pub async fn run_cli() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(None)?;
    if let Some(url) = cli.gateway_url {
        config.gateway_url = url;
    }
    if cli.live {
        config.use_live_gateway = true;
    }

    let catalog = Catalog::builtin();

    if matches!(cli.command, Some(Command::List)) {
        print_catalog(&catalog);
        return Ok(());
    }

    let (scenario_id, persona_id) = match (cli.scenario, cli.persona) {
        (Some(s), Some(p)) => (s, p),
        _ => {
            print_catalog(&catalog);
            println!("\nPick one of each: viking-roleplay --scenario <id> --persona <id>");
            return Ok(());
        }
    };

    let gateway = HttpGateway::new(
        config.gateway_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let ledger = TokenLedger::load(&config.ledger_cache_path()).unwrap_or_default();

    let mut orch = Orchestrator::new(
        catalog,
        Arc::new(gateway),
        ledger,
        config.simulator.clone(),
    );
    if let Some(seed) = cli.seed {
        orch = orch.with_rng_seed(seed);
    }
    orch.set_ai_enabled(config.use_live_gateway);

    orch.start_session(&scenario_id, &persona_id)?;

    let persona_icon = orch.catalog().persona(&persona_id)?.icon.clone();
    let scenario_title = orch.catalog().scenario(&scenario_id)?.title.clone();
    let objectives = orch
        .catalog()
        .scenario(&scenario_id)?
        .training_objectives
        .join(", ");

    println!("\x1b[1mviking-roleplay\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Scenario: \x1b[36m{scenario_title}\x1b[0m");
    println!("Objectives: {objectives}");
    println!("Type your reply; \x1b[33m/end\x1b[0m for the report, \x1b[33m/help\x1b[0m for commands.\n");

    if let Some(session) = orch.current_session() {
        println!("{persona_icon}  {}", session.messages[0].content);
    }

    loop {
        eprint!("\x1b[32;1myou>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D): seal the session so the report still prints.
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match input.as_str() {
                "/help" | "/h" => {
                    println!("\x1b[1mCommands:\x1b[0m");
                    println!("  /help     Show this help");
                    println!("  /status   Gateway status and session message count");
                    println!("  /end      End the session and print the report");
                    continue;
                }
                "/status" => {
                    println!(
                        "Gateway: {} | Messages: {}",
                        orch.gateway_status(),
                        orch.current_session().map_or(0, Session::message_count),
                    );
                    if let Some(err) = orch.last_error() {
                        println!("Last error: {err}");
                    }
                    continue;
                }
                "/end" | "/quit" | "/q" => break,
                _ => {
                    eprintln!("\x1b[31mUnknown command: {input}\x1b[0m");
                    continue;
                }
            }
        }

        match orch.send(&input).await {
            Ok(reply) => println!("{persona_icon}  {reply}"),
            Err(e) => eprintln!("\x1b[31m{e}\x1b[0m"),
        }
    }

    let session = orch.end_session()?;
    print_report(session, &scenario_title);
    println!(
        "Session cost: {} ({} tokens) | Lifetime: {} ({} tokens)",
        TokenLedger::format_cost(orch.ledger().session_cost),
        orch.ledger().session_tokens,
        TokenLedger::format_cost(orch.ledger().total_cost),
        orch.ledger().total_tokens_used,
    );

    if let Err(e) = orch.ledger().save(&config.ledger_cache_path()) {
        eprintln!("Could not save ledger cache: {e}");
    }

    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!("\x1b[1mScenarios:\x1b[0m");
    for s in catalog.scenarios() {
        println!(
            "  \x1b[36m{:<26}\x1b[0m [{}] {}",
            s.id, s.difficulty, s.title
        );
    }
    println!("\n\x1b[1mPersonas:\x1b[0m");
    for p in catalog.personas() {
        println!(
            "  \x1b[36m{:<26}\x1b[0m [{}] {} {}",
            p.id, p.difficulty, p.icon, p.name
        );
    }
}

fn print_report(session: &Session, scenario_title: &str) {
    let Some(feedback) = session.feedback.as_ref() else {
        return;
    };

    println!("\n\x1b[1mRole play complete — {scenario_title}\x1b[0m");
    println!("Total score: \x1b[1m{}\x1b[0m / 100\n", feedback.total_score);

    let d = &feedback.dimensions;
    println!("  empathy       {:>3}", d.empathy);
    println!("  clarity       {:>3}", d.clarity);
    println!("  accuracy      {:>3}", d.accuracy);
    println!("  solution      {:>3}", d.solution);
    println!("  deescalation  {:>3}", d.deescalation);
    println!("  brand         {:>3}", d.brand);

    println!("\n\x1b[32mStrengths:\x1b[0m");
    for s in &feedback.strengths {
        println!("  • {s}");
    }
    println!("\x1b[33mAreas to improve:\x1b[0m");
    for s in &feedback.improvements {
        println!("  • {s}");
    }
    println!("\x1b[36mRecommended training:\x1b[0m");
    for s in &feedback.recommendations {
        println!("  • {s}");
    }
    println!();
}
