use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use respec::config::Config;
use respec::framework::CommandFramework;
use respec::orchestrator::Orchestrator;
use respec::reload::Reloader;
use respec::watcher::WatchSession;

const CONFIG_FILE: &str = "respec.toml";

#[derive(Parser)]
#[command(name = "respec")]
#[command(about = "Rerun your test suite on file changes, failures first")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: respec.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch files and rerun matching targets on changes
    Watch,
    /// Run the full suite once and exit
    Run,
    /// List the configured watch rules
    Rules,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config_path = std::fs::canonicalize(&config_path)
        .with_context(|| format!("Could not find config file: {}", config_path.display()))?;

    let base_dir = config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config = Config::load(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;

    match cli.command {
        Commands::Watch => cmd_watch(&config, &base_dir),
        Commands::Run => cmd_run(&config, &base_dir),
        Commands::Rules => cmd_rules(&config),
    }
}

fn build_orchestrator(config: &Config, base_dir: &Path) -> Result<Orchestrator<CommandFramework>> {
    let rules = config.watch_rules()?;

    let framework =
        CommandFramework::new(&config.framework.program, config.framework.args.clone())
            .with_env(config.framework.env.clone())
            .with_cwd(base_dir.to_path_buf());

    let mut orchestrator = Orchestrator::new(rules, config.settings.clone(), framework)?;
    for reloader in &config.reloaders {
        orchestrator.add_reloader(Reloader::command(&reloader.name, &reloader.cmd));
    }

    Ok(orchestrator)
}

fn cmd_watch(config: &Config, base_dir: &Path) -> Result<()> {
    let orchestrator = build_orchestrator(config, base_dir)?;

    let mut session = WatchSession::new(orchestrator, base_dir)
        .with_monitor_file(config.settings.monitor_file.clone())
        .with_debounce_ms(config.watch.debounce_ms);

    session.start()
}

fn cmd_run(config: &Config, base_dir: &Path) -> Result<()> {
    let mut orchestrator = build_orchestrator(config, base_dir)?;

    if orchestrator.run_all().is_err() {
        anyhow::bail!("test suite failed");
    }

    println!("{} {}", "✓".green().bold(), "All specs passed");
    Ok(())
}

fn cmd_rules(config: &Config) -> Result<()> {
    if config.rules.is_empty() {
        println!("{}", "No rules configured".dimmed());
        return Ok(());
    }

    for rule in &config.rules {
        let targets = match (&rule.target, rule.targets.is_empty()) {
            (Some(target), _) => target.clone(),
            (None, false) => rule.targets.join(", "),
            (None, true) => "<changed path>".to_string(),
        };
        println!("  {} {} {}", rule.pattern.cyan(), "→".dimmed(), targets);
    }

    Ok(())
}
