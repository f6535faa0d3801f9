//! Anamnese - guided questionnaire and plan generation gateway
//!
//! CLI entry point for the gateway server and the terminal questionnaire.

use std::fs;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use anamnese::cli::{Cli, Command, generate_after_help, get_log_path};
use anamnese::client::{AuthClient, PlanStoreClient, TokenStore};
use anamnese::config::Config;
use anamnese::gateway::{self, PlanGateway, build_prompt};
use anamnese::llm::create_client;
use anamnese::repl::{self, AskOptions};

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, to_stderr: bool) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if to_stderr {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        // Interactive commands own the terminal; log to a file instead
        let log_path = get_log_path();
        if let Some(log_dir) = log_path.parent() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }
        let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    let to_stderr = cli.command.as_ref().is_some_and(Command::logs_to_stderr);
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref(), to_stderr)
        .context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Serve { bind }) => {
            debug!(?bind, "main: matched Serve command");
            cmd_serve(config, bind).await
        }
        Some(Command::Ask { category, local, save }) => {
            debug!(?category, local, save, "main: matched Ask command");
            repl::run_interactive(&config, AskOptions { category, local, save }).await
        }
        Some(Command::Prompt { category, answers }) => {
            debug!(%category, count = answers.len(), "main: matched Prompt command");
            println!("{}", build_prompt(category, &answers));
            Ok(())
        }
        Some(Command::History) => {
            debug!("main: matched History command");
            cmd_history(&config).await
        }
        Some(Command::Login { email, password }) => {
            debug!(%email, "main: matched Login command");
            cmd_login(&config, &email, &password).await
        }
        Some(Command::Register { name, email, password }) => {
            debug!(%email, "main: matched Register command");
            cmd_register(&config, &name, &email, &password).await
        }
        Some(Command::Logout) => {
            debug!("main: matched Logout command");
            cmd_logout(&config)
        }
        None => {
            debug!("main: no command specified, starting questionnaire");
            repl::run_interactive(&config, AskOptions::default()).await
        }
    }
}

/// Run the gateway until Ctrl-C
async fn cmd_serve(mut config: Config, bind: Option<String>) -> Result<()> {
    debug!(?bind, "cmd_serve: called");
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate_provider()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    info!(provider = %config.llm.provider, model = %config.llm.model(), "Starting gateway");
    let plan_gateway = PlanGateway::from_config(&config, llm);
    gateway::serve(&config.server, plan_gateway).await
}

async fn cmd_history(config: &Config) -> Result<()> {
    debug!("cmd_history: called");
    let credentials = TokenStore::from_config(&config.store)
        .load()?
        .ok_or_else(|| eyre::eyre!("Not logged in; run `an login` first"))?;
    let store = PlanStoreClient::from_config(&config.store, credentials.token)?;

    let plans = match store.list().await {
        Ok(plans) => plans,
        Err(e) => {
            eprintln!("{} {}", "Erro ao buscar planos:".red(), e.user_message());
            return Err(e.into());
        }
    };

    if plans.is_empty() {
        println!("{}", "Você ainda não gerou nenhum plano.".dimmed());
        return Ok(());
    }

    for plan in plans {
        println!();
        println!(
            "{} {} {}",
            format!("#{}", plan.id).yellow(),
            plan.category.label().bold(),
            plan.created_at.format("%d/%m/%Y %H:%M").to_string().dimmed()
        );
        println!("{}", plan.text);
    }
    Ok(())
}

async fn cmd_login(config: &Config, email: &str, password: &str) -> Result<()> {
    debug!(%email, "cmd_login: called");
    let client = AuthClient::from_config(&config.store)?;
    let credentials = match client.login(email, password).await {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{} {}", "Erro ao fazer login:".red(), e.user_message());
            return Err(e.into());
        }
    };

    let tokens = TokenStore::from_config(&config.store);
    tokens.save(&credentials)?;
    match credentials.user_name() {
        Some(name) => println!("{} Bem-vindo, {}!", "✓".green(), name),
        None => println!("{} Login realizado.", "✓".green()),
    }
    debug!(path = %tokens.path().display(), "cmd_login: session saved");
    Ok(())
}

async fn cmd_register(config: &Config, name: &str, email: &str, password: &str) -> Result<()> {
    debug!(%email, "cmd_register: called");
    let client = AuthClient::from_config(&config.store)?;
    if let Err(e) = client.register(name, email, password).await {
        eprintln!("{} {}", "Erro ao cadastrar:".red(), e.user_message());
        return Err(e.into());
    }
    println!("{} Cadastro realizado. Faça login com `an login`.", "✓".green());
    Ok(())
}

fn cmd_logout(config: &Config) -> Result<()> {
    debug!("cmd_logout: called");
    if TokenStore::from_config(&config.store).clear()? {
        println!("Sessão encerrada.");
    } else {
        println!("{}", "Nenhuma sessão ativa.".dimmed());
    }
    Ok(())
}
