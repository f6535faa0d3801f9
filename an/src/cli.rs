//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use questionnaire::Category;
use std::path::PathBuf;
use tracing::debug;

/// Anamnese - guided questionnaire that ends in a personalized plan
#[derive(Parser)]
#[command(
    name = "an",
    about = "Guided anamnesis questionnaire with LLM-generated nutrition and training plans",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the plan generation gateway (HTTP server)
    Serve {
        /// Address to bind, overrides server.bind
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Answer the questionnaire interactively (default)
    Ask {
        /// Start directly with this category (nutrition, training)
        #[arg(short = 'C', long, value_parser = parse_category)]
        category: Option<Category>,

        /// Call the provider from this process instead of the gateway
        #[arg(long)]
        local: bool,

        /// Save the generated plan to your plan history (requires login)
        #[arg(short, long)]
        save: bool,
    },

    /// Print the prompt the gateway would send for these answers
    Prompt {
        /// Plan category (nutrition, training)
        #[arg(short = 'C', long, value_parser = parse_category)]
        category: Category,

        /// Answers in question order
        #[arg(value_name = "ANSWER", required = true)]
        answers: Vec<String>,
    },

    /// List the plans saved in your history
    History,

    /// Log in to the plan history service
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account on the plan history service
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the saved login
    Logout,
}

impl Command {
    /// Whether logs go to stderr instead of the log file
    pub fn logs_to_stderr(&self) -> bool {
        matches!(self, Command::Serve { .. })
    }
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: questionnaire::EngineError| e.to_string())
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anamnese")
        .join("logs")
        .join("anamnese.log")
}

/// Generate the after_help text
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Categories:\n");
    for category in Category::ALL {
        help.push_str(&format!("  {:<10} {}\n", category.as_str(), category.label()));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["an"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_prompt_args() {
        let cli = Cli::try_parse_from(["an", "prompt", "-C", "treino", "30 anos", "academia"]).unwrap();
        match cli.command {
            Some(Command::Prompt { category, answers }) => {
                assert_eq!(category, Category::Training);
                assert_eq!(answers, vec!["30 anos", "academia"]);
            }
            other => panic!("expected Prompt, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["an", "ask", "--category", "yoga"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["an", "serve", "--bind", "0.0.0.0:8080", "-l", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let command = cli.command.unwrap();
        assert!(command.logs_to_stderr());
        assert!(matches!(command, Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:8080"));
    }

    #[test]
    fn test_after_help_lists_categories() {
        let help = generate_after_help();
        assert!(help.contains("nutrition"));
        assert!(help.contains("training"));
    }
}
