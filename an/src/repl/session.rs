//! Terminal questionnaire session

use colored::Colorize;
use eyre::Result;
use questionnaire::{AnswerEntry, Category, Outcome, Phase, SessionState};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use crate::client::PlanStoreClient;
use crate::session::SessionController;

/// Interactive questionnaire driven by a [`SessionController`]
pub struct ReplSession {
    session: SessionController,
    store: Option<PlanStoreClient>,
}

impl ReplSession {
    /// `store` is where finished plans are saved, when saving was requested
    pub fn new(session: SessionController, store: Option<PlanStoreClient>) -> Self {
        Self { session, store }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        let mut shown: Option<Phase> = None;

        loop {
            let state = self.session.snapshot().await;

            // Only redraw when the phase changed; re-prompts keep the screen quiet
            if shown != Some(state.phase) {
                self.render(&state);
                shown = Some(state.phase);
            }

            let readline = rl.readline(&prompt_for(state.phase));
            let line = match readline {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
            };

            let input = line.trim();
            if !input.is_empty() {
                let _ = rl.add_history_entry(input);
            }

            if input.starts_with('/') {
                match self.handle_slash_command(input, &state).await {
                    SlashResult::Continue => continue,
                    SlashResult::Redraw => {
                        shown = None;
                        continue;
                    }
                    SlashResult::Quit => break,
                }
            }

            match state.phase {
                Phase::CategoryUnselected => self.choose_category(input).await,
                Phase::InProgress(_) => self.answer(input).await,
                Phase::SummaryReady => {
                    if input.is_empty() || is_yes(input) {
                        self.generate().await;
                        shown = None;
                    } else {
                        println!("{}", "Digite /restart para recomeçar ou Enter para gerar o plano.".dimmed());
                    }
                }
                Phase::Completed => {
                    if input.is_empty() {
                        self.session.restart().await;
                    } else {
                        println!("{}", "Enter para um novo questionário, /generate para gerar outro plano.".dimmed());
                    }
                }
                Phase::Submitting | Phase::Failed => {}
            }
        }

        println!("Até logo!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Anamnese".bright_cyan().bold());
        println!("Responda às perguntas para receber um plano personalizado.");
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Draw the screen for the current phase
    fn render(&self, state: &SessionState) {
        match state.phase {
            Phase::CategoryUnselected => print_menu(),
            Phase::InProgress(_) => {
                if let Some(question) = state.current_question() {
                    println!();
                    println!("{} {}", "●".bright_blue(), question.bright_white());
                }
            }
            Phase::SummaryReady => {
                println!();
                println!("{}", "Resumo das respostas:".bright_cyan());
                print_history(&state.history);
                if let Some(failure) = &state.last_error {
                    println!();
                    println!("{} {}", "✗".red(), failure.user_message().red());
                }
                println!();
                println!("Gerar o plano agora? {}", "[S/n]".dimmed());
            }
            Phase::Completed => {
                println!();
                println!("{}", "Seu plano personalizado:".bright_green().bold());
                println!();
                println!("{}", state.generated_plan.as_deref().unwrap_or_default());
                println!();
                println!(
                    "{} novo questionário, {} gerar outro plano, {} sair",
                    "[Enter]".yellow(),
                    "/generate".yellow(),
                    "/quit".yellow()
                );
            }
            Phase::Submitting | Phase::Failed => {}
        }
    }

    async fn choose_category(&self, input: &str) {
        let Some(category) = parse_choice(input) else {
            println!("{} Escolha 1 ou 2.", "?".yellow());
            return;
        };
        if let Err(e) = self.session.select_category(category).await {
            warn!(error = %e, "Category selection refused");
            println!("{} {}", "Error:".red(), e);
        }
    }

    async fn answer(&self, input: &str) {
        match self.session.submit_answer(input).await {
            Ok(Outcome::Advanced { step }) => {
                if let Some((answered, total)) = self.session.progress().await {
                    debug!(step, answered, total, "answer: advanced");
                    println!("{}", format!("({}/{})", answered, total).dimmed());
                }
            }
            Ok(_) => {}
            Err(e) if e.is_validation() => {
                println!("{}", "Por favor, digite uma resposta.".yellow());
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    /// Request a plan; Ctrl-C abandons the request and restarts the session
    async fn generate(&self) {
        println!("{}", "Gerando plano... (Ctrl-C para cancelar)".dimmed());

        let outcome = tokio::select! {
            outcome = self.session.generate_plan() => outcome,
            _ = tokio::signal::ctrl_c() => {
                info!("Plan request abandoned by user");
                self.session.restart().await;
                println!("{}", "Pedido cancelado. Recomeçando.".yellow());
                return;
            }
        };

        match outcome {
            Ok(Outcome::Completed) => self.save_plan().await,
            Ok(Outcome::Failed(failure)) => {
                warn!(detail = %failure.detail(), "Plan generation failed");
            }
            Ok(other) => debug!(?other, "generate: no plan"),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn save_plan(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let state = self.session.snapshot().await;
        let (Some(category), Some(plan)) = (state.category, state.generated_plan.as_deref()) else {
            return;
        };

        match store.create(category, plan).await {
            Ok(saved) => {
                info!(id = %saved.id, "Plan saved");
                println!("{} Plano salvo no histórico (#{}).", "✓".green(), saved.id);
            }
            Err(e) => {
                warn!(error = %e, "Failed to save plan");
                println!("{} {}", "Não foi possível salvar o plano:".red(), e.user_message());
            }
        }
    }

    async fn handle_slash_command(&self, input: &str, state: &SessionState) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/restart" | "/r" => {
                self.session.restart().await;
                println!("{}", "Questionário reiniciado.".dimmed());
                SlashResult::Redraw
            }
            "/history" => {
                if state.history.is_empty() {
                    println!("{}", "Nenhuma resposta ainda.".dimmed());
                } else {
                    print_history(&state.history);
                }
                SlashResult::Continue
            }
            "/generate" | "/g" => {
                self.generate().await;
                SlashResult::Redraw
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Redraw,
    Quit,
}

fn print_menu() {
    println!();
    println!("{}", "Escolha o tipo de plano:".bright_cyan());
    for (i, category) in Category::ALL.iter().enumerate() {
        println!("  {} {}", format!("{})", i + 1).yellow(), category.label().bold());
        println!("     {}", category.blurb().dimmed());
    }
}

fn print_help() {
    println!();
    println!("{}", "Available Commands:".bright_cyan());
    println!("  {:14} Show this help", "/help".yellow());
    println!("  {:14} Start over with a new category", "/restart".yellow());
    println!("  {:14} Show questions and answers so far", "/history".yellow());
    println!("  {:14} Generate the plan (after the last answer)", "/generate".yellow());
    println!("  {:14} Exit", "/quit".yellow());
    println!();
}

/// Chat log: each question followed by its answer, if any
fn print_history(history: &[AnswerEntry]) {
    for entry in history {
        println!("  {} {}", "●".bright_blue(), entry.question);
        if let Some(answer) = &entry.answer {
            println!("    {} {}", "›".bright_green(), answer);
        }
    }
}

fn prompt_for(phase: Phase) -> String {
    match phase {
        Phase::CategoryUnselected => format!("{} ", "plano>".bright_green()),
        _ => format!("{} ", ">".bright_green()),
    }
}

/// Menu number, CLI name or wire name
fn parse_choice(input: &str) -> Option<Category> {
    match input {
        "1" => Some(Category::Nutrition),
        "2" => Some(Category::Training),
        other => other.to_lowercase().parse().ok(),
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}
