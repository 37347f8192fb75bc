use clap::{Parser, Subcommand};
use ruleware::middleware::execute_rules;
use ruleware::{Ruleware, RulewareConfig, Scaffolder};
use ruleware_engine::{MatchType, Rule};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Parser)]
#[command(name = "ruleware")]
#[command(version = "0.1.0")]
#[command(about = "Rule-driven response headers and redirects for axum", long_about = None)]
struct Cli {
    /// Directory holding ruleware.toml / ruleware.json
    #[arg(short = 'c', long = "config", value_name = "DIR", default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the development server with the rules middleware installed
    Serve {
        #[arg(short = 'S', long = "server", value_name = "ADDR:PORT", default_value = "127.0.0.1:8080")]
        addr: String,

        #[arg(short = 't', long = "docroot", value_name = "DIR", default_value = ".")]
        docroot: PathBuf,
    },
    /// Inspect registered rules, packages, and handler types
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Scaffold a new rule file or handler source
    Make {
        #[command(subcommand)]
        command: MakeCommand,
    },
}

#[derive(Subcommand)]
enum RulesCommand {
    /// List all registered rules
    List {
        /// Filter by package name
        #[arg(long)]
        package: Option<String>,

        /// Filter by rule id substring
        #[arg(long)]
        id: Option<String>,
    },
    /// Show one rule in full
    Show { id: String },
    /// List registered packages
    Packages,
    /// List registered action types
    Actions,
    /// List registered condition types
    Conditions,
}

#[derive(Subcommand)]
enum MakeCommand {
    /// Create a starter rule file in the rules directory
    Rule { name: String },
    /// Create an Action handler stub
    Action {
        name: String,

        #[arg(long, value_name = "DIR", default_value = "src/rules")]
        dir: PathBuf,
    },
    /// Create a Condition handler stub
    Condition {
        name: String,

        #[arg(long, value_name = "DIR", default_value = "src/rules")]
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt::init();

    let config = match RulewareConfig::load(&cli.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve { addr, docroot } => {
            let app = bootstrap(config);
            let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            runtime.block_on(run_server(Arc::new(app), &addr, &docroot));
        }
        Command::Rules { command } => {
            let app = bootstrap(config);
            run_rules(&app, command);
        }
        Command::Make { command } => run_make(&config, command),
    }
}

fn bootstrap(config: RulewareConfig) -> Ruleware {
    match Ruleware::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run_server(state: Arc<Ruleware>, addr: &str, docroot: &PathBuf) {
    let addr: SocketAddr = addr.parse().unwrap_or_else(|_| {
        eprintln!("Invalid address format, using 127.0.0.1:8080");
        "127.0.0.1:8080".parse().unwrap()
    });

    println!("ruleware development server");
    println!("Document root: {}", docroot.display());
    println!("Rules loaded: {}", state.engine.rules().len());
    println!("Listening on http://{}", addr);
    println!("Press Ctrl+C to stop");

    let mut app = axum::Router::new().fallback_service(ServeDir::new(docroot));
    if state.config.group_enabled("web") {
        app = app.layer(axum::middleware::from_fn_with_state(state.clone(), execute_rules));
    } else {
        println!("Middleware disabled by configuration");
    }

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {addr}: {e}");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {e}");
    }
}

fn run_rules(app: &Ruleware, command: RulesCommand) {
    match command {
        RulesCommand::List { package, id } => {
            let rules: Vec<&Rule> = app
                .engine
                .rules()
                .iter()
                .filter(|rule| {
                    package
                        .as_deref()
                        .map_or(true, |wanted| rule.package.as_deref() == Some(wanted))
                })
                .filter(|rule| id.as_deref().map_or(true, |needle| rule.id.contains(needle)))
                .collect();

            if rules.is_empty() {
                println!("No rules found.");
                return;
            }

            println!(
                "{:<28} {:<10} {:>5}  {:<7} {:<5} {:>10} {:>7}",
                "ID", "PACKAGE", "ORDER", "ENABLED", "MATCH", "CONDITIONS", "ACTIONS"
            );
            for rule in rules {
                println!(
                    "{:<28} {:<10} {:>5}  {:<7} {:<5} {:>10} {:>7}",
                    rule.id,
                    rule.package.as_deref().unwrap_or("-"),
                    rule.order,
                    if rule.enabled { "yes" } else { "no" },
                    match_label(rule.match_type),
                    rule.conditions.len(),
                    rule.actions.len()
                );
            }
        }
        RulesCommand::Show { id } => match app.engine.rule(&id) {
            Some(rule) => print_rule(rule),
            None => {
                eprintln!("No rule with id '{id}'");
                std::process::exit(1);
            }
        },
        RulesCommand::Packages => {
            println!("{:<12} {:<10} {:<7} REQUIRES", "NAME", "AVAILABLE", "LOADED");
            for package in app.packages.packages() {
                println!(
                    "{:<12} {:<10} {:<7} {}",
                    package.name(),
                    if package.is_available() { "yes" } else { "no" },
                    if app.engine.is_loaded(package.name()) { "yes" } else { "no" },
                    package.required_packages().join(", ")
                );
            }
        }
        RulesCommand::Actions => {
            for kind in app.engine.registry().action_kinds() {
                println!("{kind}");
            }
        }
        RulesCommand::Conditions => {
            for kind in app.engine.registry().condition_kinds() {
                println!("{kind}");
            }
        }
    }
}

fn print_rule(rule: &Rule) {
    println!("Rule:    {}", rule.id);
    println!("Package: {}", rule.package.as_deref().unwrap_or("-"));
    println!("Order:   {}", rule.order);
    println!("Enabled: {}", if rule.enabled { "yes" } else { "no" });
    println!("Match:   {}", match_label(rule.match_type));

    println!("Conditions:");
    if rule.conditions.is_empty() {
        println!("  (none, always matches)");
    }
    for condition in &rule.conditions {
        let mut line = format!("  - {}", condition.kind);
        if let Some(name) = &condition.name {
            line.push_str(&format!(" name={name}"));
        }
        if let Some(operator) = &condition.operator {
            line.push_str(&format!(" operator={operator}"));
        }
        if let Some(value) = &condition.value {
            line.push_str(&format!(" value={value}"));
        }
        println!("{line}");
    }

    println!("Actions:");
    for action in &rule.actions {
        let args: Vec<String> = action.args.iter().map(|arg| arg.to_string()).collect();
        println!("  - {}({})", action.kind, args.join(", "));
    }
}

fn match_label(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::All => "all",
        MatchType::Any => "any",
    }
}

fn run_make(config: &RulewareConfig, command: MakeCommand) {
    let result = match command {
        MakeCommand::Rule { name } => {
            Scaffolder::new(PathBuf::from(&config.rules_dir), PathBuf::new()).make_rule(&name)
        }
        MakeCommand::Action { name, dir } => {
            Scaffolder::new(PathBuf::from(&config.rules_dir), dir).make_action(&name)
        }
        MakeCommand::Condition { name, dir } => {
            Scaffolder::new(PathBuf::from(&config.rules_dir), dir).make_condition(&name)
        }
    };

    match result {
        Ok(path) => println!("Created {}", path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
