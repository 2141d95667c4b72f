//! `veto` — the CLI entry point: compile restrictions into policies, run
//! ad-hoc checks against a compiled policy, run the permission daemon,
//! materialise shims, and synthesise agent hook configs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use veto_core::{Action, CheckRequest, Policy, VetoConfig};

#[derive(Parser)]
#[command(name = "veto", about = "Semantic permission layer for AI coding agents")]
struct Cli {
    /// TOML config file; defaults to $VETO_CONFIG or the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a natural-language restriction into a Policy.
    Compile {
        restriction: String,
        /// Never call the LLM tier; use the in-memory fixture provider.
        #[arg(long)]
        offline: bool,
        /// Append the compiled {restriction, policy} record to the saved list.
        #[arg(long)]
        save: bool,
    },
    /// Check whether `action` on `target` is allowed under a compiled policy.
    CheckFile {
        target: String,
        #[arg(long)]
        policy: PathBuf,
        /// Defaults to the policy's own action, the only case that can deny.
        #[arg(long)]
        action: Option<String>,
    },
    /// Check whether a raw shell command is allowed under a compiled policy.
    CheckCommand {
        command: String,
        #[arg(long)]
        policy: PathBuf,
    },
    /// Check file content (AST rules first, falling back to regex) against a policy.
    CheckContent {
        /// Path to the file whose content is scanned; also used for language/file-type gating.
        file: PathBuf,
        #[arg(long)]
        policy: PathBuf,
    },
    /// Render a Policy into an agent-specific hook/permission config.
    SynthesiseHooks {
        #[arg(long)]
        policy: PathBuf,
        /// "claude-code" or "opencode"/"aider".
        #[arg(long)]
        agent: String,
    },
    /// Permission daemon lifecycle.
    Daemon {
        #[command(subcommand)]
        action: DaemonCommand,
    },
    /// Shim set generation.
    Shim {
        #[command(subcommand)]
        action: ShimCommand,
    },
    /// Internal: invoked by generated shim scripts, never by a human directly.
    #[command(name = "shim-check", hide = true)]
    ShimCheck {
        #[arg(long)]
        action: String,
        #[arg(long)]
        port: u16,
        targets: Vec<String>,
    },
    /// Compile cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand)]
enum DaemonCommand {
    /// Start the permission daemon and print its assigned port.
    Start {
        #[arg(long)]
        policy: PathBuf,
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum ShimCommand {
    /// Write per-command shim scripts into `dir` for the given actions.
    Materialize {
        dir: PathBuf,
        #[arg(long, value_delimiter = ',')]
        actions: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Delete the on-disk compile cache.
    Clear,
}

/// One error type for the whole binary: a typed core error carries its own
/// exit code, everything else (file I/O, clap misuse already handled, JSON
/// shape) maps to the generic code. No ad hoc `std::process::exit` anywhere
/// else in this file.
enum CliError {
    Core(veto_core::Error),
    Other(anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Core(e) => e.exit_code() as u8,
            CliError::Other(_) => 1,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Core(e) => write!(f, "{e}"),
            CliError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl From<veto_core::Error> for CliError {
    fn from(e: veto_core::Error) -> Self {
        CliError::Core(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        CliError::Other(e)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "veto=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("veto: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = VetoConfig::load(resolve_config_path(cli.config).as_deref());

    match cli.command {
        Commands::Compile { restriction, offline, save } => {
            run_compile(&config, &restriction, offline, save).await
        }
        Commands::CheckFile { target, policy, action } => {
            let policy = load_policy(&policy)?;
            let action = match action {
                Some(raw) => raw.parse::<Action>()?,
                None => policy.action,
            };
            let request = CheckRequest::File { action, target };
            print_response(veto_daemon::evaluate(&request, &policy));
            Ok(())
        }
        Commands::CheckCommand { command, policy } => {
            let policy = load_policy(&policy)?;
            let request = CheckRequest::Command { command };
            print_response(veto_daemon::evaluate(&request, &policy));
            Ok(())
        }
        Commands::CheckContent { file, policy } => run_check_content(&file, &policy),
        Commands::SynthesiseHooks { policy, agent } => {
            let policy = load_policy(&policy)?;
            let agent = agent.parse::<veto_hooks::HookAgent>()?;
            let value = veto_hooks::synthesise_hooks(&policy, agent);
            println!("{}", serde_json::to_string_pretty(&value).map_err(veto_core::Error::from)?);
            Ok(())
        }
        Commands::Daemon { action: DaemonCommand::Start { policy, bind } } => {
            let policy = load_policy(&policy)?;
            let bind_host = bind.unwrap_or(config.daemon.bind_host.clone());
            run_daemon(policy, bind_host).await
        }
        Commands::Shim { action: ShimCommand::Materialize { dir, actions } } => {
            let actions = actions
                .iter()
                .map(|a| a.parse::<Action>())
                .collect::<Result<Vec<_>, _>>()?;
            let plan = veto_shim::ShimPlan::render(&actions);
            plan.write_to(&dir).map_err(veto_core::Error::from)?;
            info!("wrote {} shim script(s) to {}", actions.len(), dir.display());
            Ok(())
        }
        Commands::ShimCheck { action, port, targets } => {
            let action = action.parse::<Action>()?;
            match veto_shim::check_targets(&targets, action, port) {
                Ok(()) => Ok(()),
                Err(e) => Err(anyhow::anyhow!("{e}").into()),
            }
        }
        Commands::Cache { action: CacheCommand::Clear } => {
            let cache = veto_compiler::CompileCache::new(config.cache_file());
            cache.clear().map_err(veto_core::Error::from)?;
            Ok(())
        }
    }
}

fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os("VETO_CONFIG").map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|d| d.join("veto").join("config.toml")))
}

fn load_policy(path: &Path) -> Result<Policy, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading policy file {}: {e}", path.display()))?;
    let policy: Policy = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("parsing policy file {}: {e}", path.display()))?;
    policy.validate()?;
    Ok(policy)
}

fn print_response(response: veto_core::CheckResponse) {
    println!("{}", serde_json::to_string(&response).unwrap_or_default());
}

async fn run_compile(config: &VetoConfig, restriction: &str, offline: bool, save: bool) -> Result<(), CliError> {
    let cache = veto_compiler::CompileCache::new(config.cache_file());

    let policy = if offline {
        let compiler = veto_compiler::Compiler::new(veto_compiler::FixtureProvider::new(), cache);
        compiler.compile(restriction).await?
    } else {
        let api_key = config
            .anthropic_api_key
            .clone()
            .ok_or_else(|| veto_core::Error::MissingConfig("ANTHROPIC_API_KEY not set (or pass --offline)".into()))?;
        let compiler = veto_compiler::Compiler::new(veto_compiler::AnthropicProvider::new(api_key), cache);
        compiler.compile(restriction).await?
    };

    println!("{}", serde_json::to_string_pretty(&policy).map_err(veto_core::Error::from)?);

    if save {
        save_policy_record(config, restriction, &policy)?;
    }
    Ok(())
}

/// Append `{restriction, policy}` to the saved-policies list (§6's "Policy
/// persistence"). Best-effort read, full rewrite — mirrors `CompileCache`'s
/// own read-modify-write shape rather than inventing a new one.
fn save_policy_record(config: &VetoConfig, restriction: &str, policy: &Policy) -> Result<(), CliError> {
    let path = config
        .cache_file()
        .parent()
        .map(|dir| dir.join("policies.json"))
        .ok_or_else(|| anyhow::anyhow!("could not resolve policies file location"))?;

    let mut records: Vec<serde_json::Value> = std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default();

    records.push(serde_json::json!({ "restriction": restriction, "policy": policy }));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(veto_core::Error::from)?;
    }
    let serialized = serde_json::to_string_pretty(&records).map_err(veto_core::Error::from)?;
    std::fs::write(&path, serialized).map_err(veto_core::Error::from)?;
    Ok(())
}

fn run_check_content(file: &Path, policy_path: &Path) -> Result<(), CliError> {
    let policy = load_policy(policy_path)?;
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("reading content file {}: {e}", file.display()))?;
    let file_path = file.to_string_lossy();

    let engine = veto_ast::AstEngine::new();
    let result = veto_ast::check_content_ast(&engine, &content, &file_path, &policy);

    if result.allowed {
        println!("{}", serde_json::to_string(&veto_core::CheckResponse::allow()).unwrap_or_default());
    } else {
        let reason = result
            .matched
            .as_ref()
            .map(|m| m.rule_reason.clone())
            .unwrap_or_else(|| policy.description.clone());
        print_response(veto_core::CheckResponse::deny(reason, None));
    }
    Ok(())
}

/// Start the daemon, print its port, and block until a shutdown signal.
/// First SIGINT/SIGTERM requests a graceful stop and prints the session
/// summary; a second one escalates to an immediate process exit — mirrors
/// the teacher's supervisor shutdown pattern (§5).
async fn run_daemon(policy: Policy, bind_host: String) -> Result<(), CliError> {
    let running = veto_daemon::Daemon::new(policy, bind_host)
        .start()
        .await
        .map_err(veto_core::Error::from)?;
    println!("VETO_PORT={}", running.port());

    wait_for_shutdown_signal().await;
    tokio::spawn(async {
        wait_for_shutdown_signal().await;
        eprintln!("veto: second shutdown signal, exiting immediately");
        std::process::exit(130);
    });

    let snapshot = running.stop().await;
    info!(
        allowed = snapshot.allowed_count,
        blocked = snapshot.blocked_count,
        "veto daemon stopped"
    );
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
