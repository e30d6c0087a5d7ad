//! coverctx CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use coverctx::{
    config::Config,
    context::{
        cmd_analyze_code_context, cmd_coverage_gaps, cmd_generation_context, cmd_setup,
        cmd_test_structure, cmd_validate_coverage, print_code_context, print_gap_report,
        print_generation_context, print_test_structure, print_validation_result,
    },
    error::Result,
    mcp::McpServer,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "coverctx")]
#[command(version, about = "Code-analysis context server for test generation, with MCP support", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize coverctx configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Start MCP server on stdio
    Serve,

    /// Register the MCP server in an editor settings file
    Setup {
        /// Path to the editor settings file to write
        #[arg(long)]
        settings: PathBuf,

        /// Command to launch the server (defaults to this binary)
        #[arg(long)]
        command: Option<String>,

        /// Environment variables to pass, as KEY=VALUE (repeatable)
        #[arg(long = "env", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,
    },

    /// Analyze a source file's structure
    Analyze {
        /// Source file to analyze
        source_file: PathBuf,

        /// Project root directory
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Show uncovered line ranges from the project coverage report
    Gaps {
        /// Source file the coverage applies to
        source_file: PathBuf,

        /// Companion test file
        test_file: PathBuf,

        /// Project root directory
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Analyze an existing test file's organization
    TestStructure {
        /// Test file to analyze
        test_file: PathBuf,

        /// Project root directory
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Build a full test-generation context for a source file
    Context {
        /// Source file to build context for
        source_file: PathBuf,

        /// Companion test file (discovered if omitted)
        #[arg(long)]
        test_file: Option<PathBuf>,

        /// Project root directory
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Compare current coverage against the baseline report
    Validate {
        /// Source file the coverage applies to
        source_file: PathBuf,

        /// Test file whose effect is being validated
        test_file: PathBuf,

        /// Project root directory
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_env_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; COVER_AGENT_DEBUG / MCP_DEBUG force debug output
    let default_level = if cli.verbose || Config::debug_env_enabled() {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries MCP traffic and command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if matches!(cli.command, Commands::Init { .. }) {
        return handle_init(cli);
    }

    // Handle completions command (doesn't need config)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "coverctx", &mut std::io::stdout());
        return Ok(());
    }

    // Load configuration
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    match cli.command {
        Commands::Init { .. } => unreachable!(),

        Commands::Serve => {
            let server = McpServer::new(config);
            server
                .run()
                .await
                .map_err(|e| coverctx::error::Error::McpProtocol(e.to_string()))?;
        }

        Commands::Setup {
            settings,
            command,
            env,
        } => {
            cmd_setup(&config, &settings, command, env).await?;
            println!(
                "✓ Registered MCP server '{}' in {}",
                config.mcp.server_name,
                settings.display()
            );
        }

        Commands::Analyze {
            source_file,
            project_root,
        } => {
            let context = cmd_analyze_code_context(&config, &source_file, &project_root).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                print_code_context(&context);
            }
        }

        Commands::Gaps {
            source_file,
            test_file,
            project_root,
        } => {
            let report =
                cmd_coverage_gaps(&config, &source_file, &test_file, &project_root).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_gap_report(&report);
            }
        }

        Commands::TestStructure {
            test_file,
            project_root,
        } => {
            let structure = cmd_test_structure(&test_file, &project_root).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&structure)?);
            } else {
                print_test_structure(&structure);
            }
        }

        Commands::Context {
            source_file,
            test_file,
            project_root,
        } => {
            let context = cmd_generation_context(
                &config,
                &source_file,
                test_file.as_deref(),
                &project_root,
            )
            .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                print_generation_context(&context);
            }
        }

        Commands::Validate {
            source_file,
            test_file,
            project_root,
        } => {
            let result =
                cmd_validate_coverage(&config, &source_file, &test_file, &project_root).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_validation_result(&result);
            }
        }

        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn handle_init(cli: Cli) -> Result<()> {
    let Commands::Init { force } = cli.command else {
        unreachable!()
    };

    // If the user specifies a config path, derive the base dir from it
    let (base_dir, config_path) = if let Some(path) = cli.config {
        let base = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir);
        let config = if path.extension().map_or(false, |e| e == "toml") {
            path
        } else {
            path.join("config.toml")
        };
        (base, config)
    } else {
        let base = Config::default_base_dir();
        (base.clone(), base.join("config.toml"))
    };

    if config_path.exists() && !force {
        eprintln!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        );
        std::process::exit(1);
    }

    let mut config = Config::default();
    config.paths.base_dir = base_dir;
    config.paths.config_file = config_path.clone();
    config.save()?;

    println!("✓ coverctx initialized successfully");
    println!("  Config: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit the config file to customize settings");
    println!("  2. Register with your editor: coverctx setup --settings <path>");
    println!("  3. Or start the server directly: coverctx serve");

    Ok(())
}
