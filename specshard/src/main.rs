mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use specshard_core::PluginOptions;
use tracing::Level;

#[derive(Parser)]
#[command(name = "specshard")]
#[command(about = "Infers cacheable, CI-sharded test targets from end-to-end test runner configs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = ".")]
    workspace_root: PathBuf,

    /// Directory holding the targets cache [default: <workspace>/.nx/workspace-data]
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Args)]
struct OptionArgs {
    /// Name of the primary run target [default: e2e]
    #[arg(long, global = true)]
    target_name: Option<String>,

    /// Name of the component test target [default: component-test]
    #[arg(long, global = true)]
    component_testing_target_name: Option<String>,

    /// Prefix and umbrella name of the CI targets [default: e2e-ci]
    #[arg(long, global = true)]
    ci_target_name: Option<String>,
}

impl From<OptionArgs> for PluginOptions {
    fn from(args: OptionArgs) -> Self {
        PluginOptions {
            target_name: args.target_name,
            component_testing_target_name: args.component_testing_target_name,
            ci_target_name: args.ci_target_name,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List test runner configs and whether they belong to a project
    Scan {
        #[arg(long, action)]
        json: bool,
    },
    /// Synthesize targets for every project and update the cache
    Show {
        #[arg(long, action)]
        json: bool,
        /// Ignore cached targets and synthesize from scratch
        #[arg(long, action)]
        no_cache: bool,
    },
    /// Print the execution order of one project's targets
    Graph {
        /// Project root relative to the workspace, e.g. apps/web
        project: String,
    },
    /// Delete the targets cache
    ClearCache,
    /// Report whether a plugin is registered in the workspace manifest
    CheckPlugin {
        #[arg(default_value = specshard_core::plugin::PLUGIN_NAME)]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context {
        workspace_root: cli.workspace_root,
        cache_dir: cli.cache_dir,
        options: cli.options.into(),
    };

    match cli.command {
        Commands::Scan { json } => commands::cmd_scan(&ctx, json)?,
        Commands::Show { json, no_cache } => commands::cmd_show(&ctx, json, no_cache)?,
        Commands::Graph { project } => commands::cmd_graph(&ctx, &project)?,
        Commands::ClearCache => commands::cmd_clear_cache(&ctx)?,
        Commands::CheckPlugin { name } => commands::cmd_check_plugin(&ctx, &name)?,
    }

    Ok(())
}
