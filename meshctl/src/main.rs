use anyhow::Result;
use clap::{CommandFactory, Parser};
use meshctl::cli::{Cli, Commands};
use meshctl::commands::install::{handle_install_command, InstallAction};
use meshctl::commands::manifest::{handle_manifest_command, ManifestAction};
use meshctl::commands::route_group::{handle_delete_command, handle_get_command};
use meshctl::config::Config;
use meshctl::logging::LoggingConfig;
use meshctl::meshclient::MeshClient;
use meshctl::output::{self, OutputFormat};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        output::print_warning(&format!("Ignoring config file: {:#}", e));
        Config::default()
    });

    let _log_guard = LoggingConfig {
        level: cli.log_level.clone(),
        dir: config.log_dir.clone(),
    }
    .init()?;

    let server = cli.server.clone().unwrap_or_else(|| config.default_server.clone());
    let format = cli
        .output
        .unwrap_or_else(|| OutputFormat::from_name(&config.default_output));

    match cli.command {
        Commands::Install { args, cluster } => {
            handle_install_command(InstallAction::Install, args, &cluster, &config).await?
        }
        Commands::Precheck { args, cluster } => {
            handle_install_command(InstallAction::PreCheck, args, &cluster, &config).await?
        }
        Commands::Reset { args, cluster } => {
            handle_install_command(InstallAction::Reset, args, &cluster, &config).await?
        }
        Commands::Get { resource } => {
            handle_get_command(resource, &MeshClient::new(&server), format).await?
        }
        Commands::Delete { resource } => {
            handle_delete_command(resource, &MeshClient::new(&server)).await?
        }
        Commands::Create { file } => {
            handle_manifest_command(ManifestAction::Create, &file, &MeshClient::new(&server)).await?
        }
        Commands::Apply { file } => {
            handle_manifest_command(ManifestAction::Apply, &file, &MeshClient::new(&server)).await?
        }
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

fn generate_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
