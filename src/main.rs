use anyhow::Result;
use clap::Parser;
use console::style;
use hostctl::api::host::HostApiClient;
use hostctl::api::http_client::HttpTransport;
use hostctl::api::register::AgentClient;
use hostctl::cli::{run_agent_command, run_host_command, Cli, Command, ConfigCommand};
use hostctl::config::{Config, ENV_REGISTER_TOKEN, ENV_TOKEN};
use hostctl::error::{ResultExt, TransportError};
use hostctl::logging;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {:#}", style("error:").red().bold(), err);
        if is_auth_failure(&err) {
            eprintln!(
                "{} the server rejected the credentials; check --token / {}",
                style("hint:").yellow().bold(),
                ENV_TOKEN
            );
        }
        std::process::exit(1);
    }
}

fn is_auth_failure(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<TransportError>())
        .any(TransportError::is_auth_error)
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.debug)?;

    let config_path = cli.config_path();
    let mut config = Config::load_or_default(Some(config_path.as_path()))
        .with_config_context(&config_path.display().to_string())?;
    cli.apply_overrides(&mut config);
    config.validate().with_config_context("effective configuration")?;

    if let Command::Config(sub) = &cli.command {
        return match sub {
            ConfigCommand::Show => {
                print!("{}", serde_yaml::to_string(&config)?);
                Ok(())
            }
            ConfigCommand::Init => {
                config
                    .save_to_file(&config_path)
                    .with_config_context(&config_path.display().to_string())?;
                eprintln!("{} {}", style("wrote").green(), config_path.display());
                Ok(())
            }
        };
    }

    tracing::info!(endpoint = %config.server.base_url, "connecting to host API");
    let transport = HttpTransport::from_config(&config).with_api_context("build HTTP transport")?;

    let value = match &cli.command {
        Command::Agent(sub) => {
            if !transport.has_register_token() {
                anyhow::bail!(
                    "agent commands need a registration token: pass --register-token or set {}",
                    ENV_REGISTER_TOKEN
                );
            }
            run_agent_command(&AgentClient::new(transport), sub).await?
        }
        command => run_host_command(&HostApiClient::new(transport), command).await?,
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
