//! Command-line surface: one sub-command per host operation

use crate::api::host::HostApiClient;
use crate::api::register::AgentClient;
use crate::api::transport::Transport;
use crate::api::types::{HostQuery, HostRecord, ProvisionRequest, QueryValue, RegisterRequest, RegisterToken};
use crate::config::Config;
use crate::error::{HostctlResult, ResultExt};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hostctl")]
#[command(about = "Manage scheduler hosts from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.hostctl/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API endpoint, including the /api prefix
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Session token sent as Auth-Token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Registration token sent as X-Register-Token by agent commands
    #[arg(long, global = true)]
    pub register_token: Option<String>,

    /// Response language (zh-CN or en-US)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Paged/filtered host listing
    List {
        /// Filter as key=value, repeatable (e.g. -q page=2 -q name=web)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_query_pair)]
        query: Vec<(String, QueryValue)>,
    },
    /// Every host, unfiltered
    All,
    /// Show a single host
    Detail { id: String },
    /// Create or update a host from a JSON object
    Update {
        /// Inline JSON record
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        data: Option<String>,
        /// Read the JSON record from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a host
    Remove { id: String },
    /// Check that a host's agent answers
    Ping { id: String },
    /// Agent registration token
    #[command(subcommand)]
    Token(TokenCommand),
    /// Enroll an agent using the registration token
    #[command(subcommand)]
    Agent(AgentCommand),
    /// Inspect or write the configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Print the current token
    Show,
    /// Generate a new token, invalidating the old one
    Generate,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// Register an agent listening on ip:port
    Register {
        #[arg(long)]
        hostname: String,
        #[arg(long)]
        ip: String,
        #[arg(long, default_value_t = 5921)]
        port: u16,
        /// Display name (default: the hostname)
        #[arg(long)]
        alias: Option<String>,
        /// Agent version reported to the server
        #[arg(long = "agent-version", default_value = env!("CARGO_PKG_VERSION"))]
        version: String,
        /// Ask the server to issue a client certificate
        #[arg(long)]
        needs_cert: bool,
    },
    /// Create the host record and fetch server certificates for the agent
    Provision {
        #[arg(long)]
        hostname: String,
        #[arg(long)]
        ip: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init,
}

fn parse_query_pair(arg: &str) -> Result<(String, QueryValue), String> {
    HostQuery::parse_pair(arg).ok_or_else(|| format!("expected KEY=VALUE, got '{}'", arg))
}

impl Cli {
    /// Command-line flags win over file and environment
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.server.base_url = endpoint.clone();
        }
        if let Some(token) = &self.token {
            config.server.auth_token = Some(token.clone());
        }
        if let Some(token) = &self.register_token {
            config.server.register_token = Some(token.clone());
        }
        if let Some(locale) = &self.locale {
            config.server.locale = Some(locale.clone());
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::get_config_path)
    }
}

/// Build the query for `list` from repeated `-q` flags
pub fn build_query(pairs: &[(String, QueryValue)]) -> HostQuery {
    pairs.iter().cloned().collect()
}

/// Read the record for `update` from `--data` or `--file`
pub fn read_record(data: Option<&str>, file: Option<&PathBuf>) -> HostctlResult<HostRecord> {
    let raw = match (data, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path).with_file_context(&path.display().to_string())?,
        (None, None) => anyhow::bail!("either --data or --file is required"),
    };

    let value: Value = serde_json::from_str(&raw).context("host record is not valid JSON")?;
    HostRecord::from_value(value).context("host record must be a JSON object")
}

/// Run a host command against `client`
///
/// `Config` sub-commands never reach the network and `Agent` sub-commands use
/// [`run_agent_command`]; both are handled by the caller.
pub async fn run_host_command<T: Transport>(
    client: &HostApiClient<T>,
    command: &Command,
) -> HostctlResult<Value> {
    match command {
        Command::List { query } => client
            .list(&build_query(query))
            .await
            .with_api_context("list hosts"),
        Command::All => client.all().await.with_api_context("list all hosts"),
        Command::Detail { id } => client
            .detail(id.as_str())
            .await
            .with_api_context(&format!("fetch host {}", id)),
        Command::Update { data, file } => {
            let record = read_record(data.as_deref(), file.as_ref())?;
            tracing::info!(
                name = record.name().unwrap_or("-"),
                create = record.is_new(),
                "storing host"
            );
            client
                .update(&record.into_value())
                .await
                .with_api_context("store host")
        }
        Command::Remove { id } => client
            .remove(id.as_str())
            .await
            .with_api_context(&format!("remove host {}", id)),
        Command::Ping { id } => client
            .ping(id.as_str())
            .await
            .with_api_context(&format!("ping host {}", id)),
        Command::Token(TokenCommand::Show) => {
            let value = client
                .get_register_token()
                .await
                .with_api_context("fetch register token")?;
            Ok(token_output(value))
        }
        Command::Token(TokenCommand::Generate) => {
            let value = client
                .generate_register_token()
                .await
                .with_api_context("generate register token")?;
            Ok(token_output(value))
        }
        Command::Agent(_) => anyhow::bail!("agent commands need the registration client"),
        Command::Config(_) => anyhow::bail!("config commands do not talk to the server"),
    }
}

/// Run an agent enrollment command against `client`
///
/// The transport behind `client` must already carry the registration token.
pub async fn run_agent_command<T: Transport>(
    client: &AgentClient<T>,
    command: &AgentCommand,
) -> HostctlResult<Value> {
    match command {
        AgentCommand::Register {
            hostname,
            ip,
            port,
            alias,
            version,
            needs_cert,
        } => {
            let request = RegisterRequest {
                hostname: hostname.clone(),
                ip: ip.clone(),
                port: *port,
                alias: alias.clone().unwrap_or_else(|| hostname.clone()),
                version: version.clone(),
                needs_cert: *needs_cert,
            };
            let bundle = client
                .register(&request)
                .await
                .with_api_context(&format!("register agent {}:{}", ip, port))?;
            if *needs_cert && bundle.is_none() {
                tracing::warn!("server did not return a certificate bundle");
            }
            Ok(serde_json::json!({ "registered": true, "cert_bundle": bundle }))
        }
        AgentCommand::Provision { hostname, ip } => {
            let request = ProvisionRequest {
                hostname: hostname.clone(),
                ip: ip.clone(),
            };
            let bundle = client
                .provision(&request)
                .await
                .with_api_context(&format!("provision agent {}", ip))?;
            Ok(serde_json::json!({ "provisioned": true, "cert_bundle": bundle }))
        }
    }
}

fn token_output(value: Value) -> Value {
    if let Some(token) = RegisterToken::from_response(&value) {
        if !token.is_configured() {
            tracing::warn!("no registration token configured on the server");
        }
    }
    value
}
