// Command-line interface for clusteradm

pub mod app;
pub mod error;

pub use app::execute;
pub use error::{CliError, CliResult};

use crate::commands::{
    ConnectCluster, CreateNetwork, EnableNode, GetNetwork, GetNetworkOnNode, GetNodeConfiguration,
    InvokeInfrastructureQuery, ListNetworks, NetworkAction, NetworkLifecycle, RemoveNetwork,
    ResetPartitionLoad, ResumeApplicationUpgrade, RollbackApplicationUpgrade, RollbackClusterUpgrade,
    SetHealthReportingVerbosity, TestConnection,
};
use crate::dispatch::AdminCommand;
use crate::output::OutputFormat;
use crate::session::{ConnectionSettings, Credential};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "clusteradm",
    version,
    about = "Administrative commands for a managed cluster",
    long_about = "Runs administrative operations (node, upgrade, partition, health, infrastructure and network commands) against a cluster-management endpoint"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Cluster endpoint to use instead of the session connection (repeatable)
    #[arg(long = "endpoint", value_name = "HOST:PORT", global = true)]
    pub endpoints: Vec<String>,

    /// Client certificate thumbprint
    #[arg(long, global = true, conflicts_with = "token")]
    pub thumbprint: Option<String>,

    /// Expected common name of the server certificate
    #[arg(long = "server-cn", global = true)]
    pub server_cn: Option<String>,

    /// Bearer token
    #[arg(long, global = true, env = "CLUSTERADM_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Timeout for the remote operation, in seconds
    #[arg(long = "timeout-sec", value_name = "SECONDS", global = true)]
    pub timeout_sec: Option<u64>,

    /// Session configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Result format
    #[arg(long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Run against the in-process simulated cluster
    #[arg(long, global = true)]
    pub simulate: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_sec.map(Duration::from_secs)
    }

    /// Explicit connection settings, when endpoints were given
    pub fn connection_settings(&self) -> CliResult<Option<ConnectionSettings>> {
        if self.endpoints.is_empty() {
            if self.thumbprint.is_some() || self.token.is_some() {
                log::debug!("credential options ignored without --endpoint");
            }
            return Ok(None);
        }

        let credential = match (&self.thumbprint, &self.server_cn, &self.token) {
            (Some(thumbprint), Some(server_cn), None) => Credential::Certificate {
                thumbprint: thumbprint.clone(),
                server_common_name: server_cn.clone(),
            },
            (Some(_), None, _) => {
                return Err(CliError::invalid_argument(
                    "--thumbprint",
                    "--server-cn is required with a certificate credential",
                ));
            }
            (None, Some(_), _) => {
                return Err(CliError::invalid_argument(
                    "--server-cn",
                    "--thumbprint is required with --server-cn",
                ));
            }
            (None, None, Some(token)) => Credential::Token {
                token: token.clone(),
            },
            _ => Credential::None,
        };

        let settings = ConnectionSettings::new(self.endpoints.clone()).with_credential(credential);
        settings.validate()?;
        Ok(Some(settings))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Connect to a cluster and make it the session connection
    Connect,

    /// Test connectivity on a fresh connection
    TestConnection,

    /// Re-enable a disabled node
    EnableNode {
        #[arg(long)]
        node_name: String,
    },

    /// Show the configuration of a node
    GetNodeConfiguration {
        #[arg(long)]
        node_name: String,
    },

    /// Reset the reported load of a partition
    ResetPartitionLoad {
        #[arg(long)]
        partition_id: Uuid,
    },

    /// Resume a monitored application upgrade in the next upgrade domain
    ResumeApplicationUpgrade {
        #[arg(long)]
        application_name: String,
        #[arg(long)]
        upgrade_domain: String,
    },

    /// Roll back an in-progress application upgrade
    RollbackApplicationUpgrade {
        #[arg(long)]
        application_name: String,
    },

    /// Roll back an in-progress cluster upgrade
    RollbackClusterUpgrade,

    /// Switch verbose health reporting on or off
    SetHealthReportingVerbosity {
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        enabled: bool,
    },

    /// Send a command to an infrastructure service
    InvokeInfrastructureQuery {
        #[arg(long)]
        service_name: String,
        #[arg(long)]
        command: String,
    },

    /// Manage overlay networks
    Network {
        #[command(subcommand)]
        command: NetworkCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NetworkCommands {
    /// Create an isolated network
    New {
        #[arg(long)]
        network_name: String,
        #[arg(long, value_name = "CIDR")]
        address_prefix: String,
    },
    /// Show one network
    Get {
        #[arg(long)]
        network_name: String,
    },
    /// List all networks
    List,
    /// Delete a network
    Remove {
        #[arg(long)]
        network_name: String,
    },
    Start {
        #[arg(long)]
        network_name: String,
    },
    Stop {
        #[arg(long)]
        network_name: String,
    },
    Restart {
        #[arg(long)]
        network_name: String,
    },
    /// List the nodes a network is deployed on
    Nodes {
        #[arg(long)]
        network_name: String,
    },
}

impl Commands {
    /// Bind the parsed arguments into a command
    pub fn into_command(
        self,
        settings: Option<ConnectionSettings>,
        timeout: Option<Duration>,
    ) -> Box<dyn AdminCommand> {
        match self {
            Commands::Connect => Box::new(ConnectCluster { settings, timeout }),
            Commands::TestConnection => Box::new(TestConnection { timeout }),
            Commands::EnableNode { node_name } => Box::new(EnableNode { node_name, timeout }),
            Commands::GetNodeConfiguration { node_name } => {
                Box::new(GetNodeConfiguration { node_name, timeout })
            }
            Commands::ResetPartitionLoad { partition_id } => {
                Box::new(ResetPartitionLoad { partition_id, timeout })
            }
            Commands::ResumeApplicationUpgrade {
                application_name,
                upgrade_domain,
            } => Box::new(ResumeApplicationUpgrade {
                application_name,
                upgrade_domain,
                timeout,
            }),
            Commands::RollbackApplicationUpgrade { application_name } => {
                Box::new(RollbackApplicationUpgrade {
                    application_name,
                    timeout,
                })
            }
            Commands::RollbackClusterUpgrade => Box::new(RollbackClusterUpgrade { timeout }),
            Commands::SetHealthReportingVerbosity { enabled } => {
                Box::new(SetHealthReportingVerbosity { enabled, timeout })
            }
            Commands::InvokeInfrastructureQuery {
                service_name,
                command,
            } => Box::new(InvokeInfrastructureQuery {
                service_name,
                command,
                timeout,
            }),
            Commands::Network { command } => command.into_command(timeout),
        }
    }
}

impl NetworkCommands {
    fn into_command(self, timeout: Option<Duration>) -> Box<dyn AdminCommand> {
        let lifecycle = |network_name, action| {
            Box::new(NetworkLifecycle {
                network_name,
                action,
                timeout,
            }) as Box<dyn AdminCommand>
        };

        match self {
            NetworkCommands::New {
                network_name,
                address_prefix,
            } => Box::new(CreateNetwork {
                network_name,
                address_prefix,
                timeout,
            }),
            NetworkCommands::Get { network_name } => Box::new(GetNetwork {
                network_name,
                timeout,
            }),
            NetworkCommands::List => Box::new(ListNetworks { timeout }),
            NetworkCommands::Remove { network_name } => Box::new(RemoveNetwork {
                network_name,
                timeout,
            }),
            NetworkCommands::Start { network_name } => lifecycle(network_name, NetworkAction::Start),
            NetworkCommands::Stop { network_name } => lifecycle(network_name, NetworkAction::Stop),
            NetworkCommands::Restart { network_name } => {
                lifecycle(network_name, NetworkAction::Restart)
            }
            NetworkCommands::Nodes { network_name } => Box::new(GetNetworkOnNode {
                network_name,
                timeout,
            }),
        }
    }
}
