// Command-line parsing tests

use clap::Parser;
use clusteradm::cli::{Cli, Commands, NetworkCommands};
use clusteradm::dispatch::CommandKind;
use clusteradm::output::OutputFormat;
use clusteradm::session::Credential;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("clusteradm").chain(args.iter().copied())).unwrap()
}

fn kind_of(args: &[&str]) -> CommandKind {
    let cli = parse(args);
    let settings = cli.global.connection_settings().unwrap();
    cli.command.into_command(settings, cli.global.timeout()).kind()
}

#[test]
fn test_every_subcommand_parses() {
    let cases: &[(&[&str], CommandKind)] = &[
        (&["connect", "--endpoint", "c:19000"], CommandKind::ConnectCluster),
        (&["test-connection"], CommandKind::TestConnection),
        (&["enable-node", "--node-name", "_Node_4"], CommandKind::EnableNode),
        (&["get-node-configuration", "--node-name", "_Node_0"], CommandKind::GetNodeConfiguration),
        (
            &["reset-partition-load", "--partition-id", "3f0a4b2c-9d1e-4c7f-8a6b-5e2d1c0b9a87"],
            CommandKind::ResetPartitionLoad,
        ),
        (
            &[
                "resume-application-upgrade",
                "--application-name",
                "fabric:/App1",
                "--upgrade-domain",
                "1",
            ],
            CommandKind::ResumeApplicationUpgrade,
        ),
        (
            &["rollback-application-upgrade", "--application-name", "fabric:/App1"],
            CommandKind::RollbackApplicationUpgrade,
        ),
        (&["rollback-cluster-upgrade"], CommandKind::RollbackClusterUpgrade),
        (
            &["set-health-reporting-verbosity", "--enabled", "true"],
            CommandKind::ToggleHealthReportingVerbosity,
        ),
        (
            &[
                "invoke-infrastructure-query",
                "--service-name",
                "fabric:/InfraService",
                "--command",
                "status",
            ],
            CommandKind::InvokeInfrastructureQuery,
        ),
        (
            &["network", "new", "--network-name", "n1", "--address-prefix", "10.1.0.0/16"],
            CommandKind::CreateNetwork,
        ),
        (&["network", "get", "--network-name", "n1"], CommandKind::GetNetwork),
        (&["network", "list"], CommandKind::ListNetworks),
        (&["network", "remove", "--network-name", "n1"], CommandKind::RemoveNetwork),
        (&["network", "start", "--network-name", "n1"], CommandKind::StartNetwork),
        (&["network", "stop", "--network-name", "n1"], CommandKind::StopNetwork),
        (&["network", "restart", "--network-name", "n1"], CommandKind::RestartNetwork),
        (&["network", "nodes", "--network-name", "n1"], CommandKind::GetNetworkOnNode),
    ];

    for (args, expected) in cases {
        assert_eq!(kind_of(args), *expected, "{:?}", args);
    }
}

#[test]
fn test_global_options_after_subcommand() {
    let cli = parse(&[
        "network",
        "list",
        "--endpoint",
        "a.local:19000",
        "--endpoint",
        "b.local:19000",
        "--timeout-sec",
        "30",
        "--output",
        "json",
        "-vv",
        "--simulate",
    ]);

    assert!(matches!(
        cli.command,
        Commands::Network {
            command: NetworkCommands::List
        }
    ));
    assert_eq!(cli.global.endpoints.len(), 2);
    assert_eq!(cli.global.timeout(), Some(Duration::from_secs(30)));
    assert_eq!(cli.global.output, Some(OutputFormat::Json));
    assert_eq!(cli.global.verbose, 2);
    assert!(cli.global.simulate);
}

#[test]
fn test_certificate_credential() {
    let cli = parse(&[
        "test-connection",
        "--endpoint",
        "c.local:19000",
        "--thumbprint",
        "AB12",
        "--server-cn",
        "c.local",
    ]);
    let settings = cli.global.connection_settings().unwrap().unwrap();
    assert_eq!(
        settings.credential,
        Credential::Certificate {
            thumbprint: "AB12".to_string(),
            server_common_name: "c.local".to_string(),
        }
    );
}

#[test]
fn test_thumbprint_requires_server_cn() {
    let cli = parse(&["test-connection", "--endpoint", "c.local:19000", "--thumbprint", "AB12"]);
    assert!(cli.global.connection_settings().is_err());
}

#[test]
fn test_server_cn_requires_thumbprint() {
    let cli = parse(&["test-connection", "--endpoint", "c.local:19000", "--server-cn", "c.local"]);
    assert!(cli.global.connection_settings().is_err());

    let cli = parse(&[
        "test-connection",
        "--endpoint",
        "c.local:19000",
        "--server-cn",
        "c.local",
        "--token",
        "tok",
    ]);
    assert!(cli.global.connection_settings().is_err());
}

#[test]
fn test_bad_endpoint_is_a_usage_error() {
    let cli = parse(&["test-connection", "--endpoint", "nope"]);
    assert!(cli.global.connection_settings().is_err());
}

#[test]
fn test_no_endpoint_means_session_connection() {
    let cli = parse(&["enable-node", "--node-name", "_Node_4"]);
    assert!(cli.global.connection_settings().unwrap().is_none());
}

#[test]
fn test_missing_required_argument() {
    assert!(Cli::try_parse_from(["clusteradm", "enable-node"]).is_err());
    assert!(Cli::try_parse_from(["clusteradm", "reset-partition-load", "--partition-id", "xyz"]).is_err());
}
