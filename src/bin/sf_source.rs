//! `sf-source` - retrieve, deploy and list Salesforce metadata.
//!
//! ```sh
//! sf-source retrieve -m ApexClass -u my-org
//! sf-source deploy -p force-app -l RunLocalTests --json
//! sf-source list -m ApexClass -f out/classes.json
//! ```
//!
//! Exit codes: 0 success, 68 partial success, 1 anything else.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use busbar_sf_auth::{Error as AuthError, ErrorKind as AuthErrorKind, SalesforceCredentials};
use busbar_sf_client::ClientConfig;
use busbar_sf_metadata::{DeployOptions, TestLevel};
use busbar_sf_source::config::DEFAULT_SRC_WAIT_MINUTES;
use busbar_sf_source::input::{resolve_deploy_input, resolve_retrieve_input};
use busbar_sf_source::{
    commands, connect, output, CommandOutcome, DeployCommand, DeployInput, ListCommand,
    RetrieveCommand, RetrieveInput, SfProject, SourceConfig, SourceContext, WaitBudget,
};

#[derive(Parser)]
#[command(name = "sf-source")]
#[command(about = "Retrieve, deploy and list Salesforce metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve source from an org into the project
    Retrieve(RetrieveArgs),

    /// Deploy project source to an org
    Deploy(DeployArgs),

    /// List the metadata components of one type in an org
    List(ListArgs),
}

#[derive(Args)]
struct OrgArgs {
    /// Username or alias of the target org (defaults to SF_TARGET_ORG,
    /// then SF_INSTANCE_URL/SF_ACCESS_TOKEN)
    #[arg(short = 'u', long = "targetusername")]
    target_username: Option<String>,

    /// Format output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RetrieveArgs {
    /// Comma-separated list of source file paths to retrieve
    #[arg(short = 'p', long = "sourcepath", value_delimiter = ',')]
    source_paths: Vec<PathBuf>,

    /// File path for the manifest (package.xml) that specifies the components to retrieve
    #[arg(short = 'x', long)]
    manifest: Option<PathBuf>,

    /// Comma-separated list of metadata component names
    #[arg(short = 'm', long, value_delimiter = ',')]
    metadata: Vec<String>,

    /// Comma-separated list of packages to retrieve
    #[arg(short = 'n', long = "packagenames", value_delimiter = ',')]
    package_names: Vec<String>,

    /// Minutes to wait for the command to complete
    #[arg(short = 'w', long, default_value_t = DEFAULT_SRC_WAIT_MINUTES)]
    wait: u64,

    /// Write metadata-format output to this directory instead of the project
    #[arg(short = 'r', long = "retrievetargetdir")]
    retrieve_target_dir: Option<PathBuf>,

    #[command(flatten)]
    org: OrgArgs,
}

#[derive(Args)]
struct DeployArgs {
    /// Comma-separated list of source file paths to deploy
    #[arg(short = 'p', long = "sourcepath", value_delimiter = ',')]
    source_paths: Vec<PathBuf>,

    /// File path for the manifest (package.xml) that specifies the components to deploy
    #[arg(short = 'x', long)]
    manifest: Option<PathBuf>,

    /// Comma-separated list of metadata component names
    #[arg(short = 'm', long, value_delimiter = ',')]
    metadata: Vec<String>,

    /// Minutes to wait for the command to complete
    #[arg(short = 'w', long, default_value_t = DEFAULT_SRC_WAIT_MINUTES)]
    wait: u64,

    /// Validate the deploy and run Apex tests but don't save to the org
    #[arg(short = 'c', long = "checkonly")]
    check_only: bool,

    /// Deployment testing level
    #[arg(short = 'l', long = "testlevel", value_parser = parse_test_level)]
    test_level: Option<TestLevel>,

    /// Comma-separated tests to run with RunSpecifiedTests
    #[arg(short = 'r', long = "runtests", value_delimiter = ',')]
    run_tests: Vec<String>,

    /// Ignore warnings during the deploy
    #[arg(short = 'g', long = "ignorewarnings")]
    ignore_warnings: bool,

    #[command(flatten)]
    org: OrgArgs,
}

#[derive(Args)]
struct ListArgs {
    /// Metadata type to be retrieved, such as CustomObject
    #[arg(short = 'm', long = "metadatatype")]
    metadata_type: String,

    /// Folder associated with the component, for folder-based types
    #[arg(long)]
    folder: Option<String>,

    /// Path to the file where results are stored
    #[arg(short = 'f', long = "resultfile")]
    result_file: Option<PathBuf>,

    /// API version to use
    #[arg(short = 'a', long = "apiversion")]
    api_version: Option<String>,

    #[command(flatten)]
    org: OrgArgs,
}

fn parse_test_level(raw: &str) -> std::result::Result<TestLevel, String> {
    raw.parse()
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Retrieve(args) => args.org.json,
            Commands::Deploy(args) => args.org.json,
            Commands::List(args) => args.org.json,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.command.json();

    let code = match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err, json);
            1
        }
    };
    std::process::exit(code);
}

async fn run(command: Commands) -> Result<i32> {
    let config = SourceConfig::from_env()?;
    debug!(?config, "loaded source config");
    match command {
        Commands::Retrieve(args) => retrieve(args, &config).await,
        Commands::Deploy(args) => deploy(args, &config).await,
        Commands::List(args) => list(args, &config).await,
    }
}

/// Flag, then `SF_TARGET_ORG`, then the `SF_*` credential variables.
async fn credentials(org: &OrgArgs, config: &SourceConfig) -> Result<SalesforceCredentials> {
    let target = org
        .target_username
        .clone()
        .or_else(|| config.target_org.clone());
    let creds = match target {
        Some(alias) => SalesforceCredentials::from_sfdx_alias(&alias).await,
        None => SalesforceCredentials::from_env().map_err(|e| match e.kind {
            AuthErrorKind::EnvVar(_) => AuthError::with_source(AuthErrorKind::NoTargetOrg, e),
            _ => e,
        }),
    };
    Ok(creds.map_err(busbar_sf_source::Error::from)?)
}

async fn source_context(org: &OrgArgs, config: &SourceConfig) -> Result<SourceContext> {
    let project = SfProject::resolve(&std::env::current_dir()?)?;
    let creds = credentials(org, config).await?;
    let transport = connect(&creds, &ClientConfig::default(), None)?;
    Ok(SourceContext::new(project, transport, creds.display_name()).with_config(config))
}

async fn retrieve(args: RetrieveArgs, config: &SourceConfig) -> Result<i32> {
    let command = RetrieveCommand {
        input: RetrieveInput {
            source_paths: args.source_paths,
            manifest: args.manifest,
            metadata: args.metadata,
            package_names: args.package_names,
        },
        wait: WaitBudget::from_minutes(args.wait)?,
        retrieve_target_dir: args.retrieve_target_dir,
    };
    // Flag errors are reported before the org or project is touched.
    resolve_retrieve_input(&command.input)?;

    let context = source_context(&args.org, config).await?;
    let outcome = commands::retrieve(&context, &command).await?;
    print_outcome(&outcome, args.org.json)
}

async fn deploy(args: DeployArgs, config: &SourceConfig) -> Result<i32> {
    let test_level = match (args.test_level, args.run_tests.is_empty()) {
        (None, false) => Some(TestLevel::RunSpecifiedTests),
        (level, _) => level,
    };
    let command = DeployCommand {
        input: DeployInput {
            source_paths: args.source_paths,
            manifest: args.manifest,
            metadata: args.metadata,
        },
        wait: WaitBudget::from_minutes(args.wait)?,
        options: DeployOptions {
            check_only: args.check_only,
            ignore_warnings: args.ignore_warnings,
            test_level,
            run_tests: args.run_tests,
            ..Default::default()
        },
    };
    resolve_deploy_input(&command.input)?;

    let context = source_context(&args.org, config).await?;
    let outcome = commands::deploy(&context, &command).await?;
    print_outcome(&outcome, args.org.json)
}

async fn list(args: ListArgs, config: &SourceConfig) -> Result<i32> {
    let creds = credentials(&args.org, config).await?;
    let transport = connect(&creds, &ClientConfig::default(), args.api_version.as_deref())?;
    let command = ListCommand {
        metadata_type: args.metadata_type,
        folder: args.folder,
        api_version: args.api_version,
        result_file: args.result_file,
    };

    let report = commands::list(transport, &command).await?;
    if args.org.json {
        let envelope = output::json_envelope(0, &report.records)?;
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if let Some(message) = report.result_file_message {
        println!("{}", message);
    } else {
        println!(
            "{}",
            output::render_list(&report.records, &command.metadata_type, creds.display_name())?
        );
    }
    Ok(0)
}

fn print_outcome(outcome: &CommandOutcome, json: bool) -> Result<i32> {
    let code = outcome.exit_code();
    if json {
        let envelope = output::json_envelope(code, &outcome.handle.result)?;
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        println!(
            "{}",
            output::render_outcome(outcome.classification, &outcome.handle)
        );
    }
    Ok(code)
}

fn report_error(err: &anyhow::Error, json: bool) {
    if !json {
        eprintln!("Error: {:#}", err);
        return;
    }
    let envelope = match err.downcast_ref::<busbar_sf_source::Error>() {
        Some(source_err) => output::error_envelope(source_err),
        None => serde_json::json!({
            "status": 1,
            "name": "Error",
            "message": format!("{:#}", err),
        }),
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(body) => println!("{}", body),
        Err(_) => eprintln!("Error: {:#}", err),
    }
}
