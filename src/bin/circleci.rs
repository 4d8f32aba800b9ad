//! CircleCI API CLI binary.
//!
//! A command-line interface for listing CircleCI builds and artifacts and
//! downloading artifacts.

use std::process::ExitCode;

use circleci_api::cli::{
    ArtifactArgs, ArtifactCommand, BuildCommand, Cli, Command, DownloadArgs, JobCommand,
};
use circleci_api::{
    download_artifact, find_build_with_artifacts, list_artifacts, list_recent_builds,
    render_json, render_table, search_builds, Artifact, ArtifactQuery, BuildRef, CircleClient,
    CircleError, TableRow,
};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Pass --token or set the CIRCLE_TOKEN environment variable");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(cli: &Cli) -> circleci_api::Result<CircleClient> {
    let token = cli
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CircleError::ConfigMissing("an API token is required".to_string()))?;

    CircleClient::new(token, &cli.api_url)
}

async fn run(client: &CircleClient, cli: Cli) -> circleci_api::Result<()> {
    let json = cli.json;

    match cli.command {
        Command::Job { command } => match command {
            JobCommand::List => {
                let builds = list_recent_builds(client).await?;
                output_list(&builds, json)
            }
            JobCommand::Search(args) => {
                let builds = search_builds(client, &args.to_query()).await?;
                output_list(&builds, json)
            }
        },
        Command::Build { command } => match command {
            BuildCommand::List(args) => {
                let query = args.to_query();
                eprintln!(
                    "Searching for builds {}/{}/{}",
                    query.username,
                    query.project,
                    query.job.as_deref().unwrap_or("*")
                );

                let builds: Vec<_> = search_builds(client, &query)
                    .await?
                    .into_iter()
                    .filter(|b| query.accepts(b))
                    .collect();
                output_list(&builds, json)
            }
        },
        Command::Artifact { command } => match command {
            ArtifactCommand::List(args) => {
                let artifacts = artifacts_for(client, &args).await?;
                output_list(&artifacts, json)
            }
            ArtifactCommand::Download(args) => handle_download(client, &args, json).await,
        },
    }
}

/// Resolve the build for an artifact command and list its artifacts.
async fn artifacts_for(
    client: &CircleClient,
    args: &ArtifactArgs,
) -> circleci_api::Result<Vec<Artifact>> {
    let build = match args.build {
        Some(build) => build,
        None => resolve_build(client, args).await?,
    };

    let query = ArtifactQuery::new(&args.project.username, &args.project.project, build);
    list_artifacts(client, &query).await
}

async fn resolve_build(
    client: &CircleClient,
    args: &ArtifactArgs,
) -> circleci_api::Result<BuildRef> {
    eprintln!(
        "Searching for builds {}/{}/{}",
        args.project.username, args.project.project, args.job
    );

    match find_build_with_artifacts(client, &args.to_search_query()).await? {
        Some(num) => {
            tracing::info!(build_num = num, "using build with artifacts");
            Ok(BuildRef::Number(num))
        }
        None => {
            tracing::warn!(job = %args.job, "no recent build with artifacts, using latest");
            Ok(BuildRef::Latest)
        }
    }
}

async fn handle_download(
    client: &CircleClient,
    args: &DownloadArgs,
    json: bool,
) -> circleci_api::Result<()> {
    let artifacts = artifacts_for(client, &args.artifact).await?;
    let directory = std::path::absolute(&args.directory)?;
    let mut written = Vec::with_capacity(artifacts.len());

    // One at a time; the first failure aborts the rest
    for artifact in &artifacts {
        eprintln!(
            "Downloading artifact at {}",
            artifact.destination(&directory)?.display()
        );
        written.push(download_artifact(client, artifact, &directory).await?);
    }

    if json {
        println!("{}", render_json(&written)?);
    } else {
        println!("Downloaded {} artifact(s) to {}", written.len(), directory.display());
    }
    Ok(())
}

fn output_list<T>(items: &[T], json: bool) -> circleci_api::Result<()>
where
    T: Serialize + TableRow,
{
    if json {
        println!("{}", render_json(items)?);
    } else {
        println!("{}", render_table(items));
    }
    Ok(())
}
