mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser as _;
use f1_admin_app::{
    assign_participation, AssignmentError, Calendar, Dashboard, DashboardError, DriverRoster,
    NotificationCenter, ParticipationStore, WorkflowError,
};
use f1_admin_client::{ApiError, HttpBackend};
use f1_admin_config::{Config, ConfigError};
use f1_admin_model::{DriverId, GrandPrixId};
use f1_admin_telemetry::setup_telemetry;
use tracing::debug;

use crate::commands::{Cli, Command, DriversCommand, GrandPrixCommand, ParticipationsCommand};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{}", .0.user_message())]
    Workflow(#[from] WorkflowError),
    #[error("{0}")]
    Dashboard(#[from] DashboardError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_telemetry();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = f1_admin_config::get_config()?;
    if let Some(api_base_url) = cli.api_base_url {
        config.api_base_url = api_base_url;
    }
    debug!(?config, "loaded config");
    let backend = HttpBackend::from_config(&config)?;

    match cli.command {
        Command::Dashboard => {
            let dashboard = Dashboard::load(&backend).await?;
            print!("{}", render::dashboard(&dashboard));
        }
        Command::Drivers { command } => drivers(&backend, command).await?,
        Command::GrandPrix { command } => {
            let mut calendar = Calendar::load(&backend).await?;
            match command {
                GrandPrixCommand::List => print!("{}", render::grand_prix(calendar.events())),
                GrandPrixCommand::Add(args) => {
                    let created = calendar.create(&args.into()).await?;
                    println!("created Grand Prix {} ({})", created.name, created.id);
                }
            }
        }
        Command::Participations {
            command: ParticipationsCommand::List,
        } => {
            let store = ParticipationStore::open(backend).await;
            let state = store.snapshot();
            print!("{}", render::participations(&state));
            if let Some(error) = state.error {
                eprintln!("error: {error}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Assign { driver, grand_prix } => {
            return Ok(assign(backend, &config, driver, grand_prix).await);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn drivers(backend: &HttpBackend, command: DriversCommand) -> Result<(), CliError> {
    let mut roster = DriverRoster::load(backend).await?;
    match command {
        DriversCommand::List => print!("{}", render::drivers(roster.drivers())),
        DriversCommand::Show { id } => {
            let details = roster.details(DriverId(id)).await?;
            print!("{}", render::driver_details(&details));
        }
        DriversCommand::Add(args) => {
            let created = roster.create(&args.into()).await?;
            println!("created driver {} ({})", created.full_name(), created.id);
        }
        DriversCommand::Edit { id, driver } => {
            roster.update(DriverId(id), &driver.into()).await?;
            println!("updated driver {id}");
        }
        DriversCommand::Delete { id } => {
            roster.delete(DriverId(id)).await?;
            println!("deleted driver {id}");
        }
    }
    Ok(())
}

async fn assign(
    backend: HttpBackend,
    config: &Config,
    driver: Option<i64>,
    grand_prix: Option<i64>,
) -> ExitCode {
    let store = ParticipationStore::open(backend).await;
    let mut notifications = NotificationCenter::from_config(config);
    let result = assign_participation(
        &store,
        &mut notifications,
        driver.map(DriverId),
        grand_prix.map(GrandPrixId),
    )
    .await;
    for notification in notifications.drain() {
        println!("{notification}");
    }
    match result {
        // an existing assignment is not an error for the caller
        Ok(_) | Err(AssignmentError::Conflict) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
