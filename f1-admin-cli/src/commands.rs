use clap::{Args, Parser, Subcommand};
use f1_admin_model::{DriverForm, GrandPrixForm};

#[derive(Parser, Debug)]
#[command(name = "f1-admin")]
#[command(about = "Manage Formula 1 drivers, Grand Prix events and race participations")]
#[command(version)]
pub struct Cli {
    /// Overrides `api_base_url` from f1-admin.toml and F1_ADMIN_API_BASE_URL.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Counts, drivers per team and the latest participations.
    Dashboard,
    Drivers {
        #[command(subcommand)]
        command: DriversCommand,
    },
    GrandPrix {
        #[command(subcommand)]
        command: GrandPrixCommand,
    },
    Participations {
        #[command(subcommand)]
        command: ParticipationsCommand,
    },
    /// Assigns a driver to a Grand Prix.
    Assign {
        #[arg(long)]
        driver: Option<i64>,
        #[arg(long)]
        grand_prix: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DriversCommand {
    List,
    Show {
        id: i64,
    },
    Add(DriverArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        driver: DriverArgs,
    },
    Delete {
        id: i64,
    },
}

/// Free form input, validated like the driver form.
#[derive(Args, Debug)]
pub struct DriverArgs {
    #[arg(long, default_value = "")]
    pub number: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub acronym: String,
    #[arg(long, default_value = "")]
    pub team: String,
}

impl From<DriverArgs> for DriverForm {
    fn from(args: DriverArgs) -> Self {
        Self {
            driver_number: args.number,
            first_name: args.first_name,
            last_name: args.last_name,
            acronym: args.acronym,
            team_name: args.team,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GrandPrixCommand {
    List,
    Add(GrandPrixArgs),
}

#[derive(Args, Debug)]
pub struct GrandPrixArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long)]
    pub laps: Option<i32>,
    /// Circuit length in kilometres.
    #[arg(long)]
    pub length: Option<f64>,
}

impl From<GrandPrixArgs> for GrandPrixForm {
    fn from(args: GrandPrixArgs) -> Self {
        Self {
            name: args.name,
            location: args.location,
            laps: args.laps,
            length: args.length,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ParticipationsCommand {
    List,
}
