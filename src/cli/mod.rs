pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::portal::Portal;
use crate::resources::MemberScope;
use crate::types::Direction;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "GBS Portal CLI - referrals, TYFCB slips and one-to-one meetings from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in with mobile number and OTP")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Referral slips given and received")]
    Referrals {
        #[command(subcommand)]
        cmd: commands::referrals::ReferralCommands,
    },

    #[command(about = "Thank-you-for-closed-business slips")]
    Tyfcb {
        #[command(subcommand)]
        cmd: commands::tyfcb::TyfcbCommands,
    },

    #[command(about = "One-to-one meetings")]
    Meetings {
        #[command(subcommand)]
        cmd: commands::meetings::MeetingCommands,
    },

    #[command(about = "Chapter member directory")]
    Members {
        #[command(subcommand)]
        cmd: commands::members::MemberCommands,
    },

    #[command(about = "Counts, upcoming event, notifications and testimonials")]
    Dashboard {
        #[command(subcommand)]
        cmd: commands::dashboard::DashboardCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum DirectionArg {
    #[default]
    Given,
    Received,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Given => Direction::Given,
            DirectionArg::Received => Direction::Received,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ScopeArg {
    #[default]
    Inside,
    Outside,
}

impl From<ScopeArg> for MemberScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Inside => MemberScope::Inside,
            ScopeArg::Outside => MemberScope::Outside,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let portal = Portal::connect(crate::config::config().clone())?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &portal, output_format).await,
        Commands::Referrals { cmd } => commands::referrals::handle(cmd, &portal, output_format).await,
        Commands::Tyfcb { cmd } => commands::tyfcb::handle(cmd, &portal, output_format).await,
        Commands::Meetings { cmd } => commands::meetings::handle(cmd, &portal, output_format).await,
        Commands::Members { cmd } => commands::members::handle(cmd, &portal, output_format).await,
        Commands::Dashboard { cmd } => commands::dashboard::handle(cmd, &portal, output_format).await,
    }
}
