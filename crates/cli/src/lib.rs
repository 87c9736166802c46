pub mod commands;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use slotbot_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "slotbot",
    about = "Slotbot operator CLI",
    long_about = "Operate slot schedules: migrations, schedule generation, availability queries, and bookings.",
    after_help = "Examples:\n  slotbot migrate\n  slotbot schedule generate --specialist 1 --year 2026 --month 9 --days mon,wed,fri\n  slotbot booking reserve --specialist 1 --date 2026-09-07 --time 10:00 --duration 60 --client 42"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(subcommand, about = "Manage the specialist roster")]
    Specialist(SpecialistCommand),
    #[command(subcommand, about = "Manage a specialist's service catalog")]
    Service(ServiceCommand),
    #[command(subcommand, about = "Generate, clear, or adjust a specialist's schedule")]
    Schedule(ScheduleCommand),
    #[command(subcommand, about = "Query availability for clients and specialists")]
    Availability(AvailabilityCommand),
    #[command(subcommand, about = "Reserve, move, and cancel appointments")]
    Booking(BookingCommand),
}

#[derive(Debug, Subcommand)]
pub enum SpecialistCommand {
    #[command(about = "Register a specialist")]
    Add(AddSpecialistArgs),
    #[command(about = "List registered specialists")]
    List,
}

#[derive(Debug, Args)]
pub struct AddSpecialistArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub specialization: String,
    #[arg(long, default_value = "")]
    pub timezone: String,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    #[command(about = "Add a service to a specialist's catalog")]
    Add(AddServiceArgs),
    #[command(about = "List a specialist's services")]
    List(ListServicesArgs),
}

#[derive(Debug, Args)]
pub struct AddServiceArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub duration: u32,
    #[arg(long, default_value = "0", help = "Cost as a decimal, e.g. 25.00")]
    pub cost: String,
}

#[derive(Debug, Args)]
pub struct ListServicesArgs {
    #[arg(long)]
    pub specialist: i64,
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    #[command(about = "Clear and regenerate a month of slots from a weekly template")]
    Generate(GenerateArgs),
    #[command(about = "Remove every slot of a month")]
    Clear(ClearArgs),
    #[command(about = "Close every remaining slot on a date")]
    CloseDay(CloseDayArgs),
    #[command(about = "Replace listed dates with a custom working window")]
    Special(SpecialArgs),
    #[command(about = "Close a single free slot")]
    BlockSlot(SlotArgs),
    #[command(about = "Reopen a single closed slot")]
    UnblockSlot(SlotArgs),
}

#[derive(Debug, Args)]
pub struct SlotArgs {
    #[arg(long)]
    pub slot: i64,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub month: u32,
    #[arg(long, value_delimiter = ',', help = "Working weekday names, e.g. mon,wed,fri")]
    pub days: Vec<String>,
    #[arg(long, help = "Day start HH:MM; defaults to the configured value")]
    pub start: Option<String>,
    #[arg(long, help = "Day end HH:MM; defaults to the configured value")]
    pub end: Option<String>,
    #[arg(long, help = "Minutes of break after each slot")]
    pub break_minutes: Option<u32>,
    #[arg(long, help = "Cancel existing bookings in the month instead of refusing")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub month: u32,
    #[arg(long, help = "Cancel existing bookings in the month instead of refusing")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CloseDayArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub date: String,
}

#[derive(Debug, Args)]
pub struct SpecialArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long, value_delimiter = ',', help = "Dates to replace, e.g. 2026-09-07,2026-09-08")]
    pub dates: Vec<String>,
    #[arg(long)]
    pub start: String,
    #[arg(long)]
    pub end: String,
}

#[derive(Debug, Subcommand)]
pub enum AvailabilityCommand {
    #[command(about = "List dates in a month that can host a service")]
    Dates(DatesArgs),
    #[command(about = "List start times on a date where a service fits")]
    Times(TimesArgs),
    #[command(about = "Per-day schedule status for a month")]
    Overview(OverviewArgs),
}

#[derive(Debug, Args)]
pub struct DatesArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub month: u32,
    #[arg(long)]
    pub duration: u32,
}

#[derive(Debug, Args)]
pub struct TimesArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub duration: u32,
}

#[derive(Debug, Args)]
pub struct OverviewArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub month: u32,
}

#[derive(Debug, Subcommand)]
pub enum BookingCommand {
    #[command(about = "Book the window starting at a time on a date")]
    Reserve(ReserveArgs),
    #[command(about = "Cancel the appointment anchored at a slot id")]
    Cancel(CancelArgs),
    #[command(about = "Move an appointment to a new date and time")]
    Move(MoveArgs),
    #[command(about = "List a client's appointments")]
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ReserveArgs {
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub duration: u32,
    #[arg(long)]
    pub client: i64,
}

#[derive(Debug, Args)]
pub struct CancelArgs {
    #[arg(long, help = "First slot id of the appointment")]
    pub slot: i64,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    #[arg(long, help = "First slot id of the appointment being moved")]
    pub slot: i64,
    #[arg(long)]
    pub specialist: i64,
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub time: String,
    #[arg(long)]
    pub duration: u32,
    #[arg(long)]
    pub client: i64,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub client: i64,
}

fn init_logging() {
    let Ok(config) = AppConfig::load(LoadOptions::default()) else {
        return;
    };

    let log_level =
        config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Specialist(SpecialistCommand::Add(args)) => commands::specialist::add(args),
        Command::Specialist(SpecialistCommand::List) => commands::specialist::list(),
        Command::Service(ServiceCommand::Add(args)) => commands::service::add(args),
        Command::Service(ServiceCommand::List(args)) => commands::service::list(args),
        Command::Schedule(ScheduleCommand::Generate(args)) => commands::schedule::generate(args),
        Command::Schedule(ScheduleCommand::Clear(args)) => commands::schedule::clear(args),
        Command::Schedule(ScheduleCommand::CloseDay(args)) => commands::schedule::close_day(args),
        Command::Schedule(ScheduleCommand::Special(args)) => commands::schedule::special(args),
        Command::Schedule(ScheduleCommand::BlockSlot(args)) => {
            commands::schedule::block_slot(args)
        }
        Command::Schedule(ScheduleCommand::UnblockSlot(args)) => {
            commands::schedule::unblock_slot(args)
        }
        Command::Availability(AvailabilityCommand::Dates(args)) => {
            commands::availability::dates(args)
        }
        Command::Availability(AvailabilityCommand::Times(args)) => {
            commands::availability::times(args)
        }
        Command::Availability(AvailabilityCommand::Overview(args)) => {
            commands::availability::overview(args)
        }
        Command::Booking(BookingCommand::Reserve(args)) => commands::booking::reserve(args),
        Command::Booking(BookingCommand::Cancel(args)) => commands::booking::cancel(args),
        Command::Booking(BookingCommand::Move(args)) => commands::booking::move_appointment(args),
        Command::Booking(BookingCommand::List(args)) => commands::booking::list(args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::Cli;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
