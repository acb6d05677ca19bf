use clap::{Parser, Subcommand};

mod connect;
mod document;
mod export;
mod inspect;
mod layout;
mod place;
mod symbol;
mod ui;

#[derive(Parser)]
#[command(name = "schemix")]
#[command(about = "Block schematic editing and structural VHDL export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the ports of a symbol
    #[command(alias = "i")]
    Inspect(inspect::InspectArgs),

    /// Write a block symbol file
    Symbol(symbol::SymbolArgs),

    /// Place a symbol instance
    #[command(alias = "p")]
    Place(place::PlaceArgs),

    /// Place inline glue logic
    Glue(place::GlueArgs),

    /// Move an instance
    Move(place::MoveArgs),

    /// Remove an instance or wire
    #[command(alias = "rm")]
    Remove(place::RemoveArgs),

    /// Wire two ports together
    #[command(alias = "c")]
    Connect(connect::ConnectArgs),

    /// List legal connection targets for a port
    Candidates(connect::CandidatesArgs),

    /// Export a port to a top-level pin
    Pin(connect::PinArgs),

    /// Wire ports with matching names and widths
    #[command(name = "autoconnect")]
    AutoConnect(connect::AutoConnectArgs),

    /// Arrange instances and route wires
    #[command(alias = "l")]
    Layout(layout::LayoutArgs),

    /// Export structural VHDL
    #[command(alias = "e")]
    Export(export::ExportArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Symbol(args) => symbol::execute(args),
        Commands::Place(args) => place::execute(args),
        Commands::Glue(args) => place::execute_glue(args),
        Commands::Move(args) => place::execute_move(args),
        Commands::Remove(args) => place::execute_remove(args),
        Commands::Connect(args) => connect::execute(args),
        Commands::Candidates(args) => connect::execute_candidates(args),
        Commands::Pin(args) => connect::execute_pin(args),
        Commands::AutoConnect(args) => connect::execute_auto(args),
        Commands::Layout(args) => layout::execute(args),
        Commands::Export(args) => export::execute(args),
    }
}
