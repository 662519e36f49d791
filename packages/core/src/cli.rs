use clap::Parser;

/// Line item monitor CLI.
///
/// Takes no behavioural flags: every setting comes from the environment
/// (or a `.env` file) so the binary can run unattended from a scheduler.
#[derive(Debug, Parser)]
#[command(
    name = "line-item-monitor",
    version,
    about = "Pauses Ad Manager line items that reach their impression threshold and emails a status update"
)]
pub struct Cli {}
