use clap::Parser;
use offline_proxy::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Origin(args) => cli::origin::run(args).await,
        Command::Generations(args) => cli::generations::run(args).await,
    }
}
