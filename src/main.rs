use anyhow::Result;
use bomkit::cli::{commands, AppContext, Cli, Commands};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    bomkit::logging::init(cli.global.verbose);

    let ctx = AppContext::load(&cli.global)?;
    tracing::debug!("設定: {:?}", ctx.config);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx),
        Commands::Part(cmd) => commands::part::run(cmd, &ctx),
        Commands::Import(args) => commands::import::run(args, &ctx),
        Commands::Bom(cmd) => commands::bom::run(cmd, &ctx),
        Commands::Backup => commands::backup::run(&ctx),
    }
}
