use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = parsedir::cli::Cli::parse();
    parsedir::init(cli.verbosity());
    cli.run()
}
