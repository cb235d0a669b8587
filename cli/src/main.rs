use clap::Parser;
use pastillas_cli::FilterArgs;
use pastillas_cli::init_subscriber;
use pastillas_cli::run;

fn main() -> anyhow::Result<()> {
    let args = FilterArgs::parse();
    init_subscriber(args.verbose)?;
    run(&args)
}
