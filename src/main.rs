use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use tfdiagram::cli::Cli;
use tfdiagram::{config, get_provider, output};

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let args = cli.command.args();

    let provider = get_provider(cli.command.provider())?;
    let mut profile = provider.profile();

    let app_config = config::load_config(args.config.as_deref())?;
    if let Some(overrides) = app_config.for_provider(provider.name()) {
        overrides.apply(&mut profile);
    }
    if let Some(unknown) = args.unknown {
        profile.classification.unknown = unknown;
    }

    let output_name = args.output.as_deref().unwrap_or(&profile.default_output);
    let (graph, path) = tfdiagram::generate(&profile, &args.state, output_name, args.format)?;

    if args.summary {
        println!("{}", output::node_table(&graph));
        println!("{}", output::containment_tree(&graph, &profile.style.title));
    }

    println!(
        "Infrastructure diagram generated successfully! Saved as {}",
        path.display()
    );

    Ok(())
}
