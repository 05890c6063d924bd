use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = pasctl::Cli::parse();
    if let Err(err) = pasctl::run(cli) {
        eprintln!("erreur: {err}");
        std::process::exit(1);
    }
}
