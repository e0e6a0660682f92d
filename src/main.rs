use clap::Parser;

use profit_first::cli::{Cli, run};

#[tokio::main]
async fn main() {
    profit_first::init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
