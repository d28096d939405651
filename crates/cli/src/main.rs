// CLI modules
mod cli;
mod logging;
mod state;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Delete, Download, Init, Stat, Upload, Url};

command_enum! {
    (Init, Init),
    (Upload, Upload),
    (Download, Download),
    (Delete, Delete),
    (Stat, Stat),
    (Url, Url),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    logging::init_logging(args.log_level);

    let ctx = cli::op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
