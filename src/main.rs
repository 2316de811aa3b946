use anyhow::Result;
use clap::Parser;

use iniedit::cli::{self, CliArgs};
use iniedit::config::ToolConfig;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = ToolConfig::load();
    iniedit::tracing::init(config.file_logging);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::execute(&args, &config, &mut out)
}
