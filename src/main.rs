use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use fixtureftpd::core_auth::helper::hash_password;
use fixtureftpd::core_cli::Cli;
use fixtureftpd::server;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = &args.hash_password {
        println!("{}", hash_password(password).context("Failed to hash password")?);
        return Ok(());
    }

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let config = args
        .load_config()
        .context("Failed to load configuration")?;

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
