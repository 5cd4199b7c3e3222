use crate::core_ftpcommand::site::site_chmod::handle_site_chmod_command;
use crate::core_ftpcommand::site::site_help::handle_site_help_command;
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Splits `SITE <subcommand> <rest>` and runs the subcommand.
pub async fn handle_site_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let arg = arg.trim();
    if arg.is_empty() {
        warn!("No subcommand provided for SITE command.");
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }

    let (subcommand, rest) = match arg.split_once(' ') {
        Some((subcommand, rest)) => (subcommand, rest.trim_start()),
        None => (arg, ""),
    };
    let subcommand = subcommand.to_ascii_uppercase();

    match subcommand.as_str() {
        "CHMOD" => {
            info!("Handling SITE CHMOD command with args: {}", rest);
            handle_site_chmod_command(writer, session, rest).await
        }
        "HELP" => handle_site_help_command(writer, session, rest).await,
        _ => {
            warn!("Unknown SITE subcommand: {}", subcommand);
            send_reply(writer, &format!("500 Command \"SITE {}\" not understood.", subcommand))
                .await
        }
    }
}
