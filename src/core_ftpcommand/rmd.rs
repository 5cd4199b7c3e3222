use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the RMD (Remove Directory) FTP command.
///
/// The directory must be empty and the home directory itself can never be
/// removed.
pub async fn handle_rmd_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if arg.trim().is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    let resolved = match resolve_or_reply(writer, session, arg).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };
    if resolved.is_root() {
        return send_reply(writer, "550 Can't remove root directory.").await;
    }

    let result = match session.fs().stat(&resolved.real).await {
        Ok(stat) if !stat.is_dir() => {
            return send_reply(writer, "550 Not a directory.").await;
        }
        Ok(_) => session.fs().remove_dir(&resolved.real).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!(
                "[{}] {} removed directory {}",
                session.peer_addr,
                session.username(),
                resolved.virtual_path
            );
            send_reply(writer, "250 Directory removed.").await
        }
        Err(e) => {
            warn!(
                "[{}] RMD {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
