use crate::core_ftpcommand::utils::{quote_path, resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the CWD FTP command.
///
/// Without an argument the client goes back to its home directory.
pub async fn handle_cwd_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let target = if arg.trim().is_empty() { "/" } else { arg };
    change_directory(writer, session, target).await
}

/// Moves the session into `target` once it is known to be a directory.
pub async fn change_directory(
    writer: &mut FtpStream,
    session: &mut Session,
    target: &str,
) -> Result<(), io::Error> {
    let resolved = match resolve_or_reply(writer, session, target).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) if stat.is_dir() => {
            info!(
                "[{}] {} changed directory to {}",
                session.peer_addr,
                session.username(),
                resolved.virtual_path
            );
            session.current_dir = resolved.virtual_path;
            let response = format!(
                "250 {} is the current directory.",
                quote_path(&session.current_dir)
            );
            send_reply(writer, &response).await
        }
        Ok(_) => send_reply(writer, "550 Not a directory.").await,
        Err(e) => {
            warn!(
                "[{}] CWD {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
