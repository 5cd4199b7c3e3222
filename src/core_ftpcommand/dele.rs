use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the DELE (Delete File) FTP command.
///
/// Directories are refused; RMD removes those.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `session` - The session of this connection.
/// * `arg` - The file name to delete, relative to the working directory.
pub async fn handle_dele_command(
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

    let result = match session.fs().stat(&resolved.real).await {
        Ok(stat) if stat.is_dir() => {
            return send_reply(writer, "550 Is a directory.").await;
        }
        Ok(_) => session.fs().remove(&resolved.real).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            info!(
                "[{}] {} deleted {}",
                session.peer_addr,
                session.username(),
                resolved.virtual_path
            );
            send_reply(writer, "250 File removed.").await
        }
        Err(e) => {
            warn!(
                "[{}] DELE {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
