use crate::core_ftpcommand::utils::{quote_path, resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the MKD (Make Directory) FTP command.
///
/// Only the last path segment is created; a missing parent is a 550.
pub async fn handle_mkd_command(
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
        return send_reply(writer, "550 File exists.").await;
    }

    match session.fs().make_dir(&resolved.real).await {
        Ok(()) => {
            info!(
                "[{}] {} created directory {}",
                session.peer_addr,
                session.username(),
                resolved.virtual_path
            );
            let response = format!(
                "257 {} directory created.",
                quote_path(&resolved.virtual_path)
            );
            send_reply(writer, &response).await
        }
        Err(e) => {
            warn!(
                "[{}] MKD {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
