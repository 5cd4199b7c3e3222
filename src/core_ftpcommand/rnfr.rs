use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{debug, warn};
use std::io;

/// Handles the RNFR (Rename From) FTP command.
///
/// The source must exist; it is remembered until the very next command,
/// which has to be RNTO.
pub async fn handle_rnfr_command(
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
        return send_reply(writer, "550 Can't rename home directory.").await;
    }

    if let Err(e) = session.fs().stat(&resolved.real).await {
        warn!(
            "[{}] RNFR {} failed: {}",
            session.peer_addr, resolved.virtual_path, e
        );
        return send_reply(writer, &e.to_ftp_response()).await;
    }

    debug!("[{}] Rename source set to {}", session.peer_addr, resolved.virtual_path);
    session.rename_from = Some(resolved);
    send_reply(writer, "350 Ready for destination name.").await
}
