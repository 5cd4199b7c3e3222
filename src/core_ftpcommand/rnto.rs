use crate::core_ftpcommand::error::ProtocolError;
use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the RNTO (Rename To) FTP command.
///
/// The pending source is consumed whether or not the rename succeeds.
pub async fn handle_rnto_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let source = match session.rename_from.take() {
        Some(source) => source,
        None => {
            let error = ProtocolError::BadSequence("use RNFR first".to_string());
            return send_reply(writer, &error.to_ftp_response()).await;
        }
    };
    if arg.trim().is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    let target = match resolve_or_reply(writer, session, arg).await? {
        Some(target) => target,
        None => return Ok(()),
    };
    if target.is_root() {
        return send_reply(writer, "550 Can't overwrite home directory.").await;
    }

    match session.fs().rename(&source.real, &target.real).await {
        Ok(()) => {
            info!(
                "[{}] {} renamed {} to {}",
                session.peer_addr,
                session.username(),
                source.virtual_path,
                target.virtual_path
            );
            send_reply(writer, "250 Renaming ok.").await
        }
        Err(e) => {
            warn!(
                "[{}] RNTO {} -> {} failed: {}",
                session.peer_addr, source.virtual_path, target.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
