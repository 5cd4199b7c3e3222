use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::core_transfer::TransferType;
use crate::session::Session;
use std::io;

/// Handles the SIZE FTP command.
///
/// Refused in ASCII mode, where the on-the-wire size differs from the size
/// on disk.
pub async fn handle_size_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if arg.trim().is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    if session.transfer_type == TransferType::Ascii {
        return send_reply(writer, "550 SIZE not allowed in ASCII mode.").await;
    }
    let resolved = match resolve_or_reply(writer, session, arg).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) if stat.is_file() => send_reply(writer, &format!("213 {}", stat.size)).await,
        _ => {
            let response = format!("550 {} is not retrievable.", resolved.virtual_path);
            send_reply(writer, &response).await
        }
    }
}
