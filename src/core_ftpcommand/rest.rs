use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::core_transfer::TransferType;
use crate::session::Session;
use log::debug;
use std::io;

/// Handles the REST (Restart) FTP command.
///
/// The offset is kept for the next RETR or STOR only. Resuming is refused in
/// ASCII mode, where offsets on the wire and on disk differ.
pub async fn handle_rest_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if session.transfer_type == TransferType::Ascii {
        return send_reply(writer, "501 Resuming transfers not allowed in ASCII mode.").await;
    }
    match arg.trim().parse::<u64>() {
        Ok(offset) => {
            debug!("[{}] Restart marker set to {}", session.peer_addr, offset);
            session.restart_offset = offset;
            send_reply(writer, &format!("350 Restarting at position {}.", offset)).await
        }
        Err(_) => send_reply(writer, "501 Invalid parameter.").await,
    }
}
