use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::debug;
use std::io;

/// Handles the ABOR FTP command.
///
/// ABOR during a transfer is caught by the transfer itself; here it can only
/// drop a data channel that was negotiated but never used.
pub async fn handle_abor_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    if session.data_channel.take().is_some() {
        debug!("[{}] Pending data channel discarded", session.peer_addr);
        return send_reply(writer, "225 ABOR command successful; data channel closed.").await;
    }
    send_reply(writer, "225 No transfer to abort.").await
}
