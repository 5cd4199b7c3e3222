use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::info;
use std::io;

/// Handles the REIN (Reinitialize) FTP command.
///
/// Logs the user out and forgets the transfer parameters. A TLS control
/// channel stays protected.
pub async fn handle_rein_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    info!("[{}] Session reinitialized for {}", session.peer_addr, session.username());
    session.reinitialize();
    send_reply(writer, "230 Ready for new user.").await
}
