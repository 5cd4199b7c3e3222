use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::info;
use std::io;

/// Handles the SYST (System) FTP command.
///
/// Clients use the answer to decide how to parse LIST output, which is
/// always `ls -l` style here.
pub async fn handle_syst_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    info!("[{}] Responding to SYST command with system type.", session.peer_addr);
    send_reply(writer, "215 UNIX Type: L8").await
}
