use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::info;
use std::io;

pub async fn handle_quit_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<Outcome, io::Error> {
    info!("[{}] Received QUIT command. Closing connection.", session.peer_addr);
    send_reply(writer, "221 Goodbye.").await?;
    Ok(Outcome::Close)
}
