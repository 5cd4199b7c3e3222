use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_noop_command(
    writer: &mut FtpStream,
    _session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    send_reply(writer, "200 I successfully did nothing'.").await
}
