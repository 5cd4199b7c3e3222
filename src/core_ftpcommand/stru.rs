use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_stru_command(
    writer: &mut FtpStream,
    _session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    match arg.trim().to_ascii_uppercase().as_str() {
        "F" => send_reply(writer, "200 File transfer structure set to: F.").await,
        "P" | "R" => send_reply(writer, "504 Unimplemented STRU type.").await,
        _ => send_reply(writer, "501 Unrecognized STRU type.").await,
    }
}
