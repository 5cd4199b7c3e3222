use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_mode_command(
    writer: &mut FtpStream,
    _session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    match arg.trim().to_ascii_uppercase().as_str() {
        "S" => send_reply(writer, "200 Transfer mode set to: S").await,
        "B" | "C" => send_reply(writer, "504 Unimplemented MODE type.").await,
        _ => send_reply(writer, "501 Unrecognized MODE type.").await,
    }
}
