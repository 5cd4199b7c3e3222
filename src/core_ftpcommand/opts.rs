use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

/// Handles the OPTS FTP command. Only `UTF8 ON` is understood, and paths
/// are always treated as UTF-8 anyway.
pub async fn handle_opts_command(
    writer: &mut FtpStream,
    _session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let mut words = arg.split_whitespace();
    let option = words.next().map(str::to_ascii_uppercase);
    let value = words.next().map(str::to_ascii_uppercase);

    match (option.as_deref(), value.as_deref()) {
        (Some("UTF8"), Some("ON")) | (Some("UTF8"), None) => send_reply(writer, "200 OK").await,
        (Some("UTF8"), Some(_)) => send_reply(writer, "501 Invalid argument.").await,
        (Some(_), _) => send_reply(writer, "501 Invalid command.").await,
        (None, _) => send_reply(writer, "501 Syntax error in parameters or arguments.").await,
    }
}
