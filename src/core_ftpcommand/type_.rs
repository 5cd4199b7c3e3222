use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::core_transfer::TransferType;
use crate::session::Session;
use log::info;
use std::io;

/// Maps a TYPE argument onto a transfer type. `A N` and `L 8` are the long
/// spellings of ASCII and image.
pub fn parse_type_argument(arg: &str) -> Option<TransferType> {
    let normalized: Vec<String> = arg
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();
    let words: Vec<&str> = normalized.iter().map(String::as_str).collect();
    match words.as_slice() {
        ["A"] | ["A", "N"] => Some(TransferType::Ascii),
        ["I"] | ["L", "8"] => Some(TransferType::Binary),
        _ => None,
    }
}

/// Handles the TYPE FTP command.
pub async fn handle_type_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if arg.trim().is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    match parse_type_argument(arg) {
        Some(transfer_type) => {
            session.transfer_type = transfer_type;
            info!(
                "[{}] Transfer type set to {}",
                session.peer_addr,
                transfer_type.describe()
            );
            send_reply(writer, &format!("200 Type set to: {}.", transfer_type.describe())).await
        }
        None => send_reply(writer, &format!("504 Unsupported type \"{}\".", arg.trim())).await,
    }
}
