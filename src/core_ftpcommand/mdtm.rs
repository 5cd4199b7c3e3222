use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::core_transfer::listing::format_mdtm;
use crate::session::Session;
use std::io;

/// Handles the MDTM (Modification Time) FTP command.
pub async fn handle_mdtm_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if arg.trim().is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    let resolved = match resolve_or_reply(writer, session, arg).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) => match stat.modified {
            Some(modified) if stat.is_file() => {
                send_reply(writer, &format!("213 {}", format_mdtm(modified))).await
            }
            _ => {
                let response = format!("550 {} is not retrievable.", resolved.virtual_path);
                send_reply(writer, &response).await
            }
        },
        Err(e) => send_reply(writer, &e.to_ftp_response()).await,
    }
}
