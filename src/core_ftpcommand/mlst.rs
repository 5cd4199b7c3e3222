use crate::core_ftpcommand::utils::{resolve_or_reply, send_multiline, send_reply};
use crate::core_network::stream::FtpStream;
use crate::core_transfer::listing::format_facts;
use crate::session::Session;
use std::io;

/// Handles the MLST FTP command: the facts of one path, sent over the
/// control connection.
pub async fn handle_mlst_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let resolved = match resolve_or_reply(writer, session, arg.trim()).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };
    let stat = match session.fs().stat(&resolved.real).await {
        Ok(stat) => stat,
        Err(e) => return send_reply(writer, &e.to_ftp_response()).await,
    };

    let permissions = match session.user() {
        Some(user) => user.permissions,
        None => return send_reply(writer, "530 Log in with USER and PASS first.").await,
    };
    let facts = format_facts(&resolved.virtual_path, &stat, permissions);
    send_multiline(
        writer,
        250,
        &format!("Listing \"{}\":", resolved.virtual_path),
        &[facts],
        "End MLST.",
    )
    .await
}
