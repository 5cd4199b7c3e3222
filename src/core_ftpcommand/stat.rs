use crate::core_ftpcommand::utils::{resolve_or_reply, send_multiline, send_reply};
use crate::core_network::data_channel::TransferMode;
use crate::core_network::stream::FtpStream;
use crate::core_transfer::listing::format_long_line;
use crate::core_transfer::transfer::collect_entries;
use crate::session::{Session, SessionState};
use chrono::Local;
use std::io;

/// Handles the STAT FTP command.
///
/// Without an argument it describes the session; with a path it lists that
/// path over the control connection, like LIST does over a data connection.
pub async fn handle_stat_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let arg = arg.trim();
    if arg.is_empty() {
        let lines = status_lines(session);
        return send_multiline(writer, 211, "FTP server status:", &lines, "End of status.").await;
    }

    let resolved = match resolve_or_reply(writer, session, arg).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };
    let entries = match collect_entries(&resolved.real, session.fs()).await {
        Ok(entries) => entries,
        Err(e) => return send_reply(writer, &e.to_ftp_response()).await,
    };

    let now = Local::now();
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| format_long_line(entry, &now))
        .collect();
    send_multiline(
        writer,
        213,
        &format!("Status of \"{}\":", resolved.virtual_path),
        &lines,
        "End of status.",
    )
    .await
}

fn status_lines(session: &Session) -> Vec<String> {
    let local = session.local_addr;
    let mut lines = vec![format!("Connected to: {}:{}", local.ip(), local.port())];
    lines.push(match &session.state {
        SessionState::Authenticated(user) => format!("Logged in as: {}", user.username),
        SessionState::AwaitingPassword { .. } => "Waiting for password.".to_string(),
        SessionState::Unauthenticated => "Waiting for username.".to_string(),
    });
    lines.push(format!(
        "TYPE: {}; STRUcture: File; MODE: Stream",
        session.transfer_type.describe()
    ));
    lines.push(match session.transfer_mode() {
        Some(TransferMode::Passive) => "Data connection: passive listener ready.".to_string(),
        Some(TransferMode::Active) => "Data connection: active address set.".to_string(),
        None => "Data connection closed.".to_string(),
    });
    lines
}
