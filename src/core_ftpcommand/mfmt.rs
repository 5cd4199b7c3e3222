use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::core_transfer::listing::format_mdtm;
use crate::session::Session;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::io;
use std::time::SystemTime;

const INVALID_TIME: &str = "550 Invalid time format; expected: YYYYMMDDHHMMSS.";

/// Parses an MFMT/MDTM timestamp, read as UTC.
pub fn parse_timeval(timeval: &str) -> Option<SystemTime> {
    if timeval.len() != "YYYYMMDDHHMMSS".len() {
        return None;
    }
    NaiveDateTime::parse_from_str(timeval, "%Y%m%d%H%M%S")
        .ok()
        .map(|datetime| datetime.and_utc().into())
}

/// Handles the MFMT (Modify Fact: Modification Time) FTP command.
///
/// `MFMT <timeval> <path>` sets a file's modification time and echoes the
/// time now on record.
pub async fn handle_mfmt_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let (timeval, path) = match arg.trim_start().split_once(' ') {
        Some((timeval, path)) if !path.trim().is_empty() => (timeval, path),
        _ => return send_reply(writer, "501 Syntax error in parameters or arguments.").await,
    };
    let time = match parse_timeval(timeval) {
        Some(time) => time,
        None => return send_reply(writer, INVALID_TIME).await,
    };
    let resolved = match resolve_or_reply(writer, session, path).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) if stat.is_file() => {}
        _ => {
            let response = format!("550 {} is not retrievable.", resolved.virtual_path);
            return send_reply(writer, &response).await;
        }
    }

    if let Err(e) = session.fs().set_modified(&resolved.real, time).await {
        warn!(
            "[{}] MFMT {} failed: {}",
            session.peer_addr, resolved.virtual_path, e
        );
        return send_reply(writer, &e.to_ftp_response()).await;
    }
    let modified = match session.fs().stat(&resolved.real).await {
        Ok(stat) => stat.modified.unwrap_or(time),
        Err(_) => time,
    };
    info!(
        "[{}] Modification time of {} set to {}",
        session.peer_addr, resolved.virtual_path, timeval
    );
    let response = format!(
        "213 Modify={}; {}.",
        format_mdtm(modified),
        resolved.virtual_path
    );
    send_reply(writer, &response).await
}
