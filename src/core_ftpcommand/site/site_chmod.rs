use crate::core_ftpcommand::utils::{resolve_or_reply, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Parses an octal mode such as `755` or `0644`.
pub fn parse_mode(mode: &str) -> Option<u32> {
    if mode.is_empty() || mode.len() > 4 {
        return None;
    }
    u32::from_str_radix(mode, 8).ok()
}

/// Handles `SITE CHMOD <mode> <path>`.
pub async fn handle_site_chmod_command(
    writer: &mut FtpStream,
    session: &mut Session,
    args: &str,
) -> Result<(), io::Error> {
    let (mode_str, path) = match args.split_once(' ') {
        Some((mode, path)) if !path.trim().is_empty() => (mode, path.trim_start()),
        _ => {
            warn!("Insufficient arguments for SITE CHMOD command");
            return send_reply(writer, "501 Usage: SITE CHMOD <mode> <path>").await;
        }
    };
    let mode = match parse_mode(mode_str) {
        Some(mode) => mode,
        None => {
            warn!("Invalid mode format: {}", mode_str);
            return send_reply(writer, "501 Invalid SITE CHMOD format.").await;
        }
    };
    let resolved = match resolve_or_reply(writer, session, path).await? {
        Some(resolved) => resolved,
        None => return Ok(()),
    };

    match session.fs().set_mode(&resolved.real, mode).await {
        Ok(()) => {
            info!(
                "[{}] {} changed mode of {} to {:o}",
                session.peer_addr,
                session.username(),
                resolved.virtual_path,
                mode
            );
            send_reply(writer, "200 SITE CHMOD successful.").await
        }
        Err(e) => {
            warn!(
                "[{}] SITE CHMOD {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}
