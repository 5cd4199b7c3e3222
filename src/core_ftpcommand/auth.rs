use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::core_tls::TlsError;
use crate::session::Session;
use log::info;
use std::io;

/// Handles the AUTH FTP command (RFC 4217).
///
/// The 234 reply goes out in plaintext; the connection loop then runs the
/// handshake before reading the next command.
pub async fn handle_auth_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    if session.ctx.tls.is_none() {
        send_reply(writer, &TlsError::TlsNotConfigured.to_ftp_response()).await?;
        return Ok(Outcome::Continue);
    }
    if session.control_secure {
        send_reply(writer, "503 Already using TLS.").await?;
        return Ok(Outcome::Continue);
    }

    let mechanism = arg.trim().to_ascii_uppercase();
    match mechanism.as_str() {
        "TLS" | "TLS-C" | "SSL" | "TLS-P" => {
            info!("[{}] AUTH {} accepted, upgrading control channel", session.peer_addr, mechanism);
            send_reply(writer, &format!("234 AUTH {} successful.", mechanism)).await?;
            Ok(Outcome::UpgradeControl)
        }
        _ => {
            send_reply(writer, "504 Unrecognized AUTH type.").await?;
            Ok(Outcome::Continue)
        }
    }
}

/// Handles the PBSZ FTP command. TLS needs no buffer, so any size is
/// answered with `PBSZ=0`.
pub async fn handle_pbsz_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if !session.control_secure {
        return send_reply(writer, "503 PBSZ not allowed on insecure control connection.").await;
    }
    if arg.trim().parse::<u64>().is_err() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }
    session.pbsz_set = true;
    send_reply(writer, "200 PBSZ=0 successful.").await
}

/// Handles the PROT FTP command: `C` for clear, `P` for private data
/// connections.
pub async fn handle_prot_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if !session.control_secure {
        return send_reply(writer, "503 PROT not allowed on insecure control connection.").await;
    }
    if !session.pbsz_set {
        return send_reply(writer, "503 You must issue the PBSZ command prior to PROT.").await;
    }

    match arg.trim().to_ascii_uppercase().as_str() {
        "C" if session.ctx.config.tls.data_required => {
            send_reply(writer, "534 Unprotected data channel not allowed.").await
        }
        "C" => {
            session.data_protected = false;
            send_reply(writer, "200 Protection set to Clear").await
        }
        "P" => {
            session.data_protected = true;
            info!("[{}] Data channel protection enabled", session.peer_addr);
            send_reply(writer, "200 Protection set to Private").await
        }
        level @ ("S" | "E") => {
            send_reply(writer, &format!("521 PROT {} unsupported (use C or P).", level)).await
        }
        _ => send_reply(writer, "502 Unrecognized PROT type (use C or P).").await,
    }
}
