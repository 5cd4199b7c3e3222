use crate::core_fs::PathError;
use crate::core_ftpcommand::ftpcommand::{CommandLine, FtpCommand};
use crate::core_ftpcommand::handlers::Outcome;
use crate::core_network::network::{continue_command_line, LineRead};
use crate::core_network::stream::{ControlStream, FtpStream};
use crate::core_tls::{maybe_upgrade, ChannelRole};
use crate::core_transfer::{execute_transfer_tracked, TransferRequest};
use crate::session::{ResolvedPath, Session};
use log::{debug, error, info, warn};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// Writes raw bytes to the control connection.
pub async fn send_response(writer: &mut FtpStream, response: &[u8]) -> Result<(), io::Error> {
    writer.write_all(response).await?;
    writer.flush().await?;
    debug!("Sent response: {}", String::from_utf8_lossy(response).trim_end());
    Ok(())
}

/// Sends a single-line reply, appending the CRLF terminator.
pub async fn send_reply(writer: &mut FtpStream, reply: &str) -> Result<(), io::Error> {
    send_response(writer, format!("{}\r\n", reply).as_bytes()).await
}

/// Sends a multi-line reply: `code-first`, the body lines indented by one
/// space, then `code last`.
pub async fn send_multiline(
    writer: &mut FtpStream,
    code: u16,
    first: &str,
    lines: &[String],
    last: &str,
) -> Result<(), io::Error> {
    let mut reply = format!("{}-{}\r\n", code, first);
    for line in lines {
        reply.push(' ');
        reply.push_str(line);
        reply.push_str("\r\n");
    }
    reply.push_str(&format!("{} {}\r\n", code, last));
    send_response(writer, reply.as_bytes()).await
}

/// Quotes a path for 257 replies, doubling embedded quotes (RFC 959).
pub fn quote_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

/// Resolves `arg` for the session, replying 550 when it leaves the home
/// directory, by `..` or through a symlink.
///
/// # Returns
///
/// `None` once the error reply has been sent.
pub async fn resolve_or_reply(
    writer: &mut FtpStream,
    session: &Session,
    arg: &str,
) -> Result<Option<ResolvedPath>, io::Error> {
    let resolved = match session.resolve(arg) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("[{}] {}: {}", session.peer_addr, session.username(), e);
            send_reply(writer, &e.to_ftp_response()).await?;
            return Ok(None);
        }
    };

    match session.is_confined(&resolved).await {
        Ok(true) => Ok(Some(resolved)),
        Ok(false) => {
            let e = PathError::Violation(resolved.virtual_path);
            warn!("[{}] {}: {} (symlink)", session.peer_addr, session.username(), e);
            send_reply(writer, &e.to_ftp_response()).await?;
            Ok(None)
        }
        Err(e) => {
            send_reply(writer, &e.to_ftp_response()).await?;
            Ok(None)
        }
    }
}

/// Runs a data command end to end: opens the negotiated data connection,
/// protects it when required, moves the payload and sends the final reply.
///
/// `preliminary` is the 150 reply sent before the connection is opened.
/// Every failure here is answered on the control channel and the session
/// continues, except a failed data TLS handshake which closes it.
///
/// The control connection is watched while the payload moves: ABOR drops
/// the data connection at once. Any other command is kept in the session
/// and answered after the transfer's final reply.
pub async fn run_transfer(
    control: &mut ControlStream,
    session: &mut Session,
    request: TransferRequest,
    preliminary: &str,
) -> Result<Outcome, io::Error> {
    if session.data_protection_missing() {
        send_reply(control.get_mut(), "522 SSL/TLS required on the data channel.").await?;
        return Ok(Outcome::Continue);
    }

    let channel = match session.data_channel.take() {
        Some(channel) => channel,
        None => {
            send_reply(control.get_mut(), "425 Use PORT or PASV first.").await?;
            return Ok(Outcome::Continue);
        }
    };
    let mode = channel.mode();
    let settings = session.ctx.config.transfer_settings();

    send_reply(control.get_mut(), preliminary).await?;

    let stream = match channel
        .establish(session.peer_addr.ip(), settings.timeout)
        .await
    {
        Ok(stream) => stream,
        Err(e) => {
            warn!(
                "[{}] {} data connection failed: {}",
                session.peer_addr, mode, e
            );
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Continue);
        }
    };

    let mut data = match maybe_upgrade(
        session.ctx.tls.as_ref(),
        stream,
        ChannelRole::Data,
        session.data_tls_required(),
    )
    .await
    {
        Ok(data) => data,
        Err(e) => {
            error!(
                "[{}] TLS on data connection failed, closing session: {}",
                session.peer_addr, e
            );
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Close);
        }
    };

    let progress = AtomicU64::new(0);
    let mut pending = std::mem::take(&mut session.pending_input);
    let mut transfer = Box::pin(execute_transfer_tracked(
        &request,
        &mut data,
        session.fs(),
        session.transfer_type,
        &settings,
        &progress,
    ));
    let mut watching = true;
    let result = loop {
        if !watching {
            break Some(transfer.as_mut().await);
        }
        tokio::select! {
            result = transfer.as_mut() => break Some(result),
            read = continue_command_line(&mut *control, &mut pending) => match read {
                Ok(LineRead::Line) if is_abort(&pending) => {
                    pending.clear();
                    break None;
                }
                // Whatever else arrived waits for the control loop.
                Ok(_) | Err(_) => watching = false,
            },
        }
    };
    drop(transfer);
    drop(data);
    session.pending_input = pending;

    match result {
        None => {
            let moved = progress.load(Ordering::Relaxed);
            info!(
                "[{}] {} {} aborted after {} bytes",
                session.peer_addr,
                session.username(),
                request.direction(),
                moved
            );
            if moved > 0 {
                send_reply(control.get_mut(), "426 Transfer aborted via ABOR.").await?;
                send_reply(control.get_mut(), "226 ABOR command successful.").await?;
            } else {
                send_reply(
                    control.get_mut(),
                    "225 ABOR command successful; data channel closed.",
                )
                .await?;
            }
        }
        Some(Ok(bytes)) => {
            info!(
                "[{}] {} {} of {} bytes ({}, {}{})",
                session.peer_addr,
                session.username(),
                request.direction(),
                bytes,
                session.transfer_type.describe(),
                mode,
                if session.data_tls_required() { ", TLS" } else { "" }
            );
            send_reply(control.get_mut(), "226 Transfer complete.").await?;
        }
        Some(Err(e)) => {
            warn!(
                "[{}] {} {} failed: {}",
                session.peer_addr,
                session.username(),
                request.direction(),
                e
            );
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
        }
    }
    Ok(Outcome::Continue)
}

/// Whether a control line read mid-transfer is ABOR. Clients may put Telnet
/// IP and Synch bytes in front of it.
fn is_abort(line: &[u8]) -> bool {
    let start = line
        .iter()
        .position(u8::is_ascii_alphabetic)
        .unwrap_or(line.len());
    match std::str::from_utf8(&line[start..]) {
        Ok(text) => CommandLine::parse(text).command == Some(FtpCommand::ABOR),
        Err(_) => false,
    }
}
