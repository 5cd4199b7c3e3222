use crate::core_fs::{virtual_file_name, FsError, WriteMode};
use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::{resolve_or_reply, run_transfer, send_reply};
use crate::core_network::stream::ControlStream;
use crate::core_transfer::TransferRequest;
use crate::session::{ResolvedPath, Session};
use log::{info, warn};
use std::io;

const MAX_UNIQUE_ATTEMPTS: u32 = 100;

/// Handles the STOR (Store) FTP command.
///
/// An existing file is truncated, unless REST set an offset; then the file
/// is overwritten from there on.
pub async fn handle_stor_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    let mode = match session.take_restart_offset() {
        0 => WriteMode::Truncate,
        offset => WriteMode::At(offset),
    };
    store(control, session, arg, mode).await
}

/// Handles the APPE (Append) FTP command. A missing file is created.
pub async fn handle_appe_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    if session.restart_offset > 0 {
        send_reply(control.get_mut(), "450 Can't APPE while REST request is pending.").await?;
        return Ok(Outcome::Continue);
    }
    store(control, session, arg, WriteMode::Append).await
}

/// Handles the STOU (Store Unique) FTP command.
///
/// The argument, when present, is used as the name stem; a numeric suffix
/// is added until the name is free. The chosen name is announced in the
/// preliminary reply.
pub async fn handle_stou_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    if session.restart_offset > 0 {
        send_reply(control.get_mut(), "450 Can't STOU while REST request is pending.").await?;
        return Ok(Outcome::Continue);
    }
    let stem = if arg.trim().is_empty() { "ftpd" } else { arg };
    let base = match resolve_or_reply(control.get_mut(), session, stem).await? {
        Some(base) => base,
        None => return Ok(Outcome::Continue),
    };
    if base.is_root() {
        send_reply(control.get_mut(), "550 Is a directory.").await?;
        return Ok(Outcome::Continue);
    }

    let target = match unique_target(session, &base).await {
        Ok(Some(target)) => target,
        Ok(None) => {
            send_reply(control.get_mut(), "450 No usable unique file name found.").await?;
            return Ok(Outcome::Continue);
        }
        Err(e) => {
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Continue);
        }
    };

    info!(
        "[{}] {} storing unique file {}",
        session.peer_addr,
        session.username(),
        target.virtual_path
    );
    let preliminary = format!("150 FILE: {}", virtual_file_name(&target.virtual_path));
    let request = TransferRequest::Upload {
        path: target.real,
        mode: WriteMode::Truncate,
    };
    run_transfer(control, session, request, &preliminary).await
}

async fn store(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
    mode: WriteMode,
) -> Result<Outcome, io::Error> {
    if arg.trim().is_empty() {
        send_reply(control.get_mut(), "501 Syntax error in parameters or arguments.").await?;
        return Ok(Outcome::Continue);
    }
    let resolved = match resolve_or_reply(control.get_mut(), session, arg).await? {
        Some(resolved) => resolved,
        None => return Ok(Outcome::Continue),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) if stat.is_dir() => {
            warn!(
                "[{}] Upload onto directory {} refused",
                session.peer_addr, resolved.virtual_path
            );
            send_reply(control.get_mut(), "550 Is a directory.").await?;
            return Ok(Outcome::Continue);
        }
        Ok(stat) if matches!(mode, WriteMode::At(offset) if offset > stat.size) => {
            send_reply(control.get_mut(), "554 Invalid REST parameter.").await?;
            return Ok(Outcome::Continue);
        }
        Err(e) if matches!(mode, WriteMode::At(_)) => {
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Continue);
        }
        _ => {}
    }

    info!(
        "[{}] {} {} {}",
        session.peer_addr,
        session.username(),
        match mode {
            WriteMode::Append => "appending to",
            WriteMode::At(_) => "resuming",
            WriteMode::Truncate => "storing",
        },
        resolved.virtual_path
    );
    let preliminary = format!(
        "150 Opening {} mode data connection for {}.",
        session.transfer_type.describe(),
        resolved.virtual_path
    );
    let request = TransferRequest::Upload {
        path: resolved.real,
        mode,
    };
    run_transfer(control, session, request, &preliminary).await
}

/// First free name among `base`, `base.1`, `base.2`, ...
async fn unique_target(
    session: &Session,
    base: &ResolvedPath,
) -> Result<Option<ResolvedPath>, FsError> {
    for attempt in 0..MAX_UNIQUE_ATTEMPTS {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            ResolvedPath {
                virtual_path: format!("{}.{}", base.virtual_path, attempt),
                real: base.real.with_file_name(format!(
                    "{}.{}",
                    virtual_file_name(&base.virtual_path),
                    attempt
                )),
            }
        };
        match session.fs().stat(&candidate.real).await {
            Err(FsError::NotFound) if session.is_confined(&candidate).await? => {
                return Ok(Some(candidate))
            }
            Err(FsError::NotFound) => continue,
            Err(e) => return Err(e),
            Ok(_) => continue,
        }
    }
    Ok(None)
}
