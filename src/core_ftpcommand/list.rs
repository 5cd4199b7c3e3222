use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::{resolve_or_reply, run_transfer, send_reply};
use crate::core_network::stream::ControlStream;
use crate::core_perm::Permissions;
use crate::core_transfer::{ListFormat, TransferRequest};
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the LIST FTP command (`ls -l` style).
pub async fn handle_list_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    list(control, session, arg, ListFormat::Long).await
}

/// Handles the NLST FTP command (names only).
pub async fn handle_nlst_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    list(control, session, arg, ListFormat::Names).await
}

/// Handles the MLSD FTP command (RFC 3659 facts). The target has to be a
/// directory.
pub async fn handle_mlsd_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    list(control, session, arg, ListFormat::Machine).await
}

/// Drops `ls` style flags such as `-la` that many clients send with LIST.
pub fn strip_list_options(arg: &str) -> &str {
    let mut rest = arg.trim();
    while rest.starts_with('-') {
        rest = match rest.split_once(' ') {
            Some((_, tail)) => tail.trim_start(),
            None => "",
        };
    }
    rest
}

async fn list(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
    format: ListFormat,
) -> Result<Outcome, io::Error> {
    let target = match format {
        ListFormat::Machine => arg.trim(),
        _ => strip_list_options(arg),
    };
    let resolved = match resolve_or_reply(control.get_mut(), session, target).await? {
        Some(resolved) => resolved,
        None => return Ok(Outcome::Continue),
    };

    match session.fs().stat(&resolved.real).await {
        Ok(stat) if format == ListFormat::Machine && !stat.is_dir() => {
            send_reply(control.get_mut(), "501 No such directory.").await?;
            return Ok(Outcome::Continue);
        }
        Ok(_) => {}
        Err(e) => {
            warn!(
                "[{}] Listing {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Continue);
        }
    }

    info!(
        "[{}] {} listing {}",
        session.peer_addr,
        session.username(),
        resolved.virtual_path
    );
    let permissions = session
        .user()
        .map(|user| user.permissions)
        .unwrap_or_else(Permissions::empty);
    let request = TransferRequest::Listing {
        path: resolved.real,
        format,
        permissions,
    };
    run_transfer(control, session, request, "150 Here comes the directory listing.").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_list_options() {
        assert_eq!(strip_list_options("-la"), "");
        assert_eq!(strip_list_options("-l -a docs"), "docs");
        assert_eq!(strip_list_options("my dir"), "my dir");
        assert_eq!(strip_list_options(""), "");
    }
}
