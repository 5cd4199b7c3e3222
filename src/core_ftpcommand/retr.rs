use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::{resolve_or_reply, run_transfer, send_reply};
use crate::core_network::stream::ControlStream;
use crate::core_transfer::TransferRequest;
use crate::session::Session;
use log::{info, warn};
use std::io;

/// Handles the RETR (Retrieve) FTP command.
///
/// The file is checked before the data connection is touched, so a missing
/// file leaves the negotiated channel available for the next command. A
/// pending REST offset is consumed whether or not the transfer starts.
pub async fn handle_retr_command(
    control: &mut ControlStream,
    session: &mut Session,
    arg: &str,
) -> Result<Outcome, io::Error> {
    let offset = session.take_restart_offset();
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
            send_reply(control.get_mut(), "550 Is a directory.").await?;
            return Ok(Outcome::Continue);
        }
        Ok(stat) if offset > stat.size => {
            send_reply(control.get_mut(), "554 Invalid REST parameter.").await?;
            return Ok(Outcome::Continue);
        }
        Ok(_) => {}
        Err(e) => {
            warn!(
                "[{}] RETR {} failed: {}",
                session.peer_addr, resolved.virtual_path, e
            );
            send_reply(control.get_mut(), &e.to_ftp_response()).await?;
            return Ok(Outcome::Continue);
        }
    }

    info!(
        "[{}] {} retrieving {}",
        session.peer_addr,
        session.username(),
        resolved.virtual_path
    );
    let preliminary = format!(
        "150 Opening {} mode data connection for {}.",
        session.transfer_type.describe(),
        resolved.virtual_path
    );
    let request = TransferRequest::Download {
        path: resolved.real,
        offset,
    };
    run_transfer(control, session, request, &preliminary).await
}
