use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::{Session, SessionState};
use log::{info, warn};
use std::io;

/// Handles the USER FTP command.
///
/// Every username is answered with 331 so a client cannot learn which
/// accounts exist; the check happens on PASS.
///
/// # Arguments
///
/// * `writer` - The control connection.
/// * `session` - The session of this connection.
/// * `username` - The username provided by the client.
pub async fn handle_user_command(
    writer: &mut FtpStream,
    session: &mut Session,
    username: &str,
) -> Result<(), io::Error> {
    if session.is_authenticated() {
        warn!(
            "[{}] USER {} while logged in as {}",
            session.peer_addr,
            username,
            session.username()
        );
        return send_reply(writer, "530 Can't switch to another user.").await;
    }

    let username = username.trim();
    if username.is_empty() {
        return send_reply(writer, "501 Syntax error in parameters or arguments.").await;
    }

    info!("[{}] Received USER command with username: {}", session.peer_addr, username);
    session.state = SessionState::AwaitingPassword {
        username: username.to_string(),
    };
    send_reply(writer, "331 Username ok, send password.").await
}
