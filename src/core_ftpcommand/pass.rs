use crate::core_ftpcommand::handlers::Outcome;
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::FtpStream;
use crate::session::{Session, SessionState};
use log::{error, info, warn};
use std::io;

/// Handles the PASS FTP command.
///
/// A failed attempt sends the session back to the unauthenticated state.
/// Once `max_login_attempts` failures have piled up the connection is closed
/// with 421.
pub async fn handle_pass_command(
    writer: &mut FtpStream,
    session: &mut Session,
    password: &str,
) -> Result<Outcome, io::Error> {
    let username = match &session.state {
        SessionState::AwaitingPassword { username } => username.clone(),
        SessionState::Authenticated(_) => {
            send_reply(writer, "503 User already authenticated.").await?;
            return Ok(Outcome::Continue);
        }
        SessionState::Unauthenticated => {
            send_reply(writer, "503 Login with USER first.").await?;
            return Ok(Outcome::Continue);
        }
    };

    let authenticated = match session.ctx.credentials.authenticate(&username, password) {
        Ok(user) => match tokio::fs::metadata(&user.home_dir).await {
            Ok(meta) if meta.is_dir() => Ok(user),
            _ => {
                error!(
                    "Home directory of {} is gone: {}",
                    user.username,
                    user.home_dir.display()
                );
                Err(crate::core_auth::AuthError::LoginIncorrect)
            }
        },
        Err(e) => Err(e),
    };

    match authenticated {
        Ok(user) => {
            info!("[{}] User {} logged in", session.peer_addr, user.username);
            session.login(user);
            send_reply(writer, "230 Login successful.").await?;
            Ok(Outcome::Continue)
        }
        Err(e) => {
            session.state = SessionState::Unauthenticated;
            session.failed_logins += 1;
            warn!(
                "[{}] Authentication failed for {} (attempt {})",
                session.peer_addr, username, session.failed_logins
            );

            if session.failed_logins >= session.ctx.config.server.max_login_attempts {
                warn!(
                    "[{}] Too many failed logins, closing connection",
                    session.peer_addr
                );
                send_reply(writer, "421 Too many failed login attempts; closing connection.")
                    .await?;
                return Ok(Outcome::Close);
            }
            send_reply(writer, &e.to_ftp_response()).await?;
            Ok(Outcome::Continue)
        }
    }
}
