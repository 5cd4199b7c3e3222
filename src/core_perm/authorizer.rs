use crate::core_auth::User;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_perm::error::AuthorizationError;
use crate::core_perm::permission::Capability;
use log::debug;

/// Returns the capability a command needs, if any.
///
/// `SITE` and `STAT` depend on their argument: only `SITE CHMOD` needs
/// [`Capability::Chmod`] and only `STAT <path>` lists anything.
pub fn required_capability(command: FtpCommand, arg: &str) -> Option<Capability> {
    match command {
        FtpCommand::CWD | FtpCommand::CDUP => Some(Capability::ChangeDir),
        FtpCommand::LIST
        | FtpCommand::NLST
        | FtpCommand::MLSD
        | FtpCommand::MLST
        | FtpCommand::SIZE
        | FtpCommand::MDTM => Some(Capability::List),
        FtpCommand::STAT if !arg.trim().is_empty() => Some(Capability::List),
        FtpCommand::RETR => Some(Capability::Retrieve),
        FtpCommand::MFMT => Some(Capability::SetTime),
        FtpCommand::APPE => Some(Capability::Append),
        FtpCommand::DELE | FtpCommand::RMD => Some(Capability::Delete),
        FtpCommand::RNFR | FtpCommand::RNTO => Some(Capability::Rename),
        FtpCommand::MKD => Some(Capability::MakeDir),
        FtpCommand::STOR | FtpCommand::STOU => Some(Capability::Store),
        FtpCommand::SITE if is_site_chmod(arg) => Some(Capability::Chmod),
        _ => None,
    }
}

/// Whether a command may only run once a user has logged in.
pub fn requires_login(command: FtpCommand, arg: &str) -> bool {
    match command {
        FtpCommand::USER
        | FtpCommand::PASS
        | FtpCommand::QUIT
        | FtpCommand::REIN
        | FtpCommand::NOOP
        | FtpCommand::SYST
        | FtpCommand::FEAT
        | FtpCommand::HELP
        | FtpCommand::OPTS
        | FtpCommand::AUTH
        | FtpCommand::PBSZ
        | FtpCommand::PROT => false,
        FtpCommand::STAT => !arg.trim().is_empty(),
        _ => true,
    }
}

/// Decides whether `user` may run `command` with `arg`.
///
/// The decision depends only on the command and the user's permission set;
/// it never looks at the filesystem, so callers run it before resolving
/// paths.
pub fn authorize(
    user: Option<&User>,
    command: FtpCommand,
    arg: &str,
) -> Result<(), AuthorizationError> {
    let user = match user {
        Some(user) => user,
        None if requires_login(command, arg) => {
            return Err(AuthorizationError::NotLoggedIn(command.as_str().to_string()))
        }
        None => return Ok(()),
    };

    match required_capability(command, arg) {
        Some(capability) if !user.permissions.contains(capability) => {
            debug!(
                "Denied {} to {}: missing {}",
                command.as_str(),
                user.username,
                capability
            );
            Err(AuthorizationError::Denied {
                username: user.username.clone(),
                command: command.as_str().to_string(),
                capability,
            })
        }
        _ => Ok(()),
    }
}

fn is_site_chmod(arg: &str) -> bool {
    arg.split_whitespace()
        .next()
        .map(|sub| sub.eq_ignore_ascii_case("CHMOD"))
        .unwrap_or(false)
}
