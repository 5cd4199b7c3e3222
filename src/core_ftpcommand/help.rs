use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::utils::{send_multiline, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

const ALIASES: [&str; 5] = ["XCUP", "XCWD", "XMKD", "XPWD", "XRMD"];

/// Handles the HELP FTP command.
///
/// Without an argument all recognized verbs are listed alphabetically,
/// eight per line. `HELP <verb>` returns that verb's usage.
pub async fn handle_help_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let tls = session.ctx.tls.is_some();
    let arg = arg.trim();
    if !arg.is_empty() {
        return match FtpCommand::from_str(arg).filter(|c| tls || !is_tls_only(*c)) {
            Some(command) => send_reply(writer, &format!("214 Syntax: {}", command.syntax())).await,
            None => send_reply(writer, "501 Unrecognized command.").await,
        };
    }

    send_multiline(
        writer,
        214,
        "The following commands are recognized:",
        &help_lines(tls),
        "Help command successful.",
    )
    .await
}

/// Verb table rows. Columns are padded to six characters, the last one too.
pub fn help_lines(tls: bool) -> Vec<String> {
    let mut names: Vec<&str> = FtpCommand::ALL
        .iter()
        .filter(|command| tls || !is_tls_only(**command))
        .map(FtpCommand::as_str)
        .chain(ALIASES)
        .collect();
    names.sort_unstable();

    names
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .map(|name| format!("{:<6}", name))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn is_tls_only(command: FtpCommand) -> bool {
    matches!(command, FtpCommand::AUTH | FtpCommand::PBSZ | FtpCommand::PROT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_table() {
        let lines = help_lines(false);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "ABOR   ALLO   APPE   CDUP   CWD    DELE   EPRT   EPSV  ");
        assert_eq!(lines[5], "XCUP   XCWD   XMKD   XPWD   XRMD  ");
        assert!(!lines.iter().any(|line| line.contains("AUTH")));
    }

    #[test]
    fn test_tls_table_adds_security_verbs() {
        let lines = help_lines(true);
        assert_eq!(lines[0], "ABOR   ALLO   APPE   AUTH   CDUP   CWD    DELE   EPRT  ");
        assert_eq!(lines[2], "MLST   MODE   NLST   NOOP   OPTS   PASS   PASV   PBSZ  ");
        assert_eq!(lines[5], "SYST   TYPE   USER   XCUP   XCWD   XMKD   XPWD   XRMD  ");
    }
}
