use crate::core_ftpcommand::utils::send_multiline;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_site_help_command(
    writer: &mut FtpStream,
    _session: &mut Session,
    _args: &str,
) -> Result<(), io::Error> {
    let lines = vec![
        "CHMOD <mode> <path> (change file mode)".to_string(),
        "HELP (show this help)".to_string(),
    ];
    send_multiline(
        writer,
        214,
        "The following SITE commands are recognized:",
        &lines,
        "Help SITE command successful.",
    )
    .await
}
