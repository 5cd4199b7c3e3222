use crate::core_ftpcommand::utils::{quote_path, send_reply};
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_pwd_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    let response = format!(
        "257 {} is the current directory.",
        quote_path(&session.current_dir)
    );
    send_reply(writer, &response).await
}
