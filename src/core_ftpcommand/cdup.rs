use crate::core_fs::virtual_parent;
use crate::core_ftpcommand::cwd::change_directory;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

pub async fn handle_cdup_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    // "/" is its own parent.
    let parent = virtual_parent(&session.current_dir);
    change_directory(writer, session, &parent).await
}
