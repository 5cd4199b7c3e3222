use crate::core_ftpcommand::utils::send_multiline;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use std::io;

/// Handles the FEAT FTP command.
///
/// The TLS features are only advertised when a certificate is loaded.
pub async fn handle_feat_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    let features = feature_lines(session.ctx.tls.is_some());
    send_multiline(writer, 211, "Features supported:", &features, "End FEAT.").await
}

pub fn feature_lines(tls: bool) -> Vec<String> {
    let mut features = Vec::new();
    if tls {
        features.push("AUTH TLS".to_string());
        features.push("AUTH SSL".to_string());
    }
    features.push("EPRT".to_string());
    features.push("EPSV".to_string());
    features.push("MDTM".to_string());
    features.push("MFMT".to_string());
    features.push("MLST type*;perm*;size*;modify*;unix.mode*;".to_string());
    if tls {
        features.push("PBSZ".to_string());
        features.push("PROT".to_string());
    }
    features.push("REST STREAM".to_string());
    features.push("SITE CHMOD".to_string());
    features.push("SIZE".to_string());
    features.push("TVFS".to_string());
    features.push("UTF8".to_string());
    features
}
