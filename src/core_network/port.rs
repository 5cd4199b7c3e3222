use crate::core_ftpcommand::error::ProtocolError;
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::data_channel::DataChannel;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{info, warn};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Parses the `h1,h2,h3,h4,p1,p2` argument of PORT.
pub fn parse_port_argument(arg: &str) -> Result<SocketAddr, ProtocolError> {
    let parts: Result<Vec<u8>, _> = arg.trim().split(',').map(|x| x.trim().parse::<u8>()).collect();
    let parts = parts.map_err(|_| ProtocolError::Syntax(arg.to_string()))?;
    if parts.len() != 6 {
        return Err(ProtocolError::Syntax(arg.to_string()));
    }

    let ip = Ipv4Addr::new(parts[0], parts[1], parts[2], parts[3]);
    let port = (parts[4] as u16) << 8 | parts[5] as u16;
    Ok(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Parses the RFC 2428 `<d>proto<d>addr<d>port<d>` argument of EPRT.
pub fn parse_eprt_argument(arg: &str) -> Result<SocketAddr, ProtocolError> {
    let arg = arg.trim();
    let delimiter = arg
        .chars()
        .next()
        .ok_or_else(|| ProtocolError::Syntax(arg.to_string()))?;
    let fields: Vec<&str> = arg.split(delimiter).collect();
    // A leading and a trailing delimiter yield empty outer fields.
    if fields.len() != 5 || !fields[0].is_empty() || !fields[4].is_empty() {
        return Err(ProtocolError::Syntax(arg.to_string()));
    }

    let ip: IpAddr = fields[2]
        .parse()
        .map_err(|_| ProtocolError::Syntax(arg.to_string()))?;
    match (fields[1], ip) {
        ("1", IpAddr::V4(_)) | ("2", IpAddr::V6(_)) => {}
        ("1", _) | ("2", _) => return Err(ProtocolError::Syntax(arg.to_string())),
        (other, _) => return Err(ProtocolError::UnsupportedParameter(other.to_string())),
    }
    let port: u16 = fields[3]
        .parse()
        .map_err(|_| ProtocolError::Syntax(arg.to_string()))?;

    Ok(SocketAddr::new(ip, port))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the address; the server connects out when the next data
/// command runs.
pub async fn handle_port_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if session.epsv_all {
        return send_reply(writer, "501 PORT not allowed after EPSV ALL.").await;
    }
    match parse_port_argument(arg) {
        Ok(addr) => set_active_address(writer, session, addr, "PORT").await,
        Err(e) => {
            warn!("[{}] Invalid PORT argument: {}", session.peer_addr, arg);
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}

/// Handles the EPRT (Extended Port) FTP command.
pub async fn handle_eprt_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    if session.epsv_all {
        return send_reply(writer, "501 EPRT not allowed after EPSV ALL.").await;
    }
    match parse_eprt_argument(arg) {
        Ok(addr) => set_active_address(writer, session, addr, "EPRT").await,
        Err(ProtocolError::UnsupportedParameter(_)) => {
            send_reply(writer, "522 Network protocol not supported, use (1,2).").await
        }
        Err(e) => {
            warn!("[{}] Invalid EPRT argument: {}", session.peer_addr, arg);
            send_reply(writer, &e.to_ftp_response()).await
        }
    }
}

async fn set_active_address(
    writer: &mut FtpStream,
    session: &mut Session,
    addr: SocketAddr,
    verb: &str,
) -> Result<(), io::Error> {
    if addr.ip() != session.peer_addr.ip() {
        warn!(
            "[{}] {} to foreign address {} rejected",
            session.peer_addr, verb, addr
        );
        return send_reply(writer, "501 Rejected data connection to foreign address.").await;
    }
    if addr.port() < 1024 {
        warn!(
            "[{}] {} to privileged port {} rejected",
            session.peer_addr,
            verb,
            addr.port()
        );
        return send_reply(writer, "501 Rejected data connection to privileged port.").await;
    }

    info!("[{}] {} data address set to {}", session.peer_addr, verb, addr);
    session.data_channel = Some(DataChannel::Active(addr));
    send_reply(writer, &format!("200 {} command successful.", verb)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        let addr = parse_port_argument("127,0,0,1,7,208").unwrap();
        assert_eq!(addr, "127.0.0.1:2000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_parse_port_rejects_garbage() {
        assert!(parse_port_argument("127,0,0,1,7").is_err());
        assert!(parse_port_argument("127,0,0,1,7,300").is_err());
        assert!(parse_port_argument("a,b,c,d,e,f").is_err());
    }

    #[test]
    fn test_parse_eprt() {
        assert_eq!(
            parse_eprt_argument("|1|127.0.0.1|2000|").unwrap(),
            "127.0.0.1:2000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_eprt_argument("|2|::1|2001|").unwrap(),
            "[::1]:2001".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_eprt_argument("!1!10.0.0.2!21!").unwrap(),
            "10.0.0.2:21".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_parse_eprt_errors() {
        assert!(matches!(
            parse_eprt_argument("|3|127.0.0.1|2000|"),
            Err(ProtocolError::UnsupportedParameter(_))
        ));
        assert!(parse_eprt_argument("|1|::1|2000|").is_err());
        assert!(parse_eprt_argument("|1|127.0.0.1|2000").is_err());
        assert!(parse_eprt_argument("").is_err());
    }
}
