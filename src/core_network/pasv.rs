use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::data_channel::DataChannel;
use crate::core_network::stream::FtpStream;
use crate::session::Session;
use log::{debug, error, warn};
use rand::Rng;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use tokio::net::TcpListener;

/// Sets up a passive mode (PASV) listener and sends the response to the client.
///
/// The listener is stored in the session and accepted from by the next data
/// command; a previous pending data channel is dropped.
pub async fn handle_pasv_command(
    writer: &mut FtpStream,
    session: &mut Session,
    _arg: &str,
) -> Result<(), io::Error> {
    if session.epsv_all {
        return send_reply(writer, "501 PASV not allowed after EPSV ALL.").await;
    }
    let bind_ip = session.local_addr.ip();
    let announce_ip = match session.ctx.config.server.pasv_address {
        Some(IpAddr::V4(ip)) => Some(ip),
        _ => match bind_ip {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(ip) => ip.to_ipv4_mapped(),
        },
    };
    let announce_ip = match announce_ip {
        Some(ip) => ip,
        None => {
            warn!("[{}] PASV requested on an IPv6 connection", session.peer_addr);
            return send_reply(writer, "425 PASV is not supported on IPv6 connections; use EPSV.")
                .await;
        }
    };

    session.data_channel = None;
    let listener = match setup_pasv_listener(bind_ip, session.ctx.config.server.passive_ports).await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!("[{}] Failed to set up passive listener: {}", session.peer_addr, e);
            return send_reply(writer, "425 Can't open passive connection.").await;
        }
    };
    let port = listener.local_addr()?.port();
    session.data_channel = Some(DataChannel::Passive(listener));

    let reply = format_pasv_reply(announce_ip, port);
    debug!("[{}] PASV listening on port {}", session.peer_addr, port);
    send_reply(writer, &reply).await
}

/// Handles the EPSV (Extended Passive Mode) FTP command.
///
/// `EPSV ALL` locks the session to EPSV until REIN (RFC 2428).
pub async fn handle_epsv_command(
    writer: &mut FtpStream,
    session: &mut Session,
    arg: &str,
) -> Result<(), io::Error> {
    let bind_ip = session.local_addr.ip();
    match arg.trim().to_ascii_uppercase().as_str() {
        "" => {}
        "ALL" => {
            session.epsv_all = true;
            session.data_channel = None;
            return send_reply(writer, "200 EPSV ALL command successful.").await;
        }
        "1" if bind_ip.is_ipv4() => {}
        "2" if bind_ip.is_ipv6() => {}
        "1" | "2" => {
            let supported = if bind_ip.is_ipv4() { 1 } else { 2 };
            return send_reply(
                writer,
                &format!("522 Network protocol not supported, use ({}).", supported),
            )
            .await;
        }
        _ => return send_reply(writer, "501 Unknown network protocol.").await,
    }

    session.data_channel = None;
    let listener = match setup_pasv_listener(bind_ip, session.ctx.config.server.passive_ports).await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!("[{}] Failed to set up passive listener: {}", session.peer_addr, e);
            return send_reply(writer, "425 Can't open passive connection.").await;
        }
    };
    let port = listener.local_addr()?.port();
    session.data_channel = Some(DataChannel::Passive(listener));

    debug!("[{}] EPSV listening on port {}", session.peer_addr, port);
    send_reply(
        writer,
        &format!("229 Entering extended passive mode (|||{}|).", port),
    )
    .await
}

/// Binds a passive listener on `bind_ip`.
///
/// With a configured range, ports are tried starting from a random offset so
/// concurrent sessions spread over the range.
pub async fn setup_pasv_listener(
    bind_ip: IpAddr,
    range: Option<[u16; 2]>,
) -> Result<TcpListener, io::Error> {
    let [low, high] = match range {
        Some(range) => range,
        None => return TcpListener::bind((bind_ip, 0)).await,
    };

    let span = u32::from(high) - u32::from(low) + 1;
    let start = rand::thread_rng().gen_range(0..span);
    for offset in 0..span {
        let port = (u32::from(low) + (start + offset) % span) as u16;
        match TcpListener::bind((bind_ip, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AddrInUse,
        format!("no free passive port in {}-{}", low, high),
    ))
}

pub fn format_pasv_reply(ip: Ipv4Addr, port: u16) -> String {
    let [a, b, c, d] = ip.octets();
    format!(
        "227 Entering passive mode ({},{},{},{},{},{}).",
        a,
        b,
        c,
        d,
        port >> 8,
        port & 0xff
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pasv_reply() {
        assert_eq!(
            format_pasv_reply(Ipv4Addr::new(127, 0, 0, 1), 2000),
            "227 Entering passive mode (127,0,0,1,7,208)."
        );
    }

    #[tokio::test]
    async fn test_listener_within_range() {
        let listener = setup_pasv_listener("127.0.0.1".parse().unwrap(), Some([40000, 40100]))
            .await
            .unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!((40000..=40100).contains(&port));
    }
}
