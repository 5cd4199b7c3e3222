use crate::constants::MAX_COMMAND_LENGTH;
use crate::core_ftpcommand::error::ProtocolError;
use crate::core_ftpcommand::ftpcommand::CommandLine;
use crate::core_ftpcommand::handlers::{dispatch, Outcome};
use crate::core_ftpcommand::utils::send_reply;
use crate::core_network::stream::{linger_close, FtpStream};
use crate::core_tls::{maybe_upgrade, ChannelRole};
use crate::server::ServerContext;
use crate::session::Session;
use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;

/// Result of reading one control-channel line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Binds one listening socket per address. Any failure is fatal.
pub async fn bind_listeners(
    addrs: &[SocketAddr],
) -> Result<Vec<TcpListener>, (SocketAddr, io::Error)> {
    let mut listeners = Vec::with_capacity(addrs.len());
    for addr in addrs {
        let listener = TcpListener::bind(addr).await.map_err(|e| (*addr, e))?;
        match listener.local_addr() {
            Ok(bound) => info!("Server listening on {}", bound),
            Err(_) => info!("Server listening on {}", addr),
        }
        listeners.push(listener);
    }
    Ok(listeners)
}

/// Starts one accept loop per listener and a supervisor owning every
/// session task.
///
/// Once `shutdown` flips to `true` the listeners close, sessions get
/// `grace` to finish on their own and are aborted after that.
pub fn start_server(
    listeners: Vec<TcpListener>,
    ctx: Arc<ServerContext>,
    shutdown: watch::Receiver<bool>,
    grace: Duration,
) -> JoinHandle<()> {
    let (conn_tx, conn_rx) = mpsc::unbounded_channel::<(TcpStream, SocketAddr)>();
    let acceptors = listeners
        .into_iter()
        .map(|listener| tokio::spawn(accept_loop(listener, conn_tx.clone(), shutdown.clone())))
        .collect();
    drop(conn_tx);
    tokio::spawn(supervise(conn_rx, acceptors, ctx, shutdown, grace))
}

async fn accept_loop(
    listener: TcpListener,
    conn_tx: mpsc::UnboundedSender<(TcpStream, SocketAddr)>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = wait_for_shutdown(&mut shutdown) => break,
        };
        match accepted {
            Ok(connection) => {
                if conn_tx.send(connection).is_err() {
                    break;
                }
            }
            // Per-connection failures (e.g. a reset before accept) must not
            // stop the listener.
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
    if let Ok(addr) = listener.local_addr() {
        info!("Listener on {} closed", addr);
    }
}

async fn supervise(
    mut conn_rx: mpsc::UnboundedReceiver<(TcpStream, SocketAddr)>,
    acceptors: Vec<JoinHandle<()>>,
    ctx: Arc<ServerContext>,
    mut shutdown: watch::Receiver<bool>,
    grace: Duration,
) {
    let mut sessions = JoinSet::new();
    loop {
        tokio::select! {
            connection = conn_rx.recv() => match connection {
                Some((socket, addr)) => {
                    info!("New connection from {}", addr);
                    sessions.spawn(run_session(socket, addr, Arc::clone(&ctx), shutdown.clone()));
                }
                None => break,
            },
            Some(finished) = sessions.join_next(), if !sessions.is_empty() => {
                if let Err(e) = finished {
                    if e.is_panic() {
                        error!("Session task panicked: {}", e);
                    }
                }
            }
            _ = wait_for_shutdown(&mut shutdown) => break,
        }
    }

    // Listeners are closed once their accept loops are done.
    for acceptor in acceptors {
        let _ = acceptor.await;
    }
    drop(conn_rx);
    if sessions.is_empty() {
        return;
    }
    info!("Waiting up to {:?} for {} session(s)", grace, sessions.len());
    let drained = timeout(grace, async {
        while sessions.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("Aborting {} session(s) after shutdown grace period", sessions.len());
        sessions.abort_all();
        while sessions.join_next().await.is_some() {}
    }
}

async fn run_session(
    socket: TcpStream,
    addr: SocketAddr,
    ctx: Arc<ServerContext>,
    shutdown: watch::Receiver<bool>,
) {
    if let Err(e) = handle_connection(socket, ctx, shutdown).await {
        warn!("Connection error for {}: {}", addr, e);
    }
    info!("Connection closed for {}", addr);
}

/// Resolves once shutdown has been requested. A dropped sender never
/// resolves it.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drives one control connection from the greeting to its close.
pub async fn handle_connection(
    socket: TcpStream,
    ctx: Arc<ServerContext>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), io::Error> {
    let peer_addr = socket.peer_addr()?;
    let local_addr = socket.local_addr()?;

    let implicit_required = ctx.config.tls.implicit && ctx.config.tls.control_required;
    let stream = match maybe_upgrade(
        ctx.tls.as_ref(),
        socket,
        ChannelRole::Control,
        implicit_required,
    )
    .await
    {
        Ok(stream) => stream,
        Err(e) => {
            warn!("[{}] Control channel TLS failed: {}", peer_addr, e);
            return Ok(());
        }
    };

    let mut session = Session::new(Arc::clone(&ctx), peer_addr, local_addr, stream.is_secure());
    let mut reader = BufReader::new(stream);
    send_reply(reader.get_mut(), &format!("220 {}", ctx.config.server.banner)).await?;

    let idle_timeout = ctx.config.server.idle_timeout;
    let mut line = Vec::with_capacity(MAX_COMMAND_LENGTH);
    loop {
        line.clear();
        line.append(&mut session.pending_input);
        let read = tokio::select! {
            read = timeout(idle_timeout, continue_command_line(&mut reader, &mut line)) => read,
            _ = wait_for_shutdown(&mut shutdown) => {
                info!("[{}] Closing session for shutdown", peer_addr);
                send_reply(reader.get_mut(), "421 Server shutting down.").await?;
                close(reader.get_mut()).await;
                return Ok(());
            }
        };

        match read {
            Err(_) => {
                info!("[{}] Idle timeout after {:?}", peer_addr, idle_timeout);
                send_reply(reader.get_mut(), "421 Control connection timed out.").await?;
                close(reader.get_mut()).await;
                return Ok(());
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(LineRead::Eof)) => {
                debug!("[{}] Client disconnected", peer_addr);
                return Ok(());
            }
            Ok(Ok(LineRead::TooLong)) => {
                warn!("[{}] Command line too long", peer_addr);
                send_reply(reader.get_mut(), &ProtocolError::LineTooLong.to_ftp_response())
                    .await?;
                close(reader.get_mut()).await;
                return Ok(());
            }
            Ok(Ok(LineRead::Line)) => {}
        }

        let text = match std::str::from_utf8(&line) {
            Ok(text) => text,
            Err(_) => {
                send_reply(reader.get_mut(), &ProtocolError::InvalidEncoding.to_ftp_response())
                    .await?;
                continue;
            }
        };
        let command = CommandLine::parse(text);
        info!("[{}] Received command: {}", peer_addr, command.loggable());

        match dispatch(&mut reader, &mut session, &command).await? {
            Outcome::Continue => {}
            Outcome::Close => {
                close(reader.get_mut()).await;
                return Ok(());
            }
            Outcome::UpgradeControl => {
                if !reader.buffer().is_empty() {
                    warn!("[{}] Data pipelined after AUTH, closing", peer_addr);
                    return Ok(());
                }
                let tcp = match reader.into_inner() {
                    FtpStream::Plain(tcp) => tcp,
                    secure => {
                        reader = BufReader::new(secure);
                        continue;
                    }
                };
                match maybe_upgrade(ctx.tls.as_ref(), tcp, ChannelRole::Control, true).await {
                    Ok(secure) => {
                        info!("[{}] Control channel upgraded to TLS", peer_addr);
                        session.control_secure = true;
                        session.pbsz_set = false;
                        session.data_protected = false;
                        reader = BufReader::new(secure);
                    }
                    Err(e) => {
                        warn!("[{}] AUTH TLS handshake failed: {}", peer_addr, e);
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Completes the CRLF-terminated line already started in `line`, at most
/// `MAX_COMMAND_LENGTH` bytes in all.
///
/// Cancel safe: bytes read before the future is dropped stay in `line`, so
/// calling again picks up where the last call stopped.
pub async fn continue_command_line<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    if line.ends_with(b"\n") {
        return Ok(LineRead::Line);
    }
    let room = MAX_COMMAND_LENGTH.saturating_sub(line.len()) as u64;
    if room > 0 {
        (&mut *reader).take(room).read_until(b'\n', line).await?;
    }
    if line.ends_with(b"\n") {
        Ok(LineRead::Line)
    } else if line.len() >= MAX_COMMAND_LENGTH {
        Ok(LineRead::TooLong)
    } else {
        // The peer closed, possibly mid-line.
        Ok(LineRead::Eof)
    }
}

async fn close(stream: &mut FtpStream) {
    linger_close(stream).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_command_line(reader: &mut &[u8], line: &mut Vec<u8>) -> io::Result<LineRead> {
        line.clear();
        continue_command_line(reader, line).await
    }

    #[tokio::test]
    async fn test_reads_lines_in_order() {
        let mut input: &[u8] = b"USER alice\r\nPASS password\r\n";
        let mut line = Vec::new();
        assert_eq!(read_command_line(&mut input, &mut line).await.unwrap(), LineRead::Line);
        assert_eq!(line, b"USER alice\r\n");
        assert_eq!(read_command_line(&mut input, &mut line).await.unwrap(), LineRead::Line);
        assert_eq!(line, b"PASS password\r\n");
        assert_eq!(read_command_line(&mut input, &mut line).await.unwrap(), LineRead::Eof);
    }

    #[tokio::test]
    async fn test_overlong_line_is_rejected() {
        let mut data = vec![b'A'; MAX_COMMAND_LENGTH + 10];
        data.extend_from_slice(b"\r\n");
        let mut input: &[u8] = &data;
        let mut line = Vec::new();
        assert_eq!(
            read_command_line(&mut input, &mut line).await.unwrap(),
            LineRead::TooLong
        );
    }

    #[tokio::test]
    async fn test_line_of_exactly_max_length_is_accepted() {
        let mut data = vec![b'A'; MAX_COMMAND_LENGTH - 2];
        data.extend_from_slice(b"\r\n");
        let mut input: &[u8] = &data;
        let mut line = Vec::new();
        assert_eq!(read_command_line(&mut input, &mut line).await.unwrap(), LineRead::Line);
    }

    #[tokio::test]
    async fn test_partial_line_at_eof() {
        let mut input: &[u8] = b"NOOP";
        let mut line = Vec::new();
        assert_eq!(read_command_line(&mut input, &mut line).await.unwrap(), LineRead::Eof);
    }

    #[tokio::test]
    async fn test_continues_a_started_line() {
        let mut input: &[u8] = b"OR\r\nNOOP\r\n";
        let mut line = b"AB".to_vec();
        assert_eq!(
            continue_command_line(&mut input, &mut line).await.unwrap(),
            LineRead::Line
        );
        assert_eq!(line, b"ABOR\r\n");
        assert_eq!(
            continue_command_line(&mut input, &mut line).await.unwrap(),
            LineRead::Line
        );
        assert_eq!(line, b"ABOR\r\n");
    }

    #[tokio::test]
    async fn test_started_line_counts_toward_limit() {
        let mut input: &[u8] = b"AAAA\r\n";
        let mut line = vec![b'A'; MAX_COMMAND_LENGTH - 3];
        assert_eq!(
            continue_command_line(&mut input, &mut line).await.unwrap(),
            LineRead::TooLong
        );
    }

    #[tokio::test]
    async fn test_bind_failure_names_address() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();
        let (failed, _) = bind_listeners(&[addr]).await.unwrap_err();
        assert_eq!(failed, addr);
    }
}
