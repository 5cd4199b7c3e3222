#![allow(dead_code)]

use fixtureftpd::config::UserConfig;
use fixtureftpd::{Config, FtpServer, ServerHandle};
use std::io::BufReader as StdBufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;
use tokio_rustls::TlsConnector;

pub const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestServer {
    pub handle: ServerHandle,
    pub root: TempDir,
    pub addr: SocketAddr,
}

impl TestServer {
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A loopback-only server rooted in a fresh temporary directory.
pub fn test_config(root: &TempDir) -> Config {
    let mut config = Config::default();
    config.server.listen_addresses = vec!["127.0.0.1:0".parse().unwrap()];
    config.server.root_dir = root.path().to_path_buf();
    config.server.data_timeout = Duration::from_secs(5);
    config
}

pub fn with_user(config: &mut Config, username: &str, permissions: &str) {
    let mut user = UserConfig::new(username, "password");
    user.permissions = permissions.to_string();
    config.users.push(user);
}

pub fn with_tls(config: &mut Config, implicit: bool) {
    config.tls.cert_file = Some(fixture("cert.pem"));
    config.tls.key_file = Some(fixture("key.pem"));
    config.tls.control_required = true;
    config.tls.data_required = true;
    config.tls.implicit = implicit;
    config.tls.handshake_timeout = Duration::from_secs(1);
}

pub async fn start_server<F>(configure: F) -> TestServer
where
    F: FnOnce(&mut Config),
{
    let root = tempfile::tempdir().unwrap();
    let mut config = test_config(&root);
    configure(&mut config);
    let handle = FtpServer::new(config).unwrap().bind().await.unwrap();
    let addr = handle.local_addrs()[0];
    TestServer { handle, root, addr }
}

/// Minimal FTP client speaking over any stream.
pub struct TestClient<S> {
    stream: BufReader<S>,
}

impl TestClient<TcpStream> {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        TestClient {
            stream: BufReader::new(stream),
        }
    }

    /// Connects and consumes the 220 greeting.
    pub async fn greeted(addr: SocketAddr) -> Self {
        let mut client = Self::connect(addr).await;
        let greeting = client.read_reply().await;
        assert!(greeting.starts_with("220 "), "unexpected greeting: {}", greeting);
        client
    }

    /// Runs AUTH TLS and wraps the control connection.
    pub async fn auth_tls(mut self) -> TestClient<TlsStream<TcpStream>> {
        let reply = self.command("AUTH TLS").await;
        assert!(reply.starts_with("234"), "{}", reply);
        let tcp = self.stream.into_inner();
        TestClient {
            stream: BufReader::new(tls_connect(tcp).await),
        }
    }
}

impl TestClient<TlsStream<TcpStream>> {
    pub async fn connect_implicit(addr: SocketAddr) -> Self {
        let tcp = TcpStream::connect(addr).await.unwrap();
        let mut client = TestClient {
            stream: BufReader::new(tls_connect(tcp).await),
        };
        let greeting = client.read_reply().await;
        assert!(greeting.starts_with("220 "), "unexpected greeting: {}", greeting);
        client
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> TestClient<S> {
    pub async fn send(&mut self, line: &str) {
        let stream = self.stream.get_mut();
        stream.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    }

    /// Reads one complete reply, multi-line replies included. An empty
    /// string means the server closed the connection.
    pub async fn read_reply(&mut self) -> String {
        let mut reply = String::new();
        loop {
            let mut line = String::new();
            let n = timeout(REPLY_TIMEOUT, self.stream.read_line(&mut line))
                .await
                .expect("timed out waiting for a reply")
                .unwrap_or(0);
            if n == 0 {
                return reply;
            }
            reply.push_str(&line);
            let first = reply.as_bytes();
            let code_done = line.len() >= 4
                && line.as_bytes()[..3] == first[..3]
                && line.as_bytes()[3] == b' ';
            if code_done {
                return reply.trim_end().to_string();
            }
        }
    }

    pub async fn command(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_reply().await
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        assert!(self.command(&format!("USER {}", username)).await.starts_with("331"));
        let reply = self.command(&format!("PASS {}", password)).await;
        assert_eq!(reply, "230 Login successful.");
    }

    /// Sends PASV and returns the announced data address.
    pub async fn pasv(&mut self) -> SocketAddr {
        let reply = self.command("PASV").await;
        assert!(reply.starts_with("227"), "{}", reply);
        parse_pasv_reply(&reply)
    }

    /// Downloads `path` over a fresh passive connection.
    pub async fn retrieve(&mut self, path: &str) -> Vec<u8> {
        let data_addr = self.pasv().await;
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        let reply = self.command(&format!("RETR {}", path)).await;
        assert!(reply.starts_with("150"), "{}", reply);
        let mut payload = Vec::new();
        data.read_to_end(&mut payload).await.unwrap();
        assert_eq!(self.read_reply().await, "226 Transfer complete.");
        payload
    }

    /// Uploads `payload` with `verb` (STOR or APPE) over a passive
    /// connection.
    pub async fn upload(&mut self, verb: &str, path: &str, payload: &[u8]) {
        let data_addr = self.pasv().await;
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        let reply = self.command(&format!("{} {}", verb, path)).await;
        assert!(reply.starts_with("150"), "{}", reply);
        data.write_all(payload).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);
        assert_eq!(self.read_reply().await, "226 Transfer complete.");
    }

    /// Runs a listing command and returns the data connection payload.
    pub async fn listing(&mut self, command: &str) -> String {
        let data_addr = self.pasv().await;
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        let reply = self.command(command).await;
        assert!(reply.starts_with("150"), "{}", reply);
        let mut payload = String::new();
        data.read_to_string(&mut payload).await.unwrap();
        assert_eq!(self.read_reply().await, "226 Transfer complete.");
        payload
    }

    /// True once the server has closed the control connection.
    pub async fn is_closed(&mut self) -> bool {
        let mut rest = Vec::new();
        match timeout(REPLY_TIMEOUT, self.stream.read_to_end(&mut rest)).await {
            Ok(Ok(_)) | Ok(Err(_)) => true,
            Err(_) => false,
        }
    }
}

pub fn parse_pasv_reply(reply: &str) -> SocketAddr {
    let start = reply.find('(').unwrap() + 1;
    let end = reply.rfind(')').unwrap();
    let numbers: Vec<u8> = reply[start..end]
        .split(',')
        .map(|n| n.trim().parse().unwrap())
        .collect();
    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = u16::from(numbers[4]) << 8 | u16::from(numbers[5]);
    SocketAddr::new(IpAddr::V4(ip), port)
}

/// A client trusting only the fixture certificate.
pub fn tls_connector() -> TlsConnector {
    let pem = std::fs::File::open(fixture("cert.pem")).unwrap();
    let certs = rustls_pemfile::certs(&mut StdBufReader::new(pem)).unwrap();
    let mut roots = rustls::RootCertStore::empty();
    for cert in certs {
        roots.add(&rustls::Certificate(cert)).unwrap();
    }
    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

pub async fn tls_connect(tcp: TcpStream) -> TlsStream<TcpStream> {
    let name = rustls::ServerName::try_from("localhost").unwrap();
    tls_connector().connect(name, tcp).await.unwrap()
}
