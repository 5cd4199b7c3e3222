mod common;

use common::{start_server, tls_connect, with_tls, TestClient};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::test]
async fn test_implicit_tls_rejects_plaintext_client() {
    let server = start_server(|config| with_tls(config, true)).await;
    let mut client = TestClient::connect(server.addr).await;

    let started = Instant::now();
    client.send("USER user").await;
    let reply = client.read_reply().await;
    assert!(reply.starts_with("421"), "{}", reply);
    assert!(!reply.contains("220"));
    assert!(client.is_closed().await);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_implicit_tls_times_out_silent_client() {
    let server = start_server(|config| with_tls(config, true)).await;
    let mut client = TestClient::connect(server.addr).await;

    let reply = client.read_reply().await;
    assert_eq!(reply, "421 TLS handshake timed out.");
    assert!(client.is_closed().await);
}

#[tokio::test]
async fn test_implicit_tls_session_with_protected_transfers() {
    let server = start_server(|config| with_tls(config, true)).await;
    let mut client = TestClient::connect_implicit(server.addr).await;
    client.login("user", "password").await;
    assert_eq!(client.command("PBSZ 0").await, "200 PBSZ=0 successful.");
    assert_eq!(client.command("PROT P").await, "200 Protection set to Private");
    client.command("TYPE I").await;

    let payload = b"encrypted payload\r\n\x00\xff".to_vec();
    let data_addr = client.pasv().await;
    let data = TcpStream::connect(data_addr).await.unwrap();
    assert!(client.command("STOR secret.bin").await.starts_with("150"));
    let mut data = tls_connect(data).await;
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_reply().await, "226 Transfer complete.");
    assert_eq!(std::fs::read(server.path("secret.bin")).unwrap(), payload);

    let data_addr = client.pasv().await;
    let data = TcpStream::connect(data_addr).await.unwrap();
    assert!(client.command("RETR secret.bin").await.starts_with("150"));
    let mut data = tls_connect(data).await;
    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, payload);
    assert_eq!(client.read_reply().await, "226 Transfer complete.");

    assert_eq!(client.command("QUIT").await, "221 Goodbye.");
}

#[tokio::test]
async fn test_plaintext_data_connection_is_refused() {
    let server = start_server(|config| with_tls(config, true)).await;
    std::fs::write(server.path("file.txt"), b"abc").unwrap();
    let mut client = TestClient::connect_implicit(server.addr).await;
    client.login("user", "password").await;

    let data_addr = client.pasv().await;
    let mut data = TcpStream::connect(data_addr).await.unwrap();
    assert!(client.command("RETR file.txt").await.starts_with("150"));
    // A plaintext peer talks first instead of sending a ClientHello.
    data.write_all(b"hello\r\n").await.unwrap();

    let reply = client.read_reply().await;
    assert!(reply.starts_with("421"), "{}", reply);
}

#[tokio::test]
async fn test_explicit_tls_requires_auth_before_login() {
    let server = start_server(|config| with_tls(config, false)).await;
    let mut client = TestClient::greeted(server.addr).await;

    assert_eq!(
        client.command("USER user").await,
        "550 SSL/TLS required on the control channel."
    );
    assert!(client.command("PBSZ 0").await.starts_with("503"));

    let mut client = client.auth_tls().await;
    client.login("user", "password").await;

    // Data commands need PROT P first.
    client.pasv().await;
    assert_eq!(
        client.command("LIST").await,
        "522 SSL/TLS required on the data channel."
    );
    assert!(client.command("PROT P").await.starts_with("503"));
    assert_eq!(client.command("PBSZ 0").await, "200 PBSZ=0 successful.");
    assert_eq!(client.command("PROT C").await, "534 Unprotected data channel not allowed.");
    assert_eq!(client.command("PROT P").await, "200 Protection set to Private");

    std::fs::write(server.path("listed.txt"), b"x").unwrap();
    let data_addr = client.pasv().await;
    let data = TcpStream::connect(data_addr).await.unwrap();
    assert!(client.command("NLST").await.starts_with("150"));
    let mut data = tls_connect(data).await;
    let mut names = String::new();
    data.read_to_string(&mut names).await.unwrap();
    assert_eq!(names, "listed.txt\r\n");
    assert_eq!(client.read_reply().await, "226 Transfer complete.");
}

#[tokio::test]
async fn test_auth_without_certificate() {
    let server = start_server(|_| {}).await;
    let mut client = TestClient::greeted(server.addr).await;

    assert!(client.command("AUTH TLS").await.starts_with("534"));
    let features = client.command("FEAT").await;
    assert!(!features.contains("AUTH TLS"));
}

#[tokio::test]
async fn test_feat_advertises_tls() {
    let server = start_server(|config| with_tls(config, false)).await;
    let mut client = TestClient::greeted(server.addr).await;

    let features = client.command("FEAT").await;
    assert!(features.contains(" AUTH TLS\r\n"), "{}", features);
    assert!(features.contains(" PROT\r\n"));
    assert!(features.ends_with("211 End FEAT."));
}

#[tokio::test]
async fn test_help_lists_tls_commands() {
    let server = start_server(|config| with_tls(config, false)).await;
    let mut client = TestClient::greeted(server.addr).await;

    let help = [
        "214-The following commands are recognized:",
        " ABOR   ALLO   APPE   AUTH   CDUP   CWD    DELE   EPRT  ",
        " EPSV   FEAT   HELP   LIST   MDTM   MFMT   MKD    MLSD  ",
        " MLST   MODE   NLST   NOOP   OPTS   PASS   PASV   PBSZ  ",
        " PORT   PROT   PWD    QUIT   REIN   REST   RETR   RMD   ",
        " RNFR   RNTO   SITE   SIZE   STAT   STOR   STOU   STRU  ",
        " SYST   TYPE   USER   XCUP   XCWD   XMKD   XPWD   XRMD  ",
        "214 Help command successful.",
    ]
    .join("\r\n");
    assert_eq!(client.command("HELP").await, help);
    assert_eq!(
        client.command("HELP AUTH").await,
        "214 Syntax: AUTH <SP> TLS|SSL (set up secure control channel)."
    );
}
