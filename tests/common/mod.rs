//! Shared fixtures for integration tests: a catalog HTTP server and a
//! minimal passive-mode FTP server, both bound to 127.0.0.1:0

#![allow(dead_code)]

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub fn sample_catalog() -> Value {
    json!([
        {"id": "123", "name": "ProSieben HD|E", "country": "Germany"},
        {"id": "", "name": "BILD TV", "country": "Germany"},
        {"id": null, "name": "", "country": ""},
        {"id": 77, "name": "Sky Cinema Action FHD+", "country": "Germany"},
        "garbage"
    ])
}

/// Catalog server with a handful of well-behaved and broken endpoints
pub async fn spawn_catalog_server() -> SocketAddr {
    async fn channels() -> Json<Value> {
        Json(sample_catalog())
    }

    async fn object() -> Json<Value> {
        Json(json!({"channels": []}))
    }

    async fn broken() -> impl IntoResponse {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn html() -> impl IntoResponse {
        "<html><body>maintenance</body></html>"
    }

    let app = Router::new()
        .route("/channels", get(channels))
        .route("/object", get(object))
        .route("/broken", get(broken))
        .route("/html", get(html));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FtpBehaviour {
    pub reject_login: bool,
    pub reject_cwd: bool,
    /// Swallow CWD without ever answering it
    pub silent_cwd: bool,
}

#[derive(Debug, Default)]
pub struct FtpRecording {
    pub connected: bool,
    pub commands: Vec<String>,
    pub uploads: Vec<(String, Vec<u8>)>,
}

impl FtpRecording {
    /// Command verbs in the order the client sent them
    pub fn verbs(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.split(' ').next().unwrap_or("").to_string())
            .collect()
    }
}

/// FTP server that accepts one session and records everything it sees
pub async fn spawn_ftp_server(behaviour: FtpBehaviour) -> (SocketAddr, Arc<Mutex<FtpRecording>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let recording = Arc::new(Mutex::new(FtpRecording::default()));

    let session_recording = recording.clone();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            session_recording.lock().unwrap().connected = true;
            run_ftp_session(stream, behaviour, session_recording).await;
        }
    });

    (address, recording)
}

async fn run_ftp_session(
    stream: TcpStream,
    behaviour: FtpBehaviour,
    recording: Arc<Mutex<FtpRecording>>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut data_listener: Option<TcpListener> = None;

    let reply = |text: &str| format!("{text}\r\n");
    if writer
        .write_all(reply("220-Fake FTP\r\n220 ready").as_bytes())
        .await
        .is_err()
    {
        return;
    }

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let command = line.trim_end().to_string();
        recording.lock().unwrap().commands.push(command.clone());

        let (verb, argument) = command.split_once(' ').unwrap_or((command.as_str(), ""));
        let response = match verb {
            "USER" => reply("331 Password required"),
            "PASS" if behaviour.reject_login => reply("530 Login incorrect"),
            "PASS" => reply("230 Logged in"),
            "TYPE" => reply("200 Type set to I"),
            "CWD" if behaviour.silent_cwd => continue,
            "CWD" if behaviour.reject_cwd => reply("550 No such directory"),
            "CWD" => reply("250 Directory changed"),
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                let port = listener.local_addr().unwrap().port();
                data_listener = Some(listener);
                // Announced address is deliberately bogus
                reply(&format!(
                    "227 Entering Passive Mode (10,255,255,1,{},{})",
                    port / 256,
                    port % 256
                ))
            }
            "STOR" => {
                let Some(listener) = data_listener.take() else {
                    let _ = writer.write_all(reply("425 Use PASV first").as_bytes()).await;
                    continue;
                };
                if writer
                    .write_all(reply("150 Opening data connection").as_bytes())
                    .await
                    .is_err()
                {
                    return;
                }
                let (mut data, _) = listener.accept().await.unwrap();
                let mut bytes = Vec::new();
                data.read_to_end(&mut bytes).await.unwrap();
                recording
                    .lock()
                    .unwrap()
                    .uploads
                    .push((argument.to_string(), bytes));
                reply("226 Transfer complete")
            }
            "QUIT" => {
                let _ = writer.write_all(reply("221 Bye").as_bytes()).await;
                return;
            }
            _ => reply("502 Command not implemented"),
        };

        if writer.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Server that accepts connections and never writes a byte
pub async fn spawn_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut sink = Vec::new();
                let _ = stream.read_to_end(&mut sink).await;
            });
        }
    });
    address
}

/// A local port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
