//! Loopback HTTP fixtures shared by provider and gateway tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use crate::config::{Config, SafetySettings};
use crate::model::ModelProvider;

pub(crate) fn test_config(base_url: &str) -> Config {
    Config {
        api_key: "test-key".to_string(),
        model_provider: ModelProvider::Gemini,
        model: "gemini-2.5-flash".to_string(),
        model_base_url: base_url.to_string(),
        system_prompt: String::new(),
        model_timeout_secs: 5,
        safety_settings: SafetySettings::default(),
    }
}

/// Base URL of a port nothing is listening on.
pub(crate) fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}")
}

/// Serves one HTTP response and hands back the raw request it received.
pub(crate) fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().expect("content length");
            }
            head.push_str(&line);
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).expect("read body");

        let mut stream = stream;
        write!(
            stream,
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write response");

        head + String::from_utf8_lossy(&request_body).as_ref()
    });
    (format!("http://{addr}"), handle)
}
