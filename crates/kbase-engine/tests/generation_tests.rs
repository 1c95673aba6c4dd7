use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use kbase_core::config::GenerationSettings;
use kbase_core::traits::TextGenerator;
use kbase_engine::OpenAiChatGenerator;

/// Serves exactly one HTTP response and hands back the request it received.
async fn one_shot_server(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        request
    });
    (format!("http://{addr}/v1"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok()).flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn settings_for(base_url: String) -> GenerationSettings {
    GenerationSettings { base_url, model: "test-model".to_string(), timeout_secs: 5, ..GenerationSettings::default() }
}

#[tokio::test]
async fn posts_chat_completion_and_reads_first_choice() {
    let reply = json!({ "choices": [ { "message": { "role": "assistant", "content": "  Reset it from the login page.  " } } ] });
    let (base_url, server) = one_shot_server("200 OK", reply.to_string()).await;

    let generator = OpenAiChatGenerator::new(&settings_for(base_url), "sk-test").expect("client");
    assert_eq!(generator.name(), "test-model");
    let answer = generator.generate("How do I reset my password?", "Article: Password Reset\nbody").await.expect("generate");
    assert_eq!(answer, "Reset it from the login page.");

    let request = server.await.expect("server task");
    assert!(request.starts_with("POST /v1/chat/completions"), "{request}");
    assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    let body_start = request.find("\r\n\r\n").expect("headers") + 4;
    let body: Value = serde_json::from_str(&request[body_start..]).expect("json body");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["max_tokens"], 500);
    assert_eq!(body["messages"][0]["role"], "system");
    let user = body["messages"][1]["content"].as_str().expect("user prompt");
    assert!(user.contains("Question: How do I reset my password?"));
    assert!(user.contains("Article: Password Reset"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base_url, server) = one_shot_server("500 Internal Server Error", json!({ "error": "boom" }).to_string()).await;
    let generator = OpenAiChatGenerator::new(&settings_for(base_url), "sk-test").expect("client");
    let err = generator.generate("q", "ctx").await.unwrap_err();
    assert!(err.to_string().contains("500"), "{err}");
    server.await.expect("server task");
}

#[tokio::test]
async fn response_without_choices_is_an_error() {
    let (base_url, server) = one_shot_server("200 OK", json!({ "choices": [] }).to_string()).await;
    let generator = OpenAiChatGenerator::new(&settings_for(base_url), "sk-test").expect("client");
    assert!(generator.generate("q", "ctx").await.is_err());
    server.await.expect("server task");
}

#[tokio::test]
async fn disabled_generation_builds_nothing() {
    let settings = GenerationSettings { enabled: false, api_key: "sk-test".to_string(), ..GenerationSettings::default() };
    assert!(OpenAiChatGenerator::from_settings(&settings).expect("settings").is_none());
}

#[tokio::test]
async fn configured_key_enables_generation() {
    let settings = GenerationSettings { api_key: "sk-test".to_string(), ..GenerationSettings::default() };
    assert!(OpenAiChatGenerator::from_settings(&settings).expect("settings").is_some());
}
