//! Streaming chat example against a running training backend.
//!
//! Run with:
//! ```bash
//! export SIMTRAIN_BASE_URL="http://localhost:8080/api/social-worker/simulation"
//! export SIMTRAIN_TOKEN="your-token"   # optional
//! cargo run --example stream_chat
//! ```

use std::io::Write;

use simtrain::client::TrainingClient;
use simtrain::model::{ChatRequest, Turn};
use simtrain::options::TransportOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("SIMTRAIN_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8080/api/social-worker/simulation".to_string());

    let mut options = TransportOptions::new(base_url);
    if let Ok(token) = std::env::var("SIMTRAIN_TOKEN") {
        options = options.with_credential(token);
    }

    let client = TrainingClient::new(options)?;

    let session = client.start_session(1).await?;
    println!("session {} started", session.id);

    let request = ChatRequest::new(
        session.id,
        "你今天过得怎么样？",
        vec![Turn::user("你好呀"), Turn::ai("……嗯。姐姐好。")],
    );

    client
        .send_stream(
            request,
            |fragment| {
                print!("{}", fragment);
                let _ = std::io::stdout().flush();
            },
            || println!("\n[complete]"),
        )
        .await;

    Ok(())
}
