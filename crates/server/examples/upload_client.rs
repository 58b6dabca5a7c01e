//! Walk through the drawgate API against a running server
//!
//! ```text
//! cargo run -p drawgate-server --example upload_client -- path/to/drawing.pdf
//! ```

use reqwest::multipart::{Form, Part};
use reqwest::Client;

const SERVER_URL: &str = "http://localhost:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: upload_client <drawing.png|jpg|pdf>"))?;

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Upload a drawing
    println!("2. Upload Drawing:");
    let filename = std::path::Path::new(&path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());
    let content_type = match filename.rsplit('.').next().map(str::to_ascii_lowercase) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "pdf" => "application/pdf",
        _ => "application/octet-stream",
    };
    let bytes = tokio::fs::read(&path).await?;
    let part = Part::bytes(bytes)
        .file_name(filename)
        .mime_str(content_type)?;
    let resp = client
        .post(format!("{SERVER_URL}/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Unsupported type is rejected
    println!("3. Upload Unsupported Type:");
    let part = Part::bytes(b"plain text".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")?;
    let resp = client
        .post(format!("{SERVER_URL}/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: List uploaded files
    println!("4. List Files:");
    let resp = client.get(format!("{SERVER_URL}/files")).send().await?;
    println!("Status: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    println!("Body: {}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
