use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, ETAG};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client CLI for the HTTP/CoAP gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a CoAP resource through the direct prefix
    Get {
        /// Target address, e.g. coap://host:5683/sensors/temp
        target: String,

        /// Accept header to negotiate with
        #[arg(short, long)]
        accept: Option<String>,

        /// Cache-Control header to forward
        #[arg(short, long)]
        cache_control: Option<String>,
    },
    /// Write a CoAP resource through the direct prefix
    Put {
        /// Target address, e.g. coap://host:5683/actuators/led
        target: String,

        /// Request body
        body: String,

        /// Content type of the body
        #[arg(short, long, default_value = "text/plain")]
        content_type: String,
    },
    /// Poll an observed resource through the observe prefix
    Poll {
        /// Target address, e.g. coap://host:5683/sensors/temp
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Get {
            target,
            accept,
            cache_control,
        } => {
            let mut headers = HeaderMap::new();
            if let Some(accept) = accept {
                headers.insert(ACCEPT, HeaderValue::from_str(&accept)?);
            }
            if let Some(cache_control) = cache_control {
                headers.insert(CACHE_CONTROL, HeaderValue::from_str(&cache_control)?);
            }
            let res = client
                .get(format!("{}/proxy/{}", cli.url, target))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Put {
            target,
            body,
            content_type,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
            let res = client
                .put(format!("{}/proxy/{}", cli.url, target))
                .headers(headers)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Poll { target } => {
            let res = client
                .get(format!("{}/proxy-ob/{}", cli.url, target))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    println!("Status: {}", status);

    if let Some(etag) = res.headers().get(ETAG).and_then(|v| v.to_str().ok()) {
        println!("ETag: {}", etag);
    }
    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !content_type.is_empty() {
        println!("Content-Type: {}", content_type);
    }

    let body = res.text().await?;
    if body.is_empty() {
        return Ok(());
    }
    if content_type.starts_with("application/json") {
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", body),
        }
    } else {
        println!("{}", body);
    }
    Ok(())
}
