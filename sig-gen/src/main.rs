use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use proxy_guard::services::signing::{
    Secret, SignaturePayload, core::now_ms, generate_signature, hash_body,
    headers::signature_headers,
};
use uuid::Uuid;

/// Sign a proxied request with the shared HMAC secret.
///
/// - Hashes the body (SHA-256, hex)
/// - Builds the canonical payload (timestamp, method, path, body hash, token id, nonce)
/// - Outputs the signature headers, or a JSON body for `POST /api/v1/signatures/verify`
#[derive(Parser, Debug)]
#[command(name = "sig-gen", version, about)]
struct Args {
    /// Shared signing secret
    #[arg(long, env = "SIGNING_SECRET", hide_env_values = true)]
    secret: String,

    /// HTTP method e.g. GET/POST
    #[arg(long, default_value = "POST")]
    method: String,

    /// Request target as sent (path + optional query), e.g. /v1/chat/completions
    #[arg(long)]
    path: String,

    /// Token identifier the request is made with
    #[arg(long)]
    token_id: String,

    /// Request body as a string
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the request body from a file
    #[arg(long, value_name = "FILE")]
    body_file: Option<PathBuf>,

    /// Override the nonce. Default: random UUID v4.
    #[arg(long)]
    nonce: Option<String>,

    /// Override the timestamp (epoch milliseconds). Default: now.
    #[arg(long)]
    timestamp: Option<i64>,

    /// Print a JSON body for /api/v1/signatures/verify instead of headers
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print only the signature (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn read_body(args: &Args) -> Result<Vec<u8>> {
    match (&args.body, &args.body_file) {
        (Some(body), None) => Ok(body.as_bytes().to_vec()),
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        (None, None) => Ok(Vec::new()),
        (Some(_), Some(_)) => bail!("--body and --body-file are mutually exclusive"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.secret.is_empty() {
        bail!("signing secret must not be empty");
    }

    let body = read_body(&args)?;
    let payload = SignaturePayload::new(
        args.timestamp.unwrap_or_else(now_ms),
        args.method.to_ascii_uppercase(),
        args.path.clone(),
        hash_body(&body),
        args.token_id.clone(),
        args.nonce.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
    );
    payload
        .validate()
        .context("payload cannot be signed as given")?;

    let signature = generate_signature(&payload, &Secret::from(args.secret.as_str()));

    if args.quiet {
        println!("{}", signature);
        return Ok(());
    }

    if args.json {
        let mut value = serde_json::to_value(&payload)?;
        value["signature"] = serde_json::Value::String(signature);
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (name, value) in signature_headers(&payload, &signature) {
        println!("{}: {}", name, value);
    }

    Ok(())
}
