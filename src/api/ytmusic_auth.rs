use anyhow::{anyhow, Context, Result};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

/// Request headers captured from an authenticated browser session.
/// Keys are lower-cased.
pub type BrowserHeaders = BTreeMap<String, String>;

pub const ORIGIN: &str = "https://music.youtube.com";

// Headers that must not be replayed from the browser capture.
const DROPPED_HEADERS: &[&str] = &[
    "accept-encoding",
    "authorization",
    "connection",
    "content-encoding",
    "content-length",
    "host",
];

/// Extract the SAPISID value used for request signing from a cookie header.
pub fn sapisid_from_cookie(cookie: &str) -> Option<String> {
    let pairs: Vec<(&str, &str)> = cookie
        .split(';')
        .filter_map(|kv| kv.trim().split_once('='))
        .collect();
    ["__Secure-3PAPISID", "SAPISID"].iter().find_map(|wanted| {
        pairs
            .iter()
            .find(|(k, v)| k == wanted && !v.is_empty())
            .map(|(_, v)| v.to_string())
    })
}

/// `SAPISIDHASH <ts>_<sha1("<ts> <sapisid> <origin>")>`
pub fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let digest = Sha1::digest(format!("{} {} {}", timestamp, sapisid, origin).as_bytes());
    format!("SAPISIDHASH {}_{}", timestamp, hex::encode(digest))
}

fn normalize(headers: impl IntoIterator<Item = (String, String)>) -> Result<BrowserHeaders> {
    let mut out = BrowserHeaders::new();
    for (k, v) in headers {
        let k = k.trim().to_ascii_lowercase();
        if k.is_empty() || k.starts_with(':') || DROPPED_HEADERS.contains(&k.as_str()) {
            continue;
        }
        out.insert(k, v.trim().to_string());
    }
    let cookie = out.get("cookie").ok_or_else(|| anyhow!("no cookie header in credentials"))?;
    if sapisid_from_cookie(cookie).is_none() {
        return Err(anyhow!("cookie does not contain SAPISID; copy the headers of a logged-in request"));
    }
    Ok(out)
}

/// Parse raw request headers as copied from browser dev tools
/// ("name: value" per line).
pub fn parse_raw_headers(raw: &str) -> Result<BrowserHeaders> {
    let pairs = raw.lines().filter_map(|line| {
        // pseudo headers like ":authority: ..." start with the separator
        let (k, v) = if let Some(rest) = line.strip_prefix(':') {
            let (k, v) = rest.split_once(':')?;
            (format!(":{}", k), v)
        } else {
            let (k, v) = line.split_once(':')?;
            (k.to_string(), v)
        };
        Some((k, v.to_string()))
    });
    normalize(pairs)
}

/// Load the credential file (a JSON object of header name -> value).
pub fn load_headers_file(path: &Path) -> Result<BrowserHeaders> {
    let s = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: BTreeMap<String, String> =
        serde_json::from_str(&s).map_err(|e| anyhow!("parse credential json: {}", e))?;
    normalize(raw)
}

pub fn save_headers_file(path: &Path, headers: &BrowserHeaders) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(headers)?)?;
    Ok(())
}

/// Interactive helper: the user pastes the request headers of any
/// authenticated music.youtube.com request and we store them as the
/// credential file.
pub fn run_auth_setup(output: &Path) -> Result<()> {
    println!("Open https://music.youtube.com in a logged-in browser, open the network tab,");
    println!("copy the request headers of any POST to /youtubei/v1/browse and paste them here.");
    println!("Finish with an empty line:");

    let mut raw = String::new();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        raw.push_str(&line);
        raw.push('\n');
    }
    if raw.trim().is_empty() {
        return Err(anyhow!("no input provided"));
    }

    let headers = parse_raw_headers(&raw)?;
    save_headers_file(output, &headers)?;

    info!("YouTube Music credentials saved to {}", output.display());
    println!("Saved {} header(s) to {}.", headers.len(), output.display());
    Ok(())
}
