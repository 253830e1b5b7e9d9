//! HTTP/1.1 listener.
//!
//! One task per connection, one request per connection. The response is
//! written with `Connection: close` and the socket is shut down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use drop_content::ContentBackend;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{SiteError, SiteResult};
use crate::http::{HttpRequest, HttpResponse};
use crate::storefront::Storefront;

/// Largest accepted request head.
pub const MAX_HEAD_SIZE: usize = 16 * 1024;

/// Largest accepted request body.
pub const MAX_BODY_SIZE: usize = 64 * 1024;

const DRAIN_LIMIT: usize = 1024 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Accepts connections until `shutdown` is cancelled.
pub async fn serve<B>(
    listener: TcpListener,
    storefront: Arc<Storefront<B>>,
    shutdown: CancellationToken,
) -> SiteResult<()>
where
    B: ContentBackend + 'static,
{
    let local = listener.local_addr()?;
    info!("Storefront listening on http://{}", local);

    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };

        let storefront = storefront.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => debug!("Dropped connection from {} on shutdown", peer),
                result = handle_connection(stream, peer, storefront.as_ref()) => {
                    if let Err(e) = result {
                        debug!("Connection from {} failed: {}", peer, e);
                    }
                }
            }
        });
    }

    info!("Storefront on {} stopped", local);
    Ok(())
}

async fn handle_connection<B: ContentBackend>(
    mut stream: TcpStream,
    peer: SocketAddr,
    storefront: &Storefront<B>,
) -> SiteResult<()> {
    let mut rejected = false;
    let response = match read_request(&mut stream).await {
        Ok(request) => {
            let mut response = storefront.handle(&request).await;
            debug!(
                "{} {} {} -> {}",
                peer, request.method, request.path, response.status_code
            );
            if request.method == "HEAD" {
                let length = response.body.len();
                response.body.clear();
                response = response.with_header("Content-Length", length.to_string());
            }
            response
        }
        Err(SiteError::TooLarge(what)) => {
            debug!("Rejected oversized request from {}: {}", peer, what);
            rejected = true;
            let status = if what == "head" { 431 } else { 413 };
            HttpResponse::new(status)
        }
        Err(SiteError::HttpError(msg)) => {
            debug!("Bad request from {}: {}", peer, msg);
            rejected = true;
            HttpResponse::new(400)
        }
        Err(e) => return Err(e),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await?;
    if rejected {
        drain(&mut stream).await;
    }
    Ok(())
}

/// Reads and discards what the client is still sending so closing does not
/// reset the connection before the response is delivered.
async fn drain(stream: &mut TcpStream) {
    let mut chunk = [0u8; 4096];
    let mut remaining = DRAIN_LIMIT;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, async {
        while remaining > 0 {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => remaining = remaining.saturating_sub(n),
            }
        }
    })
    .await;
}

/// Reads one request head and its `Content-Length` body.
async fn read_request(stream: &mut TcpStream) -> SiteResult<HttpRequest> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Err(SiteError::TooLarge("head".to_string()));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(SiteError::HttpError("connection closed mid-request".to_string()));
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    if head_end > MAX_HEAD_SIZE {
        return Err(SiteError::TooLarge("head".to_string()));
    }

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| SiteError::HttpError("request head is not UTF-8".to_string()))?;
    let mut request = HttpRequest::parse_head(head)?;

    let length = match request.get_header("Content-Length") {
        Some(_) => request
            .content_length()
            .ok_or_else(|| SiteError::HttpError("invalid Content-Length".to_string()))?,
        None => 0,
    };
    if length > MAX_BODY_SIZE {
        return Err(SiteError::TooLarge("body".to_string()));
    }

    let mut body = buf.split_off(head_end + 4);
    while body.len() < length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(SiteError::HttpError("connection closed mid-body".to_string()));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(length);
    request.body = body;

    Ok(request)
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
