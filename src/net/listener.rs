use super::router::{Reply, Request, Router};
use super::update::Query;
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Response, Server};

#[derive(Debug, Error)]
#[error("could not listen on {addr}: {reason}")]
pub struct BindError {
    pub addr: String,
    pub reason: String,
}

/// The HTTP side of the service. Requests are handled one at a time,
/// in arrival order, on the thread that calls `serve`; no two requests
/// ever touch a display at once.
pub struct Listener {
    server: Arc<Server>,
}

impl Listener {
    pub fn bind(addr: &str) -> Result<Listener, BindError> {
        let server = Server::http(addr).map_err(|e| BindError {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        info!("Listening on http://{addr}");

        Ok(Listener {
            server: Arc::new(server),
        })
    }

    /// A callback, usable from any thread, that makes `serve` return.
    pub fn shutdown_handle(&self) -> impl Fn() + Send + 'static {
        let server = Arc::clone(&self.server);
        move || server.unblock()
    }

    /// Answer requests until the shutdown handle is called.
    pub fn serve(&self, router: &mut Router) {
        for mut request in self.server.incoming_requests() {
            let reply = match decode(&mut request) {
                Ok(decoded) => router.handle(&decoded),
                Err(reply) => reply,
            };
            debug!(
                "{} {} -> {}",
                request.method(),
                request.url(),
                reply.status
            );

            let mut response = Response::from_string(reply.body).with_status_code(reply.status);
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type) {
                response.add_header(header);
            }
            if let Err(e) = request.respond(response) {
                warn!("Could not send reply: {e}");
            }
        }
        info!("Listener stopped");
    }
}

fn decode(request: &mut tiny_http::Request) -> Result<Request, Reply> {
    let (path, query) = split_target(request.url());

    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return Err(Reply::error(400, format!("Could not read request body: {e}")));
    }

    Ok(Request {
        method: request.method().clone(),
        path,
        query,
        body,
    })
}

/// Split a request target into its path and decoded query parameters.
pub fn split_target(target: &str) -> (String, Query) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let query = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    (path.to_string(), query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets() {
        let (path, query) = split_target("/display/update/0?x=1&y=2&r=3&g=4&b=5");
        assert_eq!(path, "/display/update/0");
        assert_eq!(query.len(), 5);
        assert_eq!(query["b"], "5");

        let (path, query) = split_target("/display/");
        assert_eq!(path, "/display/");
        assert!(query.is_empty());

        let (_, query) = split_target("/display/clear/0?r=%31%30&g=+1");
        assert_eq!(query["r"], "10");
        assert_eq!(query["g"], " 1");
    }
}
