use super::error::RequestError;
use super::registry::Registry;
use super::update::Query;
use log::{info, warn};
use tiny_http::Method;


pub const DEFAULT_BASE: &str = "/display";

/// An inbound request, already decoded from the transport.
pub struct Request {
    pub method: Method,
    // Path without the query string.
    pub path: String,
    pub query: Query,
    pub body: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn text(body: String) -> Reply {
        Reply {
            status: 200,
            content_type: "text/plain; charset=utf-8",
            body,
        }
    }

    pub fn html(body: String) -> Reply {
        Reply {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    pub fn error(status: u16, message: String) -> Reply {
        Reply {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message,
        }
    }
}

// What a path under the base addresses. IDs are kept as the raw token;
// an empty segment means no ID was given.
#[derive(Debug, PartialEq, Eq)]
enum Route<'p> {
    Index,
    Query(Option<&'p str>),
    Specs(Option<&'p str>),
    AllSpecs,
    Update(Option<&'p str>),
    Clear(Option<&'p str>),
    Display(Option<&'p str>),
}

fn token(segment: &str) -> Option<&str> {
    (!segment.is_empty()).then_some(segment)
}

fn parse_route<'p>(base: &str, path: &'p str) -> Option<Route<'p>> {
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(Route::Index);
    }

    let segments: Vec<&str> = rest.strip_prefix('/')?.split('/').collect();
    let route = match segments.as_slice() {
        [""] => Route::Index,
        ["query", id] => Route::Query(token(*id)),
        ["specs", ""] => Route::AllSpecs,
        ["specs", id] => Route::Specs(token(*id)),
        ["update", id] => Route::Update(token(*id)),
        ["clear", id] => Route::Clear(token(*id)),
        [id] => Route::Display(token(*id)),
        _ => return None,
    };
    Some(route)
}

/// Dispatches requests under a base path to one registry.
pub struct Router<'a> {
    base: String,
    registry: &'a mut Registry,
}

impl<'a> Router<'a> {
    pub fn new(base: &str, registry: &'a mut Registry) -> Router<'a> {
        Router {
            base: base.trim_end_matches('/').to_string(),
            registry,
        }
    }

    pub fn handle(&mut self, request: &Request) -> Reply {
        let Some(route) = parse_route(&self.base, &request.path) else {
            info!("{} {}: no such resource", request.method, request.path);
            return Reply::error(404, format!("No resource at {}", request.path));
        };

        let registry = &mut *self.registry;
        let result = match (route, &request.method) {
            (Route::Index, Method::Get) => Ok(Reply::html(format!(
                "<b>{} displays found!</b>",
                registry.len()
            ))),
            (Route::Query(id), Method::Get) => registry
                .describe(id)
                .map(|text| Reply::html(format!("<b>{text}</b>"))),
            (Route::Specs(id), Method::Get) => registry.specs(id).map(Reply::text),
            (Route::AllSpecs, Method::Get) => Ok(Reply::text(registry.all_specs())),
            (Route::Display(id), Method::Get) => registry.framebuffer(id).map(Reply::text),
            (Route::Display(id), Method::Put) | (Route::Update(id), Method::Get) => registry
                .update(id, &request.query, &request.body)
                .map(|_| Reply::text("OK".to_string())),
            (Route::Display(id), Method::Delete) | (Route::Clear(id), Method::Get) => registry
                .clear(id, &request.query)
                .map(|_| Reply::text("OK".to_string())),
            _ => {
                return Reply::error(
                    405,
                    format!("{} is not supported on {}", request.method, request.path),
                )
            }
        };

        result.unwrap_or_else(|e: RequestError| {
            warn!("{} {}: {}", request.method, request.path, e);
            Reply::error(e.status_code(), e.to_string())
        })
    }
}
