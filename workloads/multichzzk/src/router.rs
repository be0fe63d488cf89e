//! Request routing.
//!
//! Every request runs through the same fixed sequence: method gate, host
//! canonicalization, preflight, then either the static-asset branch (path
//! contains a `.`) or the embed page.

use edge_core::{allow_header_value, Method, RequestContext, SiteConfig};
use edge_observability::StructuredLogger;
use edge_security::SecurityHeaders;
use edge_storage::{GetOptions, ObjectStore};
use http::header::{self, HeaderValue};
use http::{Request, Response, StatusCode};

use crate::error::HandlerResult;
use crate::page::{self, InlineAssets};
use crate::stream::{chat_entries, parse_path, StreamRef};

/// Workload name used in logs.
pub const WORKLOAD: &str = "multichzzk";

/// Response body. `None` means no body is sent.
pub type Body = Option<Vec<u8>>;

/// Handle one request.
///
/// HEAD responses carry the same status and headers as GET but never a
/// body. Store failures are returned as errors.
pub async fn handle<B, S>(
    req: &Request<B>,
    store: &S,
    config: &SiteConfig,
) -> HandlerResult<Response<Body>>
where
    S: ObjectStore + ?Sized,
{
    let ctx = RequestContext::from_http(req);
    let logger = StructuredLogger::for_request(&ctx)
        .with_workload(WORKLOAD)
        .with_format(config.log_format);

    logger
        .info_builder("Request started")
        .field("host", ctx.host.as_str())
        .emit();

    let result = dispatch(&ctx, store, config, &logger).await;

    match result {
        Ok(mut response) => {
            if ctx.is_head() {
                *response.body_mut() = None;
            }
            logger
                .info_builder("Request completed")
                .field_u64("status", u64::from(response.status().as_u16()))
                .emit();
            Ok(response)
        }
        Err(e) => {
            logger
                .error_builder("Request failed")
                .field("error", e.to_string())
                .emit();
            Err(e)
        }
    }
}

async fn dispatch<S>(
    ctx: &RequestContext,
    store: &S,
    config: &SiteConfig,
    logger: &StructuredLogger,
) -> HandlerResult<Response<Body>>
where
    S: ObjectStore + ?Sized,
{
    if !ctx.method.is_allowed() {
        logger
            .warn_builder("Method not allowed")
            .field("method", ctx.method.as_str())
            .emit();
        return Ok(Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(header::ALLOW, allow_header_value())
            .body(Some(b"Method Not Allowed".to_vec()))?);
    }

    if ctx.host != config.canonical_host {
        let location = config.canonical_url(&ctx.path);
        logger
            .debug_builder("Redirecting to canonical host")
            .field("location", location.as_str())
            .emit();
        return Ok(Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(header::LOCATION, HeaderValue::from_str(&location)?)
            .body(None)?);
    }

    if ctx.method == Method::Options {
        return Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(header::ALLOW, allow_header_value())
            .body(None)?);
    }

    if ctx.path.contains('.') {
        logger.debug("Static asset branch");
        serve_static(ctx, store, logger).await
    } else {
        logger.debug("Embed page branch");
        serve_page(ctx, config, logger)
    }
}

async fn serve_static<S>(
    ctx: &RequestContext,
    store: &S,
    logger: &StructuredLogger,
) -> HandlerResult<Response<Body>>
where
    S: ObjectStore + ?Sized,
{
    let key = ctx.path.strip_prefix('/').unwrap_or(&ctx.path);

    let object = if ctx.is_head() {
        store.head(key).await?
    } else {
        let options = GetOptions::from_headers(&ctx.headers);
        store.get(key, &options).await?
    };

    let Some(object) = object else {
        logger.info_builder("Static object not found").field("key", key).emit();
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Some(b"Not Found".to_vec()))?);
    };

    // Status follows the request's Range header, not the store's range
    let status = if ctx.is_head() || object.has_body() {
        if ctx.headers.contains_key(header::RANGE) {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        }
    } else {
        StatusCode::NOT_MODIFIED
    };

    let etag = HeaderValue::from_str(&object.http_etag())?;
    let content_range = object
        .content_range()
        .map(|v| HeaderValue::from_str(&v))
        .transpose()?;

    let mut response = Response::builder().status(status).body(None)?;
    let headers = response.headers_mut();
    object.write_http_metadata(headers);
    headers.insert(header::ETAG, etag);
    if let Some(content_range) = content_range {
        headers.insert(header::CONTENT_RANGE, content_range);
    }

    logger
        .debug_builder("Static object served")
        .field("key", key)
        .field_u64("size", object.size)
        .field_bool("has_body", object.has_body())
        .emit();

    *response.body_mut() = object.body;
    Ok(response)
}

fn serve_page(
    ctx: &RequestContext,
    config: &SiteConfig,
    logger: &StructuredLogger,
) -> HandlerResult<Response<Body>> {
    let streams: Vec<StreamRef> = parse_path(&ctx.path, &config.canonical_host).collect();
    let chats = chat_entries(&streams);
    let assets = InlineAssets::shared();

    logger
        .debug_builder("Rendering embed page")
        .field_u64("streams", streams.len() as u64)
        .field_u64("chats", chats.len() as u64)
        .emit();

    let html = page::render(&streams, &chats, &config.canonical_host, assets);
    let security = SecurityHeaders::new().with_csp(page::content_security_policy(assets));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8");
    for (name, value) in security.to_pairs() {
        builder = builder.header(name, value);
    }

    Ok(builder.body(Some(html.into_bytes()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use edge_storage::{HttpMetadata, MemoryStore, StorageError};
    use futures::executor::block_on;

    const FAVICON: &[u8] = b"0123456789";

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_object(
                "favicon.ico",
                FAVICON,
                HttpMetadata::with_content_type("image/x-icon").cache_control("max-age=86400"),
            )
            .with_object(
                "manifest.webmanifest",
                br#"{"name":"MultiChzzk.tv"}"#.to_vec(),
                HttpMetadata::with_content_type("application/manifest+json"),
            )
    }

    fn request(method: &str, host: &str, uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri).header("host", host);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn run(req: Request<()>) -> Response<Body> {
        block_on(handle(&req, &store(), &SiteConfig::default())).unwrap()
    }

    fn get(uri: &str) -> Response<Body> {
        run(request("GET", "multichzzk.tv", uri, &[]))
    }

    fn body_text(response: &Response<Body>) -> String {
        String::from_utf8(response.body().clone().unwrap_or_default()).unwrap()
    }

    #[test]
    fn test_disallowed_methods() {
        for method in ["POST", "PUT", "DELETE", "PATCH"] {
            let response = run(request(method, "multichzzk.tv", "/", &[]));
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()["allow"], "OPTIONS, GET, HEAD");
            assert_eq!(body_text(&response), "Method Not Allowed");
        }
    }

    #[test]
    fn test_method_gate_runs_before_redirect() {
        let response = run(request("POST", "example.com", "/twitch", &[]));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_non_canonical_host_redirects() {
        let response = run(request("GET", "www.multichzzk.tv", "/twitch/a:afreeca", &[]));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()["location"],
            "https://multichzzk.tv/twitch/a:afreeca"
        );
        assert!(response.body().is_none());

        let response = run(request("GET", "other.example:8080", "/favicon.ico?v=2", &[]));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()["location"], "https://multichzzk.tv/favicon.ico");

        let response = run(request("OPTIONS", "other.example", "/", &[]));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    }

    #[test]
    fn test_host_comparison_ignores_case_and_port() {
        let response = run(request("GET", "MultiChzzk.TV:443", "/", &[]));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_custom_canonical_host() {
        let config = SiteConfig {
            canonical_host: "localhost".into(),
            ..SiteConfig::default()
        };
        let req = request("GET", "localhost:3000", "/somehandle123", &[]);
        let response = block_on(handle(&req, &store(), &config)).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(&response).contains("parent=localhost"));

        let req = request("GET", "multichzzk.tv", "/", &[]);
        let response = block_on(handle(&req, &store(), &config)).unwrap();
        assert_eq!(response.headers()["location"], "https://localhost/");
    }

    #[test]
    fn test_options_preflight() {
        let response = run(request("OPTIONS", "multichzzk.tv", "/anything", &[]));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["allow"], "OPTIONS, GET, HEAD");
        assert!(response.body().is_none());
    }

    #[test]
    fn test_static_get() {
        let response = get("/favicon.ico");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_deref(), Some(FAVICON));
        assert_eq!(response.headers()["content-type"], "image/x-icon");
        assert_eq!(response.headers()["cache-control"], "max-age=86400");

        let etag = response.headers()["etag"].to_str().unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(response.headers().get("content-range").is_none());
        assert!(response.headers().get("content-security-policy").is_none());
    }

    #[test]
    fn test_static_head() {
        let get_response = get("/favicon.ico");
        let head_response = run(request("HEAD", "multichzzk.tv", "/favicon.ico", &[]));

        assert_eq!(head_response.status(), StatusCode::OK);
        assert!(head_response.body().is_none());
        assert_eq!(head_response.headers()["etag"], get_response.headers()["etag"]);
        assert_eq!(head_response.headers()["content-type"], "image/x-icon");
    }

    #[test]
    fn test_static_missing() {
        let response = get("/missing.png");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(&response), "Not Found");

        let response = run(request("HEAD", "multichzzk.tv", "/missing.png", &[]));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.body().is_none());
    }

    #[test]
    fn test_static_range() {
        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("range", "bytes=2-5")],
        ));
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["content-range"], "bytes 2-5/10");
        assert_eq!(response.body().as_deref(), Some(&b"2345"[..]));

        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("range", "bytes=-3")],
        ));
        assert_eq!(response.headers()["content-range"], "bytes 7-9/10");
    }

    #[test]
    fn test_unparsable_range_serves_full_body() {
        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("range", "items=0-1")],
        ));
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.body().as_deref(), Some(FAVICON));
        assert!(response.headers().get("content-range").is_none());
    }

    #[test]
    fn test_head_with_range_reports_partial() {
        let response = run(request(
            "HEAD",
            "multichzzk.tv",
            "/favicon.ico",
            &[("range", "bytes=0-1")],
        ));
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert!(response.body().is_none());
    }

    #[test]
    fn test_static_not_modified() {
        let etag = get("/favicon.ico").headers()["etag"].to_str().unwrap().to_string();

        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("if-none-match", etag.as_str())],
        ));
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.body().is_none());
        assert_eq!(response.headers()["etag"], etag.as_str());

        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("if-none-match", "\"something-else\"")],
        ));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_static_if_match_mismatch() {
        let etag = get("/favicon.ico").headers()["etag"].to_str().unwrap().to_string();

        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("if-match", "\"something-else\"")],
        ));
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.body().is_none());
        assert_eq!(response.headers()["etag"], etag.as_str());

        // A weak tag never satisfies If-Match
        let weak = format!("W/{}", etag);
        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("if-match", weak.as_str())],
        ));
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let response = run(request(
            "GET",
            "multichzzk.tv",
            "/favicon.ico",
            &[("if-match", etag.as_str())],
        ));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_deref(), Some(FAVICON));
    }

    #[test]
    fn test_unsatisfiable_range_is_an_error() {
        let req = request("GET", "multichzzk.tv", "/favicon.ico", &[("range", "bytes=50-")]);
        let result = block_on(handle(&req, &store(), &SiteConfig::default()));
        assert!(matches!(
            result,
            Err(HandlerError::Storage(StorageError::RangeNotSatisfiable { size: 10 }))
        ));
    }

    #[test]
    fn test_page_headers() {
        let response = get("/");
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers["content-type"], "text/html; charset=utf-8");
        assert_eq!(
            headers["strict-transport-security"],
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers["x-content-type-options"], "nosniff");

        let csp = headers["content-security-policy"].to_str().unwrap();
        assert!(csp.starts_with("base-uri 'self'; default-src 'self'; script-src 'sha256-"));
        assert!(csp.contains("object-src 'none'"));
    }

    #[test]
    fn test_help_page_for_empty_path() {
        let body = body_text(&get("/"));
        assert!(body.contains("<h1>MultiChzzk.tv</h1>"));
        assert!(body.contains("y:YouTube 영상 아이디"));

        // Unrecognized segments fall back to help as well
        let body = body_text(&get("/no!"));
        assert!(body.contains("<h1>MultiChzzk.tv</h1>"));
    }

    #[test]
    fn test_page_with_streams() {
        let body = body_text(&get("/abcdef1234567890abcdef1234567890/twitch/a:afreeca/y:youtube-_id"));
        assert_eq!(body.matches("allowfullscreen").count(), 4);
        assert!(body.contains(r#"target="chat">닫기</a>"#));
        assert!(!body.contains("<h1>"));
    }

    #[test]
    fn test_page_head_has_no_body() {
        let get_response = get("/twitch");
        let head_response = run(request("HEAD", "multichzzk.tv", "/twitch", &[]));

        assert_eq!(head_response.status(), StatusCode::OK);
        assert!(head_response.body().is_none());
        assert_eq!(
            head_response.headers()["content-security-policy"],
            get_response.headers()["content-security-policy"]
        );
    }

    #[test]
    fn test_page_is_idempotent() {
        let first = get("/twitch/y:dQw4w9WgXcQ");
        let second = get("/twitch/y:dQw4w9WgXcQ");

        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(first.body(), second.body());
    }

    #[test]
    fn test_dot_anywhere_selects_static_branch() {
        let response = get("/twitch/some.thing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
