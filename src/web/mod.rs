//! Browser dashboard for sawah.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The live dashboard page and the analysis page
//! - JSON API endpoints backed by the same controllers as the terminal views
//!
//! Launched via `sawah web` (default: `http://127.0.0.1:9750`).

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::SawahConfig;
use crate::device::{Device, HttpDevice};
use crate::events::{self, EventKind};

pub use api::{ApiBody, ApiReply, WebApp};

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on `config.web.addr`.
///
/// Blocks the current thread. Requests are handled sequentially; the app
/// state is owned by this loop and handed to each handler.
pub fn serve(config: &SawahConfig, open: bool) -> Result<()> {
    let addr = config.web.addr.as_str();
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("sawah dashboard running at http://{addr}");
    println!("Device: {}", config.device.base_url);
    println!("Press Ctrl+C to stop.\n");
    events::record(EventKind::Served, format!("dashboard on http://{addr}"));

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    let mut app = WebApp::new(HttpDevice::from_config(&config.device), config);
    run_loop(&server, &mut app);
    Ok(())
}

fn run_loop<D: Device>(server: &Server, app: &mut WebApp<D>) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let body = read_body(&mut request);

        let response = match dispatch(app, &method, &url, body.as_deref()) {
            Ok(resp) => resp,
            Err(e) => {
                let body = serde_json::json!({ "error": format!("{e:#}") }).to_string();
                Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500))
            }
        };
        let status = response.status_code().0;
        let _ = request.respond(response);

        // Brief access log; the live endpoint would flood it.
        if !url.starts_with("/api/live") {
            println!(
                "{} {} {} {}",
                method,
                url,
                status,
                chrono::Local::now().format("%H:%M:%S")
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch<D: Device>(
    app: &mut WebApp<D>,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    let reply = match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            return Ok(html_response(frontend::DASHBOARD_HTML));
        }
        (&Method::Get, "/analysis.html") => return Ok(html_response(frontend::ANALYSIS_HTML)),

        (&Method::Get, "/api/settings") => app.settings(),
        (&Method::Get, "/api/live") => app.live(),
        (&Method::Post, "/api/control") => app.control(body.unwrap_or("{}")),
        (&Method::Get, "/api/analysis") => app.analysis(),
        (&Method::Get, "/api/analysis/export.csv") => app.export_csv()?,

        _ => ApiReply::json(404, &serde_json::json!({ "error": "not found" })),
    };

    reply.into_response()
}

impl ApiReply {
    fn into_response(self) -> Result<HttpResponse> {
        match self.body {
            ApiBody::Json(value) => json_response(self.status, &value),
            ApiBody::Csv {
                file_name,
                contents,
            } => {
                let disposition = format!("attachment; filename=\"{file_name}\"");
                let header = Header::from_bytes("Content-Disposition", disposition.as_bytes())
                    .map_err(|_| anyhow::anyhow!("invalid export file name: {file_name}"))?;
                Ok(Response::from_data(contents.into_bytes())
                    .with_header(content_type_csv())
                    .with_header(header)
                    .with_status_code(StatusCode(self.status)))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serialize `data` into a JSON response with the given status.
pub(crate) fn json_response<T: Serialize>(status: u16, data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

fn html_response(html: &str) -> HttpResponse {
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// Read the body of requests that carry one.
pub(crate) fn read_body(request: &mut Request) -> Option<String> {
    if !matches!(request.method(), Method::Put | Method::Post | Method::Patch) {
        return None;
    }
    let mut buf = String::new();
    request.as_reader().read_to_string(&mut buf).ok()?;
    Some(buf)
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// CSV content type header.
fn content_type_csv() -> Header {
    Header::from_bytes("Content-Type", "text/csv; charset=utf-8").unwrap()
}

/// Headers allowing cross-origin polling.
pub(crate) fn cors_headers() -> Vec<Header> {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ]
    .into_iter()
    .map(|(name, value)| Header::from_bytes(name, value).unwrap())
    .collect()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_headers_are_valid() {
        assert!(content_type_json().field.equiv("Content-Type"));
        assert_eq!(content_type_csv().value.as_str(), "text/csv; charset=utf-8");
        assert_eq!(cors_headers().len(), 3);
    }

    #[test]
    fn csv_reply_carries_attachment_header() {
        let reply = ApiReply {
            status: 200,
            body: ApiBody::Csv {
                file_name: "analisis_harian_irigasi.csv".to_string(),
                contents: "Metrik;Nilai;Satuan\r\n".to_string(),
            },
        };
        let resp = reply.into_response().unwrap();
        assert_eq!(resp.status_code().0, 200);
        assert!(resp.headers().iter().any(|h| {
            h.field.equiv("Content-Disposition")
                && h.value.as_str() == "attachment; filename=\"analisis_harian_irigasi.csv\""
        }));
    }
}
