//! Device simulator (`sawah simulate`).
//!
//! Stands in for the irrigation device so the dashboard can be run and tested
//! without hardware. Serves the device's three endpoints:
//!
//! - `GET /data` — run one logic cycle and return the reading
//! - `POST /control` — manual override, `{"command": "ON" | "OFF"}`
//! - `GET /analysis` — session summary, or `{"error": ...}` before any data
//!
//! Every response carries permissive CORS headers so browser pages served
//! from elsewhere can poll it directly.

pub mod field;
pub mod history;

use std::io::Cursor;
use std::net::SocketAddr;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::json;
use tiny_http::{Method, Response, Server, StatusCode};

use crate::config::schema::SimulatorConfig;
use crate::device::parse_command;
use crate::web::{cors_headers, json_response, read_body};

use field::{AutoThresholds, Field};
use history::{EMPTY_HISTORY_ERROR, SessionHistory};

/// Loose `/control` body: a missing or unknown command is answered with 400.
#[derive(Debug, Deserialize)]
struct ControlBody {
    command: Option<String>,
}

/// Field state plus session history, driven one request at a time.
pub struct Simulator<R: Rng> {
    field: Field<R>,
    history: SessionHistory,
}

impl<R: Rng> Simulator<R> {
    pub fn new(rng: R, config: &SimulatorConfig) -> Self {
        Self {
            field: Field::new(rng, AutoThresholds::from_config(config)),
            history: SessionHistory::new(config.cycle_seconds),
        }
    }

    /// Answer one request: status code and JSON body.
    pub fn handle(&mut self, method: &Method, path: &str, body: Option<&str>) -> (u16, serde_json::Value) {
        let path = path.split('?').next().unwrap_or(path);

        match (method, path) {
            (&Method::Get, "/data") => {
                let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
                let reading = self.field.run_cycle(timestamp);
                self.history.add(reading.clone());
                match serde_json::to_value(&reading) {
                    Ok(value) => (200, value),
                    Err(e) => (500, json!({ "error": e.to_string() })),
                }
            }
            (&Method::Post, "/control") => {
                let command = body
                    .and_then(|b| serde_json::from_str::<ControlBody>(b).ok())
                    .and_then(|b| b.command)
                    .and_then(|c| parse_command(&c));
                match command {
                    Some(command) => {
                        self.field.manual(command);
                        (200, json!({ "status": "success", "new_state": command }))
                    }
                    None => (400, json!({ "status": "failed" })),
                }
            }
            (&Method::Get, "/analysis") => match self.history.summary() {
                Some(summary) => match serde_json::to_value(&summary) {
                    Ok(value) => (200, value),
                    Err(e) => (500, json!({ "error": e.to_string() })),
                },
                None => (200, json!({ "error": EMPTY_HISTORY_ERROR })),
            },
            _ => (404, json!({ "error": "not found" })),
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }
}

/// A bound simulator, ready to serve.
pub struct SimulatorServer {
    server: Server,
    simulator: Simulator<StdRng>,
}

/// Bind the simulator on `config.addr`. A `seed` makes the run reproducible.
pub fn bind(config: &SimulatorConfig, seed: Option<u64>) -> Result<SimulatorServer> {
    let server = Server::http(&config.addr)
        .map_err(|e| anyhow::anyhow!("failed to start simulator on {}: {e}", config.addr))?;

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Ok(SimulatorServer {
        server,
        simulator: Simulator::new(rng, config),
    })
}

impl SimulatorServer {
    /// Actual listen address (useful when binding port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests sequentially until the process ends.
    pub fn run(mut self) {
        for mut request in self.server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();

            let response = if method == Method::Options {
                preflight()
            } else {
                let body = read_body(&mut request);
                let (status, value) = self.simulator.handle(&method, &url, body.as_deref());
                match json_response(status, &value) {
                    Ok(resp) => resp,
                    Err(_) => Response::from_data(Vec::new()).with_status_code(StatusCode(500)),
                }
            };

            let mut response = response;
            for header in cors_headers() {
                response.add_header(header);
            }
            let _ = request.respond(response);
        }
    }
}

fn preflight() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(Vec::new()).with_status_code(StatusCode(204))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
