//! Development server.
//!
//! Serves the project root as-is. Requests for the compiled entry script
//! (`compile.trigger`) run the source compiler first; if it fails the error
//! is shown in the status line and whatever is on disk is served.

mod lifecycle;
mod path;
mod response;

use crate::{
    config::PipelineConfig,
    core::{is_shutdown, register_server},
    debug, log,
    logger::{status_error, status_success},
    pipeline::compile::compile_entry,
    utils::path::display_relative,
};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use response::ResponseOptions;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Serializes compiler runs; concurrent requests wait for the running one.
static COMPILE_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Bind the server and run the request loop until Ctrl+C (blocking).
pub fn serve(config: &PipelineConfig) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    debug!("serve"; "compiling on request for {}", config.compile.trigger);

    run_request_loop(&server, config)
}

fn run_request_loop(server: &Server, config: &PipelineConfig) -> Result<()> {
    // A running compile must not block other requests
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("Failed to create request thread pool")?;

    pool.in_place_scope(|scope| {
        for request in server.incoming_requests() {
            scope.spawn(move |_| {
                if let Err(e) = handle_request(request, config) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
    });
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &PipelineConfig) -> Result<()> {
    let options = ResponseOptions {
        cors: config.serve.cors,
    };

    if is_shutdown() {
        return response::respond_unavailable(request, options);
    }

    if config.compile.is_trigger(request.url()) {
        compile_for_request(config);
    }

    match path::resolve_path(request.url(), config.get_root()) {
        Some(path) => response::respond_file(request, &path, options),
        None => response::respond_not_found(request, options),
    }
}

/// Run the source compiler, reporting in the status line. Never fails the request.
fn compile_for_request(config: &PipelineConfig) {
    let _guard = COMPILE_LOCK.lock();
    let entry = display_relative(&config.paths.entry, config.get_root());

    match compile_entry(config) {
        Ok(elapsed) => status_success(&format!("compiled {entry} in {}ms", elapsed.as_millis())),
        Err(warning) => status_error(&format!("compile {entry} failed, serving stale output"), &warning.detail()),
    }
}
