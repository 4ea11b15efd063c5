use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use crate::config::Settings;
use crate::error::LookupError;
use crate::lookup::Session;
use crate::sheet::WorkbookCache;

pub mod api;
pub mod routes;

/// Everything one server process owns: settings, the workbook cache and the
/// single user's selection session. Requests are handled one at a time.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    cache: WorkbookCache,
    session: Option<Session>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cache: WorkbookCache::new(),
            session: None,
        }
    }

    /// Current session, reopened whenever the cache hands back a different
    /// workbook snapshot (first request, or the source file changed).
    pub fn session(&mut self) -> Result<&mut Session, LookupError> {
        let workbook = match self.cache.get_or_load(&self.settings.source) {
            Ok(workbook) => workbook,
            Err(err) => {
                self.session = None;
                return Err(err);
            }
        };
        let stale = self
            .session
            .as_ref()
            .map_or(true, |s| !Arc::ptr_eq(s.workbook(), &workbook));
        if stale {
            tracing::info!(path = %self.settings.source.display(), "opening selection session");
            self.session = Some(Session::open(workbook, &self.settings)?);
        }
        self.session
            .as_mut()
            .ok_or_else(|| LookupError::SourceUnreadable {
                path: self.settings.source.clone(),
                cause: "session unavailable".to_string(),
            })
    }
}

pub fn run_server(settings: Settings) -> std::io::Result<()> {
    let listener = TcpListener::bind(&settings.bind_addr)?;
    println!("wall_details server listening on http://{}", settings.bind_addr);
    let mut state = AppState::new(settings);

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, &mut state) {
                    tracing::warn!(error = %err, "request error");
                }
            }
            Err(err) => tracing::warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream, state: &mut AppState) -> std::io::Result<()> {
    let mut buffer = [0_u8; 16_384];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let mut request_parts = request.lines().next().unwrap_or_default().split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(state, method, path);
    tracing::info!(method, path, status = response.status_code, "request served");
    stream.write_all(&response.to_http_bytes())?;
    stream.flush()?;
    Ok(())
}
