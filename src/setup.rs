use std::net::{SocketAddr, TcpListener};

use crate::config::HarnessConfig;
use crate::error::{BenchError, Result};

/// Stand-in for an incoming request. Only the id ends up in the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: String,
}

impl Request {
    pub fn new(id: impl Into<String>) -> Self {
        Request { id: id.into() }
    }
}

/// A bound TCP listener whose address is used as line payload.
/// The socket closes when this value is dropped.
#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
    addr: SocketAddr,
}

impl Listener {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = TcpListener::bind(addr).map_err(|source| BenchError::Bind { addr, source })?;
        let addr = socket.local_addr()?;
        tracing::debug!(%addr, "listener bound");
        Ok(Listener { socket, addr })
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    pub fn socket(&self) -> &TcpListener {
        &self.socket
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        tracing::debug!(addr = %self.addr, "listener closed");
    }
}

/// Builds the request and binds the listener for one benchmark invocation.
/// Binding is not retried: a free ephemeral port is expected to always exist.
pub fn setup(config: &HarnessConfig) -> Result<(Request, Listener)> {
    let request = Request::new(config.request_id.clone());
    let listener = Listener::bind(config.bind_addr)?;
    Ok((request, listener))
}
