use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Wrapper around may_minihttp's HTTP server.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to accept connections.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not ready within ~250ms
    /// (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the server coroutine and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancelling the accept coroutine is how may servers shut down;
        // the handle is owned here and joined right after.
        #[allow(unsafe_code)]
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            info!(addr = %self.addr, "Server coroutine ended with a panic during shutdown");
        }
    }

    /// Block until the server coroutine finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start serving on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        info!(addr = %addr, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }
}
