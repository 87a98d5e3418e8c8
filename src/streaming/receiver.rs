//! Velocity request receiver over TCP.
//!
//! A dedicated thread accepts one client at a time and reads JSON request
//! lines. Each request is mapped to wheel targets immediately on arrival and
//! stored in the shared command cell; the control loop picks it up on its
//! next tick. Only the most recent request matters.

use crate::error::Result;
use crate::motion::{CommandCell, VelocityMapper};
use crate::streaming::messages::VelocityRequest;
use crate::types::Velocity;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Velocity request receiver handle
pub struct CommandReceiver {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CommandReceiver {
    /// Bind the command listener and start the receiver thread
    pub fn bind(address: &str, mapper: VelocityMapper, pending: Arc<CommandCell>) -> Result<Self> {
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("command-receiver".to_string())
            .spawn(move || {
                receiver_loop(listener, mapper, pending, thread_shutdown);
            })?;

        info!("Command receiver listening on {}", address);

        Ok(Self {
            shutdown,
            thread: Some(thread),
        })
    }

    /// Request the receiver thread to stop
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for CommandReceiver {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn receiver_loop(
    listener: TcpListener,
    mapper: VelocityMapper,
    pending: Arc<CommandCell>,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!("Command client connected: {}", addr);
                serve_client(stream, &mapper, &pending, &shutdown);
                info!("Command client disconnected: {}", addr);
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => warn!("Command accept error: {}", e),
        }
    }
    info!("Command receiver exiting");
}

/// Read request lines from one client until it disconnects or shutdown
fn serve_client(
    stream: TcpStream,
    mapper: &VelocityMapper,
    pending: &CommandCell,
    shutdown: &AtomicBool,
) {
    // Read timeout keeps the shutdown flag responsive
    if let Err(e) = stream.set_read_timeout(Some(Duration::from_millis(500))) {
        warn!("Failed to set read timeout: {}", e);
    }

    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    while !shutdown.load(Ordering::Relaxed) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => return, // EOF
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<VelocityRequest>(trimmed) {
                    Ok(request) => {
                        let command =
                            mapper.map(Velocity::new(request.linear_x, request.angular_z));
                        debug!(
                            "Velocity request ({:.3}, {:.3}) -> wheels (L:{}, R:{})",
                            request.linear_x, request.angular_z, command.left, command.right
                        );
                        pending.store(command);
                    }
                    Err(e) => warn!("Failed to parse velocity request: {}", e),
                }
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                warn!("Command read error: {}", e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WheelCommand;
    use std::io::Write;

    #[test]
    fn test_request_lands_in_command_cell() {
        let pending = Arc::new(CommandCell::new());
        let mapper = VelocityMapper::new(0.248, 300);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut client = TcpStream::connect(address).unwrap();
        let (stream, _) = listener.accept().unwrap();

        let serve_pending = Arc::clone(&pending);
        let serve_shutdown = Arc::clone(&shutdown);
        let server = thread::spawn(move || {
            serve_client(stream, &mapper, &serve_pending, &serve_shutdown);
        });

        client
            .write_all(b"{\"linear_x\": 0.5, \"angular_z\": 0.0}\n")
            .unwrap();

        // Latest request wins over the earlier one
        client
            .write_all(b"{\"linear_x\": 0.1, \"angular_z\": 0.0}\n")
            .unwrap();
        client.flush().unwrap();
        drop(client);
        server.join().unwrap();

        assert_eq!(pending.snapshot(), WheelCommand::new(100, 100));
    }

    #[test]
    fn test_malformed_request_is_ignored() {
        let pending = CommandCell::new();
        let mapper = VelocityMapper::new(0.248, 300);
        let shutdown = AtomicBool::new(false);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let mut client = TcpStream::connect(address).unwrap();
        let (stream, _) = listener.accept().unwrap();

        client.write_all(b"not json\n").unwrap();
        client.flush().unwrap();
        drop(client);
        serve_client(stream, &mapper, &pending, &shutdown);

        assert_eq!(pending.snapshot(), WheelCommand::stop());
    }
}
