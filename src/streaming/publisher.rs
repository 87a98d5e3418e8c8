//! Telemetry publisher over TCP.
//!
//! A dedicated thread owns the listener and broadcasts each telemetry
//! message as one JSON line to every connected client. The control loop
//! hands messages over through a bounded channel and never blocks on the
//! network: when the channel is full the message is dropped.

use crate::error::Result;
use crate::streaming::messages::TelemetryMessage;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Channel depth between the control loop and the publisher thread
const QUEUE_CAPACITY: usize = 256;

/// Telemetry publisher handle
pub struct TelemetryPublisher {
    sender: Sender<TelemetryMessage>,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TelemetryPublisher {
    /// Bind the telemetry listener and start the publisher thread
    pub fn bind(address: &str) -> Result<Self> {
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;

        let (sender, receiver) = bounded(QUEUE_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let thread = thread::Builder::new()
            .name("telemetry-publisher".to_string())
            .spawn(move || {
                publisher_loop(listener, receiver, thread_shutdown);
            })?;

        info!("Telemetry publisher listening on {}", address);

        Ok(Self {
            sender,
            shutdown,
            thread: Some(thread),
        })
    }

    /// Sender half used by the control loop
    pub fn sender(&self) -> Sender<TelemetryMessage> {
        self.sender.clone()
    }

    /// Request the publisher thread to stop
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for TelemetryPublisher {
    fn drop(&mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn publisher_loop(
    listener: TcpListener,
    receiver: Receiver<TelemetryMessage>,
    shutdown: Arc<AtomicBool>,
) {
    let mut clients: Vec<TcpStream> = Vec::new();
    let mut published = 0u64;

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nonblocking(false) {
                    error!("Failed to set blocking mode for client {}: {}", addr, e);
                } else {
                    info!("Telemetry client connected: {}", addr);
                    clients.push(stream);
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => error!("Telemetry accept error: {}", e),
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(message) => {
                if broadcast(&mut clients, &message) {
                    published += 1;
                    if published % 1000 == 0 {
                        debug!("Published {} telemetry messages", published);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!("Telemetry publisher exiting ({} messages published)", published);
}

/// Serialize one message and write it to all clients, pruning dead ones.
/// Returns false when serialization failed.
fn broadcast(clients: &mut Vec<TcpStream>, message: &TelemetryMessage) -> bool {
    let mut line = match serde_json::to_vec(message) {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to serialize telemetry: {}", e);
            return false;
        }
    };
    line.push(b'\n');

    clients.retain_mut(|client| match client.write_all(&line) {
        Ok(()) => true,
        Err(e) => {
            if let Ok(addr) = client.peer_addr() {
                debug!("Telemetry client {} disconnected: {}", addr, e);
            }
            false
        }
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::messages::{MagneticSample, timestamp_us};
    use std::io::{BufRead, BufReader};

    #[test]
    fn test_broadcast_reaches_connected_client() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        listener.set_nonblocking(true).unwrap();

        let (sender, receiver) = bounded(8);
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = thread::spawn(move || publisher_loop(listener, receiver, thread_shutdown));

        let client = TcpStream::connect(&address).unwrap();
        let mut reader = BufReader::new(client);

        // Keep offering the message until the accept loop has the client
        let message = TelemetryMessage::Magnetic(MagneticSample {
            timestamp_us: timestamp_us(),
            name: "left_magnetic".to_string(),
            value: 7,
        });
        let feeder_shutdown = Arc::clone(&shutdown);
        let feeder = thread::spawn(move || {
            while !feeder_shutdown.load(Ordering::Relaxed) {
                let _ = sender.try_send(message.clone());
                thread::sleep(Duration::from_millis(20));
            }
        });

        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert!(line.contains(r#""type":"Magnetic""#));
        assert!(line.contains("left_magnetic"));

        shutdown.store(true, Ordering::Relaxed);
        feeder.join().unwrap();
        handle.join().unwrap();
    }
}
