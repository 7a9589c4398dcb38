use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use super::buffer::{Frame, FrameBuffer};
use crate::protocols::artnet::parse_artdmx;

/// Interval at which the receive loop re-checks the stop flag. Bounds the
/// latency of `stop()`.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// An ArtDMX datagram is at most 18 + 512 bytes; anything larger is foreign
/// traffic and may be truncated before the decoder rejects it.
const RECV_BUFFER_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },
    #[error("failed to spawn receive thread: {0}")]
    Spawn(std::io::Error),
    #[error("receiver already started")]
    AlreadyStarted,
    #[error("receiver already stopped; construct a new one to capture again")]
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

/// Passive Art-Net capture receiver: one UDP socket, one receive thread,
/// one frame buffer.
///
/// Lifecycle is linear (`Idle -> Running -> Stopped`) and `Stopped` is
/// terminal for the instance; tests construct and destroy their own receiver
/// per case rather than sharing a process-wide one. The buffer outlives the
/// socket: `frames()` still returns the captured snapshot after `stop()`.
pub struct Receiver {
    port: u16,
    state: State,
    buffer: Arc<FrameBuffer>,
    stop: Arc<AtomicBool>,
    local_addr: Option<SocketAddr>,
    handle: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Allocate receiver state. No I/O happens until `start()`.
    ///
    /// Port `0` requests an OS-assigned port, so parallel test runs on one
    /// host do not collide; `local_port()` reports the port actually bound.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            state: State::Idle,
            buffer: Arc::new(FrameBuffer::new()),
            stop: Arc::new(AtomicBool::new(false)),
            local_addr: None,
            handle: None,
        }
    }

    /// The configured port (possibly `0`).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The port actually bound; set once `start()` succeeds.
    pub fn local_port(&self) -> Option<u16> {
        self.local_addr.map(|addr| addr.port())
    }

    /// Bind the socket and launch the receive thread.
    ///
    /// A bind failure (port in use, permission denied) leaves the receiver
    /// `Idle`; callers treat it as "capture unavailable in this environment"
    /// and skip dependent assertions rather than failing hard.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        match self.state {
            State::Running => return Err(CaptureError::AlreadyStarted),
            State::Stopped => return Err(CaptureError::Terminated),
            State::Idle => {}
        }

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, self.port)).map_err(|source| {
            CaptureError::Bind {
                port: self.port,
                source,
            }
        })?;
        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|source| CaptureError::Bind {
                port: self.port,
                source,
            })?;
        self.local_addr = socket.local_addr().ok();

        let buffer = Arc::clone(&self.buffer);
        let stop = Arc::clone(&self.stop);
        let handle = std::thread::Builder::new()
            .name("dmxtap-recv".to_string())
            .spawn(move || receive_loop(socket, buffer, stop))
            .map_err(CaptureError::Spawn)?;

        self.handle = Some(handle);
        self.state = State::Running;
        debug!(
            port = self.local_port().unwrap_or(self.port),
            "capture receiver started"
        );
        Ok(())
    }

    /// Stop the receive thread. Idempotent; a no-op unless `Running`.
    ///
    /// Captured frames stay readable afterwards: stopping never clears the
    /// buffer.
    pub fn stop(&mut self) {
        if self.state != State::Running {
            return;
        }
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.state = State::Stopped;
        debug!(
            port = self.local_port().unwrap_or(self.port),
            "capture receiver stopped"
        );
    }

    /// Snapshot of every frame captured so far, in arrival order.
    pub fn frames(&self) -> Vec<Frame> {
        self.buffer.snapshot()
    }

    /// Drop all captured frames. Independent of receiver state.
    pub fn clear_frames(&self) {
        self.buffer.clear();
    }

    /// Clear the buffer, wait out one capture window, return the snapshot.
    ///
    /// The wait ends when `window` elapses or when `cancel` yields a message
    /// (or its sender is dropped), whichever comes first. A cancelled window
    /// returns the partial snapshot rather than an error, since partial
    /// observation is still useful. Start the window *before* triggering the
    /// action under observation, or its first frames are missed.
    pub fn capture_frames(
        &self,
        window: Duration,
        cancel: &crossbeam_channel::Receiver<()>,
    ) -> Vec<Frame> {
        self.buffer.clear();
        let _ = cancel.recv_timeout(window);
        self.buffer.snapshot()
    }

    /// `capture_frames` without a cancellation channel.
    pub fn capture_for(&self, window: Duration) -> Vec<Frame> {
        self.capture_frames(window, &crossbeam_channel::never())
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn receive_loop(socket: UdpSocket, buffer: Arc<FrameBuffer>, stop: Arc<AtomicBool>) {
    let mut payload = [0u8; RECV_BUFFER_LEN];
    while !stop.load(Ordering::Relaxed) {
        let len = match socket.recv_from(&mut payload) {
            Ok((len, _addr)) => len,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                continue;
            }
            Err(err) => {
                // After stop() a failing read is the loop's own exit signal.
                if !stop.load(Ordering::Relaxed) {
                    debug!(error = %err, "socket read failed, capture loop exiting");
                }
                break;
            }
        };

        let Some(dmx) = parse_artdmx(&payload[..len]) else {
            continue;
        };
        trace!(universe = dmx.universe, "captured ArtDMX frame");
        buffer.append(Frame {
            universe: dmx.universe,
            sequence: dmx.sequence,
            channels: dmx.slots,
            received_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureError, Receiver, State};

    #[test]
    fn new_does_no_io() {
        let receiver = Receiver::new(6454);
        assert_eq!(receiver.state, State::Idle);
        assert_eq!(receiver.local_port(), None);
        assert!(receiver.frames().is_empty());
    }

    #[test]
    fn stop_before_start_is_a_noop() {
        let mut receiver = Receiver::new(0);
        receiver.stop();
        assert_eq!(receiver.state, State::Idle);

        // Still startable: a no-op stop does not terminate the instance.
        receiver.start().unwrap();
        receiver.stop();
        assert_eq!(receiver.state, State::Stopped);
    }

    #[test]
    fn start_after_stop_is_terminal() {
        let mut receiver = Receiver::new(0);
        receiver.start().unwrap();
        receiver.stop();
        assert!(matches!(receiver.start(), Err(CaptureError::Terminated)));
    }
}
