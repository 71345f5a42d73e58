//! A blocking RESP2 connection: write a command, read its one reply.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use remote_hash_store::{StoreError, StoreResult};

use crate::codec::{self, Frame, FrameScanner};

const READ_CHUNK: usize = 4096;

/// One blocking TCP connection speaking RESP2.
///
/// Requests and replies are strictly paired: `call` writes one command and
/// reads exactly one reply frame.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    scanner: FrameScanner,
}

impl Connection {
    /// Connect to the first reachable address for `addr`.
    ///
    /// `timeout` bounds the connect and every later read and write.
    pub fn open(addr: &str, timeout: Duration) -> io::Result<Self> {
        let mut last_err = None;
        for candidate in addr.to_socket_addrs()? {
            match Self::open_one(candidate, timeout) {
                Ok(conn) => return Ok(conn),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} resolved to no addresses", addr),
            )
        }))
    }

    fn open_one(addr: SocketAddr, timeout: Duration) -> io::Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            scanner: FrameScanner::new(),
        }
    }

    /// Send one command and wait for its reply.
    ///
    /// Error replies become [`StoreError::Protocol`]; the connection stays
    /// usable after one because the reply was read in full.
    pub fn call(&mut self, request: &Frame) -> StoreResult<Frame> {
        let mut out = BytesMut::new();
        codec::encode(request, &mut out);
        self.stream.write_all(&out)?;
        self.stream.flush()?;

        match self.read_frame()? {
            Frame::Error(message) => Err(StoreError::Protocol { message }),
            frame => Ok(frame),
        }
    }

    fn read_frame(&mut self) -> StoreResult<Frame> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            // Build the frame only once the scanner has seen all of it.
            if self.scanner.scan(&self.buffer)?.is_some() {
                if let Some(frame) = codec::decode(&mut self.buffer)? {
                    return Ok(frame);
                }
            }
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by store",
                )
                .into());
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
