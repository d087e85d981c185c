//! Console IO for the simulator's syscalls.
//!
//! The interface for consoles is defined with the [`Console`] trait.
//! This is exposed to the simulator with the [`SimIO`] enum.
//!
//! Besides those two key items, this module also includes:
//! - [`EmptyIO`]: A `Console` which discards output and never has input.
//! - [`BufferedIO`]: A `Console` holding a buffered implementation for IO.
//! - [`ChannelIO`]: A `Console` holding a threaded/channel implementation for IO.
//! - [`StdIO`]: A `Console` over the process's stdin and stdout.
//!
//! Input syscalls never hang when no input is available:
//! [`Console::read_line`] returns `None` and the syscall falls back to a default value.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, RwLock, RwLockWriteGuard, TryLockError};
use std::thread::JoinHandle;

use crossbeam_channel as cbc;

/// A text console that the simulator's syscalls print to and read from.
pub trait Console {
    /// Writes bytes to the console.
    fn print(&self, bytes: &[u8]);

    /// Reads one line of input, without its line terminator.
    ///
    /// This returns `None` if no input is available.
    fn read_line(&self) -> Option<String>;
}
impl dyn Console {} // assert Console is dyn safe

/// No IO. All output is discarded and no input is ever available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyIO;
impl Console for EmptyIO {
    fn print(&self, _bytes: &[u8]) {}

    fn read_line(&self) -> Option<String> {
        None
    }
}

/// IO that reads from an input buffer and writes to an output buffer.
///
/// The buffers can be accessed in code via [`BufferedIO::get_input`] and [`BufferedIO::get_output`].
///
/// Note that if a input/output lock guard is acquired from one of the locks of this IO,
/// the input/output becomes temporarily inaccessible to the simulator.
/// Output printed while the lock is held is dropped, and input reads as unavailable.
#[derive(Debug, Clone)]
pub struct BufferedIO {
    input: Arc<RwLock<VecDeque<u8>>>,
    output: Arc<RwLock<Vec<u8>>>
}
impl BufferedIO {
    /// Creates a new BufferedIO.
    pub fn new() -> Self {
        Self { input: Default::default(), output: Default::default() }
    }
    /// Creates a new BufferedIO from already defined buffers.
    pub fn with_bufs(input: Arc<RwLock<VecDeque<u8>>>, output: Arc<RwLock<Vec<u8>>>) -> Self {
        Self { input, output }
    }
    /// Creates a new BufferedIO whose input buffer starts with the given text.
    pub fn with_input(input: &str) -> Self {
        let io = Self::new();
        if let Some(mut buf) = io.try_input() {
            buf.extend(input.bytes());
        }
        io
    }

    fn try_input(&self) -> Option<RwLockWriteGuard<'_, VecDeque<u8>>> {
        match self.input.try_write() {
            Ok(g) => Some(g),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
    fn try_output(&self) -> Option<RwLockWriteGuard<'_, Vec<u8>>> {
        match self.output.try_write() {
            Ok(g) => Some(g),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Gets a reference to the input buffer.
    pub fn get_input(&self) -> &Arc<RwLock<VecDeque<u8>>> {
        &self.input
    }
    /// Gets a reference to the output buffer.
    pub fn get_output(&self) -> &Arc<RwLock<Vec<u8>>> {
        &self.output
    }
    /// Copies the output buffer into a string (replacing invalid UTF-8).
    pub fn output_string(&self) -> String {
        match self.output.read() {
            Ok(g) => String::from_utf8_lossy(&g).into_owned(),
            Err(e) => String::from_utf8_lossy(&e.into_inner()).into_owned(),
        }
    }
}
impl Default for BufferedIO {
    fn default() -> Self {
        Self::new()
    }
}
impl Console for BufferedIO {
    fn print(&self, bytes: &[u8]) {
        if let Some(mut out) = self.try_output() {
            out.extend_from_slice(bytes);
        }
    }

    fn read_line(&self) -> Option<String> {
        let mut input = self.try_input()?;
        if input.is_empty() {
            return None;
        }

        let end = input.iter().position(|&b| b == b'\n');
        let mut line: Vec<u8> = match end {
            Some(i) => {
                let line = input.drain(..i).collect();
                input.pop_front(); // newline
                line
            },
            None => input.drain(..).collect(),
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// A helper struct for [`ChannelIO::new`],
/// indicating the channel is closed and no more reads/writes will come from it.
#[derive(Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Stop;

/// An IO that reads lines from one channel and writes output to another.
///
/// Reads block until a line arrives or the reader reports [`Stop`],
/// after which input is permanently unavailable.
pub struct ChannelIO {
    read_data:    cbc::Receiver<String>,
    #[allow(unused)]
    read_handler: JoinHandle<()>,

    write_data:    cbc::Sender<Vec<u8>>,
    write_handler: JoinHandle<()>
}
impl ChannelIO {
    /// Creates a new channel IO with the given reader and writer.
    ///
    /// The reader function is called every time the console needs a line.
    /// It should block until a line is ready, or return `Stop`
    /// if there are no more lines to read.
    ///
    /// The writer function is called every time the program prints.
    ///
    /// This uses threads to read and write from input and output,
    /// so the reader may be polled ahead of the simulator asking for input.
    pub fn new(
        mut reader: impl FnMut() -> Result<String, Stop> + Send + 'static,
        mut writer: impl FnMut(Vec<u8>) -> Result<(), Stop> + Send + 'static
    ) -> Self {
        let (read_tx, read_rx) = cbc::bounded(1);
        let (write_tx, write_rx) = cbc::unbounded();

        // Reader thread:
        let read_handler = std::thread::spawn(move || loop {
            let Ok(line) = reader() else { return };
            let Ok(()) = read_tx.send(line) else { return };
        });

        // Writer thread:
        let write_handler = std::thread::spawn(move || {
            for bytes in write_rx {
                let Ok(()) = writer(bytes) else { return };
            }
        });

        Self {
            read_data: read_rx,
            read_handler,
            write_data: write_tx,
            write_handler
        }
    }

    /// Closes this IO, waiting for all pending output to be written.
    pub fn close(self) {
        let Self { read_data, read_handler: _, write_data, write_handler } = self;

        // Dropping the channels disconnects the handler threads.
        std::mem::drop(read_data);
        std::mem::drop(write_data);

        // The read handler is not joined, since it can hang on reading.
        let _ = write_handler.join();
    }
}
impl std::fmt::Debug for ChannelIO {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelIO")
            .finish_non_exhaustive()
    }
}
impl Console for ChannelIO {
    fn print(&self, bytes: &[u8]) {
        // a disconnected writer simply drops output
        let _ = self.write_data.send(bytes.to_vec());
    }

    fn read_line(&self) -> Option<String> {
        self.read_data.recv().ok()
    }
}

/// IO over the process's stdin and stdout.
///
/// Output is flushed on every print.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdIO;
impl Console for StdIO {
    fn print(&self, bytes: &[u8]) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(bytes).and_then(|_| stdout.flush()) {
            log::warn!("failed to write to stdout: {e}");
        }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let len = line.trim_end_matches(['\r', '\n']).len();
                line.truncate(len);
                Some(line)
            },
            Err(e) => {
                log::warn!("failed to read from stdin: {e}");
                None
            },
        }
    }
}

/// All the variants of IO accepted by the Simulator.
#[derive(Debug, Default)]
pub enum SimIO {
    /// No IO. This corresponds to the implementation of [`EmptyIO`].
    #[default]
    Empty,
    /// A buffered implementation. See [`BufferedIO`].
    Buffered(BufferedIO),
    /// A channel implementation. See [`ChannelIO`].
    Channel(ChannelIO),
    /// Process stdin/stdout. See [`StdIO`].
    Std,
}
impl SimIO {
    /// Closes this IO, flushing any output that is still in flight.
    pub fn close(self) {
        if let SimIO::Channel(io) = self {
            io.close();
        }
    }
}
impl From<EmptyIO> for SimIO {
    fn from(_value: EmptyIO) -> Self {
        SimIO::Empty
    }
}
impl From<BufferedIO> for SimIO {
    fn from(value: BufferedIO) -> Self {
        SimIO::Buffered(value)
    }
}
impl From<ChannelIO> for SimIO {
    fn from(value: ChannelIO) -> Self {
        SimIO::Channel(value)
    }
}
impl From<StdIO> for SimIO {
    fn from(_value: StdIO) -> Self {
        SimIO::Std
    }
}
impl Console for SimIO {
    fn print(&self, bytes: &[u8]) {
        match self {
            SimIO::Empty => EmptyIO.print(bytes),
            SimIO::Buffered(io) => io.print(bytes),
            SimIO::Channel(io) => io.print(bytes),
            SimIO::Std => StdIO.print(bytes),
        }
    }

    fn read_line(&self) -> Option<String> {
        match self {
            SimIO::Empty => EmptyIO.read_line(),
            SimIO::Buffered(io) => io.read_line(),
            SimIO::Channel(io) => io.read_line(),
            SimIO::Std => StdIO.read_line(),
        }
    }
}
