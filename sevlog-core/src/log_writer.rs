use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::tail::TailSender;

pub trait LogWriter {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// An append-only log file. Every written chunk is forwarded to the attached
/// tail reader, if any.
pub struct LogFile {
    path: PathBuf,
    file: File,
    readable: bool,
    tail: Option<TailSender>,
}

impl LogFile {
    /// Opens `path` for appending, creating it and its parent folders if needed.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        Self::open(path.as_ref(), false)
    }

    /// Same as [`LogFile::new`] but also opens the file with read access, which
    /// makes it eligible for tailing.
    pub fn readable<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        Self::open(path.as_ref(), true)
    }

    fn open(path: &Path, readable: bool) -> Result<Self, io::Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = File::options()
            .create(true)
            .append(true)
            .read(readable)
            .open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            readable,
            tail: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn attach_tail(&mut self, tail: TailSender) {
        self.tail = Some(tail);
    }

    pub fn is_tailed(&self) -> bool {
        self.tail.is_some()
    }
}

impl LogWriter for LogFile {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        if let Some(tail) = &self.tail {
            tail.forward(line);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Conventional console streams a line can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleStream {
    Error,
    Warn,
    Info,
    Log,
}

/// Console destination accepting pre-formatted lines.
pub trait ConsoleSink: Send + Sync {
    fn write(&self, stream: ConsoleStream, line: &str);
    /// Diagnostic trace output, used for error traces.
    fn trace(&self, trace: &str);
}

/// Writes errors and warnings to stderr and everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl ConsoleSink for StdConsole {
    fn write(&self, stream: ConsoleStream, line: &str) {
        match stream {
            ConsoleStream::Error | ConsoleStream::Warn => {
                let mut stderr = io::stderr().lock();
                writeln!(stderr, "{line}").ok();
            }
            ConsoleStream::Info | ConsoleStream::Log => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{line}").ok();
                stdout.flush().ok();
            }
        }
    }

    fn trace(&self, trace: &str) {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{trace}").ok();
    }
}

/// Keeps console output in memory, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<(ConsoleStream, String)>>,
    traces: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn lines(&self) -> Vec<(ConsoleStream, String)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn traces(&self) -> Vec<String> {
        self.traces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConsoleSink for MemoryConsole {
    fn write(&self, stream: ConsoleStream, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stream, line.to_string()));
    }

    fn trace(&self, trace: &str) {
        self.traces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(trace.to_string());
    }
}

impl<C: ConsoleSink + ?Sized> ConsoleSink for std::sync::Arc<C> {
    fn write(&self, stream: ConsoleStream, line: &str) {
        (**self).write(stream, line)
    }

    fn trace(&self, trace: &str) {
        (**self).trace(trace)
    }
}

#[test]
fn test_log_file_appends() {
    let dir = PathBuf::from("/tmp/sevlog_test_log_file");
    fs::remove_dir_all(&dir).ok();
    let path = dir.join("nested").join("app.log");
    let mut log_file = LogFile::new(&path).unwrap();
    log_file.write_line("first\r\n").unwrap();
    drop(log_file);
    let mut log_file = LogFile::new(&path).unwrap();
    assert!(!log_file.is_readable());
    log_file.write_line("second\r\n").unwrap();
    log_file.flush().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\r\nsecond\r\n");
}

#[test]
fn test_memory_console_records_streams() {
    let console = MemoryConsole::default();
    console.write(ConsoleStream::Warn, "careful");
    console.write(ConsoleStream::Log, "hello");
    console.trace("Trace follows");
    assert_eq!(
        console.lines(),
        vec![
            (ConsoleStream::Warn, "careful".to_string()),
            (ConsoleStream::Log, "hello".to_string())
        ]
    );
    assert_eq!(console.traces(), vec!["Trace follows".to_string()]);
}
