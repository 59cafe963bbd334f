use std::{fmt::Write, io};

use super::rc::{RcRefCell, RcRefCellT};

pub struct StringBuffer {
    s: String,
}

impl StringBuffer {
    pub fn new() -> StringBuffer {
        StringBuffer { s: String::new() }
    }

    pub fn as_str(&self) -> &str {
        self.s.as_str()
    }

    /// Takes the buffered contents, leaving the buffer empty.
    pub fn export_string(&mut self) -> String {
        std::mem::take(&mut self.s)
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// String only implements fmt::Write
impl io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str_rep = std::str::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let res = self.s.write_str(str_rep);
        match res {
            Ok(_) => Ok(buf.len()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// For convenience, so we can pass around a shared stream writer.
//
// One use is to capture per-document errors, so they can
// be presented either to the stderr, or buffered for tests.
#[derive(Clone)]
pub struct WriteHandle {
    w: RcRefCell<dyn io::Write>,
}

impl WriteHandle {
    pub fn stdout_write_handle() -> WriteHandle {
        WriteHandle {
            w: RcRefCellT::new(io::stdout()),
        }
    }

    pub fn stderr_write_handle() -> WriteHandle {
        WriteHandle {
            w: RcRefCellT::new(io::stderr()),
        }
    }

    pub fn string_buff_write_handle() -> (WriteHandle, RcRefCell<StringBuffer>) {
        let buffer = RcRefCellT::new(StringBuffer::new());
        let h = WriteHandle { w: buffer.clone() };
        (h, buffer)
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Trace here, since tests should generally disable the error writer
        // or use a string buffer.
        tracing::trace!("WriteHandle::write {}", String::from_utf8_lossy(buf));
        self.w.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.borrow_mut().flush()
    }
}

/// writeln! to a WriteHandle, ignoring any write failure.
/// There is nowhere better to report a failure to write an error.
#[macro_export]
macro_rules! write_errln {
    ($w:expr, $($arg:tt)*) => {{
        use std::io::Write;
        let _ = writeln!($w, $($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{StringBuffer, WriteHandle};

    #[test]
    fn test_string_buffer() {
        let mut buff = StringBuffer::new();
        let _ = write!(buff, "Some {}", "text");
        let _ = writeln!(buff, " 1");
        assert_eq!(buff.as_str(), "Some text 1\n");
        assert_eq!(buff.export_string(), "Some text 1\n");
        assert_eq!(buff.as_str(), "");
    }

    #[test]
    fn test_write_handle() {
        let (mut handle, buff) = WriteHandle::string_buff_write_handle();
        let _ = write!(handle, "Some {}", "text");
        let _ = writeln!(handle, " 1");
        assert_eq!(buff.borrow().as_str(), "Some text 1\n");

        let mut other = handle.clone();
        write_errln!(other, "err {}", 2);
        assert_eq!(buff.borrow().as_str(), "Some text 1\nerr 2\n");
    }
}
