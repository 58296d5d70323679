//! In-memory output sink for tests

use crate::cli::OutputFormat;
use crate::output::OutputWriter;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Cloneable buffer; every clone shares the same bytes
#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

/// Uncolored writer over a fresh buffer
pub(crate) fn capture(format: OutputFormat) -> (OutputWriter, SharedBuf) {
    let buf = SharedBuf::default();
    let writer = OutputWriter::with_writer(format, false, false, 0, Box::new(buf.clone()));
    (writer, buf)
}
