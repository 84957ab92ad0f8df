pub mod ports;

pub use ports::{LineKind, MemorySink, ReportSink, StdoutSink};
