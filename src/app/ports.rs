/// Severity of a report line. Status lines are normal output; diagnostics
/// report a recovered failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Status,
    Diagnostic,
}

/// Output channel for the human-readable report lines a pipeline run produces.
pub trait ReportSink {
    fn emit(&mut self, kind: LineKind, line: &str);

    fn status(&mut self, line: &str) {
        self.emit(LineKind::Status, line);
    }

    fn diagnostic(&mut self, line: &str) {
        self.emit(LineKind::Diagnostic, line);
    }
}

/// Writes status lines to stdout and diagnostics to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn emit(&mut self, kind: LineKind, line: &str) {
        match kind {
            LineKind::Status => println!("{line}"),
            LineKind::Diagnostic => eprintln!("{line}"),
        }
    }
}

/// Captures lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<(LineKind, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status lines only, in emission order.
    pub fn status_lines(&self) -> Vec<&str> {
        self.lines_of(LineKind::Status)
    }

    pub fn diagnostic_lines(&self) -> Vec<&str> {
        self.lines_of(LineKind::Diagnostic)
    }

    fn lines_of(&self, kind: LineKind) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, kind: LineKind, line: &str) {
        self.lines.push((kind, line.to_string()));
    }
}
