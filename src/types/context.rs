//! Per-stream context carried alongside every record.
//!
//! The context holds the stream's separators and position counters. The
//! reader side of the pipeline owns mutation (via [`Context::start_file`]
//! and [`Context::bump_record`]); transformers only read it. Passing the
//! context inside every envelope keeps the pipeline free of process-wide
//! mutable configuration.

use std::collections::HashMap;

/// Separators, position counters, and user parameters for one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// Input field separator.
    pub ifs: String,
    /// Output field separator.
    pub ofs: String,
    /// Input pair (key/value) separator.
    pub ips: String,
    /// Output pair separator.
    pub ops: String,
    /// Input record separator.
    pub irs: String,
    /// Output record separator.
    pub ors: String,
    /// Separator joining composite-key segments when flattening nested
    /// values into scalar leaves.
    pub oflatsep: String,
    /// Cumulative record number across all files, 1-based.
    pub nr: u64,
    /// Record number within the current file, 1-based.
    pub fnr: u64,
    /// Name of the current input file (empty for non-file sources).
    pub filename: String,
    /// Ordinal of the current input file, 1-based.
    pub filenum: u64,
    /// User-defined environment-like parameters.
    pub params: HashMap<String, String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            ifs: ",".to_string(),
            ofs: ",".to_string(),
            ips: "=".to_string(),
            ops: "=".to_string(),
            irs: "\n".to_string(),
            ors: "\n".to_string(),
            oflatsep: ":".to_string(),
            nr: 0,
            fnr: 0,
            filename: String::new(),
            filenum: 0,
            params: HashMap::new(),
        }
    }
}

impl Context {
    /// Begin a new input file: bumps `filenum`, resets `fnr`, records the
    /// file name. `nr` keeps counting across files.
    pub fn start_file(&mut self, name: &str) {
        self.filenum += 1;
        self.fnr = 0;
        self.filename = name.to_string();
    }

    /// Account for one input record.
    pub fn bump_record(&mut self) {
        self.nr += 1;
        self.fnr += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::Context;

    #[test]
    fn defaults() {
        let ctx = Context::default();
        assert_eq!(ctx.ifs, ",");
        assert_eq!(ctx.ips, "=");
        assert_eq!(ctx.oflatsep, ":");
        assert_eq!(ctx.nr, 0);
        assert_eq!(ctx.filenum, 0);
    }

    #[test]
    fn counters_across_files() {
        let mut ctx = Context::default();
        ctx.start_file("a.dkvp");
        ctx.bump_record();
        ctx.bump_record();
        assert_eq!((ctx.nr, ctx.fnr, ctx.filenum), (2, 2, 1));
        assert_eq!(ctx.filename, "a.dkvp");

        ctx.start_file("b.dkvp");
        ctx.bump_record();
        assert_eq!((ctx.nr, ctx.fnr, ctx.filenum), (3, 1, 2));
        assert_eq!(ctx.filename, "b.dkvp");
    }
}
