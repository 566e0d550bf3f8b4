/// Output formatting: pretty/compact JSON, NDJSON, table.
use std::io::{self, Write};
use std::time::Instant;

use comfy_table::{Cell, Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::types::{Business, BusinessRow, ErrorOutput, SearchPage};

/// Resolve the effective output format, handling the `--json` flag.
#[must_use]
pub fn resolve_format(fmt: OutputFormat, json_flag: bool) -> OutputFormat {
    if json_flag { OutputFormat::Ndjson } else { fmt }
}

/// Output context passed to all formatters.
pub struct OutputCtx {
    pub format: OutputFormat,
    pub no_header: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(fmt: OutputFormat, json_flag: bool, no_header: bool) -> Self {
        Self {
            format: resolve_format(fmt, json_flag),
            no_header,
        }
    }

    /// Start a named timer; elapsed time is logged at debug level on drop.
    #[must_use]
    pub fn timer(&self, label: &'static str) -> DebugTimer {
        DebugTimer::new(label)
    }
}

// --- Search page ---

/// Write one page of search results.
///
/// # Errors
///
/// Any I/O error from `out`.
pub fn write_page<W: Write>(out: &mut W, page: &SearchPage, ctx: &OutputCtx) -> io::Result<()> {
    match ctx.format {
        OutputFormat::Pretty => write_json(out, page),
        OutputFormat::Compact => write_compact_json(out, page),
        OutputFormat::Ndjson => write_ndjson(out, &page.businesses),
        OutputFormat::Table => {
            let rows: Vec<BusinessRow> = page.businesses.iter().map(BusinessRow::from_business).collect();
            write_table(out, &rows, ctx)
        }
    }
}

// --- Single business ---

/// Write a single business record.
///
/// # Errors
///
/// Any I/O error from `out`.
pub fn write_business<W: Write>(out: &mut W, business: &Business, ctx: &OutputCtx) -> io::Result<()> {
    let mut stream = BusinessStream::new(out, ctx);
    stream.push(business)?;
    stream.finish().map(|_| ())
}

// --- Business stream (depagination) ---

/// Writes businesses one at a time as they arrive.
///
/// JSON formats are flushed per record so downstream tools see results
/// while later pages are still being fetched. Table output has to see every
/// row first, so it is buffered until [`BusinessStream::finish`].
pub struct BusinessStream<'a, W: Write> {
    out: &'a mut W,
    ctx: &'a OutputCtx,
    rows: Vec<BusinessRow>,
    written: usize,
}

impl<'a, W: Write> BusinessStream<'a, W> {
    #[must_use]
    pub fn new(out: &'a mut W, ctx: &'a OutputCtx) -> Self {
        Self {
            out,
            ctx,
            rows: Vec::new(),
            written: 0,
        }
    }

    /// Emit (or buffer) one business.
    ///
    /// # Errors
    ///
    /// Any I/O error from the writer.
    pub fn push(&mut self, business: &Business) -> io::Result<()> {
        self.written += 1;
        match self.ctx.format {
            OutputFormat::Pretty => write_json(&mut *self.out, business)?,
            OutputFormat::Compact | OutputFormat::Ndjson => {
                write_compact_json(&mut *self.out, business)?;
            }
            OutputFormat::Table => {
                self.rows.push(BusinessRow::from_business(business));
                return Ok(());
            }
        }
        self.out.flush()
    }

    /// Flush buffered table rows. Returns the number of businesses seen.
    ///
    /// # Errors
    ///
    /// Any I/O error from the writer.
    pub fn finish(self) -> io::Result<usize> {
        if self.ctx.format == OutputFormat::Table {
            write_table(&mut *self.out, &self.rows, self.ctx)?;
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

fn write_table<W: Write>(out: &mut W, rows: &[BusinessRow], ctx: &OutputCtx) -> io::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    if !ctx.no_header {
        table.set_header(["NAME", "RATING", "REVIEWS", "CITY", "PHONE"]);
    }
    for row in rows {
        table.add_row([
            Cell::new(&row.name),
            Cell::new(row.rating.map(|r| format!("{r:.1}")).unwrap_or_default()),
            Cell::new(row.review_count.as_ref().map(ToString::to_string).unwrap_or_default()),
            Cell::new(row.city.as_deref().unwrap_or("")),
            Cell::new(row.phone.as_deref().unwrap_or("")),
        ]);
    }
    writeln!(out, "{table}")
}

// --- Error output ---

/// Write a structured error to stderr.
pub fn write_error(err: &ErrorOutput, format: OutputFormat) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match format {
        OutputFormat::Pretty | OutputFormat::Compact | OutputFormat::Ndjson => {
            let s = serde_json::to_string_pretty(err).unwrap_or_default();
            let _ = writeln!(out, "{s}");
        }
        OutputFormat::Table => {
            let _ = writeln!(out, "Error: {}", err.error.message);
            if let Some(body) = &err.error.body {
                let s = serde_json::to_string_pretty(body).unwrap_or_default();
                let _ = writeln!(out, "{s}");
            }
        }
    }
}

// --- Debug timer ---

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`OutputCtx::timer`]. Silent unless debug logging is enabled.
pub struct DebugTimer {
    label: &'static str,
    start: Instant,
}

impl DebugTimer {
    #[must_use]
    fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for DebugTimer {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(label = self.label, "{ms:.2}ms");
    }
}

// --- Generic JSON helpers ---

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_compact_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)
}

fn write_ndjson<W: Write, T: Serialize>(out: &mut W, values: &[T]) -> io::Result<()> {
    for v in values {
        write_compact_json(out, v)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn ctx(format: OutputFormat) -> OutputCtx {
        OutputCtx {
            format,
            no_header: false,
        }
    }

    fn page() -> SearchPage {
        SearchPage {
            businesses: vec![
                json!({"id": "a", "name": "Alpha", "rating": 4.5, "location": {"city": "Oakland"}}),
                json!({"id": "b", "name": "Beta\nBar", "review_count": 12}),
            ],
            total: 2,
            extra: Map::new(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_flag_means_ndjson() {
        assert_eq!(resolve_format(OutputFormat::Pretty, true), OutputFormat::Ndjson);
        assert_eq!(resolve_format(OutputFormat::Table, false), OutputFormat::Table);
    }

    #[test]
    fn test_ndjson_one_line_per_business() {
        let out = render(|w| write_page(w, &page(), &ctx(OutputFormat::Ndjson)));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!out.trim_start().starts_with('['));
        for line in &lines {
            let v: Value = serde_json::from_str(line).unwrap();
            assert!(v.is_object());
        }
        assert_eq!(serde_json::from_str::<Value>(lines[1]).unwrap()["name"], "Beta\nBar");
    }

    #[test]
    fn test_pretty_prints_whole_payload() {
        let out = render(|w| write_page(w, &page(), &ctx(OutputFormat::Pretty)));
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["total"], 2);
        assert_eq!(v["businesses"].as_array().unwrap().len(), 2);
        assert!(out.lines().count() > 2);
    }

    #[test]
    fn test_compact_is_single_line() {
        let out = render(|w| write_page(w, &page(), &ctx(OutputFormat::Compact)));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_table() {
        let out = render(|w| write_page(w, &page(), &ctx(OutputFormat::Table)));
        assert!(out.contains("NAME"));
        assert!(out.contains("Alpha"));
        assert!(out.contains("4.5"));
        assert!(out.contains("Oakland"));

        let bare = OutputCtx {
            format: OutputFormat::Table,
            no_header: true,
        };
        let out = render(|w| write_page(w, &page(), &bare));
        assert!(!out.contains("NAME"));
    }

    #[test]
    fn test_stream_counts_and_buffers_table() {
        let c = ctx(OutputFormat::Table);
        let mut buf = Vec::new();
        let mut stream = BusinessStream::new(&mut buf, &c);
        for b in &page().businesses {
            stream.push(b).unwrap();
        }
        assert_eq!(stream.finish().unwrap(), 2);
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches("NAME").count(), 1);
    }

    #[test]
    fn test_stream_ndjson() {
        let c = ctx(OutputFormat::Ndjson);
        let mut buf = Vec::new();
        let mut stream = BusinessStream::new(&mut buf, &c);
        for b in &page().businesses {
            stream.push(b).unwrap();
        }
        stream.finish().unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_single_business_pretty() {
        let out = render(|w| write_business(w, &json!({"id": "x"}), &ctx(OutputFormat::Pretty)));
        assert_eq!(out, "{\n  \"id\": \"x\"\n}\n");
    }
}
