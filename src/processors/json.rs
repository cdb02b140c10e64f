//! JSON renderer: one object per query, newline-delimited or
//! array-wrapped.

use std::io::Write;

use serde::Serialize;

use crate::error::ResolveError;
use crate::scored_arch::ScoredArchitecture;

use super::HitsProcessor;

#[derive(Serialize)]
struct JsonHit<'a> {
    label: &'a str,
    segments: Vec<(u64, u64)>,
}

#[derive(Serialize)]
struct JsonQuery<'a> {
    query_id: &'a str,
    score: f64,
    hits: Vec<JsonHit<'a>>,
}

/// Whether queries are written as newline-delimited JSON objects or as one
/// JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    NdJson,
    Array,
}

pub struct JsonProcessor<W: Write> {
    writer: W,
    layout: JsonLayout,
    wrote_any: bool,
}

impl<W: Write> JsonProcessor<W> {
    pub fn new(output: W, layout: JsonLayout) -> Self {
        JsonProcessor {
            writer: output,
            layout,
            wrote_any: false,
        }
    }

    fn write_separator(&mut self) -> Result<(), ResolveError> {
        if self.layout == JsonLayout::Array {
            if self.wrote_any {
                self.writer.write_all(b",\n")?;
            } else {
                self.writer.write_all(b"[\n")?;
            }
        }
        Ok(())
    }
}

impl<W: Write + Send> HitsProcessor for JsonProcessor<W> {
    fn process_query(&mut self, query_id: &str, architecture: &ScoredArchitecture) -> Result<(), ResolveError> {
        let value = JsonQuery {
            query_id,
            score: architecture.score(),
            hits: architecture
                .hits()
                .iter()
                .map(|h| JsonHit {
                    label: &h.label,
                    segments: h.segments.iter().map(|&(start, stop)| (start + 1, stop)).collect(),
                })
                .collect(),
        };

        self.write_separator()?;
        serde_json::to_writer(&mut self.writer, &value)?;
        if self.layout == JsonLayout::NdJson {
            self.writer.write_all(b"\n")?;
        }
        self.wrote_any = true;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResolveError> {
        if self.layout == JsonLayout::Array {
            if self.wrote_any {
                self.writer.write_all(b"\n]\n")?;
            } else {
                self.writer.write_all(b"[]\n")?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
