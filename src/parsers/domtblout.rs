//! HMMER `--domtblout` tabular output.

use std::io::BufRead;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::specs::{DomainType, ScoreKind};

use super::{HitSource, ParsedHit};
use crate::hit_list::RawHitRecord;

const TARGET_COL: usize = 0;
const QUERY_COL: usize = 3;
const COND_EVALUE_COL: usize = 11;
const INDP_EVALUE_COL: usize = 12;
const BITSCORE_COL: usize = 13;
const ALI_START_COL: usize = 17;
const ALI_STOP_COL: usize = 18;
const ENV_START_COL: usize = 19;
const ENV_STOP_COL: usize = 20;

/// Which coordinate pair becomes the hit's segment: `ali` (the aligned
/// region) or `env` (the envelope). Preserved as an explicit choice rather
/// than auto-selected from query id, per the `DomainTypePolicy` decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Ali,
    Env,
}

pub struct DomtbloutParser<R: BufRead> {
    reader: R,
    coords: CoordKind,
    line_number: usize,
    buffer: String,
    warned_negative_bitscore: OnceLock<()>,
}

impl<R: BufRead> DomtbloutParser<R> {
    pub fn new(reader: R, coords: CoordKind) -> Self {
        DomtbloutParser {
            reader,
            coords,
            line_number: 0,
            buffer: String::with_capacity(512),
            warned_negative_bitscore: OnceLock::new(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::MalformedLine {
            line: self.line_number,
            message: message.into(),
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<Option<ParsedHit>, ParseError> {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() <= ENV_STOP_COL {
            return Err(self.malformed(format!("expected at least {} columns, got {}", ENV_STOP_COL + 1, cols.len())));
        }

        let bitscore: f64 = cols[BITSCORE_COL]
            .parse()
            .map_err(|_| self.malformed("bitscore is not a number"))?;
        if bitscore <= 0.0 {
            if self.warned_negative_bitscore.set(()).is_ok() {
                tracing::warn!(line = self.line_number, bitscore, "skipping non-positive bitscore domtblout row");
            }
            return Ok(None);
        }

        let cond_evalue: f64 = cols[COND_EVALUE_COL]
            .parse()
            .map_err(|_| self.malformed("conditional e-value is not a number"))?;
        let indp_evalue: f64 = cols[INDP_EVALUE_COL]
            .parse()
            .map_err(|_| self.malformed("independent e-value is not a number"))?;

        let (start_col, stop_col) = match self.coords {
            CoordKind::Ali => (ALI_START_COL, ALI_STOP_COL),
            CoordKind::Env => (ENV_START_COL, ENV_STOP_COL),
        };
        let start: u64 = cols[start_col]
            .parse()
            .map_err(|_| self.malformed("start coordinate is not a number"))?;
        let stop: u64 = cols[stop_col]
            .parse()
            .map_err(|_| self.malformed("stop coordinate is not a number"))?;
        if stop < start {
            return Err(self.malformed("stop coordinate precedes start coordinate"));
        }

        Ok(Some(ParsedHit {
            query_id: cols[QUERY_COL].to_string(),
            record: RawHitRecord {
                label: cols[TARGET_COL].to_string(),
                raw_score: bitscore,
                score_kind: ScoreKind::Bitscore,
                domain_type: DomainType::Normal,
                segments: vec![(start - 1, stop)],
                cond_evalue: Some(cond_evalue),
                indp_evalue: Some(indp_evalue),
            },
        }))
    }
}

impl<R: BufRead> HitSource for DomtbloutParser<R> {
    fn next_hit(&mut self) -> Result<Option<ParsedHit>, ParseError> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(hit) = self.parse_line(line)? {
                return Ok(Some(hit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn row(bitscore: &str, cond_e: &str, indp_e: &str, ali: (&str, &str), env: (&str, &str)) -> String {
        // 21 whitespace-separated columns; only the indices this parser
        // reads are meaningful, the rest are filler.
        format!(
            "target_1 - 120 query_1 - 120 1.0e-10 1 1 1 1 1 {cond} {indp} {bit} 1 1 1 1 {ali0} {ali1} {env0} {env1}\n",
            cond = cond_e,
            indp = indp_e,
            bit = bitscore,
            ali0 = ali.0,
            ali1 = ali.1,
            env0 = env.0,
            env1 = env.1,
        )
    }

    #[test]
    fn parses_a_positive_bitscore_row_using_ali_coords() {
        let line = row("22.5", "1e-9", "1e-8", ("10", "20"), ("5", "25"));
        let mut parser = DomtbloutParser::new(Cursor::new(line), CoordKind::Ali);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.query_id, "query_1");
        assert_eq!(hit.record.label, "target_1");
        assert_eq!(hit.record.raw_score, 22.5);
        assert_eq!(hit.record.segments, vec![(9, 20)]);
    }

    #[test]
    fn env_coords_selected_when_requested() {
        let line = row("22.5", "1e-9", "1e-8", ("10", "20"), ("5", "25"));
        let mut parser = DomtbloutParser::new(Cursor::new(line), CoordKind::Env);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.record.segments, vec![(4, 25)]);
    }

    #[test]
    fn non_positive_bitscore_is_skipped_not_errored() {
        let line = row("-1.0", "1e-9", "1e-8", ("10", "20"), ("5", "25"));
        let mut parser = DomtbloutParser::new(Cursor::new(line), CoordKind::Ali);
        assert!(parser.next_hit().unwrap().is_none());
    }

    #[test]
    fn comment_lines_are_skipped() {
        let mut text = String::from("# this is a comment\n");
        text.push_str(&row("22.5", "1e-9", "1e-8", ("10", "20"), ("5", "25")));
        let mut parser = DomtbloutParser::new(Cursor::new(text), CoordKind::Ali);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.query_id, "query_1");
    }
}
