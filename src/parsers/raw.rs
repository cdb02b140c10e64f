//! The `raw-with-scores` / `raw-with-evalues` line format:
//! `<query_id> <label> <score> <start1>-<stop1>[,<startN>-<stopN>]*`.

use std::io::BufRead;

use crate::error::ParseError;
use crate::specs::{DomainType, ScoreKind};

use super::{HitSource, ParsedHit};
use crate::hit_list::RawHitRecord;

/// Whether the third field of each line is a plain score or an e-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawVariant {
    Scores,
    Evalues,
}

impl RawVariant {
    fn score_kind(self) -> ScoreKind {
        match self {
            RawVariant::Scores => ScoreKind::Score,
            RawVariant::Evalues => ScoreKind::Evalue,
        }
    }
}

/// Parses the raw line format from any buffered reader.
pub struct RawParser<R: BufRead> {
    reader: R,
    variant: RawVariant,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> RawParser<R> {
    pub fn new(reader: R, variant: RawVariant) -> Self {
        RawParser {
            reader,
            variant,
            line_number: 0,
            buffer: String::with_capacity(256),
        }
    }

    fn parse_line(&self, line: &str) -> Result<ParsedHit, ParseError> {
        let mut fields = line.split_whitespace();
        let query_id = fields
            .next()
            .ok_or_else(|| self.malformed("missing query id"))?
            .to_string();
        let label = fields
            .next()
            .ok_or_else(|| self.malformed("missing label"))?
            .to_string();
        let raw_score: f64 = fields
            .next()
            .ok_or_else(|| self.malformed("missing score field"))?
            .parse()
            .map_err(|_| self.malformed("score field is not a number"))?;
        let segments_field = fields
            .next()
            .ok_or_else(|| self.malformed("missing segment field"))?;
        let segments = parse_segments(segments_field).map_err(|e| self.malformed(&e))?;

        Ok(ParsedHit {
            query_id,
            record: RawHitRecord {
                label,
                raw_score,
                score_kind: self.variant.score_kind(),
                domain_type: DomainType::Normal,
                segments,
                cond_evalue: None,
                indp_evalue: None,
            },
        })
    }

    fn malformed(&self, message: &str) -> ParseError {
        ParseError::MalformedLine {
            line: self.line_number,
            message: message.to_string(),
        }
    }
}

/// Parses `start1-stop1[,startN-stopN]*` into half-open arrow bounds, where
/// the input bounds are 1-based inclusive residue indices.
fn parse_segments(field: &str) -> Result<Vec<(u64, u64)>, String> {
    field
        .split(',')
        .map(|part| {
            let (start_s, stop_s) = part
                .split_once('-')
                .ok_or_else(|| format!("segment {:?} is not start-stop", part))?;
            let start: u64 = start_s.parse().map_err(|_| format!("bad segment start {:?}", start_s))?;
            let stop: u64 = stop_s.parse().map_err(|_| format!("bad segment stop {:?}", stop_s))?;
            if stop < start {
                return Err(format!("segment stop {} precedes start {}", stop, start));
            }
            // 1-based inclusive [start, stop] -> half-open arrows [start-1, stop).
            Ok((start - 1, stop))
        })
        .collect()
}

impl<R: BufRead> HitSource for RawParser<R> {
    fn next_hit(&mut self) -> Result<Option<ParsedHit>, ParseError> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let line = self.buffer.trim();
            if line.is_empty() {
                continue;
            }
            return self.parse_line(line).map(Some);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_a_single_contiguous_line() {
        let mut parser = RawParser::new(Cursor::new("q a 10 1-10\n"), RawVariant::Scores);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.query_id, "q");
        assert_eq!(hit.record.label, "a");
        assert_eq!(hit.record.raw_score, 10.0);
        assert_eq!(hit.record.segments, vec![(0, 10)]);
        assert!(parser.next_hit().unwrap().is_none());
    }

    #[test]
    fn parses_discontiguous_segments() {
        let mut parser = RawParser::new(Cursor::new("q a 10 1-20,60-80\n"), RawVariant::Scores);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.record.segments, vec![(0, 20), (59, 80)]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut parser = RawParser::new(Cursor::new("\n  \nq a 1 1-5\n"), RawVariant::Scores);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.query_id, "q");
    }

    #[test]
    fn evalues_variant_tags_score_kind() {
        let mut parser = RawParser::new(Cursor::new("q a 1e-5 1-5\n"), RawVariant::Evalues);
        let hit = parser.next_hit().unwrap().unwrap();
        assert_eq!(hit.record.score_kind, ScoreKind::Evalue);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let mut parser = RawParser::new(Cursor::new("q a notanumber 1-5\n"), RawVariant::Scores);
        assert!(parser.next_hit().is_err());
    }
}
