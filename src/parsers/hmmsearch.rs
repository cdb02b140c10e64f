//! Plain `hmmsearch` text output: a state machine over per-query blocks
//! (`>> query_id`), per-domain summary rows, and `== domain N` alignment
//! sections.

use std::collections::{HashMap, VecDeque};
use std::io::BufRead;

use crate::error::ParseError;
use crate::specs::{DomainType, ScoreKind};

use super::{HitSource, ParsedHit};
use crate::hit_list::RawHitRecord;

const LINE_BITSCORE_OFFSET: usize = 2;
const LINE_COND_EVALUE_OFFSET: usize = 4;
const LINE_INDP_EVALUE_OFFSET: usize = 5;
const LINE_ALI_FROM_OFFSET: usize = 9;
const LINE_ALI_TO_OFFSET: usize = 10;
const LINE_ENV_FROM_OFFSET: usize = 12;
const LINE_ENV_TO_OFFSET: usize = 13;

#[derive(Debug, Clone)]
struct PendingDomain {
    domain_num: u64,
    bitscore: f64,
    cond_evalue: f64,
    indp_evalue: f64,
    ali_from: u64,
    ali_to: u64,
}

/// Parses plain `hmmsearch` output from a buffered reader.
///
/// `min_gap_length`, when `Some`, enables splitting a domain's `ali`
/// coordinates at internal alignment gaps of at least that many residues,
/// using the target sequence line of the matching `== domain N` section.
/// `None` keeps each domain as a single contiguous segment.
pub struct HmmsearchParser<R: BufRead> {
    lines: std::io::Lines<R>,
    min_gap_length: Option<usize>,
    line_number: usize,
    eof: bool,

    block_query: Option<String>,
    block_domains: Vec<PendingDomain>,
    block_alignments: HashMap<u64, String>,
    current_domain_num: Option<u64>,
    numbered_lines_in_domain: usize,

    ready: VecDeque<ParsedHit>,
}

impl<R: BufRead> HmmsearchParser<R> {
    pub fn new(reader: R, min_gap_length: Option<usize>) -> Self {
        HmmsearchParser {
            lines: reader.lines(),
            min_gap_length,
            line_number: 0,
            eof: false,
            block_query: None,
            block_domains: Vec::new(),
            block_alignments: HashMap::new(),
            current_domain_num: None,
            numbered_lines_in_domain: 0,
            ready: VecDeque::new(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::MalformedLine {
            line: self.line_number,
            message: message.into(),
        }
    }

    fn is_summary_row(line: &str) -> bool {
        let mut it = line.trim_start().splitn(2, char::is_whitespace);
        let first = match it.next() {
            Some(s) => s,
            None => return false,
        };
        if first.parse::<u64>().is_err() {
            return false;
        }
        let rest = match it.next() {
            Some(s) => s.trim_start(),
            None => return false,
        };
        rest.starts_with('!') || rest.starts_with('?')
    }

    fn parse_summary_row(&self, line: &str) -> Result<PendingDomain, ParseError> {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() <= LINE_ENV_TO_OFFSET {
            return Err(self.malformed("summary row has too few columns"));
        }
        let domain_num: u64 = cols[0].parse().map_err(|_| self.malformed("domain number is not an integer"))?;
        let bitscore: f64 = cols[LINE_BITSCORE_OFFSET]
            .parse()
            .map_err(|_| self.malformed("bitscore is not a number"))?;
        let cond_evalue: f64 = cols[LINE_COND_EVALUE_OFFSET]
            .parse()
            .map_err(|_| self.malformed("conditional e-value is not a number"))?;
        let indp_evalue: f64 = cols[LINE_INDP_EVALUE_OFFSET]
            .parse()
            .map_err(|_| self.malformed("independent e-value is not a number"))?;
        let ali_from: u64 = cols[LINE_ALI_FROM_OFFSET]
            .parse()
            .map_err(|_| self.malformed("ali-from is not a number"))?;
        let ali_to: u64 = cols[LINE_ALI_TO_OFFSET]
            .parse()
            .map_err(|_| self.malformed("ali-to is not a number"))?;
        // env-from/env-to are read for completeness but this parser only
        // segments on `ali` coordinates; see CoordKind in the domtblout parser.
        let _: u64 = cols[LINE_ENV_FROM_OFFSET]
            .parse()
            .map_err(|_| self.malformed("env-from is not a number"))?;
        let _: u64 = cols[LINE_ENV_TO_OFFSET]
            .parse()
            .map_err(|_| self.malformed("env-to is not a number"))?;

        Ok(PendingDomain {
            domain_num,
            bitscore,
            cond_evalue,
            indp_evalue,
            ali_from,
            ali_to,
        })
    }

    /// Looks like an alignment row: `<name> <start:int> <seq> <end:int>`.
    fn alignment_row_target(line: &str) -> Option<&str> {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != 4 {
            return None;
        }
        if cols[1].parse::<u64>().is_err() || cols[3].parse::<u64>().is_err() {
            return None;
        }
        Some(cols[2])
    }

    /// Finalises the current query block: turns every collected summary row
    /// into a `ParsedHit`, using that domain's captured alignment string for
    /// gap-splitting if one was found and `min_gap_length` is set.
    fn finalise_block(&mut self) {
        let Some(query_id) = self.block_query.take() else {
            return;
        };
        for d in self.block_domains.drain(..) {
            let segments = match self.min_gap_length {
                Some(min_gap) => self
                    .block_alignments
                    .get(&d.domain_num)
                    .and_then(|align| split_on_gaps(align, d.ali_from, min_gap))
                    .unwrap_or_else(|| vec![(d.ali_from - 1, d.ali_to)]),
                None => vec![(d.ali_from - 1, d.ali_to)],
            };
            self.ready.push_back(ParsedHit {
                query_id: query_id.clone(),
                record: RawHitRecord {
                    label: format!("{}/{}", query_id, d.domain_num),
                    raw_score: d.bitscore,
                    score_kind: ScoreKind::Bitscore,
                    domain_type: DomainType::Normal,
                    segments,
                    cond_evalue: Some(d.cond_evalue),
                    indp_evalue: Some(d.indp_evalue),
                },
            });
        }
        self.block_alignments.clear();
        self.current_domain_num = None;
        self.numbered_lines_in_domain = 0;
    }
}

impl<R: BufRead> HitSource for HmmsearchParser<R> {
    fn next_hit(&mut self) -> Result<Option<ParsedHit>, ParseError> {
        loop {
            if let Some(hit) = self.ready.pop_front() {
                return Ok(Some(hit));
            }
            if self.eof {
                return Ok(None);
            }

            let line = match self.lines.next() {
                Some(l) => l?,
                None => {
                    self.eof = true;
                    self.finalise_block();
                    continue;
                }
            };
            self.line_number += 1;
            let trimmed = line.trim_end();

            if let Some(rest) = trimmed.strip_prefix(">> ") {
                self.finalise_block();
                self.block_query = Some(rest.trim().to_string());
                continue;
            }

            if Self::is_summary_row(trimmed) {
                let domain = self.parse_summary_row(trimmed)?;
                self.block_domains.push(domain);
                continue;
            }

            if let Some(rest) = trimmed.trim_start().strip_prefix("== domain") {
                let num: u64 = rest
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                self.current_domain_num = Some(num);
                self.numbered_lines_in_domain = 0;
                continue;
            }

            if self.min_gap_length.is_some() {
                if let (Some(num), Some(target)) = (self.current_domain_num, Self::alignment_row_target(trimmed)) {
                    self.numbered_lines_in_domain += 1;
                    // The query/consensus line is the first numbered row in
                    // a domain block, the target sequence the second.
                    if self.numbered_lines_in_domain == 2 {
                        self.block_alignments.insert(num, target.to_string());
                    }
                }
            }
        }
    }
}

/// Splits an alignment string into contiguous residue runs at internal gaps
/// (`-`/`.`) of length `>= min_gap_length`. Returns `None` if `align` is
/// empty (no alignment was captured for this domain).
///
/// Target-sequence gap characters consume no target residue number, so two
/// runs separated only by gap characters are still adjacent in residue
/// space; such runs are merged back together rather than emitted as a
/// touching (and therefore invalid) pair of segments. A genuine split only
/// survives when the underlying residue numbering itself leaves a gap.
fn split_on_gaps(align: &str, seq_start: u64, min_gap_length: usize) -> Option<Vec<(u64, u64)>> {
    if align.is_empty() {
        return None;
    }
    let mut raw = Vec::new();
    let mut pos = seq_start; // 1-based residue position of the next real residue
    let mut run_start: Option<u64> = None;
    let mut gap_run = 0usize;

    for ch in align.chars() {
        let is_gap = ch == '-' || ch == '.';
        if is_gap {
            gap_run += 1;
            if gap_run >= min_gap_length {
                if let Some(start) = run_start.take() {
                    raw.push((start - 1, pos - 1));
                }
            }
        } else {
            if run_start.is_none() {
                run_start = Some(pos);
            }
            gap_run = 0;
            pos += 1;
        }
    }
    if let Some(start) = run_start {
        raw.push((start - 1, pos - 1));
    }
    if raw.is_empty() {
        return None;
    }

    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(raw.len());
    for (start, stop) in raw {
        match merged.last_mut() {
            Some((_, prev_stop)) if start <= *prev_stop => {
                *prev_stop = (*prev_stop).max(stop);
            }
            _ => merged.push((start, stop)),
        }
    }
    Some(merged)
}
