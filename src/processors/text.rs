//! Plain-text renderer: one line per query, zero-allocation formatted in the
//! teacher's `BedWriter` style.

use std::io::{BufWriter, Write};

use crate::error::ResolveError;
use crate::scored_arch::ScoredArchitecture;

use super::HitsProcessor;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Writes `<query_id>\t<score>\t<label1>:<start1-stop1>[,<startN-stopN>];...`
/// one line per query, in hit-list order.
pub struct TextProcessor<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
}

impl<W: Write> TextProcessor<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        TextProcessor {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
        }
    }
}

impl<W: Write + Send> HitsProcessor for TextProcessor<W> {
    fn process_query(&mut self, query_id: &str, architecture: &ScoredArchitecture) -> Result<(), ResolveError> {
        self.writer.write_all(query_id.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(self.ryu_buf.format(architecture.score()).as_bytes())?;
        self.writer.write_all(b"\t")?;

        for (i, hit) in architecture.hits().iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b";")?;
            }
            self.writer.write_all(hit.label.as_bytes())?;
            self.writer.write_all(b":")?;
            for (j, (start, stop)) in hit.segments.iter().enumerate() {
                if j > 0 {
                    self.writer.write_all(b",")?;
                }
                self.writer.write_all(self.itoa_buf.format(*start + 1).as_bytes())?;
                self.writer.write_all(b"-")?;
                self.writer.write_all(self.itoa_buf.format(*stop).as_bytes())?;
            }
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResolveError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_list::{HitList, RawHitRecord};
    use crate::resolver::Resolver;
    use crate::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

    fn raw(label: &str, score: f64, segs: &[(u64, u64)]) -> RawHitRecord {
        RawHitRecord {
            label: label.to_string(),
            raw_score: score,
            score_kind: ScoreKind::Score,
            domain_type: DomainType::Normal,
            segments: segs.to_vec(),
            cond_evalue: None,
            indp_evalue: None,
        }
    }

    #[test]
    fn renders_one_tab_delimited_line_per_query() {
        let list = HitList::build(
            vec![raw("a", 10.0, &[(0, 10)]), raw("b", 5.0, &[(19, 30)])],
            &ScoreSpec::default(),
            &SegmentSpec::default(),
            &FilterSpec::default(),
            SegDuplHitPolicy::Preserve,
        );
        let arch = Resolver::resolve(&list);

        let mut buf = Vec::new();
        {
            let mut proc = TextProcessor::new(&mut buf);
            proc.process_query("q", &arch).unwrap();
            proc.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "q\t15.0\ta:1-10;b:20-30\n");
    }
}
