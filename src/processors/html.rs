//! HTML renderer: a minimal static results table, one per query, intended
//! for human inspection rather than machine consumption.

use std::io::Write;

use crate::error::ResolveError;
use crate::scored_arch::ScoredArchitecture;

use super::HitsProcessor;

pub struct HtmlProcessor<W: Write> {
    writer: W,
    wrote_header: bool,
}

impl<W: Write> HtmlProcessor<W> {
    pub fn new(output: W) -> Self {
        HtmlProcessor {
            writer: output,
            wrote_header: false,
        }
    }

    fn write_header(&mut self) -> Result<(), ResolveError> {
        if !self.wrote_header {
            self.writer.write_all(b"<!doctype html>\n<html><body>\n")?;
            self.wrote_header = true;
        }
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl<W: Write + Send> HitsProcessor for HtmlProcessor<W> {
    fn process_query(&mut self, query_id: &str, architecture: &ScoredArchitecture) -> Result<(), ResolveError> {
        self.write_header()?;
        writeln!(
            self.writer,
            "<h2>{} (score {})</h2>",
            escape(query_id),
            architecture.score()
        )?;
        writeln!(self.writer, "<table border=\"1\">")?;
        writeln!(self.writer, "<tr><th>label</th><th>segments</th></tr>")?;
        for hit in architecture.hits() {
            let segs = hit
                .segments
                .iter()
                .map(|(start, stop)| format!("{}-{}", start + 1, stop))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(self.writer, "<tr><td>{}</td><td>{}</td></tr>", escape(&hit.label), escape(&segs))?;
        }
        writeln!(self.writer, "</table>")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResolveError> {
        self.write_header()?;
        self.writer.write_all(b"</body></html>\n")?;
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

    #[test]
    fn renders_a_table_row_per_hit() {
        let raw = RawHitRecord {
            label: "a".to_string(),
            raw_score: 5.0,
            score_kind: ScoreKind::Score,
            domain_type: DomainType::Normal,
            segments: vec![(0, 10)],
            cond_evalue: None,
            indp_evalue: None,
        };
        let list = HitList::build(
            vec![raw],
            &ScoreSpec::default(),
            &SegmentSpec::default(),
            &FilterSpec::default(),
            SegDuplHitPolicy::Preserve,
        );
        let arch = Resolver::resolve(&list);

        let mut buf = Vec::new();
        {
            let mut proc = HtmlProcessor::new(&mut buf);
            proc.process_query("q", &arch).unwrap();
            proc.finish().unwrap();
        }
        let html = String::from_utf8(buf).unwrap();
        assert!(html.contains("<table"));
        assert!(html.contains("1-10"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn escapes_label_content() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
    }
}
