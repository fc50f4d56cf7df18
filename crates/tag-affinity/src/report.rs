//! Serialization of pipeline artifacts: the scored-pair table as JSON Lines
//! and the cluster report as JSON.

use crate::error::Result;
use crate::graph::cluster::ClusterReport;
use crate::scoring::{ScoredPair, ScoredPairTable};
use crate::types::TagOrder;
use std::io::{BufRead, Write};

/// Write one JSON object per scored pair, in table order.
pub fn write_pairs_jsonl<W: Write>(table: &ScoredPairTable, mut writer: W) -> Result<()> {
    for row in table.iter() {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a scored-pair table written by [`write_pairs_jsonl`]. Blank lines are skipped.
pub fn read_pairs_jsonl<R: BufRead>(reader: R, order: TagOrder) -> Result<ScoredPairTable> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: ScoredPair = serde_json::from_str(&line)?;
        rows.push(row);
    }
    ScoredPairTable::from_rows(order, rows)
}

/// Write the cluster report as pretty-printed JSON.
pub fn write_report_json<W: Write>(report: &ClusterReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::pipeline::Pipeline;
    use crate::types::Post;

    fn output() -> crate::pipeline::PipelineOutput {
        let posts = vec![
            Post::new("1", ["c++", "qt"]),
            Post::new("2", ["c++", "qt", "syntax-highlighting"]),
            Post::new("3", ["qt", "qpainter"]),
        ];
        Pipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&posts)
            .unwrap()
    }

    #[test]
    fn test_pairs_jsonl_lines() {
        let output = output();
        let mut buf = Vec::new();
        write_pairs_jsonl(&output.table, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), output.table.len());

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["tag1"], "c++");
        assert_eq!(first["tag2"], "qt");
        assert_eq!(first["co_occurrence_count"], 2);
        assert_eq!(first["tag1_count"], 2);
        assert_eq!(first["tag2_count"], 3);
    }

    #[test]
    fn test_pairs_reload_into_same_table() {
        let output = output();
        let mut buf = Vec::new();
        write_pairs_jsonl(&output.table, &mut buf).unwrap();

        let reloaded = read_pairs_jsonl(buf.as_slice(), TagOrder::Lexicographic).unwrap();
        assert_eq!(reloaded, output.table);
    }

    #[test]
    fn test_report_json_shape() {
        let output = output();
        let mut buf = Vec::new();
        write_report_json(&output.report, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["cluster_size"], 30);
        assert_eq!(value["cores"][0]["tag"], "qt");
        assert_eq!(value["clusters"][0]["core"], "qt");
        assert_eq!(value["clusters"][0]["peripherals"][0]["tag"], "c++");
    }

    #[test]
    fn test_corrupt_rows_fail_to_reload() {
        let data = concat!(
            "{\"tag1\":\"a\",\"tag2\":\"b\",\"co_occurrence_count\":0,",
            "\"tag1_count\":0,\"tag2_count\":0,\"similarity\":0.0}\n",
        );
        let err = read_pairs_jsonl(data.as_bytes(), TagOrder::Lexicographic).unwrap_err();
        assert!(err.is_data_integrity());

        let data = concat!(
            "{\"tag1\":\"c\",\"tag2\":\"d\",\"co_occurrence_count\":9,",
            "\"tag1_count\":1,\"tag2_count\":1,\"similarity\":0.9}\n",
        );
        let err = read_pairs_jsonl(data.as_bytes(), TagOrder::Lexicographic).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_malformed_line_is_error() {
        let data = b"{\"tag1\": \"a\"}\n";
        assert!(read_pairs_jsonl(&data[..], TagOrder::Lexicographic).is_err());
    }
}
