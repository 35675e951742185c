use super::Exporter;
use crate::error::{KwError, Result};
use crate::io::atomic_write;
use crate::paths;
use crate::pipeline::RunOutput;
use crate::summary::SummaryRecord;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::path::{Path, PathBuf};

const ROOT_ELEMENT: &str = "summary";
const ITEM_ELEMENT: &str = "item";

/// `summary.json` and `summary.xml`.
pub struct SummaryExporter;

impl Exporter for SummaryExporter {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn export(&self, run: &RunOutput, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let json_path = out_dir.join(paths::SUMMARY_JSON);
        let json = serde_json::to_string_pretty(&run.summary)?;
        atomic_write(&json_path, json.as_bytes())?;

        let xml_path = out_dir.join(paths::SUMMARY_XML);
        atomic_write(&xml_path, summary_xml(&run.summary)?.as_bytes())?;

        Ok(vec![json_path, xml_path])
    }
}

fn xml_err(e: impl std::fmt::Display) -> KwError {
    KwError::Xml(e.to_string())
}

/// Render the summary as XML. Objects become nested elements named after
/// their fields; list entries become `<item>` elements.
pub fn summary_xml(summary: &SummaryRecord) -> Result<String> {
    let value = serde_json::to_value(summary)?;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    write_value(&mut writer, ROOT_ELEMENT, &value)?;
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            for (key, child) in map {
                write_value(writer, key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
            Ok(())
        }
        Value::Array(items) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            for item in items {
                write_value(writer, ITEM_ELEMENT, item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
            Ok(())
        }
        Value::String(s) => write_text(writer, name, s),
        Value::Bool(b) => write_text(writer, name, &b.to_string()),
        Value::Number(n) => write_text(writer, name, &n.to_string()),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{GeoMode, Partition};
    use crate::summary::{build_summary, SummaryInput};
    use crate::taxonomy::TypologyClassifier;
    use crate::types::{KeywordRecord, Locale, ObjectiveSelection};

    fn summary(objective: &str) -> SummaryRecord {
        let records = TypologyClassifier::default().classify_records(&[
            KeywordRecord::new("comprar tênis & meias")
                .with_intent("Transactional")
                .with_serp("Shopping ads")
                .with_volume(900.0),
        ]);
        let objective = ObjectiveSelection::parse(objective);
        let empty = Partition::default();
        build_summary(&SummaryInput {
            locale: Locale::En,
            objective: &objective,
            input_keywords: 1,
            geo_mode: Some(GeoMode::Strict),
            geo: &empty,
            negative: &empty,
            classified: &records,
            ctr_keywords: 1,
            growth: None,
        })
    }

    #[test]
    fn xml_has_declaration_and_root() {
        let xml = summary_xml(&summary("2")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<summary>"));
        assert!(xml.trim_end().ends_with("</summary>"));
        assert!(xml.contains("<objective>E-commerce Sales</objective>"));
        assert!(xml.contains("<geo_mode>strict</geo_mode>"));
    }

    #[test]
    fn xml_escapes_text_and_lists_items() {
        let xml = summary_xml(&summary("brand & reach")).unwrap();
        assert!(xml.contains("<objective>brand &amp; reach</objective>"));
        assert!(xml.contains("<example>comprar tênis &amp; meias</example>"));
        assert!(xml.contains("<journey_stages>"));
        assert!(xml.matches("<item>").count() >= 5);
        assert!(!xml.contains("<growth>"));
    }

    #[test]
    fn json_and_xml_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let run = crate::pipeline::run_pipeline(
            &crate::ingest::KeywordTable {
                records: vec![KeywordRecord::new("seo").with_volume(10.0)],
                has_volume: true,
                ..Default::default()
            },
            &crate::pipeline::RunOptions::from_config(
                Path::new("."),
                &crate::config::Config::default(),
            )
            .unwrap(),
            &crate::cluster::TfIdfKMeans::default(),
        )
        .unwrap();
        let written = SummaryExporter.export(&run, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        let json: Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["filters"]["kept_keywords"], 1);
    }
}
