//! SARIF 2.1.0 output formatter.

use crate::finding::{Finding, Severity};
use crate::report::ScanResult;
use serde_sarif::sarif::{
    ArtifactLocation, Location, Message, MultiformatMessageString, PhysicalLocation, PropertyBag,
    Region, ReportingDescriptor, Result as SarifResult, ResultLevel, Run, Sarif, Tool,
    ToolComponent,
};
use std::collections::{BTreeMap, HashMap};

pub fn format(report: &ScanResult) -> String {
    let all_findings: Vec<&Finding> =
        report.findings.iter().chain(report.waived_findings.iter()).collect();

    let mut rule_map: HashMap<&str, &Finding> = HashMap::new();
    for f in &all_findings {
        rule_map.entry(f.rule_id.as_str()).or_insert(f);
    }

    let mut rule_ids: Vec<&str> = rule_map.keys().copied().collect();
    rule_ids.sort();

    let rule_index: HashMap<&str, i64> =
        rule_ids.iter().enumerate().map(|(i, id)| (*id, i as i64)).collect();

    let rules: Vec<ReportingDescriptor> = rule_ids
        .iter()
        .map(|id| {
            let f = rule_map[id];
            let mut rule = ReportingDescriptor::builder().id(id.to_string()).build();
            rule.short_description =
                Some(MultiformatMessageString::builder().text(f.message.clone()).build());
            if !f.remediation.is_empty() {
                rule.help = Some(
                    MultiformatMessageString::builder().text(f.remediation.join("; ")).build(),
                );
            }
            rule
        })
        .collect();

    let results: Vec<SarifResult> = all_findings
        .iter()
        .map(|f| {
            let level = match f.severity {
                Severity::Critical => ResultLevel::Error,
                Severity::High => ResultLevel::Warning,
                Severity::Med | Severity::Low => ResultLevel::Note,
            };

            let mut result = SarifResult::builder()
                .message(Message::builder().text(f.message.clone()).build())
                .build();

            result.rule_id = Some(f.rule_id.clone());
            result.level = Some(level);
            result.rule_index = rule_index.get(f.rule_id.as_str()).copied();

            let mut extra: BTreeMap<String, serde_json::Value> = BTreeMap::new();
            extra.insert("confidence".to_string(), serde_json::json!(f.confidence.to_string()));
            extra.insert("evidence".to_string(), serde_json::json!(f.evidence));
            extra.insert("remediation".to_string(), serde_json::json!(f.remediation));
            let mut properties = PropertyBag::builder().build();
            properties.additional_properties = extra;
            result.properties = Some(properties);

            let mut physical = PhysicalLocation::builder().build();
            physical.artifact_location = Some(ArtifactLocation::builder().uri(f.file.clone()).build());
            if let Some(line) = f.line {
                let mut region = Region::builder().start_line(line as i64).build();
                if let Some(column) = f.column {
                    region.start_column = Some(column as i64);
                }
                physical.region = Some(region);
            }
            let mut location = Location::builder().build();
            location.physical_location = Some(physical);
            result.locations = Some(vec![location]);

            result
        })
        .collect();

    let driver = ToolComponent::builder()
        .name("shipguard")
        .version(env!("CARGO_PKG_VERSION").to_string())
        .rules(rules)
        .build();

    let tool = Tool::builder().driver(driver).build();
    let run = Run::builder().tool(tool).results(results).build();
    let sarif = Sarif::builder().version("2.1.0").runs(vec![run]).build();

    serde_json::to_string_pretty(&sarif).expect("SARIF serialization failed")
}
