//! 단계별 응답 → 메트릭 샘플 변환.
//!
//! 모든 필드는 경로 추출기로 읽는다. 필드가 없으면 0으로 내보낸다.

use emcisi_core::extract::{Document, Field};
use emcisi_core::models::metric::{MetricId, MetricSample};
use tracing::{debug, warn};

use crate::state::ScrapeStep;

/// 시스템 요약 필드 (`system.0.<field>`)
const SUMMARY_FIELDS: [(&str, MetricId); 12] = [
    ("cpu", MetricId::CpuUsage),
    ("ftp", MetricId::FtpThroughput),
    ("http", MetricId::HttpThroughput),
    ("hdfs", MetricId::HdfsThroughput),
    ("iscsi", MetricId::IscsiThroughput),
    ("smb", MetricId::SmbThroughput),
    ("nfs", MetricId::NfsThroughput),
    ("net_in", MetricId::NetInThroughput),
    ("net_out", MetricId::NetOutThroughput),
    ("total", MetricId::NetTotalThroughput),
    ("disk_in", MetricId::DiskInThroughput),
    ("disk_out", MetricId::DiskOutThroughput),
];

const DRIVE_FIELDS: [(&str, MetricId); 4] = [
    ("busy", MetricId::DiskBusy),
    ("access_latency", MetricId::DiskAccessLatency),
    ("bytes_in", MetricId::DiskBytesIn),
    ("bytes_out", MetricId::DiskBytesOut),
];

const QUOTA_FIELDS: [(&str, MetricId); 4] = [
    ("thresholds.hard", MetricId::HardQuota),
    ("thresholds.advisory", MetricId::AdvisoryQuota),
    ("usage.logical", MetricId::LogicalUsed),
    ("usage.physical", MetricId::PhysicalUsed),
];

/// 단계 응답 본문에서 샘플 도출
pub fn derive(step: ScrapeStep, cluster: &str, body: &str) -> Vec<MetricSample> {
    let doc = Document::parse(body);
    if !doc.is_valid() {
        warn!("{step} 응답이 JSON이 아님, 필드를 0으로 내보냄");
    }
    match step {
        ScrapeStep::SystemSummary => system_summary(cluster, &doc),
        ScrapeStep::Capacity => capacity(cluster, &doc),
        ScrapeStep::DriveStats => drive_stats(cluster, &doc),
        ScrapeStep::Alerts => alerts(cluster, &doc),
        ScrapeStep::Quotas => quotas(cluster, &doc),
    }
}

fn system_summary(cluster: &str, doc: &Document) -> Vec<MetricSample> {
    SUMMARY_FIELDS
        .iter()
        .map(|&(field, id)| {
            let value = doc.get(&format!("system.0.{field}")).as_f64();
            MetricSample::new(id, [cluster], value)
        })
        .collect()
}

/// 용량 통계 키 → 메트릭
fn capacity_metric(key: &str) -> Option<MetricId> {
    match key {
        "ifs.bytes.total" => Some(MetricId::IfsBytesTotal),
        "ifs.bytes.free" => Some(MetricId::IfsBytesFree),
        "ifs.bytes.avail" => Some(MetricId::IfsBytesAvail),
        "ifs.ssd.bytes.total" => Some(MetricId::IfsSsdBytesTotal),
        "ifs.ssd.bytes.free" => Some(MetricId::IfsSsdBytesFree),
        "ifs.ssd.bytes.avail" => Some(MetricId::IfsSsdBytesAvail),
        _ => None,
    }
}

fn capacity(cluster: &str, doc: &Document) -> Vec<MetricSample> {
    let mut samples = Vec::new();
    for stat in doc.get("stats").elements() {
        let key = stat.get("key").as_string();
        match capacity_metric(&key) {
            Some(id) => samples.push(MetricSample::new(id, [cluster], stat.get("value").as_f64())),
            None => debug!("알 수 없는 용량 키 무시: '{key}'"),
        }
    }
    samples
}

fn drive_stats(cluster: &str, doc: &Document) -> Vec<MetricSample> {
    let drives = doc.get("drive").elements();
    let mut samples = Vec::with_capacity(drives.len() * DRIVE_FIELDS.len());

    for drive in &drives {
        let drive_id = drive.get("drive_id").as_string();
        let drive_type = drive.get("type").as_string();
        for &(field, id) in &DRIVE_FIELDS {
            samples.push(MetricSample::new(
                id,
                [cluster, drive_id.as_str(), drive_type.as_str()],
                drive.get(field).as_f64(),
            ));
        }
    }
    samples
}

fn severity_count(doc: &Document, severity: &str) -> f64 {
    let matches: Field<'_> = doc.get(&format!(r#"eventgroups.#[severity=="{severity}"]#"#));
    matches.count() as f64
}

fn alerts(cluster: &str, doc: &Document) -> Vec<MetricSample> {
    let error = severity_count(doc, "error");
    vec![
        MetricSample::new(MetricId::AlertsInfo, [cluster], severity_count(doc, "information")),
        MetricSample::new(MetricId::AlertsWarning, [cluster], severity_count(doc, "warning")),
        MetricSample::new(MetricId::AlertsError, [cluster], error),
        // FIXME: critical은 error와 같은 조건으로 센다. 클러스터의 critical 심각도 값을
        // 확인한 뒤 별도 조건으로 바꿔야 한다.
        MetricSample::new(MetricId::AlertsCritical, [cluster], error),
    ]
}

fn quotas(cluster: &str, doc: &Document) -> Vec<MetricSample> {
    let quotas = doc.get("quotas").elements();
    let mut samples = Vec::with_capacity(quotas.len() * QUOTA_FIELDS.len());

    for quota in &quotas {
        let path = quota.get("path").as_string();
        for &(field, id) in &QUOTA_FIELDS {
            samples.push(MetricSample::new(
                id,
                [cluster, path.as_str()],
                quota.get(field).as_f64(),
            ));
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(samples: &[MetricSample], id: MetricId) -> Option<f64> {
        samples.iter().find(|s| s.id == id).map(|s| s.value)
    }

    #[test]
    fn system_summary_reads_first_record() {
        let body = r#"{"system":[{"cpu":12.5,"ftp":0,"http":100,"nfs":2048.5,"total":4096,"net_in":"17"}]}"#;
        let samples = derive(ScrapeStep::SystemSummary, "c1", body);

        assert_eq!(samples.len(), SUMMARY_FIELDS.len());
        assert_eq!(value_of(&samples, MetricId::CpuUsage), Some(12.5));
        assert_eq!(value_of(&samples, MetricId::HttpThroughput), Some(100.0));
        assert_eq!(value_of(&samples, MetricId::NfsThroughput), Some(2048.5));
        assert_eq!(value_of(&samples, MetricId::NetTotalThroughput), Some(4096.0));
        assert_eq!(value_of(&samples, MetricId::NetInThroughput), Some(17.0));
        // 응답에 없는 필드는 0
        assert_eq!(value_of(&samples, MetricId::DiskOutThroughput), Some(0.0));
        assert!(samples.iter().all(|s| s.label("clustername") == Some("c1")));
    }

    #[test]
    fn unparseable_summary_is_zero_filled() {
        let samples = derive(ScrapeStep::SystemSummary, "c1", "<html>oops</html>");
        assert_eq!(samples.len(), SUMMARY_FIELDS.len());
        assert!(samples.iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn capacity_ignores_unknown_keys() {
        let body = r#"{"stats":[
            {"key":"ifs.bytes.total","value":1000,"devid":0},
            {"key":"unknown.key","value":5}
        ]}"#;
        let samples = derive(ScrapeStep::Capacity, "c1", body);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].id, MetricId::IfsBytesTotal);
        assert_eq!(samples[0].value, 1000.0);
    }

    #[test]
    fn capacity_maps_all_keys() {
        let body = r#"{"stats":[
            {"key":"ifs.bytes.total","value":6},
            {"key":"ifs.ssd.bytes.total","value":5},
            {"key":"ifs.bytes.free","value":4},
            {"key":"ifs.ssd.bytes.free","value":3},
            {"key":"ifs.bytes.avail","value":2},
            {"key":"ifs.ssd.bytes.avail","value":1}
        ]}"#;
        let samples = derive(ScrapeStep::Capacity, "c1", body);
        assert_eq!(samples.len(), 6);
        assert_eq!(value_of(&samples, MetricId::IfsSsdBytesFree), Some(3.0));
        assert_eq!(value_of(&samples, MetricId::IfsBytesAvail), Some(2.0));
    }

    #[test]
    fn drive_stats_emit_four_gauges_per_drive() {
        let body = r#"{"drive":[
            {"drive_id":"1:1","type":"SAS","busy":12.0,"access_latency":0.004,"bytes_in":100,"bytes_out":200},
            {"drive_id":"1:2","type":"SSD","busy":3.5},
            {"drive_id":"2:1","type":"SATA"}
        ]}"#;
        let samples = derive(ScrapeStep::DriveStats, "c1", body);

        assert_eq!(samples.len(), 3 * 4);
        let busy: Vec<_> = samples
            .iter()
            .filter(|s| s.id == MetricId::DiskBusy)
            .map(|s| (s.label("drive_id").unwrap(), s.label("type").unwrap(), s.value))
            .collect();
        assert_eq!(
            busy,
            vec![("1:1", "SAS", 12.0), ("1:2", "SSD", 3.5), ("2:1", "SATA", 0.0)]
        );
    }

    #[test]
    fn missing_drive_array_yields_nothing() {
        assert!(derive(ScrapeStep::DriveStats, "c1", r#"{"drives":[]}"#).is_empty());
    }

    #[test]
    fn alerts_count_by_severity() {
        let body = r#"{"eventgroups":[
            {"id":"1","severity":"warning"},
            {"id":"2","severity":"warning"},
            {"id":"3","severity":"error"}
        ],"total":3}"#;
        let samples = derive(ScrapeStep::Alerts, "c1", body);

        assert_eq!(samples.len(), 4);
        assert_eq!(value_of(&samples, MetricId::AlertsInfo), Some(0.0));
        assert_eq!(value_of(&samples, MetricId::AlertsWarning), Some(2.0));
        assert_eq!(value_of(&samples, MetricId::AlertsError), Some(1.0));
        assert_eq!(value_of(&samples, MetricId::AlertsCritical), Some(1.0));
    }

    #[test]
    fn quotas_emit_four_gauges_per_path() {
        let body = r#"{"quotas":[
            {"path":"/ifs/data","thresholds":{"hard":1000,"advisory":800},"usage":{"logical":500,"physical":650}},
            {"path":"/ifs/home","thresholds":{"hard":null,"advisory":null},"usage":{"logical":7,"physical":9}}
        ]}"#;
        let samples = derive(ScrapeStep::Quotas, "c1", body);

        assert_eq!(samples.len(), 2 * 4);
        let home_hard = samples
            .iter()
            .find(|s| s.id == MetricId::HardQuota && s.label("path") == Some("/ifs/home"))
            .unwrap();
        assert_eq!(home_hard.value, 0.0);
        let data_physical = samples
            .iter()
            .find(|s| s.id == MetricId::PhysicalUsed && s.label("path") == Some("/ifs/data"))
            .unwrap();
        assert_eq!(data_physical.value, 650.0);
    }
}
