//! 메트릭 카탈로그와 샘플.
//!
//! 메트릭 이름, 설명, 레이블 이름은 [`MetricId`]마다 고정이다.
//! [`MetricCatalog`]는 시작 시 한 번 만들어 `Arc`로 공유하고, 사이클마다 바뀌는 것은
//! [`MetricSample`]의 값뿐이다.

use serde::Serialize;

/// 클러스터 단위 레이블
pub const CLUSTER_LABELS: &[&str] = &["clustername"];
/// 드라이브 단위 레이블
pub const DRIVE_LABELS: &[&str] = &["clustername", "drive_id", "type"];
/// 쿼터 경로 단위 레이블
pub const QUOTA_LABELS: &[&str] = &["clustername", "path"];
/// 클러스터 정보 레이블
pub const INFO_LABELS: &[&str] = &["version", "nodecount", "clustername"];

/// 카탈로그의 메트릭 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MetricId {
    ClusterVersion,
    // 시스템 요약
    CpuUsage,
    FtpThroughput,
    HttpThroughput,
    HdfsThroughput,
    IscsiThroughput,
    SmbThroughput,
    NfsThroughput,
    NetInThroughput,
    NetOutThroughput,
    NetTotalThroughput,
    DiskInThroughput,
    DiskOutThroughput,
    // 용량
    IfsBytesTotal,
    IfsBytesFree,
    IfsBytesAvail,
    IfsSsdBytesTotal,
    IfsSsdBytesFree,
    IfsSsdBytesAvail,
    // 드라이브
    DiskBusy,
    DiskAccessLatency,
    DiskBytesIn,
    DiskBytesOut,
    // 알림
    AlertsInfo,
    AlertsWarning,
    AlertsError,
    AlertsCritical,
    // 쿼터
    HardQuota,
    AdvisoryQuota,
    LogicalUsed,
    PhysicalUsed,
    // 익스포터 자체
    ExporterUp,
    CollectionDuration,
}

/// (subsystem, name, help, labels)
type Descriptor = (
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
);

impl MetricId {
    /// 카탈로그 순서대로 모든 메트릭
    pub const ALL: [MetricId; 33] = [
        MetricId::ClusterVersion,
        MetricId::CpuUsage,
        MetricId::FtpThroughput,
        MetricId::HttpThroughput,
        MetricId::HdfsThroughput,
        MetricId::IscsiThroughput,
        MetricId::SmbThroughput,
        MetricId::NfsThroughput,
        MetricId::NetInThroughput,
        MetricId::NetOutThroughput,
        MetricId::NetTotalThroughput,
        MetricId::DiskInThroughput,
        MetricId::DiskOutThroughput,
        MetricId::IfsBytesTotal,
        MetricId::IfsBytesFree,
        MetricId::IfsBytesAvail,
        MetricId::IfsSsdBytesTotal,
        MetricId::IfsSsdBytesFree,
        MetricId::IfsSsdBytesAvail,
        MetricId::DiskBusy,
        MetricId::DiskAccessLatency,
        MetricId::DiskBytesIn,
        MetricId::DiskBytesOut,
        MetricId::AlertsInfo,
        MetricId::AlertsWarning,
        MetricId::AlertsError,
        MetricId::AlertsCritical,
        MetricId::HardQuota,
        MetricId::AdvisoryQuota,
        MetricId::LogicalUsed,
        MetricId::PhysicalUsed,
        MetricId::ExporterUp,
        MetricId::CollectionDuration,
    ];

    fn descriptor(self) -> Descriptor {
        use MetricId::*;
        match self {
            ClusterVersion => (
                "cluster",
                "version",
                "A metric with a constant '1' value labeled by version and nodecount.",
                INFO_LABELS,
            ),
            CpuUsage => (
                "cluster",
                "cpu_usage",
                "The percentage CPU utilization.",
                CLUSTER_LABELS,
            ),
            FtpThroughput => (
                "cluster",
                "ftp_throughput",
                "The total throughput (in bytes/sec) for FTP operations.",
                CLUSTER_LABELS,
            ),
            HttpThroughput => (
                "cluster",
                "http_throughput",
                "The total throughput (in bytes/sec) for HTTP operations.",
                CLUSTER_LABELS,
            ),
            HdfsThroughput => (
                "cluster",
                "hdfs_throughput",
                "The total throughput (in bytes/sec) for HDFS operations.",
                CLUSTER_LABELS,
            ),
            IscsiThroughput => (
                "cluster",
                "iscsi_throughput",
                "The total throughput (in bytes/sec) for iSCSI operations.",
                CLUSTER_LABELS,
            ),
            SmbThroughput => (
                "cluster",
                "smb_throughput",
                "The total throughput (in bytes/sec) for SMB operations.",
                CLUSTER_LABELS,
            ),
            NfsThroughput => (
                "cluster",
                "nfs_throughput",
                "The total throughput (in bytes/sec) for NFS operations.",
                CLUSTER_LABELS,
            ),
            NetInThroughput => (
                "cluster",
                "net_in_throughput",
                "Incoming network traffic (in bytes/sec) for all operations.",
                CLUSTER_LABELS,
            ),
            NetOutThroughput => (
                "cluster",
                "net_out_throughput",
                "Outgoing network traffic (in bytes/sec) for all operations.",
                CLUSTER_LABELS,
            ),
            NetTotalThroughput => (
                "cluster",
                "net_total_throughput",
                "The total throughput (in bytes/sec) for all protocols listed.",
                CLUSTER_LABELS,
            ),
            DiskInThroughput => (
                "cluster",
                "disk_in_throughput",
                "Traffic to disk (in bytes/sec).",
                CLUSTER_LABELS,
            ),
            DiskOutThroughput => (
                "cluster",
                "disk_out_throughput",
                "Traffic from disk (in bytes/sec).",
                CLUSTER_LABELS,
            ),
            IfsBytesTotal => (
                "cluster",
                "ifs_bytes_total",
                "Total size of the /ifs filesystem in bytes.",
                CLUSTER_LABELS,
            ),
            IfsBytesFree => (
                "cluster",
                "ifs_bytes_free",
                "Free bytes on the /ifs filesystem.",
                CLUSTER_LABELS,
            ),
            IfsBytesAvail => (
                "cluster",
                "ifs_bytes_avail",
                "Bytes available to users on the /ifs filesystem.",
                CLUSTER_LABELS,
            ),
            IfsSsdBytesTotal => (
                "cluster",
                "ifs_ssd_bytes_total",
                "Total SSD capacity of the /ifs filesystem in bytes.",
                CLUSTER_LABELS,
            ),
            IfsSsdBytesFree => (
                "cluster",
                "ifs_ssd_bytes_free",
                "Free SSD bytes on the /ifs filesystem.",
                CLUSTER_LABELS,
            ),
            IfsSsdBytesAvail => (
                "cluster",
                "ifs_ssd_bytes_avail",
                "SSD bytes available to users on the /ifs filesystem.",
                CLUSTER_LABELS,
            ),
            DiskBusy => (
                "node",
                "disk_busy",
                "The percentage of time the drive was busy.",
                DRIVE_LABELS,
            ),
            DiskAccessLatency => (
                "node",
                "disk_access_latency",
                "The average operation latency.",
                DRIVE_LABELS,
            ),
            DiskBytesIn => (
                "node",
                "disk_bytes_in",
                "The rate of bytes written.",
                DRIVE_LABELS,
            ),
            DiskBytesOut => (
                "node",
                "disk_bytes_out",
                "The rate of bytes read.",
                DRIVE_LABELS,
            ),
            AlertsInfo => (
                "cluster",
                "alerts_info",
                "Number of current info alerts for the cluster",
                CLUSTER_LABELS,
            ),
            AlertsWarning => (
                "cluster",
                "alerts_warning",
                "Number of current warning alerts for the cluster",
                CLUSTER_LABELS,
            ),
            AlertsError => (
                "cluster",
                "alerts_error",
                "Number of current error alerts for the cluster",
                CLUSTER_LABELS,
            ),
            AlertsCritical => (
                "cluster",
                "alerts_critical",
                "Number of current critical alerts for the cluster",
                CLUSTER_LABELS,
            ),
            HardQuota => (
                "cluster",
                "hard_quota",
                "HardQuota of a path bytes",
                QUOTA_LABELS,
            ),
            AdvisoryQuota => (
                "cluster",
                "advisory_quota",
                "Advisory Quota of a path bytes",
                QUOTA_LABELS,
            ),
            LogicalUsed => (
                "cluster",
                "logical_used",
                "Used data w/o overhead of a path bytes",
                QUOTA_LABELS,
            ),
            PhysicalUsed => (
                "cluster",
                "physical_used",
                "Used Data w/overhead of a path bytes",
                QUOTA_LABELS,
            ),
            ExporterUp => (
                "exporter",
                "up",
                "Indicates if scrape was successful or not.",
                CLUSTER_LABELS,
            ),
            CollectionDuration => (
                "",
                "collection_duration_seconds",
                "Duration of collections by the EMC Isilon exporter",
                CLUSTER_LABELS,
            ),
        }
    }

    /// 고정 레이블 이름
    pub fn label_names(self) -> &'static [&'static str] {
        self.descriptor().3
    }
}

/// 메트릭 설명자
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDesc {
    /// 식별자
    pub id: MetricId,
    /// 완전한 메트릭 이름 (`emcisi_cluster_cpu_usage`)
    pub fq_name: String,
    /// 설명
    pub help: &'static str,
    /// 레이블 이름 (순서 고정)
    pub label_names: &'static [&'static str],
}

/// 네임스페이스/서브시스템/이름을 `_`로 잇는다. 빈 부분은 건너뛴다.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// 불변 메트릭 카탈로그 (모두 게이지)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCatalog {
    descs: Vec<MetricDesc>,
}

impl MetricCatalog {
    /// 네임스페이스로 카탈로그 생성
    pub fn new(namespace: &str) -> Self {
        let descs = MetricId::ALL
            .iter()
            .map(|&id| {
                let (subsystem, name, help, label_names) = id.descriptor();
                MetricDesc {
                    id,
                    fq_name: build_fq_name(namespace, subsystem, name),
                    help,
                    label_names,
                }
            })
            .collect();

        Self { descs }
    }

    /// 식별자의 설명자
    pub fn desc(&self, id: MetricId) -> &MetricDesc {
        // descs는 MetricId::ALL 순서로 채워진다
        &self.descs[id as usize]
    }
}

/// 메트릭 샘플 — (메트릭, 레이블 값, 값)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    /// 메트릭 식별자
    pub id: MetricId,
    /// 레이블 값 (`id.label_names()` 순서)
    pub labels: Vec<String>,
    /// 값
    pub value: f64,
}

impl MetricSample {
    /// 샘플 생성
    pub fn new<I, S>(id: MetricId, labels: I, value: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        debug_assert_eq!(
            labels.len(),
            id.label_names().len(),
            "{id:?} 레이블 수 불일치"
        );
        Self { id, labels, value }
    }

    /// 레이블 이름으로 값 조회
    pub fn label(&self, name: &str) -> Option<&str> {
        self.id
            .label_names()
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_order_matches_ids() {
        let catalog = MetricCatalog::new("emcisi");
        for id in MetricId::ALL {
            assert_eq!(catalog.desc(id).id, id);
        }
    }

    #[test]
    fn fq_names() {
        let catalog = MetricCatalog::new("emcisi");
        assert_eq!(
            catalog.desc(MetricId::CpuUsage).fq_name,
            "emcisi_cluster_cpu_usage"
        );
        assert_eq!(
            catalog.desc(MetricId::DiskBusy).fq_name,
            "emcisi_node_disk_busy"
        );
        assert_eq!(
            catalog.desc(MetricId::ExporterUp).fq_name,
            "emcisi_exporter_up"
        );
        assert_eq!(
            catalog.desc(MetricId::CollectionDuration).fq_name,
            "emcisi_collection_duration_seconds"
        );
        assert_eq!(build_fq_name("", "", "up"), "up");
    }

    #[test]
    fn names_are_unique() {
        let catalog = MetricCatalog::new("emcisi");
        let names: HashSet<_> = MetricId::ALL
            .iter()
            .map(|&id| catalog.desc(id).fq_name.as_str())
            .collect();
        assert_eq!(names.len(), MetricId::ALL.len());
    }

    #[test]
    fn every_metric_carries_clustername() {
        for id in MetricId::ALL {
            assert!(id.label_names().contains(&"clustername"), "{id:?}");
        }
    }

    #[test]
    fn sample_label_lookup() {
        let sample = MetricSample::new(MetricId::DiskBusy, ["c1", "1:3", "SSD"], 12.0);
        assert_eq!(sample.label("drive_id"), Some("1:3"));
        assert_eq!(sample.label("type"), Some("SSD"));
        assert_eq!(sample.label("path"), None);
    }
}
