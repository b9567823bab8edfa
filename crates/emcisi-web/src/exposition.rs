//! Prometheus 텍스트 노출 포맷 렌더링.
//!
//! 요청마다 새 `Registry`를 만들어 샘플을 `GaugeVec` 자식으로 채운다.
//! 같은 레이블 조합이 두 번 나오면 나중 값이 남는다.

use emcisi_core::models::metric::{MetricCatalog, MetricId, MetricSample};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::btree_map::{BTreeMap, Entry};

use crate::error::WebError;

/// 샘플을 담은 요청 단위 레지스트리 생성
///
/// 샘플이 없는 메트릭은 등록하지 않는다.
pub fn sample_registry(
    catalog: &MetricCatalog,
    samples: &[MetricSample],
) -> Result<Registry, WebError> {
    let registry = Registry::new();
    let mut vecs: BTreeMap<MetricId, GaugeVec> = BTreeMap::new();

    for sample in samples {
        let gauges = match vecs.entry(sample.id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let desc = catalog.desc(sample.id);
                let vec = GaugeVec::new(
                    Opts::new(desc.fq_name.clone(), desc.help),
                    desc.label_names,
                )?;
                registry.register(Box::new(vec.clone()))?;
                e.insert(vec)
            }
        };

        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        gauges
            .get_metric_with_label_values(&labels)?
            .set(sample.value);
    }

    Ok(registry)
}

/// 메트릭 패밀리를 텍스트 포맷으로 인코딩
pub fn encode(families: &[MetricFamily]) -> Result<String, WebError> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| WebError::Encoding(e.to_string()))
}

/// 샘플을 바로 텍스트로 렌더링
pub fn render(catalog: &MetricCatalog, samples: &[MetricSample]) -> Result<String, WebError> {
    encode(&sample_registry(catalog, samples)?.gather())
}
