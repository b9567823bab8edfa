//! JSON 필드 경로 추출기.
//!
//! 클러스터 API 응답에서 경로 표현식으로 값을 꺼낸다. 실패하지 않는다:
//! 경로가 없거나 잘못됐거나 문서가 JSON이 아니면 [`Field::Missing`] 상태가 되고,
//! 숫자 변환은 0, 문자열 변환은 빈 문자열을 돌려준다.
//! 클러스터 소프트웨어 버전마다 응답 스키마가 조금씩 다르다.
//!
//! ## 경로 문법
//!
//! | 표현식                    | 의미                                   |
//! |---------------------------|----------------------------------------|
//! | `a.b.c`                   | 객체 필드 탐색 (`\.`는 키 안의 점)      |
//! | `system.0.cpu`            | 배열 인덱스                            |
//! | `devices.#`               | 배열 길이                              |
//! | `drive.#.drive_id`        | 나머지 경로를 각 원소에 적용한 배열     |
//! | `groups.#[severity=="warning"]`  | 조건에 맞는 첫 원소             |
//! | `groups.#[severity=="warning"]#` | 조건에 맞는 모든 원소 (배열)    |
//!
//! 조건 연산자: `==`, `=`, `!=`, `<`, `<=`, `>`, `>=`. 연산자 없이 `#[field]`만
//! 쓰면 필드 존재 여부로 거른다. `#(...)` 괄호 표기도 허용한다.

use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::debug;

/// 추출 결과의 스칼라 표현
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 문자열 (배열/객체는 원본 JSON 텍스트)
    Str(String),
    /// 실수
    Float(f64),
    /// 정수 (불리언은 0/1)
    Int(i64),
    /// 경로 없음
    Missing,
}

/// 경로 추출 결과.
///
/// 원본 문서를 빌려 쓰는 동안에는 복사하지 않는다. `#` 길이나 필터 결과처럼
/// 새로 만들어진 값만 소유한다.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    /// 값 있음
    Present(Cow<'a, Value>),
    /// 경로 없음
    Missing,
}

impl<'a> Field<'a> {
    fn borrowed(value: &'a Value) -> Self {
        Field::Present(Cow::Borrowed(value))
    }

    fn from_cow(value: Option<Cow<'a, Value>>) -> Self {
        value.map_or(Field::Missing, Field::Present)
    }

    /// 경로가 존재하지 않았는지 여부
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    /// 원본 JSON 값
    pub fn value(&self) -> Option<&Value> {
        match self {
            Field::Present(v) => Some(v.as_ref()),
            Field::Missing => None,
        }
    }

    /// 실수 변환: 숫자, 숫자 문자열, `true`(1) 외에는 0
    pub fn as_f64(&self) -> f64 {
        match self.value() {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        }
    }

    /// 정수 변환: 실수는 소수점 이하를 버린다
    pub fn as_i64(&self) -> i64 {
        match self.value() {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
            Some(Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                    .unwrap_or(0)
            }
            Some(Value::Bool(true)) => 1,
            _ => 0,
        }
    }

    /// 문자열 변환: null/없음은 빈 문자열, 그 외는 JSON 텍스트
    pub fn as_string(&self) -> String {
        match self.value() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// 스칼라 표현
    pub fn scalar(&self) -> Scalar {
        match self.value() {
            None | Some(Value::Null) => Scalar::Missing,
            Some(Value::String(s)) => Scalar::Str(s.clone()),
            Some(Value::Bool(b)) => Scalar::Int(i64::from(*b)),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(0.0)),
            },
            Some(other) => Scalar::Str(other.to_string()),
        }
    }

    /// 배열 원소 목록 (배열이 아니면 빈 목록)
    pub fn elements(&self) -> Vec<Field<'a>> {
        match self {
            Field::Present(Cow::Borrowed(v)) => {
                let v: &'a Value = *v;
                match v {
                    Value::Array(items) => items.iter().map(Field::borrowed).collect(),
                    _ => Vec::new(),
                }
            }
            Field::Present(Cow::Owned(Value::Array(items))) => items
                .iter()
                .cloned()
                .map(|v| Field::Present(Cow::Owned(v)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 배열 원소 수 (배열이 아니면 0)
    pub fn count(&self) -> usize {
        match self.value() {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// 이 값을 기준으로 하위 경로 추출
    pub fn get(&self, path: &str) -> Field<'a> {
        match self {
            Field::Present(Cow::Borrowed(v)) => get(*v, path),
            Field::Present(Cow::Owned(v)) => get(v, path).into_owned(),
            Field::Missing => Field::Missing,
        }
    }

    /// 원본 문서와의 수명 연결을 끊는다
    pub fn into_owned(self) -> Field<'static> {
        match self {
            Field::Present(v) => Field::Present(Cow::Owned(v.into_owned())),
            Field::Missing => Field::Missing,
        }
    }
}

/// 파싱된 API 응답 문서.
///
/// 한 번 파싱해서 여러 경로를 추출할 때 사용한다. JSON이 아니면 빈 문서로 취급한다.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Option<Value>,
}

impl Document {
    /// 응답 본문 파싱
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(root) => Self { root: Some(root) },
            Err(e) => {
                debug!("JSON 파싱 실패, 빈 문서로 처리: {e}");
                Self { root: None }
            }
        }
    }

    /// 유효한 JSON이었는지 여부
    pub fn is_valid(&self) -> bool {
        self.root.is_some()
    }

    /// 경로 추출
    pub fn get(&self, path: &str) -> Field<'_> {
        match &self.root {
            Some(root) => get(root, path),
            None => Field::Missing,
        }
    }
}

/// 파싱된 값에서 경로 추출
pub fn get<'a>(document: &'a Value, path: &str) -> Field<'a> {
    match parse_path(path) {
        Some(segments) => Field::from_cow(resolve(Cow::Borrowed(document), &segments)),
        None => Field::Missing,
    }
}

/// JSON 텍스트에서 경로 추출
pub fn extract(document: &str, path: &str) -> Field<'static> {
    Document::parse(document).get(path).into_owned()
}

// ============================================================
// 경로 파싱
// ============================================================

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// 객체 키 또는 배열 인덱스
    Key(String),
    /// `#` — 마지막이면 길이, 아니면 나머지 경로를 각 원소에 적용
    Hash,
    /// `#[cond]` / `#[cond]#`
    Query { cond: Condition, all: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn accepts(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl Literal {
    fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return serde_json::from_str::<String>(raw)
                .map(Literal::Str)
                .unwrap_or_else(|_| Literal::Str(raw[1..raw.len() - 1].to_string()));
        }
        match raw {
            "true" => Literal::Bool(true),
            "false" => Literal::Bool(false),
            "null" => Literal::Null,
            _ => raw
                .parse::<f64>()
                .map(Literal::Num)
                .unwrap_or_else(|_| Literal::Str(raw.to_string())),
        }
    }

    fn compare(&self, value: Option<&Value>, op: CmpOp) -> bool {
        let ordering = match (self, value) {
            (Literal::Str(expected), Some(Value::String(actual))) => {
                Some(actual.as_str().cmp(expected.as_str()))
            }
            (Literal::Num(expected), Some(Value::Number(actual))) => {
                actual.as_f64().and_then(|a| a.partial_cmp(expected))
            }
            (Literal::Bool(expected), Some(Value::Bool(actual))) => Some(actual.cmp(expected)),
            (Literal::Null, None | Some(Value::Null)) => Some(Ordering::Equal),
            _ => None,
        };
        match ordering {
            Some(ord) => op.accepts(ord),
            // 타입이 다르면 같지 않은 것으로 본다
            None => op == CmpOp::Ne,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    path: Vec<Segment>,
    test: Option<(CmpOp, Literal)>,
}

impl Condition {
    fn parse(expr: &str) -> Option<Self> {
        let bytes = expr.as_bytes();
        let mut in_quote = false;
        let mut op_at = None;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if in_quote => i += 1,
                b'"' => in_quote = !in_quote,
                b'=' | b'!' | b'<' | b'>' if !in_quote => {
                    op_at = Some(i);
                    break;
                }
                _ => {}
            }
            i += 1;
        }

        let Some(i) = op_at else {
            return Some(Self {
                path: parse_path(expr.trim())?,
                test: None,
            });
        };

        let next_is_eq = bytes.get(i + 1) == Some(&b'=');
        let (op, len) = match (bytes[i], next_is_eq) {
            (b'=', true) => (CmpOp::Eq, 2),
            (b'=', false) => (CmpOp::Eq, 1),
            (b'!', true) => (CmpOp::Ne, 2),
            (b'<', true) => (CmpOp::Le, 2),
            (b'<', false) => (CmpOp::Lt, 1),
            (b'>', true) => (CmpOp::Ge, 2),
            (b'>', false) => (CmpOp::Gt, 1),
            _ => return None,
        };

        let left = expr[..i].trim();
        let right = expr[i + len..].trim();
        if left.is_empty() {
            return None;
        }

        Some(Self {
            path: parse_path(left)?,
            test: Some((op, Literal::parse(right))),
        })
    }

    fn matches(&self, item: &Value) -> bool {
        let found = resolve(Cow::Borrowed(item), &self.path);
        match &self.test {
            None => found.is_some(),
            Some((op, literal)) => literal.compare(found.as_deref(), *op),
        }
    }
}

/// 경로 문자열을 구성요소로 분리한다. 괄호/따옴표가 맞지 않거나 빈 구성요소가 있으면 `None`.
fn split_components(path: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if depth == 0 => current.push(chars.next()?),
            '\\' => {
                current.push(c);
                current.push(chars.next()?);
            }
            '"' if depth > 0 => {
                in_quote = !in_quote;
                current.push(c);
            }
            '[' | '(' if !in_quote => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if !in_quote => {
                depth = depth.checked_sub(1)?;
                current.push(c);
            }
            '.' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if depth != 0 || in_quote {
        return None;
    }
    parts.push(current);

    if parts.iter().any(String::is_empty) {
        return None;
    }
    Some(parts)
}

fn parse_segment(raw: String) -> Segment {
    if raw == "#" {
        return Segment::Hash;
    }
    if let Some(body) = raw.strip_prefix('#') {
        let (inner, all) = match body.strip_suffix('#') {
            Some(inner) => (inner, true),
            None => (body, false),
        };
        let cond = inner
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .or_else(|| inner.strip_prefix('(').and_then(|s| s.strip_suffix(')')))
            .and_then(Condition::parse);
        if let Some(cond) = cond {
            return Segment::Query { cond, all };
        }
    }
    Segment::Key(raw)
}

fn parse_path(path: &str) -> Option<Vec<Segment>> {
    if path.is_empty() {
        return None;
    }
    Some(
        split_components(path)?
            .into_iter()
            .map(parse_segment)
            .collect(),
    )
}

// ============================================================
// 경로 평가
// ============================================================

fn lookup<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child<'a>(current: Cow<'a, Value>, key: &str) -> Option<Cow<'a, Value>> {
    match current {
        Cow::Borrowed(v) => lookup(v, key).map(Cow::Borrowed),
        Cow::Owned(v) => lookup(&v, key).cloned().map(Cow::Owned),
    }
}

fn array_items<'a>(current: Cow<'a, Value>) -> Option<Vec<Cow<'a, Value>>> {
    match current {
        Cow::Borrowed(Value::Array(items)) => Some(items.iter().map(Cow::Borrowed).collect()),
        Cow::Owned(Value::Array(items)) => Some(items.into_iter().map(Cow::Owned).collect()),
        _ => None,
    }
}

fn collect_mapped<'a>(items: Vec<Cow<'a, Value>>, rest: &[Segment]) -> Cow<'a, Value> {
    let mapped = items
        .into_iter()
        .filter_map(|item| resolve(item, rest))
        .map(Cow::into_owned)
        .collect();
    Cow::Owned(Value::Array(mapped))
}

fn resolve<'a>(current: Cow<'a, Value>, segments: &[Segment]) -> Option<Cow<'a, Value>> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current);
    };

    match segment {
        Segment::Key(key) => resolve(child(current, key)?, rest),
        Segment::Hash => {
            let items = array_items(current)?;
            if rest.is_empty() {
                Some(Cow::Owned(Value::from(items.len())))
            } else {
                Some(collect_mapped(items, rest))
            }
        }
        Segment::Query { cond, all } => {
            let items = array_items(current)?;
            let mut matched = items.into_iter().filter(|item| cond.matches(item));
            if *all {
                Some(collect_mapped(matched.collect(), rest))
            } else {
                resolve(matched.next()?, rest)
            }
        }
    }
}
