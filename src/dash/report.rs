// Written reports from a generative language model.

use std::time::Duration;

use log::error;
use serde::{Deserialize, Serialize};

use crate::dash::config_reader::ReportSettings;
use crate::dash::*;

pub const REPORT_MISSING_KEY: &str = "시스템 설정에서 API Key가 누락되었습니다.";
pub const REPORT_FAILED: &str =
    "리포트 생성 중 오류가 발생했습니다. 학과 데이터 형식을 확인해 주세요.";
pub const CHAT_MISSING_KEY: &str = "AI 분석 기능을 사용하려면 API Key 설정이 필요합니다.";
pub const CHAT_FAILED: &str =
    "요청하신 분석을 수행하는 중 기술적인 문제가 발생했습니다. 관리자에게 문의하세요.";

/// Produces prose about the survey results.
///
/// Implementations never fail: problems are logged and reported to the user
/// as a message in place of the report.
pub trait ReportGenerator {
    fn dept_report(
        &self,
        dept: &DeptAgg,
        university: &AggregatedData,
        instruction: Option<&str>,
    ) -> String;

    fn chat(&self, message: &str, state: &AppState) -> String;
}

// ********* generateContent wire format ***********

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

impl GenerateRequest {
    fn new(system_instruction: &str, prompt: &str, temperature: f32) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

impl GenerateResponse {
    /// The text of the first candidate, if there is any.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.clone())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ********* Prompts ***********

const REPORT_SYSTEM_INSTRUCTION: &str = "\
당신은 대학 교육성과 관리를 담당하는 데이터 분석가입니다.
핵심역량 진단 결과를 바탕으로 학과 교수진을 위한 분석 리포트를 작성하십시오.
모든 점수는 5점 척도 응답을 100점 만점으로 환산한 값입니다.

리포트는 다음 순서로 구성하십시오.
- [학과 요약]: 응답 인원, 6대 역량 평균, 학년 및 성별 분포의 특이사항.
- [역량 분석]: 대학 전체 평균과 비교한 강점 역량과 보완이 필요한 역량.
- [하위 역량]: 12개 하위역량 중 강점 3개와 약점 3개, 수치 포함.
- [시사점]: 교육과정 개선과 학생 지도 방향에 대한 제언.

전문적이고 신뢰감 있는 보고서 문체를 유지하십시오.";

fn to_js<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

pub fn dept_prompt(dept: &DeptAgg, university: &AggregatedData, instruction: Option<&str>) -> String {
    let s = &dept.summary;
    let mut prompt = format!(
        "'{name}' 학과의 진단 결과입니다. 대학 전체 지표와 비교하여 리포트를 작성하십시오.

[학과 기초 정보]
- 학과명: {name}
- 계열: {category}
- 응답 인원: {n}명
- 학년 분포: {grades}
- 성별 분포: {genders}

[학과 역량 점수 (100점 환산)]
- 6대 핵심역량: {comp}
- 12개 하위역량: {sub}

[대학 전체 기준]
- 6대 핵심역량 평균: {ucomp}
- 12개 하위역량 평균: {usub}
",
        name = dept.dept_name,
        category = dept.category_name(),
        n = s.n,
        grades = to_js(&s.grade_distribution),
        genders = to_js(&s.gender_distribution),
        comp = to_js(&s.competency_scores),
        sub = to_js(&s.sub_competency_scores),
        ucomp = to_js(&university.competency_scores),
        usub = to_js(&university.sub_competency_scores),
    );
    if let Some(admissions) = &s.admission_distribution {
        prompt.push_str(&format!("- 전형별 분포: {}\n", to_js(admissions)));
    }
    if let Some(extra) = instruction {
        prompt.push_str(&format!("\n[추가 요청]\n{}\n", extra));
    }
    prompt
}

pub fn chat_system_instruction(state: &AppState) -> String {
    let names: Vec<&str> = state
        .departments
        .iter()
        .map(|d| d.dept_name.as_str())
        .collect();
    format!(
        "당신은 핵심역량 진단 결과를 분석하는 AI 분석가입니다.
사용자가 특정 학과의 분석을 요청하면 '학과 요약', '역량 분석', '하위 역량 TOP 3', '시사점' 순서로 답하십시오.

1. 요청한 학과가 학과 목록({names})에 있는지 먼저 확인하십시오.
2. 목록에 없다면 이름이 비슷한 학과를 제안하거나 목록을 안내하십시오.
3. 항상 대학 전체 평균({ucomp})과 비교하여 설명하십시오.
4. 계열별 평균: {cats}",
        names = names.join(", "),
        ucomp = to_js(&state.university.competency_scores),
        cats = to_js(
            &state
                .categories
                .iter()
                .map(|c| (c.category_name.clone(), c.summary.competency_scores.clone()))
                .collect::<Vec<_>>()
        ),
    )
}

// ********* HTTP implementation ***********

/// Calls the `generateContent` method of the Gemini API.
pub struct GeminiReporter {
    settings: ReportSettings,
    api_key: Option<String>,
}

impl GeminiReporter {
    /// Reads the API key from the environment variable named in the settings.
    pub fn new(settings: &ReportSettings) -> GeminiReporter {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "GeminiReporter::new: {} is not set, reports are disabled",
                settings.api_key_env
            );
        }
        GeminiReporter::with_api_key(settings, api_key)
    }

    pub fn with_api_key(settings: &ReportSettings, api_key: Option<String>) -> GeminiReporter {
        GeminiReporter {
            settings: settings.clone(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn generate(&self, api_key: &str, request: &GenerateRequest) -> DashResult<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .build()
            .context(HttpRequestSnafu {})?;
        let url = self.url();
        debug!("generate: POST {}", url);
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .context(HttpRequestSnafu {})?;
        let status = response.status();
        if !status.is_success() {
            let body: String = response.text().unwrap_or_default().chars().take(180).collect();
            return Err(Box::new(DashError::HttpStatus {
                status: status.as_u16(),
                body,
            }));
        }
        let parsed: GenerateResponse = response.json().context(HttpRequestSnafu {})?;
        let text = parsed.text().context(EmptyReportSnafu {})?;
        info!("generate: {} characters", text.chars().count());
        Ok(text)
    }

    fn generate_or(
        &self,
        request: &GenerateRequest,
        missing_key: &'static str,
        failed: &'static str,
    ) -> String {
        let api_key = match self.api_key.as_deref() {
            Some(k) => k,
            None => return missing_key.to_string(),
        };
        match self.generate(api_key, request) {
            Ok(text) => text,
            Err(e) => {
                error!("Report generation failed: {}", e);
                failed.to_string()
            }
        }
    }
}

impl ReportGenerator for GeminiReporter {
    fn dept_report(
        &self,
        dept: &DeptAgg,
        university: &AggregatedData,
        instruction: Option<&str>,
    ) -> String {
        let request = GenerateRequest::new(
            REPORT_SYSTEM_INSTRUCTION,
            &dept_prompt(dept, university, instruction),
            self.settings.temperature,
        );
        self.generate_or(&request, REPORT_MISSING_KEY, REPORT_FAILED)
    }

    fn chat(&self, message: &str, state: &AppState) -> String {
        let request = GenerateRequest::new(
            &chat_system_instruction(state),
            &format!("사용자 요청: {}", message),
            self.settings.chat_temperature,
        );
        self.generate_or(&request, CHAT_MISSING_KEY, CHAT_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        sample_state("2026-01-01T00:00:00.000Z")
    }

    #[test]
    fn missing_key_returns_message() {
        let reporter = GeminiReporter::with_api_key(&ReportSettings::default(), None);
        let state = state();
        let dept = state.department("간호학과").unwrap();
        assert_eq!(
            reporter.dept_report(dept, &state.university, None),
            REPORT_MISSING_KEY
        );
        assert_eq!(reporter.chat("간호학과 분석해줘", &state), CHAT_MISSING_KEY);
    }

    #[test]
    fn unreachable_service_returns_message() {
        let settings = ReportSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ReportSettings::default()
        };
        let reporter = GeminiReporter::with_api_key(&settings, Some("key".to_string()));
        let state = state();
        assert_eq!(reporter.chat("안녕하세요", &state), CHAT_FAILED);
    }

    #[test]
    fn request_wire_format() {
        let request = GenerateRequest::new("system", "prompt", 0.5);
        let js = serde_json::to_value(&request).unwrap();
        assert_eq!(
            js,
            json!({
                "systemInstruction": {"parts": [{"text": "system"}]},
                "contents": [{"role": "user", "parts": [{"text": "prompt"}]}],
                "generationConfig": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn response_text() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "첫 "}, {"text": "문단"}], "role": "model"}}],
            "usageMetadata": {}
        }))
        .unwrap();
        assert_eq!(response.text(), Some("첫 문단".to_string()));

        let empty: GenerateResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.text(), None);
        let blank: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": " "}]}}]}))
                .unwrap();
        assert_eq!(blank.text(), None);
    }

    #[test]
    fn prompts_carry_the_data() {
        let state = state();
        let dept = state.department("디자인학과").unwrap();
        let prompt = dept_prompt(dept, &state.university, Some("간결하게"));
        assert!(prompt.contains("디자인학과"));
        assert!(prompt.contains("기타창의계열"));
        assert!(prompt.contains("81.2"));
        assert!(prompt.contains("간결하게"));

        let system = chat_system_instruction(&state);
        assert!(system.contains("의예과, 간호학과, 디자인학과"));
    }

    #[test]
    fn url_from_settings() {
        let settings = ReportSettings {
            endpoint: "https://example.test/v1beta/".to_string(),
            ..ReportSettings::default()
        };
        let reporter = GeminiReporter::with_api_key(&settings, None);
        assert_eq!(
            reporter.url(),
            "https://example.test/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }
}
