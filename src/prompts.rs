//! Fixed copy: the assistant persona, the seed greeting and the fallback replies.

/// Persona sent as the Gemini `systemInstruction` for the whole session.
pub const SYSTEM_INSTRUCTION: &str = r#"You are WEBSOLUTE AI, a professional crypto market analyst and DAO governance assistant.
Your tone is technical, precise, and helpful.
When asked about market analysis, provide structured reports with clear sections.
You can simulate providing "On-chain data" and "Market Momentum" insights.
Always remind users that AI can make mistakes and they should verify data before investing."#;

/// First message of every conversation.
pub const GREETING: &str = "안녕하세요! WEBSOLUTE AI 어시스턴트입니다. \n암호화폐 시장 분석, DAO 거버넌스 제안서 검토, 또는 실시간 온체인 데이터에 대해 무엇이든 물어보세요.";

/// Timestamp shown on the greeting.
pub const GREETING_TIMESTAMP: &str = "오전 10:00";

/// Substituted when the endpoint answers without any text.
pub const EMPTY_REPLY_FALLBACK: &str = "죄송합니다. 응답을 생성하는 중에 오류가 발생했습니다.";

/// Shown in place of a reply when the gateway call fails for any reason.
pub const GATEWAY_FAILURE_FALLBACK: &str = "API 호출 중 오류가 발생했습니다. 설정을 확인해주세요.";

/// Input substrings that turn a reply into a report card.
pub const REPORT_TRIGGERS: [&str; 2] = ["분석", "리포트"];

pub const APP_TITLE: &str = "WEBSOLUTE AI";
pub const STATUS_ONLINE: &str = "시스템 정상 작동 중";
pub const REPORT_TITLE: &str = "실시간 시장 분석 리포트";
pub const REPORT_CHART_LABEL: &str = "MARKET MOMENTUM GRAPH";
pub const REPORT_DOWNLOAD_LABEL: &str = "상세 온체인 리포트 다운로드 (.PDF)";
pub const USER_BADGE: &str = "DAO LEVEL 5";
pub const INPUT_PLACEHOLDER: &str = "메시지를 입력하세요...";
pub const DISCLAIMER: &str = "AI는 실수를 할 수 있습니다. 투자 전 데이터를 확인하세요.";
pub const VERSION_TAG: &str = "Websolute AI v2.4";
