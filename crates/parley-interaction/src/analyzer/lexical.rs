//! Deterministic fallback analysis strategy.
//!
//! Rule-based extraction over lexical cues: keyword sets per emotion,
//! regexes for monetary amounts and funding rounds, and fixed term tables
//! for topics, strategic concepts, stakeholders, actions and concerns. The
//! tables are enumerated once as statics, not rebuilt per call. This
//! strategy is total: it never fails for any input string, including the
//! empty string.

use once_cell::sync::Lazy;
use regex::Regex;

use parley_core::analysis::{
    BusinessImpact, EmotionAssessment, EndConditionStatus, FinancialImpact, ImpactLevel,
    KeyPointExtraction, MessageAnalysis, ObjectiveProgress, UrgencyLevel, UserEmotion,
};
use parley_core::SessionState;

/// One emotion detection rule: first matching rule wins.
struct EmotionRule {
    emotion: UserEmotion,
    confidence: f64,
    cues: &'static [&'static str],
}

const EMOTION_RULES: &[EmotionRule] = &[
    EmotionRule {
        emotion: UserEmotion::Positive,
        confidence: 0.9,
        cues: &[
            "acepto", "perfecto", "excelente", "de acuerdo", "genial", "fantástico", "aprobado",
        ],
    },
    EmotionRule {
        emotion: UserEmotion::Negative,
        confidence: 0.85,
        cues: &[
            "rechazo", "imposible", "preocupa", "problema", "preocupación", "no estoy de acuerdo",
        ],
    },
    EmotionRule {
        emotion: UserEmotion::Confident,
        confidence: 0.8,
        cues: &["propongo", "sugiero", "mi plan", "confío", "creo que", "estrategia"],
    },
    EmotionRule {
        emotion: UserEmotion::Frustrated,
        confidence: 0.8,
        cues: &["urgente", "inmediatamente", "necesito ya", "frustrado", "molesto"],
    },
    EmotionRule {
        emotion: UserEmotion::Aggressive,
        confidence: 0.85,
        cues: &["inaceptable", "exijo", "absurdo", "ridículo"],
    },
    EmotionRule {
        emotion: UserEmotion::Collaborative,
        confidence: 0.75,
        cues: &["juntos", "colaboremos", "trabajemos", "alianza"],
    },
    EmotionRule {
        emotion: UserEmotion::Hesitant,
        confidence: 0.7,
        cues: &["no estoy seguro", "quizás", "tal vez", "dudo", "no sé"],
    },
];

const TOPIC_TABLE: &[(&str, &[&str])] = &[
    ("usuarios", &["usuarios", "clientes", "user"]),
    ("crecimiento", &["crecimiento", "growth", "expansión"]),
    ("estrategia", &["estrategia", "plan", "roadmap"]),
    ("equipo", &["equipo", "team", "talento"]),
    ("producto", &["producto", "product", "plataforma"]),
    ("presentación", &["pitch", "deck", "presentación"]),
];

const STRATEGIC_TABLE: &[(&str, &[&str])] = &[
    ("plan", &["plan", "planificación", "planning"]),
    ("expansión", &["expansión", "expansion", "crecimiento"]),
    ("partnership", &["partnership", "alianza", "colaboración"]),
    ("mercado", &["mercado", "market", "segmento"]),
    ("competencia", &["competencia", "competition", "rival"]),
    ("estrategia", &["estrategia", "visión", "roadmap"]),
];

const STAKEHOLDER_TABLE: &[(&str, &[&str])] = &[
    ("CEO", &["ceo", "director ejecutivo"]),
    ("CFO", &["cfo", "director financiero"]),
    ("equipo", &["equipo", "team"]),
    ("usuarios", &["usuarios", "clientes", "users"]),
    ("inversores", &["inversores", "investors", "inversionista", "vc"]),
    ("junta", &["junta", "board", "directorio"]),
];

const ACTION_TABLE: &[(&str, &[&str])] = &[
    ("acción requerida", &["necesito", "debemos", "vamos a"]),
    ("implementación", &["implementar", "ejecutar", "desarrollar"]),
    ("análisis", &["revisar", "analizar", "evaluar"]),
];

const CONCERN_CUES: &[&str] = &[
    "preocupa", "riesgo", "problema", "desafío", "preocupación", "difícil", "complicado",
];

const RISK_TABLE: &[(&str, &[&str])] = &[
    ("riesgo competitivo", &["competencia", "rival"]),
    ("riesgo financiero", &["presupuesto", "costo", "dinero"]),
    ("riesgo temporal", &["tiempo", "deadline", "plazo"]),
];

const OPPORTUNITY_TABLE: &[(&str, &[&str])] = &[
    ("oportunidad de crecimiento", &["crecimiento", "expansión", "mercado"]),
    ("oportunidad de partnership", &["partnership", "alianza", "colaboración"]),
];

const COMPLETION_CUES: &[&str] = &[
    "acepto", "acuerdo", "aprobado", "listo", "completado", "terminado",
];
const PROPOSAL_CUES: &[&str] = &["propongo", "sugiero", "considero", "plan", "vamos a"];
const COMPREHENSION_CUES: &[&str] = &["entiendo", "comprendo", "veo"];

const GROWTH_CONTEXT_CUES: &[&str] = &["crecimiento", "growth", "aumento", "mensual", "anual"];

static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(?:[.,]\d+)?[KMBkmb]?").expect("money regex must parse"));
static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?%").expect("percent regex must parse"));
static USER_METRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+K?\s*usuarios?\b").expect("user metric regex must parse"));
static FUNDING_ROUND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bserie\s+([abc])\b").expect("funding round regex must parse"));

fn contains_any(haystack: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| haystack.contains(cue))
}

fn matched_cues(haystack: &str, cues: &[&str]) -> Vec<String> {
    cues.iter()
        .filter(|cue| haystack.contains(*cue))
        .map(|cue| cue.to_string())
        .collect()
}

fn table_matches(haystack: &str, table: &[(&str, &[&str])]) -> Vec<String> {
    table
        .iter()
        .filter(|(_, cues)| contains_any(haystack, cues))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Runs the deterministic analysis over one user message.
///
/// `objectives` and `end_conditions` must already be truncated to the
/// contractual caps. The result always satisfies the analysis invariants.
pub fn analyze(
    message: &str,
    session: &SessionState,
    objectives: &[String],
    end_conditions: &[String],
) -> MessageAnalysis {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return MessageAnalysis::neutral("Mensaje vacío, sin contenido analizable").normalized();
    }

    let msg_lower = trimmed.to_lowercase();
    let (emotion, confidence, indicators) = detect_emotion(&msg_lower);
    let financial_mentions = extract_financial_mentions(trimmed, &msg_lower);

    let analysis = MessageAnalysis {
        emotion: EmotionAssessment {
            primary: emotion,
            confidence,
            indicators,
        },
        key_points: KeyPointExtraction {
            main_topics: table_matches(&msg_lower, TOPIC_TABLE)
                .into_iter()
                .take(5)
                .collect(),
            financial_mentions,
            strategic_concepts: table_matches(&msg_lower, STRATEGIC_TABLE),
            stakeholders: table_matches(&msg_lower, STAKEHOLDER_TABLE),
            action_items: table_matches(&msg_lower, ACTION_TABLE),
            concerns_raised: matched_cues(&msg_lower, CONCERN_CUES)
                .into_iter()
                .map(|cue| format!("preocupación sobre {cue}"))
                .collect(),
        },
        business_impact: BusinessImpact {
            impact_level: assess_impact_level(&msg_lower),
            financial_impact: assess_financial_impact(&msg_lower),
            strategic_importance: assess_strategic_importance(&msg_lower),
            urgency_level: assess_urgency(&msg_lower),
            risk_factors: table_matches(&msg_lower, RISK_TABLE),
            opportunities: table_matches(&msg_lower, OPPORTUNITY_TABLE),
        },
        objective_progress: objectives
            .iter()
            .map(|objective| score_objective(&msg_lower, objective))
            .collect(),
        end_conditions: end_conditions
            .iter()
            .map(|condition| evaluate_condition(&msg_lower, condition))
            .collect(),
        summary: build_summary(trimmed, session),
        recommended_approach: recommend_approach(&msg_lower),
    };

    analysis.normalized()
}

/// Lexical-only emotion detection, exposed for quick classification.
pub fn detect_emotion(msg_lower: &str) -> (UserEmotion, f64, Vec<String>) {
    // Negated agreement would otherwise hit the positive "de acuerdo" cue.
    if msg_lower.contains("no estoy de acuerdo") {
        return (
            UserEmotion::Negative,
            0.85,
            vec![format!("no estoy de acuerdo (indica {})", UserEmotion::Negative)],
        );
    }

    for rule in EMOTION_RULES {
        let matched = matched_cues(msg_lower, rule.cues);
        if !matched.is_empty() {
            let indicators = matched
                .into_iter()
                .map(|cue| format!("{cue} (indica {})", rule.emotion))
                .collect();
            return (rule.emotion, rule.confidence, indicators);
        }
    }
    (UserEmotion::Neutral, 0.5, Vec::new())
}

fn extract_financial_mentions(message: &str, msg_lower: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();

    for m in MONEY_RE.find_iter(message) {
        mentions.push(m.as_str().to_string());
    }

    // Percentages only count as financial in a growth/metric context.
    if contains_any(msg_lower, GROWTH_CONTEXT_CUES) {
        for m in PERCENT_RE.find_iter(message) {
            mentions.push(m.as_str().to_string());
        }
    }

    for m in USER_METRIC_RE.find_iter(message) {
        mentions.push(m.as_str().to_string());
    }

    for caps in FUNDING_ROUND_RE.captures_iter(message) {
        if let Some(letter) = caps.get(1) {
            mentions.push(format!("Serie {}", letter.as_str().to_uppercase()));
        }
    }

    // Financial concepts mentioned without figures still matter.
    if contains_any(msg_lower, &["valuación", "valuation", "funding"]) {
        mentions.push("valuación".to_string());
    }
    if contains_any(msg_lower, &["revenue", "ingresos", "facturación"]) {
        mentions.push("revenue".to_string());
    }

    mentions
}

fn assess_impact_level(msg_lower: &str) -> ImpactLevel {
    if contains_any(msg_lower, &["crítico", "crisis", "urgente", "inmediatamente", "millones"]) {
        ImpactLevel::Critical
    } else if contains_any(msg_lower, &["importante", "significativo", "inversión", "clave"]) {
        ImpactLevel::High
    } else if contains_any(msg_lower, &["necesario", "requerido", "plan"]) {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

fn assess_financial_impact(msg_lower: &str) -> FinancialImpact {
    if contains_any(msg_lower, &["$", "millones", "inversión", "serie a", "serie b"]) {
        FinancialImpact::High
    } else if contains_any(msg_lower, &["presupuesto", "costo", "precio"]) {
        FinancialImpact::Medium
    } else if contains_any(msg_lower, &["usuarios", "crecimiento"]) {
        FinancialImpact::Low
    } else {
        FinancialImpact::None
    }
}

fn assess_strategic_importance(msg_lower: &str) -> ImpactLevel {
    if contains_any(msg_lower, &["estrategia", "visión", "misión"]) {
        ImpactLevel::Critical
    } else if contains_any(msg_lower, &["plan", "roadmap", "expansión"]) {
        ImpactLevel::High
    } else if contains_any(msg_lower, &["objetivo", "meta", "proyecto"]) {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

fn assess_urgency(msg_lower: &str) -> UrgencyLevel {
    if contains_any(msg_lower, &["urgente", "inmediatamente", "ya mismo", "hoy mismo"]) {
        UrgencyLevel::Immediate
    } else if contains_any(msg_lower, &["pronto", "rápido", "esta semana"]) {
        UrgencyLevel::High
    } else {
        UrgencyLevel::Medium
    }
}

fn score_objective(msg_lower: &str, objective: &str) -> ObjectiveProgress {
    let (percentage, evidence, remaining) = if contains_any(msg_lower, COMPLETION_CUES) {
        (
            90,
            vec!["Indicadores de aceptación o finalización".to_string()],
            Vec::new(),
        )
    } else if contains_any(msg_lower, PROPOSAL_CUES) {
        (
            60,
            vec!["Propuesta o plan presentado".to_string()],
            vec!["Necesita aceptación de la contraparte".to_string()],
        )
    } else if contains_any(msg_lower, COMPREHENSION_CUES) {
        (
            30,
            vec!["Usuario mostró comprensión del tema".to_string()],
            vec!["Más información necesaria".to_string()],
        )
    } else {
        (0, Vec::new(), vec![objective.to_string()])
    };

    ObjectiveProgress {
        objective_text: objective.to_string(),
        completion_percentage: percentage,
        is_fully_completed: percentage >= 90,
        evidence,
        remaining_requirements: remaining,
    }
}

fn evaluate_condition(msg_lower: &str, condition: &str) -> EndConditionStatus {
    let condition_lower = condition.to_lowercase();
    let condition_is_agreement =
        contains_any(&condition_lower, &["acuerdo", "aceptar", "términos", "cerrar"]);
    let is_met = condition_is_agreement && contains_any(msg_lower, COMPLETION_CUES);

    EndConditionStatus {
        condition_text: condition.to_string(),
        is_met,
        likelihood: if is_met { 0.7 } else { 0.3 },
    }
}

fn recommend_approach(msg_lower: &str) -> String {
    if contains_any(msg_lower, &["preocupa", "problema"]) {
        "Abordar preocupaciones con empatía y soluciones concretas".to_string()
    } else if contains_any(msg_lower, &["propongo", "sugiero"]) {
        "Evaluar propuesta y hacer preguntas de seguimiento".to_string()
    } else {
        "Mantener conversación productiva y explorar detalles".to_string()
    }
}

fn build_summary(message: &str, session: &SessionState) -> String {
    let preview: String = message.chars().take(100).collect();
    let ellipsis = if message.chars().count() > 100 { "..." } else { "" };
    format!(
        "Usuario ({}) expresó: {preview}{ellipsis}",
        session.user_role
    )
}
