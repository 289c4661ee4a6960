//! Memory recall: answering questions from accumulated insights.
//!
//! Questions are classified into an insight topic by keyword cues with a
//! fixed priority order (financial first, it carries the most specific
//! vocabulary), then answered with capped previews of the relevant
//! accumulated lists. Classification failure is a normal outcome, not an
//! error path.

use serde::{Deserialize, Serialize};

use super::ConversationInsights;

/// Maximum items returned per list in a recall answer.
pub const MAX_RECALL_ITEMS: usize = 5;

/// Topic a memory question was classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightTopic {
    Financial,
    KeyPoints,
    Strategic,
    Stakeholders,
    Actions,
    Concerns,
    General,
}

/// Relevant accumulated data returned by recall and search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecallData {
    pub relevant_key_points: Vec<String>,
    pub relevant_financial_data: Vec<String>,
    pub relevant_stakeholders: Vec<String>,
    pub relevant_actions: Vec<String>,
    pub relevant_concerns: Vec<String>,
    pub context_summary: String,
}

/// Whether and how a question can be answered from memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallAnswer {
    pub can_answer: bool,
    pub insight_type: Option<InsightTopic>,
    pub data: RecallData,
}

const FINANCIAL_CUES: &[&str] = &[
    "financiero", "financieras", "dinero", "presupuesto", "costo", "precio", "valor",
    "inversion", "inversión", "serie a", "funding", "revenue", "arr", "$", "millones",
    "ingresos", "cifras", "numeros", "números", "metricas", "métricas", "economico",
    "económico", "monetario",
];
const SUMMARY_CUES: &[&str] = &[
    "key findings", "puntos clave", "conclusiones", "resumen", "resumir",
];
const CONVERSATION_CUES: &[&str] = &[
    "discutido", "hablado", "conversacion", "conversación", "mencionado", "aspectos",
    "temas", "cubierto", "tratado",
];
const STRATEGIC_CUES: &[&str] = &[
    "estrategia", "estrategico", "estratégico", "enfoque", "vision", "visión", "mision",
    "misión", "objetivos", "metas", "direccion", "dirección",
];
const STAKEHOLDER_CUES: &[&str] = &[
    "equipo", "personas", "stakeholder", "cliente", "usuario", "inversor", "socio",
    "partner", "ceo", "team",
];
const ACTION_CUES: &[&str] = &[
    "acciones", "pasos", "implementar", "ejecutar", "realizar", "siguiente", "proximos",
    "próximos", "plan de accion", "plan de acción",
];
const CONCERN_CUES: &[&str] = &[
    "problemas", "preocupaciones", "riesgos", "desafios", "desafíos", "dificultades",
    "obstaculos", "obstáculos", "concerns", "issues",
];
const PAST_REFERENCE_CUES: &[&str] = &[
    "anterior", "anteriormente", "antes", "previo", "pasado", "discutimos", "hablamos",
    "mencionamos", "dijimos",
];

fn contains_any(haystack: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| haystack.contains(cue))
}

/// Classifies a question into an insight topic, if any.
///
/// Priority order: financial > summary/key-findings > conversation reference
/// > strategic > stakeholders > actions > concerns > explicit past reference.
pub fn classify_question(question: &str) -> Option<InsightTopic> {
    let question_lower = question.to_lowercase();

    if contains_any(&question_lower, FINANCIAL_CUES) {
        Some(InsightTopic::Financial)
    } else if contains_any(&question_lower, SUMMARY_CUES) {
        Some(InsightTopic::KeyPoints)
    } else if contains_any(&question_lower, CONVERSATION_CUES) {
        Some(InsightTopic::KeyPoints)
    } else if contains_any(&question_lower, STRATEGIC_CUES) {
        Some(InsightTopic::Strategic)
    } else if contains_any(&question_lower, STAKEHOLDER_CUES) {
        Some(InsightTopic::Stakeholders)
    } else if contains_any(&question_lower, ACTION_CUES) {
        Some(InsightTopic::Actions)
    } else if contains_any(&question_lower, CONCERN_CUES) {
        Some(InsightTopic::Concerns)
    } else if contains_any(&question_lower, PAST_REFERENCE_CUES) {
        Some(InsightTopic::General)
    } else {
        None
    }
}

/// Checks whether a question can be answered from accumulated insights.
///
/// When the question classifies under a topic, every relevant list is
/// returned capped at [`MAX_RECALL_ITEMS`]; otherwise `can_answer` is false
/// with empty data.
pub fn answer_from_memory(question: &str, insights: &ConversationInsights) -> RecallAnswer {
    let Some(topic) = classify_question(question) else {
        return RecallAnswer {
            can_answer: false,
            insight_type: None,
            data: RecallData::default(),
        };
    };

    let preview = |items: &[String]| items.iter().take(MAX_RECALL_ITEMS).cloned().collect();

    RecallAnswer {
        can_answer: true,
        insight_type: Some(topic),
        data: RecallData {
            relevant_key_points: preview(&insights.all_key_points),
            relevant_financial_data: preview(&insights.all_financial_mentions),
            relevant_stakeholders: preview(&insights.all_stakeholders),
            relevant_actions: preview(&insights.all_action_items),
            relevant_concerns: preview(&insights.all_concerns),
            context_summary: insights.summary.clone(),
        },
    }
}

/// Searches accumulated insights for items matching a free-text query.
///
/// Each accumulated list keeps the items containing any whitespace-split
/// query token (case-insensitive substring match). Summary-intent queries
/// bypass filtering and return the full lists.
pub fn search(insights: &ConversationInsights, query: &str) -> RecallData {
    let query_lower = query.to_lowercase();

    if contains_any(&query_lower, SUMMARY_CUES) || contains_any(&query_lower, CONVERSATION_CUES) {
        return RecallData {
            relevant_key_points: insights.all_key_points.clone(),
            relevant_financial_data: insights.all_financial_mentions.clone(),
            relevant_stakeholders: insights.all_stakeholders.clone(),
            relevant_actions: insights.all_action_items.clone(),
            relevant_concerns: insights.all_concerns.clone(),
            context_summary: insights.summary.clone(),
        };
    }

    let tokens: Vec<&str> = query_lower.split_whitespace().collect();
    let matches = |items: &[String]| -> Vec<String> {
        let mut found: Vec<String> = items
            .iter()
            .filter(|item| {
                let item_lower = item.to_lowercase();
                tokens.iter().any(|token| item_lower.contains(token))
            })
            .cloned()
            .collect();
        crate::analysis::dedup_in_place(&mut found);
        found
    };

    RecallData {
        relevant_key_points: matches(&insights.all_key_points),
        relevant_financial_data: matches(&insights.all_financial_mentions),
        relevant_stakeholders: matches(&insights.all_stakeholders),
        relevant_actions: matches(&insights.all_action_items),
        relevant_concerns: matches(&insights.all_concerns),
        context_summary: insights.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ImpactLevel, UrgencyLevel};

    fn insights_with_data() -> ConversationInsights {
        ConversationInsights {
            all_key_points: vec!["estrategia".to_string(), "usuarios".to_string()],
            all_financial_mentions: vec!["$5M".to_string(), "Serie A".to_string()],
            all_strategic_concepts: vec!["expansión".to_string()],
            all_stakeholders: vec!["CEO".to_string()],
            all_action_items: vec!["implementación".to_string()],
            all_concerns: vec!["preocupación identificada".to_string()],
            highest_impact_level: ImpactLevel::High,
            peak_urgency_level: UrgencyLevel::Medium,
            dominant_emotions: vec![],
            emotion_counts: vec![],
            phase_history: vec![],
            user_turn_count: 3,
            summary: "Conversación en fase development".to_string(),
            last_updated: String::new(),
        }
    }

    #[test]
    fn key_point_questions_classify_as_key_points() {
        let insights = insights_with_data();
        let answer = answer_from_memory("¿cuáles son los puntos clave?", &insights);

        assert!(answer.can_answer);
        assert_eq!(answer.insight_type, Some(InsightTopic::KeyPoints));
        assert!(!answer.data.relevant_key_points.is_empty());
        for point in &answer.data.relevant_key_points {
            assert!(insights.all_key_points.contains(point));
        }
    }

    #[test]
    fn financial_cues_take_priority() {
        let answer = answer_from_memory(
            "¿qué cifras financieras hemos discutido?",
            &insights_with_data(),
        );
        assert_eq!(answer.insight_type, Some(InsightTopic::Financial));
    }

    #[test]
    fn unclassifiable_questions_are_not_an_error() {
        let answer = answer_from_memory("¿qué hora es?", &insights_with_data());

        assert!(!answer.can_answer);
        assert_eq!(answer.insight_type, None);
        assert!(answer.data.relevant_key_points.is_empty());
    }

    #[test]
    fn recall_previews_are_capped() {
        let mut insights = insights_with_data();
        insights.all_key_points = (0..10).map(|i| format!("punto {i}")).collect();

        let answer = answer_from_memory("resumen de la conversación", &insights);
        assert_eq!(answer.data.relevant_key_points.len(), MAX_RECALL_ITEMS);
    }

    #[test]
    fn search_filters_by_query_tokens() {
        let results = search(&insights_with_data(), "serie");

        assert_eq!(results.relevant_financial_data, vec!["Serie A"]);
        assert!(results.relevant_key_points.is_empty());
    }

    #[test]
    fn summary_queries_bypass_filtering() {
        let insights = insights_with_data();
        let results = search(&insights, "dame un resumen");

        assert_eq!(results.relevant_key_points, insights.all_key_points);
        assert_eq!(results.relevant_financial_data, insights.all_financial_mentions);
    }
}
