//! Extraction prompt construction for the generative strategy.
//!
//! The prompt embeds the scenario, objectives, end conditions, recent
//! history, personality sliders, and the current message, together with an
//! explicit JSON output-shape contract matching `MessageAnalysis`. The
//! capability is instructed to judge contextually, not keyword-match, and to
//! answer with the JSON object only.

use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use parley_core::{ParleyError, SessionState, Speaker};

/// Number of prior turns included in the extraction prompt.
pub const HISTORY_WINDOW: usize = 5;

const EXTRACTION_TEMPLATE: &str = r#"Eres un experto analista de comunicación empresarial especializado en simulaciones de liderazgo ejecutivo.
Tu tarea es analizar el mensaje del usuario con precisión objetiva, no basándote en keywords sino en comprensión contextual profunda.

CONTEXTO DEL ESCENARIO:
{{ scenario_context }}

ROL DE LA CONTRAPARTE:
{{ counterpart_role }}

OBJETIVOS DEL USUARIO:
{% for objective in user_objectives %}- {{ objective }}
{% endfor %}
CONDICIONES DE FINALIZACIÓN:
{% for condition in end_conditions %}- {{ condition }}
{% endfor %}
HISTORIAL DE CONVERSACIÓN:
{% for line in history %}{{ line }}
{% endfor %}
MENSAJE ACTUAL DEL USUARIO:
"{{ user_message }}"

PERSONALIDAD DE LA CONTRAPARTE (para entender el contexto):
- Analítico: {{ analytical }}/100
- Paciencia: {{ patience }}/100
- Agresividad: {{ aggression }}/100
- Flexibilidad: {{ flexibility }}/100

INSTRUCCIONES CRÍTICAS:
1. NO uses keyword matching. Analiza el SIGNIFICADO real del mensaje.
2. Para emociones: evalúa el tono, contexto e intención, no solo palabras específicas.
3. Para puntos financieros: identifica TODOS los números, métricas y conceptos económicos mencionados.
4. Para análisis de impacto: considera las implicaciones estratégicas reales, no solo urgencia aparente.
5. Para objetivos: evalúa el PROGRESO REAL hacia las metas, considerando el contexto completo.

Responde ÚNICAMENTE con un objeto JSON con esta forma exacta (sin prosa adicional):

{
  "emotion": {
    "primary": "positive|negative|neutral|frustrated|confident|hesitant|aggressive|collaborative",
    "confidence": 0.0,
    "indicators": ["..."]
  },
  "key_points": {
    "main_topics": ["..."],
    "financial_mentions": ["..."],
    "strategic_concepts": ["..."],
    "stakeholders": ["..."],
    "action_items": ["..."],
    "concerns_raised": ["..."]
  },
  "business_impact": {
    "impact_level": "low|medium|high|critical",
    "financial_impact": "none|low|medium|high|critical",
    "strategic_importance": "low|medium|high|critical",
    "urgency_level": "low|medium|high|immediate",
    "risk_factors": ["..."],
    "opportunities": ["..."]
  },
  "objective_progress": [
    {
      "objective_text": "...",
      "completion_percentage": 0,
      "is_fully_completed": false,
      "evidence": ["..."],
      "remaining_requirements": ["..."]
    }
  ],
  "end_conditions": [
    {
      "condition_text": "...",
      "is_met": false,
      "likelihood": 0.0
    }
  ],
  "summary": "...",
  "recommended_approach": "..."
}
"#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("extraction", EXTRACTION_TEMPLATE)
        .expect("extraction template must parse");
    env
});

#[derive(Serialize)]
struct ExtractionContext<'a> {
    scenario_context: &'a str,
    counterpart_role: &'a str,
    user_objectives: &'a [String],
    end_conditions: &'a [String],
    history: Vec<String>,
    user_message: &'a str,
    analytical: u8,
    patience: u8,
    aggression: u8,
    flexibility: u8,
}

/// Renders the structured-extraction prompt for one user message.
///
/// `objectives` and `end_conditions` must already be truncated to the
/// contractual caps by the caller.
pub fn render_extraction_prompt(
    user_message: &str,
    session: &SessionState,
    objectives: &[String],
    end_conditions: &[String],
) -> Result<String, ParleyError> {
    let history = session
        .recent_turns(HISTORY_WINDOW)
        .iter()
        .map(|turn| match turn.speaker {
            Speaker::User => format!("Usuario: {}", turn.content),
            Speaker::Counterpart => format!("Contraparte: {}", turn.content),
        })
        .collect();

    let context = ExtractionContext {
        scenario_context: &session.scenario_context,
        counterpart_role: &session.counterpart_role,
        user_objectives: objectives,
        end_conditions,
        history,
        user_message,
        analytical: session.personality.analytical,
        patience: session.personality.patience,
        aggression: session.personality.aggression,
        flexibility: session.personality.flexibility,
    };

    TEMPLATES
        .get_template("extraction")
        .and_then(|template| template.render(&context))
        .map_err(|err| ParleyError::Serialization {
            format: "template".to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Turn;

    #[test]
    fn prompt_embeds_message_history_and_objectives() {
        let mut session = SessionState::new(
            "Pitch de Serie A frente a un fondo",
            "Founder",
            "Investor Partner",
        );
        session.user_objectives = vec!["Cerrar acuerdo".to_string()];
        session.turns.push(Turn::user("Tenemos 50K usuarios"));
        session.turns.push(Turn::counterpart("¿Y la retención?"));

        let prompt = render_extraction_prompt(
            "Buscamos $5M",
            &session,
            &session.user_objectives,
            &[],
        )
        .unwrap();

        assert!(prompt.contains("Buscamos $5M"));
        assert!(prompt.contains("- Cerrar acuerdo"));
        assert!(prompt.contains("Usuario: Tenemos 50K usuarios"));
        assert!(prompt.contains("Contraparte: ¿Y la retención?"));
        assert!(prompt.contains("\"recommended_approach\""));
    }

    #[test]
    fn prompt_limits_history_to_the_window() {
        let mut session = SessionState::new("ctx", "a", "b");
        for i in 0..10 {
            session.turns.push(Turn::user(format!("mensaje {i}")));
        }

        let prompt = render_extraction_prompt("hola", &session, &[], &[]).unwrap();

        assert!(!prompt.contains("mensaje 4"));
        assert!(prompt.contains("mensaje 5"));
        assert!(prompt.contains("mensaje 9"));
    }
}
