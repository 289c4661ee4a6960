//! Response synthesizer.
//!
//! Consumes the analyzer's output plus role, personality, and accumulated
//! memory, and produces the counterpart's next utterance. Synthesis is a
//! fixed sequence of stages over a working draft: base draft selection,
//! objective-alignment strategy, personality modulation, memory enrichment,
//! and final field derivation. Total over well-formed analyses; the
//! composed-draft path guarantees non-empty content even for sparse
//! fallback analyses.

use once_cell::sync::Lazy;
use regex::Regex;

use parley_core::analysis::{ImpactLevel, MessageAnalysis, UrgencyLevel, UserEmotion};
use parley_core::insights::recall::{self, InsightTopic};
use parley_core::insights::Phase;
use parley_core::{ConversationInsights, CounterpartResponse, ResponseEmotion, ScenarioKind, SessionState};

const EXECUTIVE_TERMS: &[&str] = &[
    "valoración", "revenue", "board", "stakeholder", "pipeline", "metrics", "due diligence",
    "growth", "market", "capital", "competition", "estrategia",
];

const GENERIC_FILLERS: &[&str] = &[
    "mantener conversación", "elaborar más", "aspectos específicos", "recomiendo que",
];

const CLOSING_QUESTION: &str = "¿Cuáles son los próximos pasos concretos?";

/// Objective-driven negotiation posture, selected from a small rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NegotiationStrategy {
    Neutral,
    ProtectiveWithData,
    CollaborativeUrgent,
}

/// What must hold in the analysis for a strategy rule to fire.
#[derive(Debug, Clone, Copy)]
enum StrategyTrigger {
    /// The user put a figure above the protective threshold on the table.
    LargeFinancialAsk,
    /// The user's message carries immediate urgency.
    ImmediateUrgency,
}

struct StrategyRule {
    objective_cue: &'static str,
    trigger: StrategyTrigger,
    strategy: NegotiationStrategy,
}

const STRATEGY_RULES: &[StrategyRule] = &[
    StrategyRule {
        objective_cue: "valoración",
        trigger: StrategyTrigger::LargeFinancialAsk,
        strategy: NegotiationStrategy::ProtectiveWithData,
    },
    StrategyRule {
        objective_cue: "maximizar",
        trigger: StrategyTrigger::LargeFinancialAsk,
        strategy: NegotiationStrategy::ProtectiveWithData,
    },
    StrategyRule {
        objective_cue: "estabilizar",
        trigger: StrategyTrigger::ImmediateUrgency,
        strategy: NegotiationStrategy::CollaborativeUrgent,
    },
];

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number regex must parse"));

/// Role seniority families the openers are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seniority {
    Founder,
    Executive,
    Other,
}

fn seniority_of(role: &str) -> Seniority {
    if role.contains("CEO") || role.contains("Founder") || role.contains("Fundador") {
        Seniority::Founder
    } else if role.contains("VP") || role.contains("Director") || role.contains("Directora") {
        Seniority::Executive
    } else {
        Seniority::Other
    }
}

/// A scenario-keyed opening line with its presentation metadata.
struct ScenarioOpener {
    content: &'static str,
    emotion: ResponseEmotion,
    confidence: u8,
    key_points: &'static [&'static str],
    impact: ImpactLevel,
}

const MERGER_OPENER: ScenarioOpener = ScenarioOpener {
    content: "Buenos días. Aprecio su interés en nuestra empresa. Sin embargo, antes de discutir valoraciones, necesito entender su visión estratégica para la integración. ¿Cómo planean mantener nuestra cultura de innovación y velocidad de desarrollo?",
    emotion: ResponseEmotion::Neutral,
    confidence: 8,
    key_points: &["visión estratégica", "cultura de innovación", "velocidad de desarrollo"],
    impact: ImpactLevel::High,
};

const CRISIS_OPENER: ScenarioOpener = ScenarioOpener {
    content: "La situación está escalando rápidamente. Los medios están pidiendo declaraciones y nuestros stakeholders principales están preocupados. Tenemos dos horas antes de la reunión de emergencia con la junta. ¿Cuál es nuestra estrategia de comunicación inmediata?",
    emotion: ResponseEmotion::Concerned,
    confidence: 9,
    key_points: &["escalación rápida", "medios", "estrategia de comunicación"],
    impact: ImpactLevel::Critical,
};

const PITCH_OPENER: ScenarioOpener = ScenarioOpener {
    content: "Bienvenidos a nuestro fondo. Hemos revisado su deck y la oportunidad nos interesa. Pero hemos visto muchas propuestas similares. ¿Qué hace realmente diferente a su plataforma? Y más importante: ¿cómo llegan a unit economics rentables?",
    emotion: ResponseEmotion::Skeptical,
    confidence: 9,
    key_points: &["diferenciación", "unit economics", "rentabilidad"],
    impact: ImpactLevel::Critical,
};

const GENERAL_OPENER: ScenarioOpener = ScenarioOpener {
    content: "Entiendo su punto de vista. ¿Podría elaborar más sobre los aspectos específicos que considera más importantes?",
    emotion: ResponseEmotion::Neutral,
    confidence: 6,
    key_points: &["comprensión", "elaboración", "aspectos específicos"],
    impact: ImpactLevel::Medium,
};

/// Working draft threaded through the synthesis stages.
struct Draft {
    content: String,
    key_points: Vec<String>,
    confidence_bump: i8,
    upgrade_to_skeptical: bool,
}

/// Synthesizes counterpart responses from analyses, roles, and memory.
#[derive(Default)]
pub struct ResponseSynthesizer;

impl ResponseSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Produces the counterpart's next utterance for one analyzed turn.
    pub fn synthesize(
        &self,
        _user_message: &str,
        analysis: &MessageAnalysis,
        session: &SessionState,
        insights: Option<&ConversationInsights>,
    ) -> CounterpartResponse {
        let mut draft = Draft {
            content: self.base_draft(analysis, session),
            key_points: analysis.key_points.main_topics.clone(),
            confidence_bump: 0,
            upgrade_to_skeptical: false,
        };

        self.apply_objective_strategy(&mut draft, analysis, session);
        self.apply_personality(&mut draft, session);
        if let Some(insights) = insights {
            self.enrich_with_memory(&mut draft, analysis, insights);
        }

        self.finalize(draft, analysis)
    }

    /// The counterpart's opening utterance for a session with no history.
    ///
    /// Deterministic per scenario family; personality modulation still
    /// applies so an aggressive counterpart opens in character.
    pub fn opening_line(&self, session: &SessionState) -> CounterpartResponse {
        let opener = match session.scenario_kind() {
            ScenarioKind::MergerNegotiation => &MERGER_OPENER,
            ScenarioKind::CrisisLeadership => &CRISIS_OPENER,
            ScenarioKind::StartupPitch => &PITCH_OPENER,
            ScenarioKind::General => &GENERAL_OPENER,
        };

        let mut draft = Draft {
            content: opener.content.to_string(),
            key_points: opener.key_points.iter().map(|p| p.to_string()).collect(),
            confidence_bump: 0,
            upgrade_to_skeptical: false,
        };
        self.apply_personality(&mut draft, session);

        let mut emotion = opener.emotion;
        if draft.upgrade_to_skeptical && emotion == ResponseEmotion::Neutral {
            emotion = ResponseEmotion::Skeptical;
        }

        CounterpartResponse {
            content: draft.content,
            emotion,
            confidence_level: (opener.confidence as i8 + draft.confidence_bump).clamp(1, 10) as u8,
            key_points: draft.key_points,
            business_impact: opener.impact,
            suggested_follow_up: None,
        }
        .with_clamped_confidence()
    }

    /// A memory-grounded reply for questions answerable from prior context.
    ///
    /// Returns `None` when the accumulated insights cannot answer the
    /// question; the caller then proceeds with normal synthesis.
    pub fn recall_reply(
        &self,
        question: &str,
        insights: &ConversationInsights,
    ) -> Option<CounterpartResponse> {
        let answer = recall::answer_from_memory(question, insights);
        if !answer.can_answer {
            return None;
        }
        let data = &answer.data;

        let mut content = match answer.insight_type? {
            InsightTopic::Financial => {
                if data.relevant_financial_data.is_empty() {
                    "En términos financieros, hemos tocado varios aspectos importantes. ".to_string()
                } else {
                    format!(
                        "Respecto a los aspectos financieros, hemos mencionado: {}. ",
                        data.relevant_financial_data.join(", ")
                    )
                }
            }
            InsightTopic::KeyPoints => {
                if data.relevant_key_points.is_empty() {
                    "Hasta ahora hemos cubierto varios temas importantes en nuestra conversación. "
                        .to_string()
                } else {
                    format!(
                        "Basándome en nuestra conversación, los puntos clave que hemos discutido incluyen: {}. ",
                        data.relevant_key_points.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
                    )
                }
            }
            InsightTopic::Strategic => {
                if data.relevant_key_points.is_empty() {
                    "Desde una perspectiva estratégica, hemos avanzado en varios frentes. ".to_string()
                } else {
                    format!(
                        "Estratégicamente, hemos discutido: {}. ",
                        data.relevant_key_points.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
                    )
                }
            }
            InsightTopic::Stakeholders => {
                if data.relevant_stakeholders.is_empty() {
                    "En cuanto a los stakeholders involucrados, seguimos mapeando posiciones. "
                        .to_string()
                } else {
                    format!(
                        "Considerando los stakeholders que hemos mencionado ({}), hay posiciones que alinear. ",
                        data.relevant_stakeholders.join(", ")
                    )
                }
            }
            InsightTopic::Actions => {
                if data.relevant_actions.is_empty() {
                    "En términos de acciones concretas, aún estamos definiendo compromisos. "
                        .to_string()
                } else {
                    format!(
                        "Las acciones que hemos identificado incluyen: {}. ",
                        data.relevant_actions.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
                    )
                }
            }
            InsightTopic::Concerns => {
                if data.relevant_concerns.is_empty() {
                    "No hemos registrado preocupaciones mayores hasta ahora. ".to_string()
                } else {
                    format!(
                        "Las preocupaciones que hemos registrado incluyen: {}. ",
                        data.relevant_concerns.join(", ")
                    )
                }
            }
            InsightTopic::General => {
                let mut combined: Vec<String> = Vec::new();
                combined.extend(data.relevant_financial_data.iter().cloned());
                combined.extend(data.relevant_key_points.iter().cloned());
                combined.extend(data.relevant_stakeholders.iter().cloned());
                combined.extend(data.relevant_actions.iter().cloned());
                if combined.is_empty() {
                    "En nuestra conversación previa hemos tocado varios temas importantes. "
                        .to_string()
                } else {
                    combined.truncate(4);
                    format!(
                        "Revisando nuestra conversación anterior, hemos cubierto: {}. ",
                        combined.join(", ")
                    )
                }
            }
        };

        if insights.highest_impact_level == ImpactLevel::Critical {
            content.push_str(
                "Dado el impacto crítico de estos temas, necesitamos tomar decisiones concretas.",
            );
        } else {
            content.push_str("¿Hay algún aspecto específico que quiera profundizar?");
        }

        let mut key_points: Vec<String> = Vec::new();
        key_points.extend(data.relevant_key_points.iter().cloned());
        key_points.extend(data.relevant_financial_data.iter().cloned());
        key_points.extend(data.relevant_stakeholders.iter().cloned());
        key_points.extend(data.relevant_actions.iter().cloned());
        key_points.truncate(recall::MAX_RECALL_ITEMS);

        Some(
            CounterpartResponse {
                content,
                emotion: ResponseEmotion::Neutral,
                confidence_level: 9,
                key_points,
                business_impact: insights.highest_impact_level,
                suggested_follow_up: Some(
                    "¿Quiere que revisemos algún punto específico?".to_string(),
                ),
            }
            .with_clamped_confidence(),
        )
    }

    // ------------------------------------------------------------------
    // Stage 1: base draft selection
    // ------------------------------------------------------------------

    fn base_draft(&self, analysis: &MessageAnalysis, session: &SessionState) -> String {
        let approach = analysis.recommended_approach.trim();
        if is_executive_level(approach) {
            return approach.to_string();
        }
        self.build_executive_draft(analysis, session)
    }

    fn build_executive_draft(&self, analysis: &MessageAnalysis, session: &SessionState) -> String {
        let mut components: Vec<String> = Vec::new();

        components.push(
            emotional_opener(
                seniority_of(&session.counterpart_role),
                analysis.emotion.primary,
            )
            .to_string(),
        );

        let financial = &analysis.key_points.financial_mentions;
        if !financial.is_empty() {
            let context = financial.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
            components.push(match session.scenario_kind() {
                ScenarioKind::MergerNegotiation => format!(
                    "Respecto a {context}, nuestros benchmarks de mercado muestran dinámicas de valoración distintas. Necesito entender mejor sus supuestos sobre el múltiplo de revenue."
                ),
                ScenarioKind::CrisisLeadership => format!(
                    "Los números que menciona ({context}) coinciden con nuestro análisis interno. Ya tenemos un plan de recuperación sobre la mesa."
                ),
                _ => format!(
                    "Los aspectos financieros ({context}) son críticos. ¿Cuál es el modelo de negocio detrás de estas proyecciones?"
                ),
            });
        }

        if !analysis.key_points.strategic_concepts.is_empty() {
            if let Some(primary_objective) = session.counterpart_objectives.first() {
                let objective_lower = primary_objective.to_lowercase();
                if objective_lower.contains("valoración") {
                    components.push(
                        "Mi prioridad es maximizar el valor para todos los stakeholders. ¿Cómo estructura su oferta para alinear incentivos a largo plazo?".to_string(),
                    );
                } else if objective_lower.contains("estabilizar") {
                    components.push(
                        "Lo crítico es estabilizar operaciones. ¿Qué nivel de autoridad tiene para implementar las medidas que necesitamos?".to_string(),
                    );
                } else if objective_lower.contains("cerrar") {
                    components.push(
                        "Para cerrar esta ronda necesito ver un compromiso real. ¿Cuál es su timeline para due diligence y términos definitivos?".to_string(),
                    );
                }
            }
        }

        if analysis.business_impact.urgency_level == UrgencyLevel::Immediate {
            components.push(
                "El timing es crucial aquí. Tenemos reunión de junta en dos semanas y necesitamos claridad antes de esa fecha.".to_string(),
            );
        }

        let actions = &analysis.key_points.action_items;
        if !actions.is_empty() {
            let focus = actions.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
            components.push(format!(
                "Propongo que nos enfoquemos en {focus}. ¿Puede comprometerse con esos entregables esta semana?"
            ));
        }

        let mut draft = components.join(" ");
        if !draft.trim_end().ends_with('?') {
            draft.push(' ');
            draft.push_str(CLOSING_QUESTION);
        }
        draft
    }

    // ------------------------------------------------------------------
    // Stage 2: objective-alignment strategy
    // ------------------------------------------------------------------

    fn apply_objective_strategy(
        &self,
        draft: &mut Draft,
        analysis: &MessageAnalysis,
        session: &SessionState,
    ) {
        match select_strategy(analysis, session) {
            NegotiationStrategy::ProtectiveWithData => {
                let body = lowercase_first(&draft.content);
                draft.content =
                    format!("Basándome en nuestro track record y benchmarks de mercado, {body}");
            }
            NegotiationStrategy::CollaborativeUrgent => {
                if !draft.content.to_lowercase().contains("urgencia") {
                    draft.content = format!("Compartimos esa urgencia. {}", draft.content);
                }
            }
            NegotiationStrategy::Neutral => {}
        }
    }

    // ------------------------------------------------------------------
    // Stage 3: personality modulation
    // ------------------------------------------------------------------

    fn apply_personality(&self, draft: &mut Draft, session: &SessionState) {
        let personality = &session.personality;
        let content_lower = draft.content.to_lowercase();

        if personality.analytical > 70
            && !content_lower.contains("datos")
            && !content_lower.contains("métricas")
        {
            draft.content.push_str(
                " Necesito ver datos específicos y métricas concretas para evaluar esta propuesta adecuadamente.",
            );
            draft.key_points.push("datos específicos requeridos".to_string());
        }

        if personality.patience < 30 {
            draft.content.push_str(" Necesito una respuesta rápida y decisiva.");
            draft.confidence_bump += 1;
        }

        if personality.aggression > 70 {
            draft.content = draft
                .content
                .replace("Interesante", "Francamente")
                .replace("Me gusta", "No estoy completamente convencido de");
            draft.upgrade_to_skeptical = true;
        }

        if personality.flexibility < 30 {
            draft
                .content
                .push_str(" Mi posición en este tema es firme y basada en experiencia previa.");
            draft.confidence_bump += 1;
        }
    }

    // ------------------------------------------------------------------
    // Stage 4: memory enrichment
    // ------------------------------------------------------------------

    fn enrich_with_memory(
        &self,
        draft: &mut Draft,
        analysis: &MessageAnalysis,
        insights: &ConversationInsights,
    ) {
        if !insights.all_financial_mentions.is_empty()
            && !analysis.key_points.financial_mentions.is_empty()
        {
            let previous = insights
                .all_financial_mentions
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            draft.content.push_str(&format!(
                " Considerando que anteriormente discutimos {previous}, mantengamos consistencia en las cifras."
            ));
        }

        match insights.current_phase() {
            Phase::Negotiation => {
                draft
                    .content
                    .push_str(" Estamos en una fase crítica de la negociación.");
            }
            Phase::Closing => {
                draft.content.push_str(" Nos acercamos a las decisiones finales.");
            }
            _ => {}
        }

        if insights.all_concerns.len() > 2 {
            draft.content.push_str(
                " Veo que hemos identificado varias preocupaciones importantes que debemos resolver.",
            );
        }
    }

    // ------------------------------------------------------------------
    // Stage 5: final field derivation
    // ------------------------------------------------------------------

    fn finalize(&self, draft: Draft, analysis: &MessageAnalysis) -> CounterpartResponse {
        let mut emotion = map_emotion(analysis.emotion.primary);
        if draft.upgrade_to_skeptical && emotion == ResponseEmotion::Neutral {
            emotion = ResponseEmotion::Skeptical;
        }

        // Confidence scales with draft length and analyzer confidence on a
        // 100 scale capped at 95, then compresses onto 1-10.
        let length_component = (draft.content.chars().count() / 20) as f64;
        let internal = (60.0 + analysis.emotion.confidence * 10.0 + length_component).min(95.0);
        let confidence_level =
            ((internal / 10.0).round() as i8 + draft.confidence_bump).clamp(1, 10) as u8;

        let suggested_follow_up = Some(suggest_follow_up(analysis).to_string());

        CounterpartResponse {
            content: draft.content,
            emotion,
            confidence_level,
            key_points: draft.key_points,
            business_impact: analysis.business_impact.impact_level,
            suggested_follow_up,
        }
        .with_clamped_confidence()
    }
}

fn is_executive_level(approach: &str) -> bool {
    if approach.len() <= 80 {
        return false;
    }
    let approach_lower = approach.to_lowercase();
    let has_register = EXECUTIVE_TERMS
        .iter()
        .any(|term| approach_lower.contains(term));
    let has_filler = GENERIC_FILLERS
        .iter()
        .any(|filler| approach_lower.contains(filler));
    has_register && !has_filler
}

fn emotional_opener(seniority: Seniority, emotion: UserEmotion) -> &'static str {
    use UserEmotion::{Aggressive, Confident, Frustrated, Positive};
    match seniority {
        Seniority::Founder => match emotion {
            Frustrated | Aggressive => {
                "Entiendo la presión. Como founder, he pasado por situaciones similares."
            }
            Confident | Positive => {
                "Me gusta esa confianza. Es el tipo de mentalidad que necesitamos."
            }
            _ => "Aprecio la claridad de su propuesta.",
        },
        Seniority::Executive => match emotion {
            Frustrated | Aggressive => {
                "Comparto su sentido de urgencia. La situación requiere acción inmediata."
            }
            Confident | Positive => {
                "Su aproximación es sólida. Vamos a profundizar en los detalles."
            }
            _ => "Revisemos los elementos clave de lo que plantea.",
        },
        Seniority::Other => match emotion {
            Frustrated | Aggressive => "Entiendo su inquietud. Vayamos al fondo del asunto.",
            Confident | Positive => "Valoro el planteamiento. Revisemos los detalles.",
            _ => "Gracias por compartir su planteamiento.",
        },
    }
}

fn select_strategy(analysis: &MessageAnalysis, session: &SessionState) -> NegotiationStrategy {
    let objectives_lower = session.counterpart_objectives.join(" ").to_lowercase();

    for rule in STRATEGY_RULES {
        if !objectives_lower.contains(rule.objective_cue) {
            continue;
        }
        let triggered = match rule.trigger {
            StrategyTrigger::LargeFinancialAsk => has_large_financial_ask(analysis),
            StrategyTrigger::ImmediateUrgency => {
                analysis.business_impact.urgency_level == UrgencyLevel::Immediate
            }
        };
        if triggered {
            return rule.strategy;
        }
    }
    NegotiationStrategy::Neutral
}

fn has_large_financial_ask(analysis: &MessageAnalysis) -> bool {
    analysis
        .key_points
        .financial_mentions
        .iter()
        .flat_map(|mention| NUMBER_RE.find_iter(mention))
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .any(|value| value > 20)
}

fn map_emotion(emotion: UserEmotion) -> ResponseEmotion {
    match emotion {
        UserEmotion::Positive => ResponseEmotion::Encouraging,
        UserEmotion::Negative => ResponseEmotion::Concerned,
        UserEmotion::Frustrated => ResponseEmotion::Concerned,
        UserEmotion::Confident => ResponseEmotion::Neutral,
        UserEmotion::Hesitant => ResponseEmotion::Encouraging,
        UserEmotion::Aggressive => ResponseEmotion::Skeptical,
        UserEmotion::Collaborative => ResponseEmotion::Encouraging,
        UserEmotion::Neutral => ResponseEmotion::Neutral,
    }
}

fn suggest_follow_up(analysis: &MessageAnalysis) -> &'static str {
    if analysis.business_impact.urgency_level == UrgencyLevel::Immediate {
        "¿Cuáles son los próximos pasos inmediatos que propone?"
    } else if !analysis.key_points.financial_mentions.is_empty() {
        "¿Podría compartir los supuestos detrás de sus cifras financieras?"
    } else if !analysis.key_points.concerns_raised.is_empty() {
        "¿Cómo planea abordar las preocupaciones que hemos identificado?"
    } else {
        "¿Hay algún aspecto adicional que debamos considerar?"
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
