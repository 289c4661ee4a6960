//! End-to-end tests for the turn pipeline: analyzer strategies, memory
//! accumulation, and orchestrator failure semantics.

use std::sync::Arc;

use async_trait::async_trait;
use parley_core::analysis::{FinancialImpact, ImpactLevel, UrgencyLevel};
use parley_core::insights::recall::{self, InsightTopic};
use parley_core::{ConversationInsights, SessionState};
use parley_interaction::{
    AnalysisStrategy, CapabilityError, GenerativeCapability, MessageAnalyzer, TurnOrchestrator,
};

struct AlwaysFailingCapability;

#[async_trait]
impl GenerativeCapability for AlwaysFailingCapability {
    fn name(&self) -> &str {
        "always-failing"
    }

    async fn complete(&self, _prompt: String) -> Result<String, CapabilityError> {
        Err(CapabilityError::Transport {
            message: "simulated outage".to_string(),
            is_retryable: true,
        })
    }
}

fn pitch_session() -> SessionState {
    let mut session = SessionState::new(
        "Pitch de Serie A frente a un fondo de inversión",
        "Founder",
        "Investor Partner",
    );
    session.user_objectives = vec!["Cerrar acuerdo".to_string()];
    session.end_conditions = vec!["Acuerdo de financiamiento".to_string()];
    session
}

fn degraded_orchestrator() -> TurnOrchestrator {
    TurnOrchestrator::new(
        MessageAnalyzer::new().with_capability(Arc::new(AlwaysFailingCapability)),
    )
}

// Bounded fields hold their declared ranges for any strategy output.
#[tokio::test]
async fn analysis_invariants_hold_for_fallback_output() {
    let analyzer = MessageAnalyzer::new().with_capability(Arc::new(AlwaysFailingCapability));
    let session = pitch_session();

    let messages = [
        "",
        "Acepto el acuerdo, todo listo",
        "Es urgente, necesito $30M inmediatamente",
        "Propongo revisar la estrategia de crecimiento con el equipo",
    ];

    for message in messages {
        let analysis = analyzer.analyze(message, &session).await;

        assert!((0.0..=1.0).contains(&analysis.emotion.confidence));
        for progress in &analysis.objective_progress {
            assert!(progress.completion_percentage <= 100);
        }
        for condition in &analysis.end_conditions {
            assert!((0.0..=1.0).contains(&condition.likelihood));
        }
    }
}

// The deterministic strategy is total over arbitrary strings.
#[tokio::test]
async fn lexical_strategy_never_fails() {
    let analyzer = MessageAnalyzer::new();
    let session = pitch_session();

    let very_long = "propuesta ".repeat(50_000);
    let inputs = ["", "zzz sin keywords", very_long.as_str(), "🚀💰📈"];

    for input in inputs {
        let (_, strategy) = analyzer.analyze_traced(input, &session).await;
        assert_eq!(strategy, AnalysisStrategy::Lexical);
    }
}

// Severity maxima never regress as turns accumulate.
#[tokio::test]
async fn peak_urgency_is_monotone_across_turns() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let first = orchestrator
        .process_turn("Revisemos el contrato con calma", &session, None)
        .await
        .unwrap();
    let second = orchestrator
        .process_turn("Necesito avanzar pronto con el plan", &session, Some(first.insights))
        .await
        .unwrap();
    assert!(second.insights.peak_urgency_level.severity_rank() >= UrgencyLevel::Medium.severity_rank());

    let third = orchestrator
        .process_turn(
            "Es urgente, necesito la decisión inmediatamente",
            &session,
            Some(second.insights),
        )
        .await
        .unwrap();
    assert_eq!(third.insights.peak_urgency_level, UrgencyLevel::Immediate);

    let fourth = orchestrator
        .process_turn("Gracias por su tiempo", &session, Some(third.insights))
        .await
        .unwrap();
    assert_eq!(fourth.insights.peak_urgency_level, UrgencyLevel::Immediate);
}

// The phase history is a forward-only walk with no duplicates.
#[tokio::test]
async fn phase_history_walks_forward_only() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let mut insights: Option<ConversationInsights> = None;
    for _ in 0..10 {
        let outcome = orchestrator
            .process_turn("Seguimos revisando el plan", &session, insights.take())
            .await
            .unwrap();
        insights = Some(outcome.insights);
    }

    let history = insights.unwrap().phase_history;
    let ranks: Vec<usize> = history
        .iter()
        .map(|phase| match phase {
            parley_core::Phase::Opening => 0,
            parley_core::Phase::Development => 1,
            parley_core::Phase::Negotiation => 2,
            parley_core::Phase::Closing => 3,
        })
        .collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(ranks, sorted, "phase walk must be strictly increasing");
}

// Folding a subset analysis back in does not grow the accumulated lists.
#[tokio::test]
async fn reapplying_subset_analysis_is_idempotent() {
    let analyzer = MessageAnalyzer::new();
    let session = pitch_session();

    let analysis = analyzer
        .analyze("Buscamos $5M para crecimiento con el equipo", &session)
        .await;

    let insights = ConversationInsights::updated(None, &analysis, 1);
    let sizes = (
        insights.all_key_points.len(),
        insights.all_financial_mentions.len(),
        insights.all_stakeholders.len(),
    );

    let again = ConversationInsights::updated(Some(&insights), &analysis, 2);
    assert_eq!(
        (
            again.all_key_points.len(),
            again.all_financial_mentions.len(),
            again.all_stakeholders.len(),
        ),
        sizes
    );
}

// The orchestrator never fails for non-empty input, even when the
// generative capability fails on every call.
#[tokio::test]
async fn orchestrator_absorbs_capability_outage() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let mut insights: Option<ConversationInsights> = None;
    for message in [
        "Hola, gracias por recibirme",
        "Tenemos 50K usuarios y $180K ARR",
        "Propongo cerrar en dos semanas",
    ] {
        let outcome = orchestrator
            .process_turn(message, &session, insights.take())
            .await
            .expect("processTurn must not fail with a non-empty message");
        assert!(!outcome.response.content.is_empty());
        insights = Some(outcome.insights);
    }
}

// An empty message is the one refusal this layer makes.
#[tokio::test]
async fn empty_message_raises_empty_message() {
    let orchestrator = degraded_orchestrator();
    let err = orchestrator
        .process_turn("", &pitch_session(), None)
        .await
        .unwrap_err();
    assert!(err.is_empty_message());
}

// Acceptance wording completes a tracked objective.
#[tokio::test]
async fn acceptance_completes_objective_deterministically() {
    let analyzer = MessageAnalyzer::new();
    let session = pitch_session();

    let analysis = analyzer
        .analyze("Estoy de acuerdo, acepto los términos", &session)
        .await;

    assert_eq!(analysis.objective_progress[0].objective_text, "Cerrar acuerdo");
    assert_eq!(analysis.objective_progress[0].completion_percentage, 90);
    assert!(analysis.objective_progress[0].is_fully_completed);
}

// Financial extraction keeps working with the generative capability down.
#[tokio::test]
async fn financial_mentions_survive_capability_outage() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let outcome = orchestrator
        .process_turn(
            "Buscamos $5M en nuestra Serie A para acelerar",
            &session,
            None,
        )
        .await
        .unwrap();

    let mentions = &outcome.analysis.key_points.financial_mentions;
    assert!(mentions.iter().any(|m| m.contains("$5M")));
    assert!(mentions.iter().any(|m| m == "Serie A"));
    assert!(matches!(
        outcome.analysis.business_impact.financial_impact,
        FinancialImpact::Medium | FinancialImpact::High
    ));
}

// Memory recall classifies and answers key-point questions.
#[tokio::test]
async fn memory_answers_key_point_questions() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let outcome = orchestrator
        .process_turn(
            "Nuestra estrategia de crecimiento se apoya en el equipo",
            &session,
            None,
        )
        .await
        .unwrap();
    let insights = outcome.insights;
    assert!(!insights.all_key_points.is_empty());

    let answer = recall::answer_from_memory("¿cuáles son los puntos clave?", &insights);

    assert!(answer.can_answer);
    assert_eq!(answer.insight_type, Some(InsightTopic::KeyPoints));
    assert!(!answer.data.relevant_key_points.is_empty());
    for point in &answer.data.relevant_key_points {
        assert!(insights.all_key_points.contains(point));
    }
}

// The composed reply stays coherent when memory accumulates concerns and
// the conversation reaches the negotiation phase.
#[tokio::test]
async fn responses_reference_accumulated_context() {
    let orchestrator = degraded_orchestrator();
    let session = pitch_session();

    let mut insights: Option<ConversationInsights> = None;
    for _ in 0..6 {
        let outcome = orchestrator
            .process_turn(
                "Me preocupa el riesgo del problema de competencia, es un desafío difícil",
                &session,
                insights.take(),
            )
            .await
            .unwrap();
        insights = Some(outcome.insights);
    }

    let outcome = orchestrator
        .process_turn(
            "Sigamos con la propuesta de $30 millones",
            &session,
            insights,
        )
        .await
        .unwrap();

    assert!(outcome.response.content.contains("fase crítica de la negociación"));
    assert!(outcome
        .response
        .content
        .contains("varias preocupaciones importantes"));
    assert_eq!(outcome.insights.highest_impact_level, ImpactLevel::Critical);
}
