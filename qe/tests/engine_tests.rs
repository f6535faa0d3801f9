//! Behavioral tests for the questionnaire engine
//!
//! Properties are checked with proptest over arbitrary answer sequences;
//! the end-to-end scenarios drive the engine the way a UI does.

use proptest::prelude::*;
use questionnaire::{
    Action, AnswerEntry, Category, EngineError, Outcome, Phase, PlanFailure, PlanTicket, Questionnaire, SessionState,
};

fn category_strategy() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Nutrition), Just(Category::Training)]
}

fn blank_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just(' '), Just('\t'), Just('\n'), Just('\r')], 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

fn answer_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}[a-zA-Z0-9][a-zA-Z0-9 ]{0,12}"
}

fn answer_all(q: &mut Questionnaire, category: Category) {
    q.select_category(category).expect("select");
    let total = q.question_set(category).len();
    for i in 0..total {
        q.submit_answer(format!("resposta {}", i + 1)).expect("answer");
    }
}

fn issue(q: &mut Questionnaire) -> PlanTicket {
    match q.generate_plan().expect("generate") {
        Outcome::Submit { ticket, .. } => ticket,
        other => panic!("expected Submit, got {:?}", other),
    }
}

/// history.len() == current_step + 1 and only the last entry is unanswered
fn assert_in_progress_invariant(state: &SessionState) {
    assert_eq!(state.history.len(), state.current_step + 1);
    let (last, done) = state.history.split_last().expect("history not empty");
    assert!(!last.is_answered());
    assert!(done.iter().all(AnswerEntry::is_answered));
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_selecting_seeds_exactly_first_question(category in category_strategy()) {
        let mut q = Questionnaire::default();
        q.select_category(category).unwrap();

        let first = q.question_set(category).get(0).unwrap().to_string();
        prop_assert_eq!(&q.state().history, &vec![AnswerEntry::pending(first)]);
        prop_assert_eq!(q.state().current_step, 0);
    }

    #[test]
    fn prop_blank_answer_never_advances(
        category in category_strategy(),
        valid in prop::collection::vec(answer_strategy(), 0..4),
        blank in blank_strategy(),
    ) {
        let mut q = Questionnaire::default();
        q.select_category(category).unwrap();
        for answer in &valid {
            q.submit_answer(answer.clone()).unwrap();
        }

        let before = q.state().clone();
        prop_assert_eq!(q.submit_answer(blank.clone()), Err(EngineError::EmptyAnswer));
        prop_assert_eq!(q.submit_answer(blank), Err(EngineError::EmptyAnswer));
        prop_assert_eq!(q.state(), &before);
    }

    #[test]
    fn prop_valid_answer_appends_next_question(
        category in category_strategy(),
        answers in prop::collection::vec(answer_strategy(), 1..5),
    ) {
        let mut q = Questionnaire::default();
        q.select_category(category).unwrap();
        let last = q.question_set(category).last_index();

        for (i, answer) in answers.iter().enumerate() {
            prop_assume!(i < last);
            let outcome = q.submit_answer(answer.clone()).unwrap();
            prop_assert_eq!(outcome, Outcome::Advanced { step: i + 1 });

            let state = q.state();
            prop_assert_eq!(state.history.len(), i + 2);
            prop_assert_eq!(
                Some(state.history[i + 1].question.as_str()),
                q.question_set(category).get(i + 1)
            );
            prop_assert_eq!(state.history[i].answer.as_deref(), Some(answer.trim()));
            assert_in_progress_invariant(state);
        }
    }

    #[test]
    fn prop_final_answer_sets_summary_without_append(
        category in category_strategy(),
        answers in prop::collection::vec(answer_strategy(), 5),
    ) {
        let mut q = Questionnaire::default();
        q.select_category(category).unwrap();
        let total = q.question_set(category).len();

        for answer in answers.iter().take(total - 1) {
            q.submit_answer(answer.clone()).unwrap();
        }
        let len_before = q.state().history.len();

        prop_assert_eq!(q.submit_answer(answers[total - 1].clone()), Ok(Outcome::SummaryReady));
        prop_assert!(q.state().summary_ready);
        prop_assert_eq!(q.state().history.len(), len_before);
        prop_assert_eq!(q.state().current_step, total - 1);
        prop_assert!(q.state().history.iter().all(AnswerEntry::is_answered));
    }

    #[test]
    fn prop_restart_from_any_point_resets(
        category in category_strategy(),
        answered in 0usize..7,
        generate in any::<bool>(),
    ) {
        let mut q = Questionnaire::default();
        q.select_category(category).unwrap();
        for i in 0..answered {
            let _ = q.submit_answer(format!("r{}", i));
        }
        if generate {
            let _ = q.generate_plan();
        }

        prop_assert_eq!(q.restart(), Outcome::Reset);
        let state = q.state();
        prop_assert_eq!(state.category, None);
        prop_assert_eq!(state.current_step, 0);
        prop_assert!(state.history.is_empty());
        prop_assert!(!state.summary_ready);
        prop_assert_eq!(&state.generated_plan, &None);
        prop_assert_eq!(state.phase, Phase::CategoryUnselected);
        prop_assert!(!state.is_busy());
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_nutrition_happy_path() {
    let mut q = Questionnaire::default();
    answer_all(&mut q, Category::Nutrition);
    assert!(q.state().summary_ready);
    assert_eq!(q.phase(), Phase::SummaryReady);

    let ticket = issue(&mut q);
    assert_eq!(q.phase(), Phase::Submitting);

    let outcome = q
        .dispatch(Action::PlanReceived {
            ticket,
            plan: "Plano: ...".to_string(),
        })
        .unwrap();

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(q.state().generated_plan.as_deref(), Some("Plano: ..."));
    assert_eq!(q.phase(), Phase::Completed);
    assert!(!q.state().is_busy());
}

#[test]
fn test_provider_failure_returns_to_summary() {
    let mut q = Questionnaire::default();
    answer_all(&mut q, Category::Training);
    let ticket = issue(&mut q);

    let failure = PlanFailure::Request("HTTP 500".to_string());
    let outcome = q
        .dispatch(Action::PlanFailed {
            ticket,
            failure: failure.clone(),
        })
        .unwrap();

    assert_eq!(outcome, Outcome::Failed(failure.clone()));
    assert_eq!(q.phase(), Phase::SummaryReady);
    assert!(q.state().generated_plan.is_none());
    assert_eq!(q.state().last_error, Some(failure));
    assert!(q.transitions().iter().any(|t| t.to == Phase::Failed));

    // user retries
    let retry = issue(&mut q);
    assert_ne!(retry, ticket);
    assert!(q.state().last_error.is_none());
}

#[test]
fn test_failed_regenerate_drops_previous_plan() {
    let mut q = Questionnaire::default();
    answer_all(&mut q, Category::Nutrition);
    let first = issue(&mut q);
    q.dispatch(Action::PlanReceived {
        ticket: first,
        plan: "Plano A".to_string(),
    })
    .unwrap();
    assert_eq!(q.phase(), Phase::Completed);

    let second = issue(&mut q);
    assert_eq!(q.phase(), Phase::Submitting);
    assert!(q.state().generated_plan.is_none());

    q.dispatch(Action::PlanFailed {
        ticket: second,
        failure: PlanFailure::Request("HTTP 500".to_string()),
    })
    .unwrap();
    assert_eq!(q.phase(), Phase::SummaryReady);
    assert!(q.state().generated_plan.is_none());
    assert!(q.state().last_error.is_some());
}

#[test]
fn test_generate_is_single_flight() {
    let mut q = Questionnaire::default();
    answer_all(&mut q, Category::Nutrition);
    let ticket = issue(&mut q);

    let before = q.state().clone();
    assert_eq!(q.generate_plan(), Err(EngineError::PlanInFlight));
    assert_eq!(q.state(), &before);
    assert_eq!(q.state().pending, Some(ticket));
}

#[test]
fn test_result_after_restart_is_stale() {
    let mut q = Questionnaire::default();
    answer_all(&mut q, Category::Nutrition);
    let ticket = issue(&mut q);

    q.restart();
    answer_all(&mut q, Category::Training);

    let outcome = q
        .dispatch(Action::PlanReceived {
            ticket,
            plan: "late".to_string(),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Stale);
    assert!(q.state().generated_plan.is_none());
    assert_eq!(q.phase(), Phase::SummaryReady);

    let outcome = q
        .dispatch(Action::PlanFailed {
            ticket,
            failure: PlanFailure::Request("late".to_string()),
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Stale);
    assert!(q.state().last_error.is_none());
}
