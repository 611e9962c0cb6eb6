//! Deferred confirmation: answers, timeout, and state changes while waiting

use augment_core::{
    ActorId, Answer, AugmentConfig, AutoAugment, NotifyError, ResumeOutcome, UseOutcome,
    ValidationError, Variation, WorkflowRun, WorkflowState,
};
use augment_test_utils::{
    catalyst, player, scenario_world, setup_workflow, InMemoryWorld, PromptScript,
    ScriptedPrompts, APPLIED, CATALYST_ITEM, CATALYST_OBJECT, MATERIAL, PLAYER, SKILL_OPTION,
    STAT_OPTION, TRIGGER_OPTION, WEAPON_OBJECT,
};
use std::sync::Arc;
use std::time::Duration;

const PROTECTED: Variation = Variation::new(SKILL_OPTION, 0);

fn protected_setup(script: PromptScript) -> (Arc<InMemoryWorld>, Arc<ScriptedPrompts>, AutoAugment) {
    let world = scenario_world();
    world.set_variation(WEAPON_OBJECT, PROTECTED);
    let prompts = Arc::new(ScriptedPrompts::new(script));
    let workflow = setup_workflow(AugmentConfig::new(), &world, &prompts);
    (world, prompts, workflow)
}

async fn deferred(workflow: &AutoAugment) -> WorkflowRun {
    let run = workflow.use_catalyst(player(), catalyst()).await;
    assert!(
        matches!(run.outcome, UseOutcome::Deferred(_)),
        "expected a prompt, got {:?}",
        run.outcome
    );
    run
}

#[tokio::test]
async fn yes_resumes_under_a_fresh_lock() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);

    let run = deferred(&workflow).await;
    assert_eq!(workflow.outstanding_prompts(), 1);
    assert_eq!(prompts.shown().len(), 1);
    assert_eq!(prompts.shown()[0].1.timeout, Duration::from_secs(15));

    // Lock is released while the prompt is open
    let guard = tokio::time::timeout(
        Duration::from_millis(100),
        workflow.locks().lock(ActorId(PLAYER)),
    )
    .await
    .expect("lock must be free while confirming");
    drop(guard);

    assert!(prompts.answer(Answer::Yes));
    let report = run.continuation.unwrap().await.unwrap();

    assert!(report.outcome.is_applied());
    assert_eq!(
        report.trace.states(),
        &[
            WorkflowState::Confirming,
            WorkflowState::Stripping,
            WorkflowState::Applying,
            WorkflowState::Done,
        ]
    );
    assert_eq!(world.variation(WEAPON_OBJECT), APPLIED);
    assert_eq!(world.calls().cancel, 1);
    assert_eq!(world.messages(PLAYER).len(), 1);
    assert_eq!(workflow.outstanding_prompts(), 0);
}

#[tokio::test(start_paused = true)]
async fn silence_times_out_without_mutation() {
    let (world, _prompts, workflow) = protected_setup(PromptScript::Hold);

    let run = deferred(&workflow).await;
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(report.outcome, ResumeOutcome::TimedOut));
    assert_eq!(world.variation(WEAPON_OBJECT), PROTECTED);
    assert_eq!(world.calls().engine_calls(), 0);
    assert_eq!(world.messages(PLAYER).len(), 1);
    assert_eq!(workflow.outstanding_prompts(), 0);
}

#[tokio::test(start_paused = true)]
async fn late_yes_after_timeout_is_ignored() {
    let world = scenario_world();
    world.set_variation(WEAPON_OBJECT, PROTECTED);
    let prompts = Arc::new(ScriptedPrompts::holding());
    let workflow = setup_workflow(AugmentConfig::new().with_confirm_timeout(2), &world, &prompts);

    let run = deferred(&workflow).await;
    let report = run.continuation.unwrap().await.unwrap();
    assert!(matches!(report.outcome, ResumeOutcome::TimedOut));

    assert!(!prompts.answer(Answer::Yes));
    assert_eq!(world.variation(WEAPON_OBJECT), PROTECTED);
}

#[tokio::test]
async fn dropped_prompt_counts_as_no() {
    let (world, _prompts, workflow) = protected_setup(PromptScript::Drop);

    let run = deferred(&workflow).await;
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(report.outcome, ResumeOutcome::Abandoned));
    assert_eq!(world.calls().engine_calls(), 0);
    assert_eq!(world.messages(PLAYER).len(), 1);
}

#[tokio::test]
async fn prompt_failure_changes_nothing() {
    let (world, _prompts, workflow) = protected_setup(PromptScript::Fail);

    let run = workflow.use_catalyst(player(), catalyst()).await;

    assert!(matches!(
        run.outcome,
        UseOutcome::PromptFailed(NotifyError::Disconnected(_))
    ));
    assert!(run.continuation.is_none());
    assert_eq!(run.trace.current(), WorkflowState::Done);
    assert_eq!(world.calls().engine_calls(), 0);
    assert_eq!(world.messages(PLAYER).len(), 1);
    assert_eq!(workflow.outstanding_prompts(), 0);
}

#[tokio::test]
async fn confirmation_off_overwrites_directly() {
    let world = scenario_world();
    world.set_variation(WEAPON_OBJECT, PROTECTED);
    let prompts = Arc::new(ScriptedPrompts::holding());
    let workflow = setup_workflow(AugmentConfig::new().with_confirm(false), &world, &prompts);

    let run = workflow.use_catalyst(player(), catalyst()).await;

    assert!(run.outcome.is_applied());
    assert!(prompts.shown().is_empty());
    assert!(!run.trace.visited(WorkflowState::Confirming));
}

#[tokio::test]
async fn triggers_and_keywords_also_prompt() {
    for variation in [
        Variation::new(0, TRIGGER_OPTION),
        Variation::new(STAT_OPTION, 0),
    ] {
        let world = scenario_world();
        world.set_variation(WEAPON_OBJECT, variation);
        let prompts = Arc::new(ScriptedPrompts::answering(Answer::No));
        let workflow = setup_workflow(AugmentConfig::new(), &world, &prompts);

        deferred(&workflow).await;
        assert_eq!(prompts.shown().len(), 1, "variation {variation}");
    }
}

#[tokio::test]
async fn weapon_traded_away_while_waiting() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.transfer(WEAPON_OBJECT, 2);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(
        report.outcome,
        ResumeOutcome::Invalidated(ValidationError::ItemMissing(_))
    ));
    assert_eq!(world.calls().engine_calls(), 0);
    assert_eq!(world.calls().mutations(), 0);
    assert_eq!(world.messages(PLAYER).len(), 1);
}

#[tokio::test]
async fn weapon_unequipped_while_waiting() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.set_equipped(WEAPON_OBJECT, false);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(
        report.outcome,
        ResumeOutcome::Invalidated(ValidationError::StateChanged(_))
    ));
    assert_eq!(world.calls().engine_calls(), 0);
}

#[tokio::test]
async fn augment_removed_while_waiting() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.set_variation(WEAPON_OBJECT, Variation::EMPTY);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(
        report.outcome,
        ResumeOutcome::Invalidated(ValidationError::StateChanged(_))
    ));
    assert_eq!(world.variation(WEAPON_OBJECT), Variation::EMPTY);
}

#[tokio::test]
async fn catalyst_spent_while_waiting() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.set_count(PLAYER, CATALYST_ITEM, 0);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(
        report.outcome,
        ResumeOutcome::Invalidated(ValidationError::CatalystMissing(_))
    ));
    assert_eq!(world.variation(WEAPON_OBJECT), PROTECTED);
}

#[tokio::test]
async fn replaced_catalyst_stack_is_refetched_after_yes() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.remove_stack(CATALYST_OBJECT);
    world.give_stack(PLAYER, 501, CATALYST_ITEM, 1);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(report.outcome.is_applied(), "got {:?}", report.outcome);
    assert_eq!(world.variation(WEAPON_OBJECT), APPLIED);
    assert_eq!(world.count(PLAYER, CATALYST_ITEM), 0);
    assert_eq!(world.calls().refine, 1);
    assert_eq!(world.messages(PLAYER).len(), 1);
}

#[tokio::test]
async fn removed_catalyst_stack_keeps_the_protected_augment() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    let run = deferred(&workflow).await;

    world.remove_stack(CATALYST_OBJECT);
    prompts.answer(Answer::Yes);
    let report = run.continuation.unwrap().await.unwrap();

    assert!(matches!(
        report.outcome,
        ResumeOutcome::Invalidated(ValidationError::CatalystMissing(_))
    ));
    assert_eq!(world.variation(WEAPON_OBJECT), PROTECTED);
    assert_eq!(world.calls().engine_calls(), 0);
    assert_eq!(world.calls().mutations(), 0);
    assert_eq!(world.messages(PLAYER).len(), 1);
}

#[tokio::test]
async fn second_use_is_not_blocked_by_an_open_prompt() {
    let (world, prompts, workflow) = protected_setup(PromptScript::Hold);
    world.set_count(PLAYER, CATALYST_ITEM, 2);
    world.set_count(PLAYER, MATERIAL, 100);

    let first = deferred(&workflow).await;
    let second = tokio::time::timeout(Duration::from_millis(200), deferred(&workflow))
        .await
        .expect("second use must not wait for the first prompt");
    assert_eq!(workflow.outstanding_prompts(), 2);

    prompts.answer(Answer::Yes);
    let first = first.continuation.unwrap().await.unwrap();
    assert!(first.outcome.is_applied());

    // Second answer re-validates against the new augment and applies again
    prompts.answer(Answer::Yes);
    let second = second.continuation.unwrap().await.unwrap();
    assert!(second.outcome.is_applied());

    assert_eq!(world.calls().refine, 2);
    assert_eq!(world.count(PLAYER, CATALYST_ITEM), 0);
    assert_eq!(world.messages(PLAYER).len(), 2);
}
