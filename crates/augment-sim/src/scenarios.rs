//! Canonical scenarios replayed against the in-memory world

use augment_core::{
    Answer, ApplyError, AugmentConfig, ResumeOutcome, UseOutcome, Variation, WorkflowRun,
};
use augment_test_utils::{
    catalyst, player, scenario_world, setup_workflow, InMemoryWorld, PromptScript, RefineBehavior,
    ScriptedPrompts, APPLIED, MATERIAL, PLAIN_OPTION, PLAYER, SKILL_OPTION, WEAPON_OBJECT,
};
use clap::ValueEnum;
use std::sync::Arc;

/// Scenario selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Clean weapon, fee held: applied
    A,
    /// Skill augment, actor declines: untouched
    B,
    /// Plain augment: stripped and replaced without a prompt
    C,
    /// Credit off, fee short: refused before the engine
    D,
    /// Credit on, engine throws: advance reversed
    E,
    /// All of the above
    All,
}

impl Scenario {
    pub(crate) fn expand(self) -> Vec<Scenario> {
        match self {
            Self::All => vec![Self::A, Self::B, Self::C, Self::D, Self::E],
            one => vec![one],
        }
    }
}

/// Checks made for one scenario
#[derive(Debug)]
pub(crate) struct ScenarioReport {
    pub(crate) name: Scenario,
    pub(crate) checks: Vec<(String, bool)>,
}

impl ScenarioReport {
    fn new(name: Scenario) -> Self {
        Self {
            name,
            checks: Vec::new(),
        }
    }

    fn check(&mut self, what: impl Into<String>, passed: bool) {
        self.checks.push((what.into(), passed));
    }

    pub(crate) fn passed(&self) -> bool {
        self.checks.iter().all(|(_, ok)| *ok)
    }

    pub(crate) fn generate_text(&self) -> String {
        let mut out = format!(
            "Scenario {:?}: {}\n",
            self.name,
            if self.passed() { "PASS" } else { "FAIL" }
        );
        for (what, ok) in &self.checks {
            out.push_str(&format!("  [{}] {what}\n", if *ok { "x" } else { " " }));
        }
        out
    }
}

pub(crate) async fn run(scenario: Scenario, base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    match scenario {
        Scenario::A => clean_weapon(base).await,
        Scenario::B => protected_declined(base).await,
        Scenario::C => plain_replaced(base).await,
        Scenario::D => short_without_credit(base).await,
        Scenario::E => credit_reversed(base).await,
        Scenario::All => anyhow::bail!("`all` must be expanded before running"),
    }
}

fn world_with(variation: Variation, material: u64) -> Arc<InMemoryWorld> {
    let world = scenario_world();
    world.set_variation(WEAPON_OBJECT, variation);
    world.set_count(PLAYER, MATERIAL, material);
    world
}

async fn use_once(
    config: AugmentConfig,
    world: &Arc<InMemoryWorld>,
    prompts: &Arc<ScriptedPrompts>,
) -> WorkflowRun {
    setup_workflow(config, world, prompts)
        .use_catalyst(player(), catalyst())
        .await
}

async fn clean_weapon(base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    let mut report = ScenarioReport::new(Scenario::A);
    let world = world_with(Variation::EMPTY, 50);
    let prompts = Arc::new(ScriptedPrompts::new(PromptScript::Fail));

    let run = use_once(base.clone(), &world, &prompts).await;

    report.check("outcome is success", run.outcome.is_applied());
    report.check("material count is 0", world.count(PLAYER, MATERIAL) == 0);
    report.check(
        "slots are non-zero",
        world.variation(WEAPON_OBJECT).is_augmented(),
    );
    report.check(
        "one success message",
        world.messages(PLAYER).len() == 1,
    );
    Ok(report)
}

async fn protected_declined(base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    let mut report = ScenarioReport::new(Scenario::B);
    let before = Variation::new(SKILL_OPTION, 0);
    let world = world_with(before, 50);
    let prompts = Arc::new(ScriptedPrompts::answering(Answer::No));
    let config = base.clone().with_confirm(true);

    let run = use_once(config, &world, &prompts).await;
    report.check(
        "prompt issued",
        matches!(run.outcome, UseOutcome::Deferred(_)),
    );

    let Some(continuation) = run.continuation else {
        report.check("continuation spawned", false);
        return Ok(report);
    };
    let resumed = continuation.await?;

    report.check(
        "actor declined",
        matches!(resumed.outcome, ResumeOutcome::Declined),
    );
    report.check("slots unchanged", world.variation(WEAPON_OBJECT) == before);
    report.check("no engine calls", world.calls().engine_calls() == 0);
    Ok(report)
}

async fn plain_replaced(base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    let mut report = ScenarioReport::new(Scenario::C);
    let world = world_with(Variation::new(PLAIN_OPTION, 0), 50);
    let prompts = Arc::new(ScriptedPrompts::holding());

    let run = use_once(base.clone(), &world, &prompts).await;

    report.check("no prompt shown", prompts.shown().is_empty());
    report.check("old augment cancelled", world.calls().cancel == 1);
    report.check("outcome is success", run.outcome.is_applied());
    report.check("new augment in place", world.variation(WEAPON_OBJECT) == APPLIED);
    Ok(report)
}

async fn short_without_credit(base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    let mut report = ScenarioReport::new(Scenario::D);
    let world = world_with(Variation::EMPTY, 10);
    let prompts = Arc::new(ScriptedPrompts::holding());
    let config = base.clone().with_credit_mode(false);

    let run = use_once(config, &world, &prompts).await;

    report.check(
        "insufficient material",
        matches!(
            run.outcome,
            UseOutcome::Completed(Err(ApplyError::InsufficientMaterial { .. }))
        ),
    );
    report.check("no refine call", world.calls().refine == 0);
    report.check("material still 10", world.count(PLAYER, MATERIAL) == 10);
    Ok(report)
}

async fn credit_reversed(base: &AugmentConfig) -> anyhow::Result<ScenarioReport> {
    let mut report = ScenarioReport::new(Scenario::E);
    let world = world_with(Variation::EMPTY, 10);
    world.set_refine(RefineBehavior::Throw);
    let prompts = Arc::new(ScriptedPrompts::holding());
    let config = base.clone().with_credit_mode(true);

    let run = use_once(config, &world, &prompts).await;

    report.check(
        "engine rejected",
        matches!(
            run.outcome,
            UseOutcome::Completed(Err(ApplyError::EngineRejected(_)))
        ),
    );
    report.check("40 advanced once", world.calls().grant == 1);
    report.check("advance destroyed", world.calls().destroy == 1);
    report.check("material back to 10", world.count(PLAYER, MATERIAL) == 10);
    Ok(report)
}
