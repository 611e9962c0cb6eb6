//! Testing utilities for the auto-augment workspace
//!
//! An in-memory world implementing every collaborator trait, with call
//! counters and behaviour knobs, a scripted confirmation transport, and the
//! canonical scenario fixture.

#![allow(missing_docs)]

use augment_core::{
    ActorId, Answer, AugmentConfig, AutoAugment, CatalystRef, Collaborators, ConfirmPrompt,
    ConfirmationTransport, EngineError, Inventory, ItemFlags, ItemHandler, ItemHandlerRegistry,
    ItemId, ItemSnapshot, Notifier, NotifyError, ObjectId, OptionCatalog, OptionId, OptionTraits,
    PaperdollSlot, Recipe, RecipeSource, RefineEngine, Shortcut, ShortcutKind, SystemNotice,
    Variation,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

pub const PLAYER: u32 = 1;
pub const WEAPON_OBJECT: u32 = 100;
pub const WEAPON_ITEM: u32 = 7000;
pub const CATALYST_OBJECT: u32 = 500;
pub const CATALYST_ITEM: u32 = 8723;
pub const MATERIAL: u32 = 9000;
pub const MATERIAL_COUNT: u64 = 50;
pub const SKILL_OPTION: u32 = 1001;
pub const PLAIN_OPTION: u32 = 1002;
pub const TRIGGER_OPTION: u32 = 1003;
pub const STAT_OPTION: u32 = 1004;
pub const APPLIED: Variation = Variation::new(2001, 2002);

/// What the engine does on refine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineBehavior {
    /// Consume the fee and write the variation
    Apply(Variation),
    /// Return an error
    Throw,
    /// Panic inside the call
    Panic,
    /// Return Ok without touching anything
    SilentNoop,
    /// Consume the fee but leave the slots alone
    ConsumeOnly,
}

/// What the engine does on cancel-refine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelBehavior {
    /// Clear both slots
    Clear,
    /// Return Ok without touching anything
    Refuse,
    /// Return an error
    Throw,
}

/// Snapshot of collaborator call counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub refine: usize,
    pub cancel: usize,
    pub equip: usize,
    pub unequip: usize,
    pub write_variation: usize,
    pub persist: usize,
    pub grant: usize,
    pub destroy: usize,
}

impl CallCounts {
    /// Engine calls of any kind
    pub fn engine_calls(&self) -> usize {
        self.refine + self.cancel
    }

    /// Direct inventory mutations of any kind
    pub fn mutations(&self) -> usize {
        self.equip + self.unequip + self.write_variation + self.persist + self.grant + self.destroy
    }
}

#[derive(Default)]
struct Counters {
    refine: AtomicUsize,
    cancel: AtomicUsize,
    equip: AtomicUsize,
    unequip: AtomicUsize,
    write_variation: AtomicUsize,
    persist: AtomicUsize,
    grant: AtomicUsize,
    destroy: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[derive(Debug, Clone, Copy)]
struct StoredItem {
    snapshot: ItemSnapshot,
    slot: PaperdollSlot,
}

struct WorldState {
    items: HashMap<ObjectId, StoredItem>,
    counts: HashMap<(ActorId, ItemId), u64>,
    stacks: HashMap<ObjectId, (ActorId, ItemId)>,
    shortcuts: HashMap<ActorId, Vec<Shortcut>>,
    recipes: HashMap<ItemId, Vec<Recipe>>,
    options: HashMap<OptionId, OptionTraits>,
    refine: RefineBehavior,
    cancel: CancelBehavior,
    writes_stick: bool,
    grant_cap: Option<u64>,
    refine_delay: Option<Duration>,
}

/// In-memory item engine, inventory, data sources and notifier
pub struct InMemoryWorld {
    state: Mutex<WorldState>,
    counters: Counters,
    messages: Mutex<Vec<(ActorId, String)>>,
    notices: Mutex<Vec<(ActorId, SystemNotice)>>,
    inventory_updates: Mutex<Vec<(ActorId, ObjectId)>>,
    shortcut_updates: Mutex<Vec<(ActorId, Shortcut)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for InMemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorldState {
                items: HashMap::new(),
                counts: HashMap::new(),
                stacks: HashMap::new(),
                shortcuts: HashMap::new(),
                recipes: HashMap::new(),
                options: HashMap::new(),
                refine: RefineBehavior::Apply(APPLIED),
                cancel: CancelBehavior::Clear,
                writes_stick: true,
                grant_cap: None,
                refine_delay: None,
            }),
            counters: Counters::default(),
            messages: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
            inventory_updates: Mutex::new(Vec::new()),
            shortcut_updates: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    // ---- setup ----

    /// Put a weapon into the actor's inventory, optionally worn
    pub fn give_weapon(
        &self,
        actor: u32,
        object: u32,
        item: u32,
        variation: Variation,
        worn: Option<PaperdollSlot>,
    ) {
        self.give_item(actor, object, item, variation, worn, ItemFlags::weapon());
    }

    pub fn give_item(
        &self,
        actor: u32,
        object: u32,
        item: u32,
        variation: Variation,
        worn: Option<PaperdollSlot>,
        flags: ItemFlags,
    ) {
        let stored = StoredItem {
            snapshot: ItemSnapshot {
                object_id: ObjectId(object),
                item_id: ItemId(item),
                owner: ActorId(actor),
                variation,
                equipped: worn.is_some(),
                flags,
            },
            slot: worn.unwrap_or(PaperdollSlot::RightHand),
        };
        self.state.lock().items.insert(ObjectId(object), stored);
    }

    /// Set the stack count of an item template
    pub fn set_count(&self, actor: u32, item: u32, count: u64) {
        self.state
            .lock()
            .counts
            .insert((ActorId(actor), ItemId(item)), count);
    }

    /// Put a stackable item (e.g. a catalyst) into the inventory
    pub fn give_stack(&self, actor: u32, object: u32, item: u32, count: u64) {
        let mut state = self.state.lock();
        state
            .stacks
            .insert(ObjectId(object), (ActorId(actor), ItemId(item)));
        state.counts.insert((ActorId(actor), ItemId(item)), count);
    }

    /// Take a stack out of the inventory; the template count drops to zero
    /// once the owner holds no other stack of it
    pub fn remove_stack(&self, object: u32) {
        let mut state = self.state.lock();
        let Some((owner, item)) = state.stacks.remove(&ObjectId(object)) else {
            return;
        };
        if !state.stacks.values().any(|s| *s == (owner, item)) {
            state.counts.insert((owner, item), 0);
        }
    }

    pub fn add_recipe(&self, item: u32, recipe: Recipe) {
        self.state
            .lock()
            .recipes
            .entry(ItemId(item))
            .or_default()
            .push(recipe);
    }

    pub fn add_option(&self, option: u32, traits: OptionTraits) {
        self.state.lock().options.insert(OptionId(option), traits);
    }

    pub fn bind_shortcut(&self, actor: u32, shortcut: Shortcut) {
        self.state
            .lock()
            .shortcuts
            .entry(ActorId(actor))
            .or_default()
            .push(shortcut);
    }

    /// Hand the item to someone else
    pub fn transfer(&self, object: u32, to: u32) {
        if let Some(stored) = self.state.lock().items.get_mut(&ObjectId(object)) {
            stored.snapshot.owner = ActorId(to);
            stored.snapshot.equipped = false;
        }
    }

    /// Overwrite slots as if something outside the workflow changed them
    pub fn set_variation(&self, object: u32, variation: Variation) {
        if let Some(stored) = self.state.lock().items.get_mut(&ObjectId(object)) {
            stored.snapshot.variation = variation;
        }
    }

    pub fn set_equipped(&self, object: u32, equipped: bool) {
        if let Some(stored) = self.state.lock().items.get_mut(&ObjectId(object)) {
            stored.snapshot.equipped = equipped;
        }
    }

    // ---- knobs ----

    pub fn set_refine(&self, behavior: RefineBehavior) {
        self.state.lock().refine = behavior;
    }

    pub fn set_cancel(&self, behavior: CancelBehavior) {
        self.state.lock().cancel = behavior;
    }

    /// When false, direct variation writes are accepted but ignored
    pub fn set_writes_stick(&self, stick: bool) {
        self.state.lock().writes_stick = stick;
    }

    /// Grants deliver at most this many items
    pub fn set_grant_cap(&self, cap: Option<u64>) {
        self.state.lock().grant_cap = cap;
    }

    /// Refine sleeps this long before doing anything
    pub fn set_refine_delay(&self, delay: Option<Duration>) {
        self.state.lock().refine_delay = delay;
    }

    // ---- observation ----

    pub fn count(&self, actor: u32, item: u32) -> u64 {
        self.count_of(ActorId(actor), ItemId(item))
    }

    pub fn variation(&self, object: u32) -> Variation {
        self.state
            .lock()
            .items
            .get(&ObjectId(object))
            .map_or(Variation::EMPTY, |s| s.snapshot.variation)
    }

    pub fn is_equipped(&self, object: u32) -> bool {
        self.state
            .lock()
            .items
            .get(&ObjectId(object))
            .is_some_and(|s| s.snapshot.equipped)
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        CallCounts {
            refine: c.refine.load(Ordering::SeqCst),
            cancel: c.cancel.load(Ordering::SeqCst),
            equip: c.equip.load(Ordering::SeqCst),
            unequip: c.unequip.load(Ordering::SeqCst),
            write_variation: c.write_variation.load(Ordering::SeqCst),
            persist: c.persist.load(Ordering::SeqCst),
            grant: c.grant.load(Ordering::SeqCst),
            destroy: c.destroy.load(Ordering::SeqCst),
        }
    }

    /// Chat lines sent to an actor
    pub fn messages(&self, actor: u32) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(a, _)| *a == ActorId(actor))
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn notices(&self, actor: u32) -> Vec<SystemNotice> {
        self.notices
            .lock()
            .iter()
            .filter(|(a, _)| *a == ActorId(actor))
            .map(|(_, n)| *n)
            .collect()
    }

    pub fn inventory_updates(&self) -> Vec<(ActorId, ObjectId)> {
        self.inventory_updates.lock().clone()
    }

    pub fn shortcut_updates(&self) -> Vec<(ActorId, Shortcut)> {
        self.shortcut_updates.lock().clone()
    }

    /// Highest number of refine calls observed running at once
    pub fn max_concurrent_refines(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn take(state: &mut WorldState, actor: ActorId, item: ItemId, count: u64) -> bool {
    let held = state.counts.entry((actor, item)).or_insert(0);
    if *held < count {
        return false;
    }
    *held -= count;
    true
}

impl Inventory for InMemoryWorld {
    fn paperdoll(&self, actor: ActorId, slot: PaperdollSlot) -> Option<ItemSnapshot> {
        self.state
            .lock()
            .items
            .values()
            .find(|s| s.snapshot.owner == actor && s.snapshot.equipped && s.slot == slot)
            .map(|s| s.snapshot)
    }

    fn item(&self, actor: ActorId, object: ObjectId) -> Option<ItemSnapshot> {
        self.state
            .lock()
            .items
            .get(&object)
            .filter(|s| s.snapshot.owner == actor)
            .map(|s| s.snapshot)
    }

    fn count_of(&self, actor: ActorId, item: ItemId) -> u64 {
        self.state
            .lock()
            .counts
            .get(&(actor, item))
            .copied()
            .unwrap_or(0)
    }

    fn stack_of(&self, actor: ActorId, item: ItemId) -> Option<ObjectId> {
        let state = self.state.lock();
        if state.counts.get(&(actor, item)).copied().unwrap_or(0) == 0 {
            return None;
        }
        state
            .stacks
            .iter()
            .filter(|(_, s)| **s == (actor, item))
            .map(|(object, _)| *object)
            .min()
    }

    fn equip(&self, _actor: ActorId, object: ObjectId) -> Result<(), EngineError> {
        bump(&self.counters.equip);
        match self.state.lock().items.get_mut(&object) {
            Some(stored) => {
                stored.snapshot.equipped = true;
                Ok(())
            }
            None => Err(EngineError::Unavailable(format!("no item {object}"))),
        }
    }

    fn unequip(&self, _actor: ActorId, object: ObjectId) -> Result<(), EngineError> {
        bump(&self.counters.unequip);
        match self.state.lock().items.get_mut(&object) {
            Some(stored) => {
                stored.snapshot.equipped = false;
                Ok(())
            }
            None => Err(EngineError::Unavailable(format!("no item {object}"))),
        }
    }

    fn write_variation(&self, object: ObjectId, variation: Variation) -> Result<(), EngineError> {
        bump(&self.counters.write_variation);
        let mut state = self.state.lock();
        let stick = state.writes_stick;
        match state.items.get_mut(&object) {
            Some(stored) => {
                if stick {
                    stored.snapshot.variation = variation;
                }
                Ok(())
            }
            None => Err(EngineError::Unavailable(format!("no item {object}"))),
        }
    }

    fn persist(&self, _object: ObjectId) -> Result<(), EngineError> {
        bump(&self.counters.persist);
        Ok(())
    }

    fn grant(&self, actor: ActorId, item: ItemId, count: u64) -> Result<(), EngineError> {
        bump(&self.counters.grant);
        let mut state = self.state.lock();
        let delivered = state.grant_cap.map_or(count, |cap| count.min(cap));
        *state.counts.entry((actor, item)).or_insert(0) += delivered;
        Ok(())
    }

    fn destroy(&self, actor: ActorId, item: ItemId, count: u64) -> Result<(), EngineError> {
        bump(&self.counters.destroy);
        let mut state = self.state.lock();
        if take(&mut state, actor, item, count) {
            Ok(())
        } else {
            Err(EngineError::Refused(format!("not enough {item} to destroy")))
        }
    }

    fn shortcuts(&self, actor: ActorId) -> Vec<Shortcut> {
        self.state
            .lock()
            .shortcuts
            .get(&actor)
            .cloned()
            .unwrap_or_default()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl RefineEngine for InMemoryWorld {
    async fn refine(
        &self,
        actor: ActorId,
        item: ObjectId,
        catalyst: ObjectId,
        material: ItemId,
        material_count: u64,
    ) -> Result<(), EngineError> {
        bump(&self.counters.refine);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let (behavior, delay) = {
            let state = self.state.lock();
            (state.refine, state.refine_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match behavior {
            RefineBehavior::Throw => Err(EngineError::Unavailable("refine failed".into())),
            RefineBehavior::Panic => panic!("refine exploded"),
            RefineBehavior::SilentNoop => Ok(()),
            RefineBehavior::Apply(_) | RefineBehavior::ConsumeOnly => {
                let mut state = self.state.lock();
                let Some((owner, catalyst_item)) = state.stacks.get(&catalyst).copied() else {
                    return Err(EngineError::Refused(format!("no catalyst {catalyst}")));
                };
                if owner != actor {
                    return Err(EngineError::Refused(format!("catalyst {catalyst} not held")));
                }
                if state.counts.get(&(actor, material)).copied().unwrap_or(0) < material_count
                    || state.counts.get(&(actor, catalyst_item)).copied().unwrap_or(0) < 1
                {
                    return Err(EngineError::Refused("fee not met".into()));
                }
                take(&mut state, actor, material, material_count);
                take(&mut state, actor, catalyst_item, 1);
                if let RefineBehavior::Apply(variation) = behavior {
                    if let Some(stored) = state.items.get_mut(&item) {
                        stored.snapshot.variation = variation;
                    }
                }
                Ok(())
            }
        }
    }

    async fn cancel_refine(&self, _actor: ActorId, item: ObjectId) -> Result<(), EngineError> {
        bump(&self.counters.cancel);
        let mut state = self.state.lock();
        match state.cancel {
            CancelBehavior::Throw => Err(EngineError::Unavailable("cancel failed".into())),
            CancelBehavior::Refuse => Ok(()),
            CancelBehavior::Clear => {
                if let Some(stored) = state.items.get_mut(&item) {
                    stored.snapshot.variation = Variation::EMPTY;
                }
                Ok(())
            }
        }
    }
}

impl RecipeSource for InMemoryWorld {
    fn recipes_for(&self, item: ItemId) -> Vec<Recipe> {
        self.state
            .lock()
            .recipes
            .get(&item)
            .cloned()
            .unwrap_or_default()
    }
}

impl OptionCatalog for InMemoryWorld {
    fn traits(&self, option: OptionId) -> Option<OptionTraits> {
        self.state.lock().options.get(&option).cloned()
    }
}

impl Notifier for InMemoryWorld {
    fn message(&self, actor: ActorId, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().push((actor, text.to_string()));
        Ok(())
    }

    fn notice(&self, actor: ActorId, notice: SystemNotice) -> Result<(), NotifyError> {
        self.notices.lock().push((actor, notice));
        Ok(())
    }

    fn inventory_update(&self, actor: ActorId, item: ObjectId) -> Result<(), NotifyError> {
        self.inventory_updates.lock().push((actor, item));
        Ok(())
    }

    fn shortcut_register(&self, actor: ActorId, shortcut: &Shortcut) -> Result<(), NotifyError> {
        self.shortcut_updates.lock().push((actor, *shortcut));
        Ok(())
    }
}

/// How [`ScriptedPrompts`] reacts to a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptScript {
    /// Answer right away
    Answer(Answer),
    /// Keep the reply handle until [`ScriptedPrompts::answer`]
    Hold,
    /// Drop the reply handle
    Drop,
    /// Fail to show the prompt
    Fail,
}

/// Confirmation transport driven by the test
pub struct ScriptedPrompts {
    script: Mutex<PromptScript>,
    shown: Mutex<Vec<(ActorId, ConfirmPrompt)>>,
    held: Mutex<Vec<oneshot::Sender<Answer>>>,
}

impl ScriptedPrompts {
    pub fn new(script: PromptScript) -> Self {
        Self {
            script: Mutex::new(script),
            shown: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: Answer) -> Self {
        Self::new(PromptScript::Answer(answer))
    }

    pub fn holding() -> Self {
        Self::new(PromptScript::Hold)
    }

    pub fn set_script(&self, script: PromptScript) {
        *self.script.lock() = script;
    }

    /// Prompts shown so far
    pub fn shown(&self) -> Vec<(ActorId, ConfirmPrompt)> {
        self.shown.lock().clone()
    }

    /// Answer the oldest held prompt; false if none is held or it was
    /// already resolved
    pub fn answer(&self, answer: Answer) -> bool {
        let reply = {
            let mut held = self.held.lock();
            if held.is_empty() {
                return false;
            }
            held.remove(0)
        };
        reply.send(answer).is_ok()
    }

    pub fn held(&self) -> usize {
        self.held.lock().len()
    }
}

impl ConfirmationTransport for ScriptedPrompts {
    fn ask(
        &self,
        actor: ActorId,
        prompt: &ConfirmPrompt,
        reply: oneshot::Sender<Answer>,
    ) -> Result<(), NotifyError> {
        let script = *self.script.lock();
        if script == PromptScript::Fail {
            return Err(NotifyError::Disconnected(actor));
        }

        self.shown.lock().push((actor, prompt.clone()));
        match script {
            PromptScript::Answer(answer) => {
                let _ = reply.send(answer);
            }
            PromptScript::Hold => self.held.lock().push(reply),
            PromptScript::Drop | PromptScript::Fail => drop(reply),
        }
        Ok(())
    }
}

/// Host registry that records handlers and can refuse ids
#[derive(Default)]
pub struct RecordingRegistry {
    handlers: Mutex<HashMap<ItemId, Arc<dyn ItemHandler>>>,
    refused: Mutex<Vec<ItemId>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse(&self, item: u32) {
        self.refused.lock().push(ItemId(item));
    }

    pub fn registered(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn handler(&self, item: u32) -> Option<Arc<dyn ItemHandler>> {
        self.handlers.lock().get(&ItemId(item)).cloned()
    }
}

impl ItemHandlerRegistry for RecordingRegistry {
    fn register(&self, item: ItemId, handler: Arc<dyn ItemHandler>) -> Result<(), EngineError> {
        if self.refused.lock().contains(&item) {
            return Err(EngineError::Refused(format!("handler slot {item} taken")));
        }
        self.handlers.lock().insert(item, handler);
        Ok(())
    }
}

// ---- fixtures ----

pub fn player() -> augment_core::Actor {
    augment_core::Actor::player(PLAYER)
}

pub fn catalyst() -> CatalystRef {
    CatalystRef::new(CATALYST_OBJECT, CATALYST_ITEM)
}

/// Player 1 wielding a clean weapon, one catalyst, 50 material, recipe
/// 8723 -> 50 x 9000, and a shortcut bound to the weapon
pub fn scenario_world() -> Arc<InMemoryWorld> {
    let world = InMemoryWorld::new();
    world.give_weapon(
        PLAYER,
        WEAPON_OBJECT,
        WEAPON_ITEM,
        Variation::EMPTY,
        Some(PaperdollSlot::RightHand),
    );
    world.give_stack(PLAYER, CATALYST_OBJECT, CATALYST_ITEM, 1);
    world.set_count(PLAYER, MATERIAL, MATERIAL_COUNT);
    world.add_recipe(
        WEAPON_ITEM,
        Recipe::new(CATALYST_ITEM, MATERIAL, MATERIAL_COUNT),
    );
    world.add_option(
        SKILL_OPTION,
        OptionTraits {
            skills: 1,
            triggers: 0,
            description: "Active: Lightning Strike".into(),
        },
    );
    world.add_option(
        TRIGGER_OPTION,
        OptionTraits {
            skills: 0,
            triggers: 1,
            description: "Chance: Stun".into(),
        },
    );
    world.add_option(
        PLAIN_OPTION,
        OptionTraits {
            skills: 0,
            triggers: 0,
            description: "P. Atk +30".into(),
        },
    );
    world.add_option(
        STAT_OPTION,
        OptionTraits {
            skills: 0,
            triggers: 0,
            description: "str +1".into(),
        },
    );
    world.bind_shortcut(
        PLAYER,
        Shortcut {
            page: 0,
            slot: 3,
            kind: ShortcutKind::Item,
            target: WEAPON_OBJECT,
        },
    );
    Arc::new(world)
}

pub fn collaborators(
    world: &Arc<InMemoryWorld>,
    prompts: &Arc<ScriptedPrompts>,
) -> Collaborators {
    Collaborators {
        inventory: world.clone(),
        engine: world.clone(),
        recipes: world.clone(),
        options: world.clone(),
        notifier: world.clone(),
        prompts: prompts.clone(),
    }
}

pub fn setup_workflow(
    config: AugmentConfig,
    world: &Arc<InMemoryWorld>,
    prompts: &Arc<ScriptedPrompts>,
) -> AutoAugment {
    AutoAugment::new(config, collaborators(world, prompts))
}
