//! Core types for the augment workflow
//!
//! Identifiers, item snapshots and the small value types exchanged with the
//! external item engine:
//! - Actor, item instance and item template identifiers
//! - The two-slot variation carried by an item
//! - Recipes, shortcuts and confirmation prompts

use serde::{Deserialize, Serialize};
use std::time::Duration;
use ulid::Ulid;

/// Stable identity of an actor (the object id of the character)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Identity of one concrete item instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Item template identifier (what kind of item, not which one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modifier option identifier stored in a variation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub u32);

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of actor that used an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// A player character
    Player,
    /// A summon or pet acting on its own inventory
    Summon,
}

/// Actor that triggered the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    /// Actor identity
    pub id: ActorId,
    /// Actor kind
    pub kind: ActorKind,
}

impl Actor {
    /// Create a player actor
    #[inline]
    #[must_use]
    pub fn player(id: u32) -> Self {
        Self {
            id: ActorId(id),
            kind: ActorKind::Player,
        }
    }

    /// Create a summon actor
    #[inline]
    #[must_use]
    pub fn summon(id: u32) -> Self {
        Self {
            id: ActorId(id),
            kind: ActorKind::Summon,
        }
    }

    /// Whether the actor is a player
    #[inline]
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player
    }
}

/// The two modifier slots of an item
///
/// Zero means "empty". An item is augmented when at least one slot is
/// non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Variation {
    /// First modifier slot
    pub first: u32,
    /// Second modifier slot
    pub second: u32,
}

impl Variation {
    /// Both slots empty
    pub const EMPTY: Variation = Variation {
        first: 0,
        second: 0,
    };

    /// Create a variation from raw slot values
    #[inline]
    #[must_use]
    pub const fn new(first: u32, second: u32) -> Self {
        Self { first, second }
    }

    /// Whether any slot carries an option
    #[inline]
    #[must_use]
    pub fn is_augmented(&self) -> bool {
        self.first != 0 || self.second != 0
    }

    /// Non-zero options, first slot first
    #[must_use]
    pub fn options(&self) -> Vec<OptionId> {
        [self.first, self.second]
            .into_iter()
            .filter(|v| *v != 0)
            .map(OptionId)
            .collect()
    }
}

impl std::fmt::Display for Variation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first, self.second)
    }
}

/// Equipment slots the workflow looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperdollSlot {
    /// Right hand (one-handed weapons)
    RightHand,
    /// Both hands (two-handed weapons)
    TwoHanded,
}

/// Template properties that decide augmentability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Hero weapon
    pub hero: bool,
    /// Cursed weapon
    pub cursed: bool,
    /// Shadow (time-limited) item
    pub shadow: bool,
    /// Weapon template
    pub weapon: bool,
    /// Can be equipped at all
    pub equipable: bool,
}

impl ItemFlags {
    /// Plain equipable weapon
    #[inline]
    #[must_use]
    pub fn weapon() -> Self {
        Self {
            weapon: true,
            equipable: true,
            ..Self::default()
        }
    }
}

/// Point-in-time view of an item as reported by the inventory
///
/// Snapshots are never carried across a suspension point; they are
/// re-fetched after every await on an external answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Instance identity
    pub object_id: ObjectId,
    /// Template identity
    pub item_id: ItemId,
    /// Current owner
    pub owner: ActorId,
    /// Current modifier slots
    pub variation: Variation,
    /// Whether the item is worn right now
    pub equipped: bool,
    /// Template flags
    pub flags: ItemFlags,
}

/// The catalyst instance the actor used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalystRef {
    /// Instance identity of the stack
    pub object_id: ObjectId,
    /// Template identity
    pub item_id: ItemId,
}

impl CatalystRef {
    /// Create a catalyst reference
    #[inline]
    #[must_use]
    pub fn new(object_id: u32, item_id: u32) -> Self {
        Self {
            object_id: ObjectId(object_id),
            item_id: ItemId(item_id),
        }
    }
}

/// Fee for applying one catalyst to one item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recipe {
    /// Catalyst this recipe is keyed by
    pub catalyst: ItemId,
    /// Material charged
    pub material: ItemId,
    /// Material quantity charged
    pub material_count: u64,
}

impl Recipe {
    /// Create a recipe
    #[inline]
    #[must_use]
    pub fn new(catalyst: u32, material: u32, material_count: u64) -> Self {
        Self {
            catalyst: ItemId(catalyst),
            material: ItemId(material),
            material_count,
        }
    }
}

/// What a quick-access binding points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutKind {
    /// An item instance
    Item,
    /// A skill
    Skill,
    /// A social or system action
    Action,
    /// A user macro
    Macro,
}

/// One quick-access binding on the actor's bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Bar page
    pub page: u8,
    /// Slot on the page
    pub slot: u8,
    /// Binding kind
    pub kind: ShortcutKind,
    /// Target id, interpreted by kind
    pub target: u32,
}

impl Shortcut {
    /// Whether this binding points at the given item instance
    #[inline]
    #[must_use]
    pub fn targets_item(&self, object: ObjectId) -> bool {
        self.kind == ShortcutKind::Item && self.target == object.0
    }
}

/// Unique confirmation prompt identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PromptId(pub Ulid);

impl PromptId {
    /// Generate new prompt ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Yes/no dialog shown to the actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    /// Prompt identity
    pub id: PromptId,
    /// Body text
    pub text: String,
    /// How long the dialog stays open
    pub timeout: Duration,
}

/// Answer delivered by the confirmation transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    /// The actor accepted
    Yes,
    /// The actor declined
    No,
}

/// Built-in system notices sent alongside chat messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemNotice {
    /// "The item was successfully augmented"
    AugmentSucceeded,
}
