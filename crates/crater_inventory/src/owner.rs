//! The owning actor seam

use crate::storage::SharedStorage;
use crater_ability::SharedAbilitySystem;
use crater_core::{ActorId, ConnectionId};
use serde::{Deserialize, Serialize};

/// Network role of the local copy of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetRole {
    /// Server (or standalone) copy with write permission
    Authority,
    /// Copy on the owning client
    AutonomousProxy,
    /// Copy on any other client
    SimulatedProxy,
}

impl NetRole {
    /// Check for write permission
    pub fn has_authority(&self) -> bool {
        *self == Self::Authority
    }
}

/// The actor an inventory manager is attached to.
///
/// Collaborators are located through the owner rather than injected one by
/// one, so a host can attach them in any order before `begin_play`.
pub trait InventoryOwner: Send + Sync {
    /// Owner's actor id, used as the source of grants
    fn actor_id(&self) -> ActorId;

    /// Network role of this copy
    fn role(&self) -> NetRole;

    /// Connection of the owning player, if any
    fn owning_connection(&self) -> Option<ConnectionId>;

    /// Storage component on the owner
    fn find_storage(&self) -> Option<SharedStorage>;

    /// Ability system on the owner
    fn find_ability_system(&self) -> Option<SharedAbilitySystem>;
}
