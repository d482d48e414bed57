//! Routing of client requests to transactions

use super::InventoryManager;
use crate::error::{InventoryError, Result};
use crate::owner::NetRole;
use crate::request::InventoryRequest;
use crater_core::ConnectionId;

impl InventoryManager {
    /// Perform a request locally on the authority, or queue it for the
    /// server on the owning client
    pub fn request(&mut self, request: InventoryRequest) -> Result<()> {
        match self.owner.role() {
            NetRole::Authority => self.apply_request(request),
            NetRole::AutonomousProxy => {
                log::debug!("Queued {} for the server", request.name());
                self.outbox.push(request);
                Ok(())
            }
            NetRole::SimulatedProxy => {
                log::warn!("{} dropped: this client does not own the inventory", request.name());
                Err(InventoryError::NotOwningConnection)
            }
        }
    }

    /// Requests waiting to be sent to the server
    pub fn take_outgoing_requests(&mut self) -> Vec<InventoryRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Number of queued requests
    pub fn pending_requests(&self) -> usize {
        self.outbox.len()
    }

    /// Apply a request received from a client connection
    pub fn handle_request(
        &mut self,
        connection: ConnectionId,
        request: InventoryRequest,
    ) -> Result<()> {
        self.require_authority("handle_request")?;

        if self.owner.owning_connection() != Some(connection) {
            log::warn!(
                "Rejected {} from {}: not the owning connection",
                request.name(),
                connection
            );
            return Err(InventoryError::NotOwningConnection);
        }

        self.apply_request(request)
    }

    fn apply_request(&mut self, request: InventoryRequest) -> Result<()> {
        match request {
            InventoryRequest::AddItem { item, quantity } => self.add_item(item, quantity),
            InventoryRequest::RemoveItem { item, quantity } => self.remove_item(item, quantity),
            InventoryRequest::DiscardItem { index, quantity } => self.discard_item(index, quantity),
            InventoryRequest::SwapItems { from, to } => self.swap_items(from, to),
            InventoryRequest::EquipItem { index, slot } => self.equip_item(index, slot).map(|_| ()),
            InventoryRequest::UnequipItem { slot } => self.unequip_item(slot).map(|_| ()),
        }
    }
}
