//! JSON import/export and persistence through the eframe storage.

use super::TopologyEditor;
use crate::constants::STORAGE_KEY;
use crate::error::{Result, TopologyError};
use crate::types::Topology;

impl TopologyEditor {
    /// The scene as pretty-printed JSON, without any inline edit in progress.
    pub fn export_json(&self) -> Result<String> {
        self.settled_topology().to_json()
    }

    /// Replaces the scene with one parsed from JSON.
    ///
    /// On error the current scene is left untouched. Id counters move past
    /// every imported id so new objects never clash with loaded ones.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let topology = Topology::from_json(json)?;
        self.replace_topology(topology);
        self.commit("import");
        log::info!(
            "imported topology: {} device(s), {} connection(s), {} label(s)",
            self.topology.devices.len(),
            self.topology.connections.len(),
            self.topology.text_labels.len()
        );
        Ok(())
    }

    /// Clears the scene. Undoable.
    pub fn new_topology(&mut self) {
        self.replace_topology(Topology::new());
        self.commit("new topology");
    }

    /// Writes the scene under [`STORAGE_KEY`] and flushes.
    pub fn save_to_storage(&mut self, storage: &mut dyn eframe::Storage) -> Result<()> {
        let json = self.export_json()?;
        storage.set_string(STORAGE_KEY, json);
        storage.flush();
        self.mark_saved();
        log::info!("saved topology to storage");
        Ok(())
    }

    /// Loads the scene saved under [`STORAGE_KEY`].
    pub fn load_from_storage(&mut self, storage: &dyn eframe::Storage) -> Result<()> {
        let json = storage
            .get_string(STORAGE_KEY)
            .ok_or(TopologyError::StorageEmpty)?;
        self.import_json(&json)?;
        self.mark_saved();
        Ok(())
    }

    fn replace_topology(&mut self, topology: Topology) {
        self.text_edit = None;
        self.reset_interaction();
        self.next_node_id = self.next_node_id.max(topology.next_node_id());
        self.next_edge_id = self.next_edge_id.max(topology.next_edge_id());
        self.next_label_id = self.next_label_id.max(topology.next_label_id());
        self.topology = topology;
    }
}
