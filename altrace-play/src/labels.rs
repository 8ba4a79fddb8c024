//! Player-side mirror of the label maps (§3 "Label maps", §4.3, §8
//! "delete-clears-label"): a label is installed by a decoded label event
//! and wiped the moment the matching destroy/delete event is decoded, so a
//! stale label can never resurface under a reused handle/name.

use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct LabelMaps {
    pub devices: FxHashMap<u64, String>,
    pub contexts: FxHashMap<u64, String>,
    pub sources: FxHashMap<u32, String>,
    pub buffers: FxHashMap<u32, String>,
}

impl LabelMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_device(&mut self, handle: u64, label: Option<String>) {
        set(&mut self.devices, handle, label);
    }

    pub fn set_context(&mut self, handle: u64, label: Option<String>) {
        set(&mut self.contexts, handle, label);
    }

    pub fn set_source(&mut self, name: u32, label: Option<String>) {
        set(&mut self.sources, name, label);
    }

    pub fn set_buffer(&mut self, name: u32, label: Option<String>) {
        set(&mut self.buffers, name, label);
    }

    pub fn clear_device(&mut self, handle: u64) {
        self.devices.remove(&handle);
    }

    pub fn clear_context(&mut self, handle: u64) {
        self.contexts.remove(&handle);
    }

    pub fn clear_source(&mut self, name: u32) {
        self.sources.remove(&name);
    }

    pub fn clear_buffer(&mut self, name: u32) {
        self.buffers.remove(&name);
    }
}

fn set<K: std::hash::Hash + Eq>(map: &mut FxHashMap<K, String>, key: K, label: Option<String>) {
    match label {
        Some(label) => {
            map.insert(key, label);
        }
        None => {
            map.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_clears_the_label_for_that_handle() {
        let mut labels = LabelMaps::new();
        labels.set_source(7, Some("footsteps".to_string()));
        assert_eq!(labels.sources.get(&7).map(String::as_str), Some("footsteps"));

        labels.clear_source(7);
        assert_eq!(labels.sources.get(&7), None);
    }
}
