use std::collections::HashMap;

const LIMIT: usize = 1024;

/// Encode-side shared string table: string -> back-reference index.
pub(crate) struct EncodeCache {
    map: HashMap<String, u16>,
}

impl EncodeCache {
    pub fn new() -> Self {
        EncodeCache {
            map: HashMap::new(),
        }
    }

    pub fn intern(&mut self, s: &str) {
        if self.map.len() >= LIMIT {
            self.map.clear();
        }

        let id = self.map.len() as u16;
        self.map.insert(s.to_string(), id);
    }

    pub fn get(&self, s: &str) -> Option<u16> {
        self.map.get(s).copied()
    }
}

/// Decode-side shared string table: back-reference index -> string.
pub(crate) struct DecodeCache {
    vec: Vec<String>,
}

impl DecodeCache {
    pub fn new() -> Self {
        DecodeCache { vec: vec![] }
    }

    pub fn intern(&mut self, s: &str) {
        if self.vec.len() >= LIMIT {
            self.vec.clear();
        }

        self.vec.push(s.to_string());
    }

    pub fn get(&self, reference: u16) -> Option<&str> {
        self.vec.get(reference as usize).map(|s| s.as_str())
    }
}
