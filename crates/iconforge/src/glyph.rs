/// First code point of the Basic Multilingual Plane private use area.
pub const PUA_START: u32 = 0xE000;
/// Last code point of the Basic Multilingual Plane private use area.
pub const PUA_END: u32 = 0xF8FF;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphAssignment {
    pub name: String,
    pub code_point: u32,
}

impl GlyphAssignment {
    pub fn new(name: impl Into<String>, code_point: u32) -> Self {
        Self {
            name: name.into(),
            code_point,
        }
    }
}

/// Glyph name to code point mapping, iterated in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMap {
    entries: Vec<GlyphAssignment>,
}

impl GlyphMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assignment. Returns `false` and leaves the map untouched if
    /// `name` is already present.
    pub fn insert(&mut self, name: impl Into<String>, code_point: u32) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push(GlyphAssignment::new(name, code_point));
        true
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.code_point)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|g| g.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphAssignment> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|g| g.name.as_str())
    }
}

impl<'a> IntoIterator for &'a GlyphMap {
    type Item = &'a GlyphAssignment;
    type IntoIter = std::slice::Iter<'a, GlyphAssignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A compiled font together with the glyph map describing it.
#[derive(Clone, Debug)]
pub struct FontArtifact {
    pub font: Vec<u8>,
    pub glyph_map: GlyphMap,
}
