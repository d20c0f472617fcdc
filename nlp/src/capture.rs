//! Per-path variable captures.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Slot<'t> {
    var: Option<&'t str>,
    text: Option<String>,
}

/// Variable bindings along the current root-to-node path.
///
/// There is one slot per input offset. Binding offset `o` drops every slot at
/// `o` and beyond, so sibling branches of the search never see each other's
/// captures. Slots without a variable name record wildcard or literal tokens
/// and are invisible to lookups.
#[derive(Debug, Clone, Default)]
pub struct CaptureStack<'t> {
    slots: Vec<Slot<'t>>,
}

impl<'t> CaptureStack<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `var` (or no variable) the active binding at `offset`.
    pub fn bind(&mut self, offset: usize, var: Option<&'t str>) {
        self.slots.truncate(offset);
        self.slots.resize_with(offset, Slot::default);
        self.slots.push(Slot { var, text: None });
    }

    /// Records the token consumed at `offset`.
    pub fn capture(&mut self, offset: usize, text: &str) {
        if let Some(slot) = self.slots.get_mut(offset) {
            slot.text = Some(text.to_string());
        }
    }

    /// Captured text of `var`, words joined by spaces. Empty when unbound.
    pub fn value(&self, var: &str) -> String {
        let mut value = String::new();
        for text in self.texts_of(var) {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(text);
        }
        value
    }

    /// Whether `var` captured at least one token.
    pub fn is_bound(&self, var: &str) -> bool {
        self.texts_of(var).next().is_some()
    }

    /// All named bindings, sorted by variable name.
    pub fn bindings(&self) -> BTreeMap<&'t str, String> {
        let mut out = BTreeMap::new();
        for slot in &self.slots {
            if let Some(var) = slot.var {
                out.entry(var).or_insert_with(|| self.value(var));
            }
        }
        out
    }

    /// Number of offsets on the current path.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    fn texts_of<'a>(&'a self, var: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.slots
            .iter()
            .filter(move |s| s.var == Some(var))
            .filter_map(|s| s.text.as_deref())
    }
}
