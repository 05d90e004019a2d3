//! Context stack for resolving reused tag names
//!
//! Legends exports reuse names like `name`, `id`, `type` and `entity_id` in
//! unrelated places. Every open element gets a frame on this stack, tagged
//! with the [`Scope`] it introduces. A closing field is routed by looking at
//! the frame directly beneath it, so a `name` inside an `entity_position`
//! can never be mistaken for the owning entity's name.

pub use crate::types::RecordKind;

/// What an open element means in its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A top-level record
    Record(RecordKind),
    /// `entity_link` inside a historical figure
    EntityLink,
    /// `hf_link` inside a historical figure
    HfLink,
    /// `hf_skill` inside a historical figure
    HfSkill,
    /// `site_link` inside a historical figure
    SiteLink,
    /// `entity_position_link` / `entity_former_position_link` inside a figure
    PositionLink,
    /// `structures` wrapper inside a site
    Structures,
    /// `structure` inside a site's `structures`
    Structure,
    /// `item` inside an artifact
    ArtifactItem,
    /// Scalar field, list wrapper, or unrecognized container
    Element,
}

impl Scope {
    /// Whether fields closing directly inside this scope are meaningful
    pub fn owns_fields(&self) -> bool {
        !matches!(self, Scope::Element | Scope::Structures)
    }

    /// Resolve the scope opened by `name` when `parent` is the innermost frame.
    fn resolve(parent: Option<Scope>, in_record: bool, name: &[u8]) -> Scope {
        if !in_record {
            return RecordKind::from_tag(name)
                .map(Scope::Record)
                .unwrap_or(Scope::Element);
        }

        match (parent, name) {
            (Some(Scope::Record(RecordKind::HistoricalFigure)), b"entity_link") => Scope::EntityLink,
            (Some(Scope::Record(RecordKind::HistoricalFigure)), b"hf_link") => Scope::HfLink,
            (Some(Scope::Record(RecordKind::HistoricalFigure)), b"hf_skill") => Scope::HfSkill,
            (Some(Scope::Record(RecordKind::HistoricalFigure)), b"site_link") => Scope::SiteLink,
            (
                Some(Scope::Record(RecordKind::HistoricalFigure)),
                b"entity_position_link" | b"entity_former_position_link",
            ) => Scope::PositionLink,
            (Some(Scope::Record(RecordKind::Site)), b"structures") => Scope::Structures,
            (Some(Scope::Structures), b"structure") => Scope::Structure,
            (Some(Scope::Record(RecordKind::Artifact)), b"item") => Scope::ArtifactItem,
            _ => Scope::Element,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    scope: Scope,
    /// Offset of this frame's name in `ContextStack::names`
    name_start: usize,
    has_children: bool,
}

/// A frame removed from the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Popped {
    pub scope: Scope,
    /// Whether other elements opened inside this one
    pub has_children: bool,
}

/// Stack of currently open elements
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
    /// Names of all open frames, back to back
    names: Vec<u8>,
    /// Index of the open record frame, if any
    record_frame: Option<usize>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an element and return the scope it introduces.
    pub fn push(&mut self, name: &[u8]) -> Scope {
        let scope = Scope::resolve(self.top(), self.record_frame.is_some(), name);

        if let Some(parent) = self.frames.last_mut() {
            parent.has_children = true;
        }
        if matches!(scope, Scope::Record(_)) {
            self.record_frame = Some(self.frames.len());
        }

        self.frames.push(Frame {
            scope,
            name_start: self.names.len(),
            has_children: false,
        });
        self.names.extend_from_slice(name);
        scope
    }

    /// Remove the innermost frame.
    pub fn pop(&mut self) -> Option<Popped> {
        let frame = self.frames.pop()?;
        self.names.truncate(frame.name_start);
        if self.record_frame == Some(self.frames.len()) {
            self.record_frame = None;
        }
        Some(Popped {
            scope: frame.scope,
            has_children: frame.has_children,
        })
    }

    /// Depth index of the innermost open element called `name`.
    pub fn position_of(&self, name: &[u8]) -> Option<usize> {
        (0..self.frames.len())
            .rev()
            .find(|&idx| self.frame_name(idx) == name)
    }

    /// Scope of the innermost open element
    pub fn top(&self) -> Option<Scope> {
        self.frames.last().map(|f| f.scope)
    }

    /// Kind of the record currently being read
    pub fn current_record(&self) -> Option<RecordKind> {
        let idx = self.record_frame?;
        match self.frames[idx].scope {
            Scope::Record(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn frame_name(&self, idx: usize) -> &[u8] {
        let start = self.frames[idx].name_start;
        let end = self
            .frames
            .get(idx + 1)
            .map(|next| next.name_start)
            .unwrap_or(self.names.len());
        &self.names[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_all(stack: &mut ContextStack, names: &[&str]) -> Vec<Scope> {
        names.iter().map(|n| stack.push(n.as_bytes())).collect()
    }

    #[test]
    fn test_record_tags_open_records_only_outside_records() {
        let mut stack = ContextStack::new();
        let scopes = open_all(&mut stack, &["df_world", "historical_figures", "historical_figure"]);
        assert_eq!(
            scopes,
            vec![
                Scope::Element,
                Scope::Element,
                Scope::Record(RecordKind::HistoricalFigure)
            ]
        );
        // A nested tag that happens to share a record name stays an element
        assert_eq!(stack.push(b"site"), Scope::Element);
        assert_eq!(stack.current_record(), Some(RecordKind::HistoricalFigure));
    }

    #[test]
    fn test_nested_figure_scopes() {
        let mut stack = ContextStack::new();
        stack.push(b"historical_figure");
        assert_eq!(stack.push(b"entity_link"), Scope::EntityLink);
        stack.pop();
        assert_eq!(stack.push(b"hf_link"), Scope::HfLink);
        stack.pop();
        assert_eq!(stack.push(b"hf_skill"), Scope::HfSkill);
        stack.pop();
        assert_eq!(stack.push(b"entity_former_position_link"), Scope::PositionLink);
    }

    #[test]
    fn test_entity_link_is_opaque_inside_entity() {
        let mut stack = ContextStack::new();
        stack.push(b"entity");
        assert_eq!(stack.push(b"entity_link"), Scope::Element);
        stack.push(b"type");
        stack.pop();
        // The field's owner is the opaque container, not the entity
        assert_eq!(stack.top(), Some(Scope::Element));
        assert!(!Scope::Element.owns_fields());
    }

    #[test]
    fn test_structures_wrapper() {
        let mut stack = ContextStack::new();
        stack.push(b"site");
        assert_eq!(stack.push(b"structures"), Scope::Structures);
        assert_eq!(stack.push(b"structure"), Scope::Structure);
        // `structure` outside its wrapper means nothing special
        let mut other = ContextStack::new();
        other.push(b"site");
        assert_eq!(other.push(b"structure"), Scope::Element);
    }

    #[test]
    fn test_pop_restores_record_state() {
        let mut stack = ContextStack::new();
        stack.push(b"sites");
        stack.push(b"site");
        stack.push(b"name");
        let popped = stack.pop().unwrap();
        assert_eq!(popped.scope, Scope::Element);
        assert!(!popped.has_children);

        let popped = stack.pop().unwrap();
        assert_eq!(popped.scope, Scope::Record(RecordKind::Site));
        assert!(popped.has_children);
        assert_eq!(stack.current_record(), None);
        assert_eq!(stack.push(b"site"), Scope::Record(RecordKind::Site));
    }

    #[test]
    fn test_position_of_searches_innermost_first() {
        let mut stack = ContextStack::new();
        open_all(&mut stack, &["a", "b", "a", "c"]);
        assert_eq!(stack.position_of(b"a"), Some(2));
        assert_eq!(stack.position_of(b"b"), Some(1));
        assert_eq!(stack.position_of(b"zzz"), None);
        stack.pop();
        stack.pop();
        assert_eq!(stack.position_of(b"a"), Some(0));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_record_kind_round_trips_tag() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_tag(kind.tag().as_bytes()), Some(kind));
        }
    }
}
