//! Streaming Legends parser
//!
//! Wires the [`TagLexer`] to the [`ContextStack`] and the per-kind draft
//! builders. One `LegendsParser` holds all state for a single parse; feed it
//! chunks in order and call [`LegendsParser::finish`] once the input is
//! exhausted.

use super::drafts::*;
use super::lexer::{Tag, TagLexer};
use super::scope::{ContextStack, Popped, RecordKind, Scope};
use crate::types::*;
use crate::util::decode_text;
use tracing::{debug, warn};

/// Records collected by a finished parse, in parse order, not yet resolved
#[derive(Debug, Default)]
pub struct ParsedDrafts {
    pub world_name: String,
    pub regions: Vec<Region>,
    pub underground_regions: Vec<UndergroundRegion>,
    pub sites: Vec<Site>,
    pub historical_figures: Vec<HistoricalFigure>,
    pub entities: Vec<Entity>,
    pub artifacts: Vec<Artifact>,
    pub written_contents: Vec<WrittenContent>,
    pub historical_events: Vec<HistoricalEvent>,
    pub event_collections: Vec<EventCollection>,
    /// Records dropped because their own ID was missing or invalid
    pub dropped: usize,
}

#[derive(Debug, Default)]
struct Builders {
    regions: DraftBuilder<RegionDraft>,
    underground_regions: DraftBuilder<UndergroundRegionDraft>,
    sites: DraftBuilder<SiteDraft>,
    historical_figures: DraftBuilder<HistoricalFigureDraft>,
    entities: DraftBuilder<EntityDraft>,
    artifacts: DraftBuilder<ArtifactDraft>,
    written_contents: DraftBuilder<WrittenContentDraft>,
    historical_events: DraftBuilder<HistoricalEventDraft>,
    event_collections: DraftBuilder<EventCollectionDraft>,
}

impl Builders {
    fn sink(&mut self, kind: RecordKind) -> &mut dyn RecordSink {
        match kind {
            RecordKind::Region => &mut self.regions,
            RecordKind::UndergroundRegion => &mut self.underground_regions,
            RecordKind::Site => &mut self.sites,
            RecordKind::HistoricalFigure => &mut self.historical_figures,
            RecordKind::Entity => &mut self.entities,
            RecordKind::Artifact => &mut self.artifacts,
            RecordKind::WrittenContent => &mut self.written_contents,
            RecordKind::HistoricalEvent => &mut self.historical_events,
            RecordKind::EventCollection => &mut self.event_collections,
        }
    }

    fn sink_ref(&self, kind: RecordKind) -> &dyn RecordSink {
        match kind {
            RecordKind::Region => &self.regions,
            RecordKind::UndergroundRegion => &self.underground_regions,
            RecordKind::Site => &self.sites,
            RecordKind::HistoricalFigure => &self.historical_figures,
            RecordKind::Entity => &self.entities,
            RecordKind::Artifact => &self.artifacts,
            RecordKind::WrittenContent => &self.written_contents,
            RecordKind::HistoricalEvent => &self.historical_events,
            RecordKind::EventCollection => &self.event_collections,
        }
    }

    fn counts(&self) -> RecordCounts {
        RecordCounts::from_kinds(|kind| self.sink_ref(kind).len())
    }

    fn dropped(&self) -> usize {
        RecordKind::ALL
            .iter()
            .map(|&kind| self.sink_ref(kind).dropped())
            .sum()
    }
}

/// Everything except the lexer, so tags can be handled while the lexer is
/// mid-feed.
#[derive(Debug, Default)]
struct ParseState {
    stack: ContextStack,
    builders: Builders,
    world_name: Option<String>,
    /// Set once any section opens under the document root; the world name
    /// must precede it
    section_opened: bool,
    implicit_closes: usize,
    stray_closes: usize,
}

impl ParseState {
    fn handle(&mut self, tag: Tag<'_>) {
        if tag.closing {
            self.close(tag.name, tag.text);
        } else {
            self.open(tag.name);
        }
    }

    fn open(&mut self, name: &[u8]) {
        let scope = self.stack.push(name);
        if name != b"name" && self.stack.depth() > 1 {
            self.section_opened = true;
        }
        match scope {
            Scope::Record(kind) => {
                self.section_opened = true;
                self.builders.sink(kind).open();
            }
            Scope::Element | Scope::Structures => {}
            nested => {
                if let Some(kind) = self.stack.current_record() {
                    self.builders.sink(kind).open_nested(nested, name);
                }
            }
        }
    }

    fn close(&mut self, name: &[u8], text: &[u8]) {
        let Some(target) = self.stack.position_of(name) else {
            self.stray_closes += 1;
            debug!(tag = %String::from_utf8_lossy(name), "Ignoring close without matching open");
            return;
        };

        while self.stack.depth() > target + 1 {
            if let Some(popped) = self.stack.pop() {
                self.implicit_closes += 1;
                warn!(
                    closing = %String::from_utf8_lossy(name),
                    "Implicitly closing {:?} element",
                    popped.scope
                );
                self.finalize(popped, None);
            }
        }

        if let Some(popped) = self.stack.pop() {
            self.finalize(popped, Some((name, text)));
        }
    }

    /// Act on a frame that was just removed. `field` is the element's name
    /// and text when it was closed explicitly.
    fn finalize(&mut self, popped: Popped, field: Option<(&[u8], &[u8])>) {
        match popped.scope {
            Scope::Record(kind) => {
                if !self.builders.sink(kind).close() {
                    warn!(kind = kind.tag(), "Dropping record without a valid id");
                }
            }
            Scope::Element if !popped.has_children => {
                if let Some((name, text)) = field {
                    self.assign_field(name, text);
                }
            }
            _ => {}
        }
    }

    fn assign_field(&mut self, name: &[u8], text: &[u8]) {
        let Some(kind) = self.stack.current_record() else {
            let top_level = self.stack.depth() <= 1;
            if name == b"name" && top_level && !self.section_opened && self.world_name.is_none() {
                self.world_name = Some(decode_text(text));
            }
            return;
        };

        let value = FieldValue(text);
        match self.stack.top() {
            Some(Scope::Record(_)) => self.builders.sink(kind).field(name, value),
            Some(owner) if owner.owns_fields() => {
                self.builders.sink(kind).nested_field(owner, name, value)
            }
            _ => {}
        }
    }
}

/// Resumable parser for one Legends document
#[derive(Debug, Default)]
pub struct LegendsParser {
    lexer: TagLexer,
    state: ParseState,
}

impl LegendsParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one chunk. Chunks may be cut at any byte.
    pub fn feed(&mut self, chunk: &[u8]) {
        let Self { lexer, state } = self;
        lexer.feed(chunk, |tag| state.handle(tag));
    }

    /// Records completed so far, per kind
    pub fn counts(&self) -> RecordCounts {
        self.state.builders.counts()
    }

    /// Stop parsing and hand over every completed record.
    ///
    /// Records still open at this point are discarded.
    pub fn finish(self) -> ParsedDrafts {
        let Self { lexer, mut state } = self;

        if lexer.in_partial_tag() {
            warn!("Input ended inside a tag; the partial tag was discarded");
        }
        if !state.stack.is_empty() {
            warn!(
                open_elements = state.stack.depth(),
                "Input ended with unclosed elements"
            );
            if let Some(kind) = state.stack.current_record() {
                warn!(kind = kind.tag(), "Discarding unfinished record");
                state.builders.sink(kind).discard();
            }
        }
        if state.implicit_closes > 0 || state.stray_closes > 0 {
            debug!(
                implicit_closes = state.implicit_closes,
                stray_closes = state.stray_closes,
                "Recovered from mismatched tags"
            );
        }

        let dropped = state.builders.dropped();
        let b = state.builders;
        ParsedDrafts {
            world_name: state.world_name.unwrap_or_default(),
            regions: b.regions.into_records(),
            underground_regions: b.underground_regions.into_records(),
            sites: b.sites.into_records(),
            historical_figures: b.historical_figures.into_records(),
            entities: b.entities.into_records(),
            artifacts: b.artifacts.into_records(),
            written_contents: b.written_contents.into_records(),
            historical_events: b.historical_events.into_records(),
            event_collections: b.event_collections.into_records(),
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> ParsedDrafts {
        let mut parser = LegendsParser::new();
        parser.feed(doc.as_bytes());
        parser.finish()
    }

    #[test]
    fn test_world_name_precedes_records() {
        let drafts = parse(
            "<df_world><name>The Realm of Fire</name><altname>Tar</altname>\
             <regions><region><id>0</id><name>the Plains</name><type>Grassland</type></region></regions>\
             </df_world>",
        );
        assert_eq!(drafts.world_name, "The Realm of Fire");
        assert_eq!(drafts.regions.len(), 1);
        assert_eq!(drafts.regions[0].name, "the Plains");
        assert_eq!(drafts.regions[0].region_type, "Grassland");
    }

    #[test]
    fn test_world_name_not_taken_after_records() {
        let drafts = parse("<df_world><regions><region><id>0</id></region></regions><name>Late</name></df_world>");
        assert_eq!(drafts.world_name, "");
    }

    #[test]
    fn test_world_name_not_taken_after_empty_section() {
        let drafts = parse("<df_world><regions></regions><name>Late</name></df_world>");
        assert_eq!(drafts.world_name, "");
    }

    #[test]
    fn test_world_name_ignores_names_in_containers() {
        let drafts = parse("<df_world><world_info><name>Inner</name></world_info></df_world>");
        assert_eq!(drafts.world_name, "");
    }

    #[test]
    fn test_nested_names_do_not_leak_into_figure() {
        let drafts = parse(
            "<historical_figure><id>3</id><name>urist</name><race>DWARF</race>\
             <entity_link><link_type>member</link_type><entity_id>7</entity_id></entity_link>\
             <hf_skill><skill>MINING</skill><total_ip>1200</total_ip></hf_skill>\
             <entity_position_link><position_profile_id>2</position_profile_id><entity_id>7</entity_id></entity_position_link>\
             </historical_figure>",
        );
        let figure = &drafts.historical_figures[0];
        assert_eq!(figure.name, "urist");
        assert_eq!(figure.race, "DWARF");
        assert_eq!(figure.entity_links[0].link_type, "member");
        assert_eq!(figure.entity_links[0].entity_id, Some(7));
        assert_eq!(figure.hf_skills[0].skill, "MINING");
        assert_eq!(figure.position_history[0].position_id, Some(2));
        assert_eq!(figure.position_history[0].link_type.as_deref(), Some("position"));
    }

    #[test]
    fn test_unknown_container_is_opaque() {
        let drafts = parse(
            "<entity><id>1</id><name>the guild</name>\
             <entity_position><id>0</id><name>master</name></entity_position>\
             </entity>",
        );
        assert_eq!(drafts.entities[0].id, 1);
        assert_eq!(drafts.entities[0].name.as_deref(), Some("the guild"));
    }

    #[test]
    fn test_container_events_skip_extra_entries() {
        let drafts = parse(
            "<historical_event><id>4</id><type>hf died</type>\
             <circumstance><type>murdered</type></circumstance><cause>murder</cause>\
             </historical_event>",
        );
        let event = &drafts.historical_events[0];
        assert_eq!(event.event_type, "hf died");
        assert_eq!(event.cause.as_deref(), Some("murder"));
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_site_structures() {
        let drafts = parse(
            "<site><id>5</id><type>fortress</type><name>boatmurdered</name><coords>10,20</coords>\
             <structures><structure><local_id>0</local_id><type>tavern</type><name>the mug</name></structure>\
             <structure><id>1</id><type>temple</type></structure></structures></site>",
        );
        let site = &drafts.sites[0];
        assert_eq!(site.name, "boatmurdered");
        assert_eq!(site.coords, Coords { x: Some(10), y: Some(20) });
        assert_eq!(site.structures.len(), 2);
        assert_eq!(site.structures[0].name.as_deref(), Some("the mug"));
        assert_eq!(site.structures[1].local_id, Some(1));
        assert_eq!(site.structures[1].structure_type, "temple");
    }

    #[test]
    fn test_artifact_item_name() {
        let drafts = parse(
            "<artifact><id>2</id><item><name_string>the Gleaming Axe</name_string></item></artifact>\
             <artifact><id>3</id><name>named</name><item><name_string>ignored</name_string></item></artifact>",
        );
        assert_eq!(drafts.artifacts[0].name.as_deref(), Some("the Gleaming Axe"));
        assert_eq!(drafts.artifacts[1].name.as_deref(), Some("named"));
    }

    #[test]
    fn test_mismatched_close_recovers() {
        let drafts = parse(
            "<sites><site><id>1</id><name>first</site>\
             <site><id>2</id><name>second</name></site></sites>",
        );
        assert_eq!(drafts.sites.len(), 2);
        // The implicitly closed `name` carries no value
        assert_eq!(drafts.sites[0].name, "");
        assert_eq!(drafts.sites[1].name, "second");
    }

    #[test]
    fn test_stray_close_is_ignored() {
        let drafts = parse("<region><id>1</id></bogus><name>a</name></region>");
        assert_eq!(drafts.regions[0].name, "a");
    }

    #[test]
    fn test_unfinished_record_is_discarded() {
        let mut parser = LegendsParser::new();
        parser.feed(b"<regions><region><id>1</id></region><region><id>2</id><na");
        assert_eq!(parser.counts().regions, 1);
        let drafts = parser.finish();
        assert_eq!(drafts.regions.len(), 1);
        assert_eq!(drafts.regions[0].id, 1);
    }

    #[test]
    fn test_invalid_ids_are_counted() {
        let drafts = parse("<region><id>x</id></region><region></region><region><id>0</id></region>");
        assert_eq!(drafts.regions.len(), 1);
        assert_eq!(drafts.dropped, 2);
    }

    #[test]
    fn test_self_closing_flags() {
        let drafts = parse("<historical_figure><id>1</id><deity/><sphere>fire</sphere></historical_figure>");
        assert!(drafts.historical_figures[0].is_deity);
        assert_eq!(drafts.historical_figures[0].spheres, vec!["fire".to_string()]);
    }
}
