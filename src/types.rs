//! Core record types for a resolved Legends world
//!
//! Every record here is a finalized value: drafts are converted into these
//! types only once their closing tag has been read and their ID validated.
//! Fields documented as "derived" are written exclusively by the resolution
//! pass in [`crate::resolve`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Record identifier, unique within its record kind
pub type RecordId = i32;

/// Name used for a killer whose own record is missing from the export
pub const UNKNOWN_KILLER: &str = "Unknown";

// ============================================================================
// Geography
// ============================================================================

/// Surface region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type")]
    pub region_type: String,
    pub evilness: Option<String>,
}

/// Cavern layer or magma sea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndergroundRegion {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub region_type: String,
    pub depth: Option<i32>,
}

/// Map coordinates; a malformed component is `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coords {
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl Coords {
    /// Split `"x,y"` on a single comma.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(',') {
            Some((x, y)) => Self {
                x: crate::util::parse_int(x),
                y: crate::util::parse_int(y),
            },
            None => Self { x: None, y: None },
        }
    }
}

/// A building inside a site; has no identity outside its site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub local_id: Option<i32>,
    #[serde(rename = "type")]
    pub structure_type: String,
    pub subtype: Option<String>,
    pub name: Option<String>,
    pub entity_id: Option<RecordId>,
    pub copied_artifact_id: Option<RecordId>,
}

/// Settlement, lair, camp, or other named location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub site_type: String,
    pub name: String,
    pub coords: Coords,
    pub rectangle: Option<String>,
    pub civ_id: Option<RecordId>,
    pub owner_id: Option<RecordId>,
    pub structures: Vec<Structure>,
}

// ============================================================================
// Historical figures
// ============================================================================

/// Link from a figure to an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    pub link_type: String,
    pub entity_id: Option<RecordId>,
    pub link_strength: Option<i32>,
    pub position_profile_id: Option<i32>,
    pub start_year: Option<i32>,
}

/// Directed link between two figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HfLink {
    pub link_type: String,
    pub hfid: Option<RecordId>,
    pub link_strength: Option<i32>,
}

/// Accumulated experience in one skill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HfSkill {
    pub skill: String,
    pub total_ip: Option<i32>,
}

/// Link from a figure to a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteLink {
    pub link_type: String,
    pub site_id: Option<RecordId>,
    pub entity_id: Option<RecordId>,
}

/// A position held by a figure within an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionTenure {
    pub entity_id: Option<RecordId>,
    pub position_id: Option<i32>,
    pub link_type: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

/// A victim credited to a slayer (derived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillRecord {
    pub victim_id: RecordId,
    pub victim_name: String,
    pub victim_race: String,
    pub year: Option<i32>,
    /// `-1` when the death event names no site
    pub site_id: i32,
    pub cause: Option<String>,
}

/// Who killed a figure (derived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillerInfo {
    pub hfid: RecordId,
    pub name: String,
    pub cause: Option<String>,
    pub year: Option<i32>,
}

/// A named individual in the world's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalFigure {
    pub id: RecordId,
    pub name: String,
    pub race: String,
    pub caste: String,
    pub associated_type: Option<String>,
    pub appeared: Option<i32>,
    pub birth_year: Option<i32>,
    pub birth_seconds72: Option<i32>,
    pub death_year: Option<i32>,
    pub death_seconds72: Option<i32>,
    pub is_alive: bool,
    pub holds_artifact: Option<RecordId>,
    pub spheres: Vec<String>,
    pub entity_links: Vec<EntityLink>,
    pub hf_links: Vec<HfLink>,
    pub hf_skills: Vec<HfSkill>,
    pub site_links: Vec<SiteLink>,
    pub is_deity: bool,
    pub is_force: bool,
    pub is_vampire: bool,
    pub vampire_generation: Option<u32>,
    pub is_werecreature: bool,
    pub is_necromancer: bool,
    pub is_undead: bool,
    pub position_history: Vec<PositionTenure>,
    pub site_ids: Vec<RecordId>,
    pub artifact_ids: Vec<RecordId>,
    /// Derived: victims of this figure
    pub kills: Vec<KillRecord>,
    /// Derived: who killed this figure
    pub killer: Option<KillerInfo>,
    /// Derived: age at death, or at the last year seen in the event log
    pub age: Option<i32>,
}

// ============================================================================
// Entities, artifacts, written works
// ============================================================================

/// Civilization, site government, religion, or other group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: RecordId,
    pub name: Option<String>,
    pub race: Option<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub site_ids: Vec<RecordId>,
    pub member_ids: Vec<RecordId>,
    pub war_ids: Vec<RecordId>,
}

/// Custody or state change recorded for an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceKind {
    Created,
    Stolen,
    Stored,
    Possessed,
    Lost,
    Destroyed,
}

/// One entry of an artifact's provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceEvent {
    pub kind: ProvenanceKind,
    pub event_id: RecordId,
    pub year: Option<i32>,
    pub hfid: Option<RecordId>,
    pub site_id: Option<RecordId>,
}

/// Where an artifact currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Held,
    Stored,
    Lost,
    Destroyed,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "held",
            Self::Stored => "stored",
            Self::Lost => "lost",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named item of note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: RecordId,
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub item_subtype: Option<String>,
    pub material: Option<String>,
    pub creator_hfid: Option<RecordId>,
    pub creation_year: Option<i32>,
    pub holder_hfid: Option<RecordId>,
    pub site_id: Option<RecordId>,
    pub subregion_id: Option<RecordId>,
    pub written_content_id: Option<RecordId>,
    pub written_content_type: Option<String>,
    pub written_content_title: Option<String>,
    pub provenance: Vec<ProvenanceEvent>,
    pub current_status: ArtifactStatus,
}

/// Book, poem, or other composed work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrittenContent {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub author_hfid: Option<RecordId>,
    pub form: Option<String>,
    pub styles: Vec<String>,
    pub page_start: Option<i32>,
    pub page_end: Option<i32>,
}

// ============================================================================
// Event log
// ============================================================================

/// Event types the resolution pass acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    HfDied,
    ArtifactCreated,
    ArtifactStored,
    ArtifactPossessed,
    ArtifactLost,
    ArtifactDestroyed,
    ItemStolen,
    ChangeHfState,
    AddHfHfLink,
    AddHfEntityLink,
    SiteTakenOver,
    CreatedSite,
    Other,
}

impl EventKind {
    /// Map an exported type string to its kind.
    ///
    /// Underscore and space separators are treated alike, so `hf_died` and
    /// `hf died` are the same kind.
    pub fn classify(raw: &str) -> Self {
        match normalize_event_type(raw).as_str() {
            "hf died" => Self::HfDied,
            "artifact created" => Self::ArtifactCreated,
            "artifact stored" => Self::ArtifactStored,
            "artifact possessed" | "artifact claim formed" => Self::ArtifactPossessed,
            "artifact lost" => Self::ArtifactLost,
            "artifact destroyed" => Self::ArtifactDestroyed,
            "item stolen" => Self::ItemStolen,
            "change hf state" => Self::ChangeHfState,
            "add hf hf link" => Self::AddHfHfLink,
            "add hf entity link" => Self::AddHfEntityLink,
            "site taken over" => Self::SiteTakenOver,
            "created site" => Self::CreatedSite,
            _ => Self::Other,
        }
    }
}

/// Canonical spelling of an event type: lowercase, single spaces.
pub fn normalize_event_type(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entry of the append-only world event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    pub id: RecordId,
    pub year: Option<i32>,
    pub seconds72: Option<i32>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub kind: EventKind,
    pub hfid: Option<RecordId>,
    pub target_hfid: Option<RecordId>,
    pub slayer_hfid: Option<RecordId>,
    pub site_id: Option<RecordId>,
    pub subregion_id: Option<RecordId>,
    pub entity_id: Option<RecordId>,
    pub attacker_civ_id: Option<RecordId>,
    pub defender_civ_id: Option<RecordId>,
    pub artifact_id: Option<RecordId>,
    pub collection_id: Option<RecordId>,
    pub position_id: Option<i32>,
    pub cause: Option<String>,
    pub link_type: Option<String>,
    pub state: Option<String>,
    /// Type-specific fields without a typed slot, keyed by tag name
    pub extra: BTreeMap<String, String>,
}

/// Named grouping of related events, such as a war or a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCollection {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub collection_type: String,
    pub name: Option<String>,
    pub start_year: Option<i32>,
    pub start_seconds72: Option<i32>,
    pub end_year: Option<i32>,
    pub end_seconds72: Option<i32>,
    pub site_id: Option<RecordId>,
    pub aggressor_entity_id: Option<RecordId>,
    pub defender_entity_id: Option<RecordId>,
    pub event_ids: Vec<RecordId>,
    pub child_collection_ids: Vec<RecordId>,
}

// ============================================================================
// Collections
// ============================================================================

/// Record kinds produced by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Region,
    UndergroundRegion,
    Site,
    HistoricalFigure,
    Entity,
    Artifact,
    WrittenContent,
    HistoricalEvent,
    EventCollection,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::Region,
        RecordKind::UndergroundRegion,
        RecordKind::Site,
        RecordKind::HistoricalFigure,
        RecordKind::Entity,
        RecordKind::Artifact,
        RecordKind::WrittenContent,
        RecordKind::HistoricalEvent,
        RecordKind::EventCollection,
    ];

    /// Element name that opens a record of this kind
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::UndergroundRegion => "underground_region",
            Self::Site => "site",
            Self::HistoricalFigure => "historical_figure",
            Self::Entity => "entity",
            Self::Artifact => "artifact",
            Self::WrittenContent => "written_content",
            Self::HistoricalEvent => "historical_event",
            Self::EventCollection => "historical_event_collection",
        }
    }

    pub fn from_tag(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag().as_bytes() == name)
    }
}

/// Number of records per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub regions: usize,
    pub underground_regions: usize,
    pub sites: usize,
    pub historical_figures: usize,
    pub entities: usize,
    pub artifacts: usize,
    pub written_contents: usize,
    pub historical_events: usize,
    pub event_collections: usize,
}

impl RecordCounts {
    /// Build counts by asking `count` for each kind.
    pub fn from_kinds(mut count: impl FnMut(RecordKind) -> usize) -> Self {
        RecordCounts {
            regions: count(RecordKind::Region),
            underground_regions: count(RecordKind::UndergroundRegion),
            sites: count(RecordKind::Site),
            historical_figures: count(RecordKind::HistoricalFigure),
            entities: count(RecordKind::Entity),
            artifacts: count(RecordKind::Artifact),
            written_contents: count(RecordKind::WrittenContent),
            historical_events: count(RecordKind::HistoricalEvent),
            event_collections: count(RecordKind::EventCollection),
        }
    }

    pub fn total(&self) -> usize {
        self.regions
            + self.underground_regions
            + self.sites
            + self.historical_figures
            + self.entities
            + self.artifacts
            + self.written_contents
            + self.historical_events
            + self.event_collections
    }
}

/// Fully resolved world, ready to hand to a store
///
/// Every collection is sorted by ascending ID and holds at most one record
/// per ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegendsDataset {
    pub world_name: String,
    /// Largest positive event year, if any event carried one
    pub current_year: Option<i32>,
    pub regions: Vec<Region>,
    pub underground_regions: Vec<UndergroundRegion>,
    pub sites: Vec<Site>,
    pub historical_figures: Vec<HistoricalFigure>,
    pub entities: Vec<Entity>,
    pub artifacts: Vec<Artifact>,
    pub written_contents: Vec<WrittenContent>,
    pub historical_events: Vec<HistoricalEvent>,
    pub event_collections: Vec<EventCollection>,
}

fn find_by_id<T>(records: &[T], id: RecordId, key: impl Fn(&T) -> RecordId) -> Option<&T> {
    records
        .binary_search_by_key(&id, key)
        .ok()
        .map(|idx| &records[idx])
}

impl LegendsDataset {
    pub fn counts(&self) -> RecordCounts {
        RecordCounts::from_kinds(|kind| match kind {
            RecordKind::Region => self.regions.len(),
            RecordKind::UndergroundRegion => self.underground_regions.len(),
            RecordKind::Site => self.sites.len(),
            RecordKind::HistoricalFigure => self.historical_figures.len(),
            RecordKind::Entity => self.entities.len(),
            RecordKind::Artifact => self.artifacts.len(),
            RecordKind::WrittenContent => self.written_contents.len(),
            RecordKind::HistoricalEvent => self.historical_events.len(),
            RecordKind::EventCollection => self.event_collections.len(),
        })
    }

    pub fn figure(&self, id: RecordId) -> Option<&HistoricalFigure> {
        find_by_id(&self.historical_figures, id, |f| f.id)
    }

    pub fn site(&self, id: RecordId) -> Option<&Site> {
        find_by_id(&self.sites, id, |s| s.id)
    }

    pub fn entity(&self, id: RecordId) -> Option<&Entity> {
        find_by_id(&self.entities, id, |e| e.id)
    }

    pub fn artifact(&self, id: RecordId) -> Option<&Artifact> {
        find_by_id(&self.artifacts, id, |a| a.id)
    }

    pub fn written_content(&self, id: RecordId) -> Option<&WrittenContent> {
        find_by_id(&self.written_contents, id, |w| w.id)
    }

    pub fn event(&self, id: RecordId) -> Option<&HistoricalEvent> {
        find_by_id(&self.historical_events, id, |e| e.id)
    }

    pub fn event_collection(&self, id: RecordId) -> Option<&EventCollection> {
        find_by_id(&self.event_collections, id, |c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_parse() {
        assert_eq!(Coords::parse("12,34"), Coords { x: Some(12), y: Some(34) });
        assert_eq!(Coords::parse("12,abc"), Coords { x: Some(12), y: None });
        assert_eq!(Coords::parse("nonsense"), Coords { x: None, y: None });
    }

    #[test]
    fn test_event_kind_accepts_both_separators() {
        assert_eq!(EventKind::classify("hf_died"), EventKind::HfDied);
        assert_eq!(EventKind::classify("hf died"), EventKind::HfDied);
        assert_eq!(EventKind::classify("artifact created"), EventKind::ArtifactCreated);
        assert_eq!(EventKind::classify("ADD_HF_ENTITY_LINK"), EventKind::AddHfEntityLink);
        assert_eq!(EventKind::classify("masterpiece item"), EventKind::Other);
    }

    #[test]
    fn test_normalize_event_type() {
        assert_eq!(normalize_event_type("change_hf_state"), "change hf state");
        assert_eq!(normalize_event_type("  hf   died "), "hf died");
    }

    #[test]
    fn test_counts_total() {
        let counts = RecordCounts {
            regions: 2,
            historical_events: 5,
            ..Default::default()
        };
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_counts_from_kinds() {
        let counts = RecordCounts::from_kinds(|kind| match kind {
            RecordKind::Site => 3,
            RecordKind::EventCollection => 1,
            _ => 0,
        });
        assert_eq!(counts.sites, 3);
        assert_eq!(counts.event_collections, 1);
        assert_eq!(counts.regions, 0);
        assert_eq!(counts.total(), 4);
    }
}
