//! Draft builders, one per record kind
//!
//! A draft holds every field as optional while its element is open. Fields
//! are assigned as their closing tags are read; the draft is validated and
//! turned into a finished record only when the record's own closing tag
//! arrives. Drafts never leave this module.

use super::scope::Scope;
use crate::types::*;
use crate::util::{decode_text, parse_int, parse_ref, sanitize_skill, IdSet};

/// Text of a closed field
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a>(pub &'a [u8]);

impl<'a> FieldValue<'a> {
    pub fn string(&self) -> String {
        decode_text(self.0)
    }

    pub fn int(&self) -> Option<i32> {
        std::str::from_utf8(self.0).ok().and_then(parse_int)
    }

    /// Reference to another record; the `-1` sentinel becomes `None`
    pub fn id_ref(&self) -> Option<RecordId> {
        std::str::from_utf8(self.0).ok().and_then(parse_ref)
    }
}

/// Record IDs must be present and non-negative.
fn valid_id(id: Option<i32>) -> Option<RecordId> {
    id.filter(|v| *v >= 0)
}

/// A record under construction
pub trait Draft: Default + std::fmt::Debug {
    type Record: std::fmt::Debug;

    /// Assign a field closing directly inside the record element.
    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>);

    /// A nested item opened inside the record.
    fn open_nested(&mut self, _scope: Scope, _tag: &[u8]) {}

    /// Assign a field of the most recently opened nested item.
    fn set_nested_field(&mut self, _scope: Scope, _tag: &[u8], _value: FieldValue<'_>) {}

    /// Validate and convert; `None` drops the record.
    fn finish(self) -> Option<Self::Record>;
}

/// Operations the parser needs from a builder, independent of record type
pub trait RecordSink {
    fn open(&mut self);
    fn field(&mut self, tag: &[u8], value: FieldValue<'_>);
    fn open_nested(&mut self, scope: Scope, tag: &[u8]);
    fn nested_field(&mut self, scope: Scope, tag: &[u8], value: FieldValue<'_>);
    /// Finish the open draft; returns whether it produced a record.
    fn close(&mut self) -> bool;
    fn discard(&mut self);
    fn len(&self) -> usize;
    fn dropped(&self) -> usize;
}

/// Accumulates finished records of one kind in parse order
#[derive(Debug)]
pub struct DraftBuilder<D: Draft> {
    current: Option<D>,
    records: Vec<D::Record>,
    dropped: usize,
}

impl<D: Draft> Default for DraftBuilder<D> {
    fn default() -> Self {
        Self {
            current: None,
            records: Vec::new(),
            dropped: 0,
        }
    }
}

impl<D: Draft> DraftBuilder<D> {
    pub fn into_records(self) -> Vec<D::Record> {
        self.records
    }
}

impl<D: Draft> RecordSink for DraftBuilder<D> {
    fn open(&mut self) {
        self.current = Some(D::default());
    }

    fn field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        if let Some(draft) = self.current.as_mut() {
            draft.set_field(tag, value);
        }
    }

    fn open_nested(&mut self, scope: Scope, tag: &[u8]) {
        if let Some(draft) = self.current.as_mut() {
            draft.open_nested(scope, tag);
        }
    }

    fn nested_field(&mut self, scope: Scope, tag: &[u8], value: FieldValue<'_>) {
        if let Some(draft) = self.current.as_mut() {
            draft.set_nested_field(scope, tag, value);
        }
    }

    fn close(&mut self) -> bool {
        let Some(draft) = self.current.take() else {
            return false;
        };
        match draft.finish() {
            Some(record) => {
                self.records.push(record);
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    fn discard(&mut self) {
        self.current = None;
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn dropped(&self) -> usize {
        self.dropped
    }
}

// ============================================================================
// Regions
// ============================================================================

#[derive(Debug, Default)]
pub struct RegionDraft {
    id: Option<i32>,
    name: Option<String>,
    region_type: Option<String>,
    evilness: Option<String>,
}

impl Draft for RegionDraft {
    type Record = Region;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"name" => self.name = Some(value.string()),
            b"type" => self.region_type = Some(value.string()),
            b"evilness" => self.evilness = Some(value.string()),
            _ => {}
        }
    }

    fn finish(self) -> Option<Region> {
        Some(Region {
            id: valid_id(self.id)?,
            name: self.name.unwrap_or_default(),
            region_type: self.region_type.unwrap_or_default(),
            evilness: self.evilness,
        })
    }
}

#[derive(Debug, Default)]
pub struct UndergroundRegionDraft {
    id: Option<i32>,
    region_type: Option<String>,
    depth: Option<i32>,
}

impl Draft for UndergroundRegionDraft {
    type Record = UndergroundRegion;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"type" => self.region_type = Some(value.string()),
            b"depth" => self.depth = value.int(),
            _ => {}
        }
    }

    fn finish(self) -> Option<UndergroundRegion> {
        Some(UndergroundRegion {
            id: valid_id(self.id)?,
            region_type: self.region_type.unwrap_or_default(),
            depth: self.depth,
        })
    }
}

// ============================================================================
// Sites
// ============================================================================

#[derive(Debug, Default)]
pub struct SiteDraft {
    id: Option<i32>,
    site_type: Option<String>,
    name: Option<String>,
    coords: Coords,
    rectangle: Option<String>,
    civ_id: Option<RecordId>,
    owner_id: Option<RecordId>,
    structures: Vec<Structure>,
}

impl Draft for SiteDraft {
    type Record = Site;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"type" => self.site_type = Some(value.string()),
            b"name" => self.name = Some(value.string()),
            b"coords" => self.coords = Coords::parse(&value.string()),
            b"rectangle" => self.rectangle = Some(value.string()),
            b"civ_id" => self.civ_id = value.id_ref(),
            b"cur_owner_id" => self.owner_id = value.id_ref(),
            _ => {}
        }
    }

    fn open_nested(&mut self, scope: Scope, _tag: &[u8]) {
        if scope == Scope::Structure {
            self.structures.push(Structure::default());
        }
    }

    fn set_nested_field(&mut self, scope: Scope, tag: &[u8], value: FieldValue<'_>) {
        if scope != Scope::Structure {
            return;
        }
        let Some(structure) = self.structures.last_mut() else {
            return;
        };
        match tag {
            b"local_id" | b"id" => structure.local_id = value.int(),
            b"type" => structure.structure_type = value.string(),
            b"subtype" => structure.subtype = Some(value.string()),
            b"name" => structure.name = Some(value.string()),
            b"entity_id" => structure.entity_id = value.id_ref(),
            b"copied_artifact_id" => structure.copied_artifact_id = value.id_ref(),
            _ => {}
        }
    }

    fn finish(self) -> Option<Site> {
        Some(Site {
            id: valid_id(self.id)?,
            site_type: self.site_type.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            coords: self.coords,
            rectangle: self.rectangle,
            civ_id: self.civ_id,
            owner_id: self.owner_id,
            structures: self.structures,
        })
    }
}

// ============================================================================
// Historical figures
// ============================================================================

#[derive(Debug)]
pub struct HistoricalFigureDraft {
    id: Option<i32>,
    name: Option<String>,
    race: Option<String>,
    caste: Option<String>,
    associated_type: Option<String>,
    appeared: Option<i32>,
    birth_year: Option<i32>,
    birth_seconds72: Option<i32>,
    death_year: Option<i32>,
    death_seconds72: Option<i32>,
    is_alive: bool,
    holds_artifact: Option<RecordId>,
    spheres: Vec<String>,
    entity_links: Vec<EntityLink>,
    hf_links: Vec<HfLink>,
    hf_skills: Vec<HfSkill>,
    site_links: Vec<SiteLink>,
    position_history: Vec<PositionTenure>,
    site_ids: IdSet,
    artifact_ids: IdSet,
    is_deity: bool,
    is_force: bool,
    is_vampire: bool,
    is_werecreature: bool,
}

impl Default for HistoricalFigureDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            race: None,
            caste: None,
            associated_type: None,
            appeared: None,
            birth_year: None,
            birth_seconds72: None,
            death_year: None,
            death_seconds72: None,
            is_alive: true,
            holds_artifact: None,
            spheres: Vec::new(),
            entity_links: Vec::new(),
            hf_links: Vec::new(),
            hf_skills: Vec::new(),
            site_links: Vec::new(),
            position_history: Vec::new(),
            site_ids: IdSet::new(),
            artifact_ids: IdSet::new(),
            is_deity: false,
            is_force: false,
            is_vampire: false,
            is_werecreature: false,
        }
    }
}

/// `death_year` value the exporter writes for figures still alive
const STILL_ALIVE_YEAR: i32 = -1;

impl Draft for HistoricalFigureDraft {
    type Record = HistoricalFigure;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"name" => self.name = Some(value.string()),
            b"race" => self.race = Some(value.string()),
            b"caste" => self.caste = Some(value.string()),
            b"associated_type" => self.associated_type = Some(value.string()),
            b"appeared" => self.appeared = value.int(),
            b"birth_year" => self.birth_year = value.int(),
            b"birth_seconds72" => self.birth_seconds72 = value.int(),
            b"death_year" => {
                let year = value.int();
                if year.is_some() && year != Some(STILL_ALIVE_YEAR) {
                    self.death_year = year;
                    self.is_alive = false;
                }
            }
            b"death_seconds72" => self.death_seconds72 = value.int(),
            b"holds_artifact" => {
                if let Some(artifact_id) = value.id_ref() {
                    self.holds_artifact.get_or_insert(artifact_id);
                    self.artifact_ids.insert(artifact_id);
                }
            }
            b"sphere" => self.spheres.push(value.string()),
            b"deity" => self.is_deity = true,
            b"force" => self.is_force = true,
            b"active_interaction" => {
                let interaction = value.string();
                if interaction.contains("VAMPIRE") {
                    self.is_vampire = true;
                }
                if interaction.contains("WEREBEAST") {
                    self.is_werecreature = true;
                }
            }
            _ => {}
        }
    }

    fn open_nested(&mut self, scope: Scope, tag: &[u8]) {
        match scope {
            Scope::EntityLink => self.entity_links.push(EntityLink::default()),
            Scope::HfLink => self.hf_links.push(HfLink::default()),
            Scope::HfSkill => self.hf_skills.push(HfSkill::default()),
            Scope::SiteLink => self.site_links.push(SiteLink::default()),
            Scope::PositionLink => {
                let link_type = if tag == b"entity_former_position_link" {
                    "former position"
                } else {
                    "position"
                };
                self.position_history.push(PositionTenure {
                    link_type: Some(link_type.to_string()),
                    ..Default::default()
                });
            }
            _ => {}
        }
    }

    fn set_nested_field(&mut self, scope: Scope, tag: &[u8], value: FieldValue<'_>) {
        match scope {
            Scope::EntityLink => {
                let Some(link) = self.entity_links.last_mut() else { return };
                match tag {
                    b"link_type" => link.link_type = value.string(),
                    b"entity_id" => link.entity_id = value.id_ref(),
                    b"link_strength" => link.link_strength = value.int(),
                    b"position_profile_id" => link.position_profile_id = value.int(),
                    b"start_year" => link.start_year = value.int(),
                    _ => {}
                }
            }
            Scope::HfLink => {
                let Some(link) = self.hf_links.last_mut() else { return };
                match tag {
                    b"link_type" => link.link_type = value.string(),
                    b"hfid" => link.hfid = value.id_ref(),
                    b"link_strength" => link.link_strength = value.int(),
                    _ => {}
                }
            }
            Scope::HfSkill => {
                let Some(skill) = self.hf_skills.last_mut() else { return };
                match tag {
                    b"skill" => skill.skill = sanitize_skill(&value.string()),
                    b"total_ip" => skill.total_ip = value.int(),
                    _ => {}
                }
            }
            Scope::SiteLink => {
                let Some(link) = self.site_links.last_mut() else { return };
                match tag {
                    b"link_type" => link.link_type = value.string(),
                    b"site_id" => {
                        link.site_id = value.id_ref();
                        if let Some(site_id) = link.site_id {
                            self.site_ids.insert(site_id);
                        }
                    }
                    b"entity_id" => link.entity_id = value.id_ref(),
                    _ => {}
                }
            }
            Scope::PositionLink => {
                let Some(tenure) = self.position_history.last_mut() else { return };
                match tag {
                    b"position_profile_id" | b"position_id" => tenure.position_id = value.int(),
                    b"entity_id" => tenure.entity_id = value.id_ref(),
                    b"start_year" => tenure.start_year = value.int(),
                    b"end_year" => tenure.end_year = value.int(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<HistoricalFigure> {
        Some(HistoricalFigure {
            id: valid_id(self.id)?,
            name: self.name.unwrap_or_default(),
            race: self.race.unwrap_or_default(),
            caste: self.caste.unwrap_or_default(),
            associated_type: self.associated_type,
            appeared: self.appeared,
            birth_year: self.birth_year,
            birth_seconds72: self.birth_seconds72,
            death_year: self.death_year,
            death_seconds72: self.death_seconds72,
            is_alive: self.is_alive,
            holds_artifact: self.holds_artifact,
            spheres: self.spheres,
            entity_links: self.entity_links,
            hf_links: self.hf_links,
            hf_skills: self.hf_skills,
            site_links: self.site_links,
            is_deity: self.is_deity,
            is_force: self.is_force,
            is_vampire: self.is_vampire,
            vampire_generation: None,
            is_werecreature: self.is_werecreature,
            is_necromancer: false,
            is_undead: false,
            position_history: self.position_history,
            site_ids: self.site_ids.into_vec(),
            artifact_ids: self.artifact_ids.into_vec(),
            kills: Vec::new(),
            killer: None,
            age: None,
        })
    }
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Default)]
pub struct EntityDraft {
    id: Option<i32>,
    name: Option<String>,
    race: Option<String>,
    entity_type: Option<String>,
}

impl Draft for EntityDraft {
    type Record = Entity;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"name" => self.name = Some(value.string()),
            b"race" => self.race = Some(value.string()),
            b"type" => self.entity_type = Some(value.string()),
            _ => {}
        }
    }

    fn finish(self) -> Option<Entity> {
        Some(Entity {
            id: valid_id(self.id)?,
            name: self.name,
            race: self.race,
            entity_type: self.entity_type,
            site_ids: Vec::new(),
            member_ids: Vec::new(),
            war_ids: Vec::new(),
        })
    }
}

// ============================================================================
// Artifacts and written content
// ============================================================================

#[derive(Debug, Default)]
pub struct ArtifactDraft {
    id: Option<i32>,
    name: Option<String>,
    item_type: Option<String>,
    item_subtype: Option<String>,
    material: Option<String>,
    creator_hfid: Option<RecordId>,
    holder_hfid: Option<RecordId>,
    site_id: Option<RecordId>,
    subregion_id: Option<RecordId>,
    written_content_id: Option<RecordId>,
}

impl Draft for ArtifactDraft {
    type Record = Artifact;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"name" => self.name = Some(value.string()),
            b"item_type" => self.item_type = Some(value.string()),
            b"item_subtype" => self.item_subtype = Some(value.string()),
            b"mat" | b"material" => self.material = Some(value.string()),
            b"creator_hfid" => self.creator_hfid = value.id_ref(),
            b"holder_hfid" => self.holder_hfid = value.id_ref(),
            b"site_id" => self.site_id = value.id_ref(),
            b"subregion_id" => self.subregion_id = value.id_ref(),
            b"writing" | b"writing_written_content_id" | b"page_written_content_id" => {
                self.written_content_id = value.id_ref()
            }
            _ => {}
        }
    }

    fn set_nested_field(&mut self, scope: Scope, tag: &[u8], value: FieldValue<'_>) {
        if scope != Scope::ArtifactItem {
            return;
        }
        match tag {
            b"name_string" => {
                self.name.get_or_insert_with(|| value.string());
            }
            b"writing_written_content_id" | b"page_written_content_id" => {
                self.written_content_id = value.id_ref()
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<Artifact> {
        Some(Artifact {
            id: valid_id(self.id)?,
            name: self.name,
            item_type: self.item_type,
            item_subtype: self.item_subtype,
            material: self.material,
            creator_hfid: self.creator_hfid,
            creation_year: None,
            holder_hfid: self.holder_hfid,
            site_id: self.site_id,
            subregion_id: self.subregion_id,
            written_content_id: self.written_content_id,
            written_content_type: None,
            written_content_title: None,
            provenance: Vec::new(),
            current_status: ArtifactStatus::default(),
        })
    }
}

#[derive(Debug, Default)]
pub struct WrittenContentDraft {
    id: Option<i32>,
    title: Option<String>,
    content_type: Option<String>,
    author_hfid: Option<RecordId>,
    form: Option<String>,
    styles: Vec<String>,
    page_start: Option<i32>,
    page_end: Option<i32>,
}

impl Draft for WrittenContentDraft {
    type Record = WrittenContent;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"title" => self.title = Some(value.string()),
            b"type" => self.content_type = Some(value.string()),
            b"author_hfid" | b"author" => self.author_hfid = value.id_ref(),
            b"form" => self.form = Some(value.string()),
            b"style" => self.styles.push(value.string()),
            b"page_start" => self.page_start = value.int(),
            b"page_end" => self.page_end = value.int(),
            _ => {}
        }
    }

    fn finish(self) -> Option<WrittenContent> {
        Some(WrittenContent {
            id: valid_id(self.id)?,
            title: self.title.unwrap_or_default(),
            content_type: self.content_type,
            author_hfid: self.author_hfid,
            form: self.form,
            styles: self.styles,
            page_start: self.page_start,
            page_end: self.page_end,
        })
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Default)]
pub struct HistoricalEventDraft {
    id: Option<i32>,
    year: Option<i32>,
    seconds72: Option<i32>,
    event_type: Option<String>,
    hfid: Option<RecordId>,
    target_hfid: Option<RecordId>,
    slayer_hfid: Option<RecordId>,
    site_id: Option<RecordId>,
    subregion_id: Option<RecordId>,
    entity_id: Option<RecordId>,
    attacker_civ_id: Option<RecordId>,
    defender_civ_id: Option<RecordId>,
    artifact_id: Option<RecordId>,
    collection_id: Option<RecordId>,
    position_id: Option<i32>,
    cause: Option<String>,
    link_type: Option<String>,
    state: Option<String>,
    extra: std::collections::BTreeMap<String, String>,
}

impl Draft for HistoricalEventDraft {
    type Record = HistoricalEvent;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        // Aliases differ between the base and the extended export; the first
        // alias seen fills the slot.
        match tag {
            b"id" => self.id = value.int(),
            b"year" => self.year = value.int(),
            b"seconds72" => self.seconds72 = value.int(),
            b"type" => self.event_type = Some(value.string()),
            b"hfid" | b"histfig" | b"hist_fig_id" | b"hist_figure_id" | b"builder_hfid" => {
                self.hfid = self.hfid.or(value.id_ref())
            }
            b"hfid_target" | b"target_hfid" => self.target_hfid = self.target_hfid.or(value.id_ref()),
            b"slayer_hfid" | b"slayer_hf" => self.slayer_hfid = self.slayer_hfid.or(value.id_ref()),
            b"site_id" | b"site" => self.site_id = self.site_id.or(value.id_ref()),
            b"subregion_id" => self.subregion_id = value.id_ref(),
            b"entity_id" | b"civ_id" | b"civ" | b"entity" => {
                self.entity_id = self.entity_id.or(value.id_ref())
            }
            b"attacker_civ_id" => self.attacker_civ_id = value.id_ref(),
            b"defender_civ_id" => self.defender_civ_id = value.id_ref(),
            b"artifact_id" => self.artifact_id = value.id_ref(),
            b"collection_id" | b"collection" | b"eventcol" => {
                self.collection_id = self.collection_id.or(value.id_ref())
            }
            b"position_id" | b"position" => self.position_id = value.int(),
            b"cause" | b"death_cause" => self.cause = Some(value.string()),
            b"link_type" | b"link" => self.link_type = Some(value.string()),
            b"state" => self.state = Some(value.string()),
            other => {
                let key = String::from_utf8_lossy(other).into_owned();
                self.extra.insert(key, value.string());
            }
        }
    }

    fn finish(self) -> Option<HistoricalEvent> {
        let raw_type = self.event_type.unwrap_or_default();
        Some(HistoricalEvent {
            id: valid_id(self.id)?,
            year: self.year,
            seconds72: self.seconds72,
            kind: EventKind::classify(&raw_type),
            event_type: normalize_event_type(&raw_type),
            hfid: self.hfid,
            target_hfid: self.target_hfid,
            slayer_hfid: self.slayer_hfid,
            site_id: self.site_id,
            subregion_id: self.subregion_id,
            entity_id: self.entity_id,
            attacker_civ_id: self.attacker_civ_id,
            defender_civ_id: self.defender_civ_id,
            artifact_id: self.artifact_id,
            collection_id: self.collection_id,
            position_id: self.position_id,
            cause: self.cause,
            link_type: self.link_type,
            state: self.state,
            extra: self.extra,
        })
    }
}

#[derive(Debug, Default)]
pub struct EventCollectionDraft {
    id: Option<i32>,
    collection_type: Option<String>,
    name: Option<String>,
    start_year: Option<i32>,
    start_seconds72: Option<i32>,
    end_year: Option<i32>,
    end_seconds72: Option<i32>,
    site_id: Option<RecordId>,
    aggressor_entity_id: Option<RecordId>,
    defender_entity_id: Option<RecordId>,
    event_ids: IdSet,
    child_collection_ids: IdSet,
}

impl Draft for EventCollectionDraft {
    type Record = EventCollection;

    fn set_field(&mut self, tag: &[u8], value: FieldValue<'_>) {
        match tag {
            b"id" => self.id = value.int(),
            b"type" => self.collection_type = Some(value.string()),
            b"name" => self.name = Some(value.string()),
            b"start_year" => self.start_year = value.int(),
            b"start_seconds72" => self.start_seconds72 = value.int(),
            b"end_year" => self.end_year = value.int(),
            b"end_seconds72" => self.end_seconds72 = value.int(),
            b"site_id" => self.site_id = value.id_ref(),
            b"aggressor_ent_id" | b"attacking_enid" | b"aggressor_entity_id" => {
                self.aggressor_entity_id = value.id_ref()
            }
            b"defender_ent_id" | b"defending_enid" | b"defender_entity_id" => {
                self.defender_entity_id = value.id_ref()
            }
            b"event" => {
                if let Some(event_id) = value.id_ref() {
                    self.event_ids.insert(event_id);
                }
            }
            b"eventcol" => {
                if let Some(child_id) = value.id_ref() {
                    self.child_collection_ids.insert(child_id);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<EventCollection> {
        Some(EventCollection {
            id: valid_id(self.id)?,
            collection_type: self.collection_type.unwrap_or_default(),
            name: self.name,
            start_year: self.start_year,
            start_seconds72: self.start_seconds72,
            end_year: self.end_year,
            end_seconds72: self.end_seconds72,
            site_id: self.site_id,
            aggressor_entity_id: self.aggressor_entity_id,
            defender_entity_id: self.defender_entity_id,
            event_ids: self.event_ids.into_vec(),
            child_collection_ids: self.child_collection_ids.into_vec(),
        })
    }
}
