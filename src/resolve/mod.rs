//! Resolution pass
//!
//! Runs once over the completed drafts. Steps, in order:
//!
//! 1. Deduplicate every collection by ID; the last occurrence wins.
//! 2. Index figures, sites, entities, artifacts, written contents and
//!    collections by ID.
//! 3. Copy written-content type and title onto the artifacts that carry them.
//! 4. Walk the event log once, in log order, deriving kills, provenance,
//!    membership and collection contents (see [`events`]).
//! 5. Link wars to their belligerents.
//! 6. Derive artifact status from sorted provenance.
//! 7. Derive figure ages from the latest event year.
//!
//! Dangling references are skipped silently at every step.

mod events;

use crate::ingest::ParsedDrafts;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Keep one record per ID. A repeated ID replaces the earlier record's value
/// but keeps the earlier record's position.
pub fn dedup_last_wins<T>(records: Vec<T>, id: impl Fn(&T) -> RecordId) -> Vec<T> {
    let mut slots: HashMap<RecordId, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<T> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&id(&record)) {
            Some(&slot) => out[slot] = record,
            None => {
                slots.insert(id(&record), out.len());
                out.push(record);
            }
        }
    }
    out
}

fn index_by_id<T>(records: &[T], id: impl Fn(&T) -> RecordId) -> HashMap<RecordId, usize> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| (id(record), idx))
        .collect()
}

/// Id lists the pass appends to with set semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum IdList {
    CollectionEvents,
    EntityMembers,
    EntitySites,
    EntityWars,
    FigureSites,
}

/// Mutable collections plus their ID indexes, owned for the length of the pass
pub(crate) struct World {
    figures: Vec<HistoricalFigure>,
    entities: Vec<Entity>,
    artifacts: Vec<Artifact>,
    collections: Vec<EventCollection>,
    figure_idx: HashMap<RecordId, usize>,
    entity_idx: HashMap<RecordId, usize>,
    artifact_idx: HashMap<RecordId, usize>,
    site_idx: HashMap<RecordId, usize>,
    collection_idx: HashMap<RecordId, usize>,
    /// Every (list, owner, id) entry already present in an id list
    linked: HashSet<(IdList, RecordId, RecordId)>,
}

impl World {
    /// Record the entries that parsing already put into id lists.
    fn seed_links(&mut self) {
        let mut linked = HashSet::new();
        for c in &self.collections {
            linked.extend(c.event_ids.iter().map(|&id| (IdList::CollectionEvents, c.id, id)));
        }
        for e in &self.entities {
            linked.extend(e.member_ids.iter().map(|&id| (IdList::EntityMembers, e.id, id)));
            linked.extend(e.site_ids.iter().map(|&id| (IdList::EntitySites, e.id, id)));
            linked.extend(e.war_ids.iter().map(|&id| (IdList::EntityWars, e.id, id)));
        }
        for f in &self.figures {
            linked.extend(f.site_ids.iter().map(|&id| (IdList::FigureSites, f.id, id)));
        }
        self.linked = linked;
    }

    fn id_list_mut(&mut self, list: IdList, owner: RecordId) -> Option<&mut Vec<RecordId>> {
        let owner = Some(owner);
        match list {
            IdList::CollectionEvents => self.collection_mut(owner).map(|c| &mut c.event_ids),
            IdList::EntityMembers => self.entity_mut(owner).map(|e| &mut e.member_ids),
            IdList::EntitySites => self.entity_mut(owner).map(|e| &mut e.site_ids),
            IdList::EntityWars => self.entity_mut(owner).map(|e| &mut e.war_ids),
            IdList::FigureSites => self.figure_mut(owner).map(|f| &mut f.site_ids),
        }
    }

    /// Append `id` to the owner's list unless it is already there. A missing
    /// owner is skipped.
    fn link(&mut self, list: IdList, owner: Option<RecordId>, id: RecordId) {
        let Some(owner) = owner else { return };
        if self.id_list_mut(list, owner).is_none() || !self.linked.insert((list, owner, id)) {
            return;
        }
        if let Some(ids) = self.id_list_mut(list, owner) {
            ids.push(id);
        }
    }

    fn figure(&self, id: Option<RecordId>) -> Option<&HistoricalFigure> {
        let idx = *self.figure_idx.get(&id?)?;
        self.figures.get(idx)
    }

    fn figure_mut(&mut self, id: Option<RecordId>) -> Option<&mut HistoricalFigure> {
        let idx = *self.figure_idx.get(&id?)?;
        self.figures.get_mut(idx)
    }

    fn entity_mut(&mut self, id: Option<RecordId>) -> Option<&mut Entity> {
        let idx = *self.entity_idx.get(&id?)?;
        self.entities.get_mut(idx)
    }

    fn artifact_mut(&mut self, id: Option<RecordId>) -> Option<&mut Artifact> {
        let idx = *self.artifact_idx.get(&id?)?;
        self.artifacts.get_mut(idx)
    }

    fn collection_mut(&mut self, id: Option<RecordId>) -> Option<&mut EventCollection> {
        let idx = *self.collection_idx.get(&id?)?;
        self.collections.get_mut(idx)
    }

    fn site_exists(&self, id: Option<RecordId>) -> bool {
        id.is_some_and(|id| self.site_idx.contains_key(&id))
    }

    fn link_wars(&mut self) {
        let wars: Vec<(RecordId, Option<RecordId>, Option<RecordId>)> = self
            .collections
            .iter()
            .filter(|c| c.collection_type.eq_ignore_ascii_case("war"))
            .map(|c| (c.id, c.aggressor_entity_id, c.defender_entity_id))
            .collect();

        for (war_id, aggressor, defender) in wars {
            for side in [aggressor, defender] {
                self.link(IdList::EntityWars, side, war_id);
            }
        }
    }
}

/// Current status of an artifact given provenance sorted by year.
///
/// Empty provenance leaves the default, `held`.
pub fn derive_status(
    provenance: &[ProvenanceEvent],
    holder_hfid: Option<RecordId>,
    site_id: Option<RecordId>,
) -> ArtifactStatus {
    let Some(last) = provenance.last() else {
        return ArtifactStatus::default();
    };

    if last.kind == ProvenanceKind::Destroyed {
        ArtifactStatus::Destroyed
    } else if holder_hfid.is_none() && site_id.is_none() {
        ArtifactStatus::Lost
    } else if site_id.is_some() && holder_hfid.is_none() {
        ArtifactStatus::Stored
    } else {
        ArtifactStatus::Held
    }
}

/// Age at death, or at `current_year` for the living.
///
/// Years too far apart to subtract leave the age unset.
pub fn derive_age(figure: &HistoricalFigure, current_year: Option<i32>) -> Option<i32> {
    let birth = figure.birth_year?;
    if !figure.is_alive {
        figure.death_year?.checked_sub(birth)
    } else {
        current_year?.checked_sub(birth)
    }
}

/// Turn parsed drafts into a fully cross-referenced dataset.
pub fn resolve(drafts: ParsedDrafts) -> LegendsDataset {
    let regions = dedup_last_wins(drafts.regions, |r| r.id);
    let underground_regions = dedup_last_wins(drafts.underground_regions, |r| r.id);
    let sites = dedup_last_wins(drafts.sites, |s| s.id);
    let figures = dedup_last_wins(drafts.historical_figures, |f| f.id);
    let entities = dedup_last_wins(drafts.entities, |e| e.id);
    let mut artifacts = dedup_last_wins(drafts.artifacts, |a| a.id);
    let written_contents = dedup_last_wins(drafts.written_contents, |w| w.id);
    let events = dedup_last_wins(drafts.historical_events, |e| e.id);
    let collections = dedup_last_wins(drafts.event_collections, |c| c.id);

    let written_idx = index_by_id(&written_contents, |w| w.id);
    for artifact in &mut artifacts {
        let Some(wc_id) = artifact.written_content_id else { continue };
        if let Some(&idx) = written_idx.get(&wc_id) {
            let content = &written_contents[idx];
            artifact.written_content_type = content.content_type.clone();
            artifact.written_content_title = Some(content.title.clone());
        }
    }

    let mut world = World {
        figure_idx: index_by_id(&figures, |f| f.id),
        entity_idx: index_by_id(&entities, |e| e.id),
        artifact_idx: index_by_id(&artifacts, |a| a.id),
        site_idx: index_by_id(&sites, |s| s.id),
        collection_idx: index_by_id(&collections, |c| c.id),
        figures,
        entities,
        artifacts,
        collections,
        linked: HashSet::new(),
    };
    world.seed_links();

    let mut current_year: Option<i32> = None;
    for event in &events {
        world.apply_event(event);
        if let Some(year) = event.year.filter(|y| *y > 0) {
            current_year = Some(current_year.map_or(year, |cur| cur.max(year)));
        }
    }
    world.link_wars();

    for artifact in &mut world.artifacts {
        if artifact.provenance.is_empty() {
            continue;
        }
        artifact
            .provenance
            .sort_by_key(|p| p.year.unwrap_or(i32::MIN));
        artifact.current_status =
            derive_status(&artifact.provenance, artifact.holder_hfid, artifact.site_id);
    }

    for figure in &mut world.figures {
        figure.age = derive_age(figure, current_year);
    }

    let World {
        figures,
        entities,
        artifacts,
        collections,
        ..
    } = world;

    let mut dataset = LegendsDataset {
        world_name: drafts.world_name,
        current_year,
        regions,
        underground_regions,
        sites,
        historical_figures: figures,
        entities,
        artifacts,
        written_contents,
        historical_events: events,
        event_collections: collections,
    };
    sort_by_id(&mut dataset);

    debug!(
        records = dataset.counts().total(),
        current_year = ?dataset.current_year,
        "Resolution pass complete"
    );
    dataset
}

fn sort_by_id(dataset: &mut LegendsDataset) {
    dataset.regions.sort_by_key(|r| r.id);
    dataset.underground_regions.sort_by_key(|r| r.id);
    dataset.sites.sort_by_key(|s| s.id);
    dataset.historical_figures.sort_by_key(|f| f.id);
    dataset.entities.sort_by_key(|e| e.id);
    dataset.artifacts.sort_by_key(|a| a.id);
    dataset.written_contents.sort_by_key(|w| w.id);
    dataset.historical_events.sort_by_key(|e| e.id);
    dataset.event_collections.sort_by_key(|c| c.id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance(kind: ProvenanceKind, year: i32) -> ProvenanceEvent {
        ProvenanceEvent {
            kind,
            event_id: 0,
            year: Some(year),
            hfid: None,
            site_id: None,
        }
    }

    #[test]
    fn test_dedup_keeps_last_value_in_first_slot() {
        let records = vec![(1, "a"), (2, "b"), (1, "c")];
        let deduped = dedup_last_wins(records, |r| r.0);
        assert_eq!(deduped, vec![(1, "c"), (2, "b")]);
    }

    #[test]
    fn test_status_destroyed_overrides_location() {
        let prov = [provenance(ProvenanceKind::Created, 1), provenance(ProvenanceKind::Destroyed, 5)];
        assert_eq!(derive_status(&prov, Some(1), Some(2)), ArtifactStatus::Destroyed);
    }

    #[test]
    fn test_status_from_location() {
        let prov = [provenance(ProvenanceKind::Created, 1)];
        assert_eq!(derive_status(&prov, None, None), ArtifactStatus::Lost);
        assert_eq!(derive_status(&prov, None, Some(3)), ArtifactStatus::Stored);
        assert_eq!(derive_status(&prov, Some(4), None), ArtifactStatus::Held);
        assert_eq!(derive_status(&prov, Some(4), Some(3)), ArtifactStatus::Held);
    }

    #[test]
    fn test_status_without_provenance_stays_held() {
        assert_eq!(derive_status(&[], None, None), ArtifactStatus::Held);
    }

    #[test]
    fn test_age_rules() {
        let mut parser = crate::ingest::LegendsParser::new();
        parser.feed(b"<historical_figure><id>1</id><birth_year>100</birth_year></historical_figure>");
        let mut figure = parser.finish().historical_figures.remove(0);

        assert_eq!(derive_age(&figure, Some(200)), Some(100));
        assert_eq!(derive_age(&figure, None), None);

        figure.is_alive = false;
        figure.death_year = Some(150);
        assert_eq!(derive_age(&figure, Some(200)), Some(50));

        figure.birth_year = None;
        assert_eq!(derive_age(&figure, Some(200)), None);
    }

    #[test]
    fn test_age_with_extreme_years_is_unset() {
        let doc = b"<historical_figures>\
            <historical_figure><id>1</id><birth_year>-2147483648</birth_year><death_year>100</death_year></historical_figure>\
            <historical_figure><id>2</id><birth_year>-2147483648</birth_year></historical_figure>\
            <historical_figure><id>3</id><birth_year>10</birth_year></historical_figure>\
            </historical_figures>\
            <historical_events><historical_event><id>0</id><year>2147483647</year><type>hf died</type></historical_event></historical_events>";
        let dataset = crate::parse_document(doc);

        assert_eq!(dataset.figure(1).and_then(|f| f.age), None);
        assert_eq!(dataset.figure(2).and_then(|f| f.age), None);
        assert_eq!(dataset.figure(3).and_then(|f| f.age), Some(2147483637));
    }

    #[test]
    fn test_large_collection_membership_keeps_order_without_duplicates() {
        const EVENTS: i32 = 40_000;
        let mut doc = String::from(
            "<historical_event_collections><historical_event_collection><id>0</id><type>war</type>",
        );
        for id in (0..EVENTS).rev() {
            doc.push_str(&format!("<event>{id}</event>"));
        }
        doc.push_str("</historical_event_collection></historical_event_collections><historical_events>");
        for id in 0..EVENTS {
            doc.push_str(&format!(
                "<historical_event><id>{id}</id><type>battle</type><collection_id>0</collection_id></historical_event>"
            ));
        }
        doc.push_str("<historical_event><id>40000</id><type>battle</type><collection_id>0</collection_id></historical_event>");
        doc.push_str("</historical_events>");

        let dataset = crate::parse_document(doc.as_bytes());
        let collection = &dataset.event_collections[0];

        assert_eq!(collection.event_ids.len(), EVENTS as usize + 1);
        assert_eq!(collection.event_ids[0], EVENTS - 1);
        assert_eq!(collection.event_ids[EVENTS as usize - 1], 0);
        assert_eq!(collection.event_ids[EVENTS as usize], EVENTS);
    }
}
