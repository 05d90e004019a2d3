//! Event log walk
//!
//! One handler per [`EventKind`] the pass acts on. Events are applied in log
//! order; chronology is never assumed.

use super::{IdList, World};
use crate::types::*;

impl World {
    pub(super) fn apply_event(&mut self, event: &HistoricalEvent) {
        match event.kind {
            EventKind::HfDied => self.record_death(event),
            EventKind::ArtifactCreated => self.record_creation(event),
            EventKind::ItemStolen => self.add_provenance(event, ProvenanceKind::Stolen),
            EventKind::ArtifactStored => self.add_provenance(event, ProvenanceKind::Stored),
            EventKind::ArtifactPossessed => self.add_provenance(event, ProvenanceKind::Possessed),
            EventKind::ArtifactLost => self.add_provenance(event, ProvenanceKind::Lost),
            EventKind::ArtifactDestroyed => self.add_provenance(event, ProvenanceKind::Destroyed),
            EventKind::ChangeHfState => self.change_state(event),
            EventKind::AddHfHfLink => self.add_hf_link(event),
            EventKind::AddHfEntityLink => self.add_entity_link(event),
            EventKind::SiteTakenOver => self.take_over_site(event),
            EventKind::CreatedSite => self.found_site(event),
            EventKind::Other => {}
        }

        self.link(IdList::CollectionEvents, event.collection_id, event.id);
    }

    fn record_death(&mut self, event: &HistoricalEvent) {
        let Some(slayer_id) = event.slayer_hfid else { return };
        let Some(victim) = self.figure(event.hfid) else { return };

        let kill = KillRecord {
            victim_id: victim.id,
            victim_name: victim.name.clone(),
            victim_race: victim.race.clone(),
            year: event.year,
            site_id: event.site_id.unwrap_or(-1),
            cause: event.cause.clone(),
        };
        let killer_name = self
            .figure(Some(slayer_id))
            .map(|slayer| slayer.name.clone())
            .unwrap_or_else(|| UNKNOWN_KILLER.to_string());

        if let Some(victim) = self.figure_mut(event.hfid) {
            victim.killer = Some(KillerInfo {
                hfid: slayer_id,
                name: killer_name,
                cause: event.cause.clone(),
                year: event.year,
            });
        }
        if let Some(slayer) = self.figure_mut(Some(slayer_id)) {
            slayer.kills.push(kill);
        }
    }

    fn record_creation(&mut self, event: &HistoricalEvent) {
        let Some(artifact) = self.artifact_mut(event.artifact_id) else { return };
        artifact.creation_year = event.year;
        if event.hfid.is_some() {
            artifact.creator_hfid = event.hfid;
        }
        artifact.provenance.push(provenance_entry(event, ProvenanceKind::Created));
    }

    fn add_provenance(&mut self, event: &HistoricalEvent, kind: ProvenanceKind) {
        if let Some(artifact) = self.artifact_mut(event.artifact_id) {
            artifact.provenance.push(provenance_entry(event, kind));
        }
    }

    fn change_state(&mut self, event: &HistoricalEvent) {
        let Some(state) = event.state.as_deref() else { return };
        let state = state.to_ascii_lowercase();
        let Some(figure) = self.figure_mut(event.hfid) else { return };

        match state.as_str() {
            "vampire" => {
                figure.is_vampire = true;
                figure.vampire_generation.get_or_insert(1);
            }
            "werecreature" => figure.is_werecreature = true,
            "necromancer" => figure.is_necromancer = true,
            "undead" => figure.is_undead = true,
            _ => {}
        }
    }

    fn add_hf_link(&mut self, event: &HistoricalEvent) {
        if self.figure(event.target_hfid).is_none() {
            return;
        }
        let Some(source) = self.figure_mut(event.hfid) else { return };
        source.hf_links.push(HfLink {
            link_type: event.link_type.clone().unwrap_or_default(),
            hfid: event.target_hfid,
            link_strength: None,
        });
    }

    fn add_entity_link(&mut self, event: &HistoricalEvent) {
        let Some(entity_id) = event.entity_id else { return };
        let Some(figure_id) = event.hfid else { return };
        let link_type = event
            .link_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let Some(figure) = self.figure_mut(Some(figure_id)) else { return };
        figure.entity_links.push(EntityLink {
            link_type: link_type.clone(),
            entity_id: Some(entity_id),
            link_strength: None,
            position_profile_id: event.position_id,
            start_year: event.year,
        });
        if link_type == "ruler" || link_type == "position" {
            figure.position_history.push(PositionTenure {
                entity_id: Some(entity_id),
                position_id: event.position_id,
                link_type: Some(link_type.clone()),
                start_year: event.year,
                end_year: None,
            });
        }

        if link_type == "member" {
            self.link(IdList::EntityMembers, Some(entity_id), figure_id);
        }
    }

    fn take_over_site(&mut self, event: &HistoricalEvent) {
        if !self.site_exists(event.site_id) {
            return;
        }
        let Some(site_id) = event.site_id else { return };
        let controller = event.attacker_civ_id.or(event.entity_id);
        self.link(IdList::EntitySites, controller, site_id);
    }

    fn found_site(&mut self, event: &HistoricalEvent) {
        if !self.site_exists(event.site_id) {
            return;
        }
        let Some(site_id) = event.site_id else { return };
        self.link(IdList::FigureSites, event.hfid, site_id);
        self.link(IdList::EntitySites, event.entity_id, site_id);
    }
}

fn provenance_entry(event: &HistoricalEvent, kind: ProvenanceKind) -> ProvenanceEvent {
    ProvenanceEvent {
        kind,
        event_id: event.id,
        year: event.year,
        hfid: event.hfid,
        site_id: event.site_id,
    }
}
