//! Adjacency graph for the standard map.
//!
//! The border table lists every undirected border once. At first access it is
//! expanded into a per-province step list (`MapGraph`) that is shared by every
//! game in the process.
//!
//! Split-coast provinces (bul, spa, stp) carry their coast on fleet borders
//! only; army borders never name a coast.

use std::collections::VecDeque;
use std::sync::LazyLock;

use super::order::Location;
use super::province::{Coast, Province, PROVINCE_COUNT};
use super::unit::UnitType;

/// A single undirected border between two provinces.
#[derive(Debug, Clone, Copy)]
pub struct Border {
    pub a: Province,
    /// Coast of `a` a fleet uses for this border, for split-coast provinces.
    pub a_coast: Option<Coast>,
    pub b: Province,
    pub army: bool,
    pub fleet: bool,
}

const fn land(a: Province, b: Province) -> Border {
    Border { a, a_coast: None, b, army: true, fleet: false }
}

const fn shore(a: Province, b: Province) -> Border {
    Border { a, a_coast: None, b, army: true, fleet: true }
}

const fn sea(a: Province, b: Province) -> Border {
    Border { a, a_coast: None, b, army: false, fleet: true }
}

const fn split(a: Province, coast: Coast, b: Province) -> Border {
    Border { a, a_coast: Some(coast), b, army: false, fleet: true }
}

const NC: Coast = Coast::North;
const SC: Coast = Coast::South;
const EC: Coast = Coast::East;

use Province::*;

/// Number of undirected borders on the standard map.
pub const BORDER_COUNT: usize = 217;

/// Every border of the standard map, grouped by the alphabetically first province.
pub static BORDERS: [Border; BORDER_COUNT] = [
    sea(Adr, Alb), sea(Adr, Apu), sea(Adr, Ion), sea(Adr, Tri), sea(Adr, Ven),
    split(Bul, SC, Aeg), sea(Aeg, Con), sea(Aeg, Eas), sea(Aeg, Gre), sea(Aeg, Ion), sea(Aeg, Smy),
    shore(Alb, Gre), sea(Alb, Ion), land(Alb, Ser), shore(Alb, Tri),
    shore(Ank, Arm), sea(Ank, Bla), shore(Ank, Con), land(Ank, Smy),
    sea(Apu, Ion), shore(Apu, Nap), land(Apu, Rom), shore(Apu, Ven),
    sea(Arm, Bla), shore(Arm, Sev), land(Arm, Smy), land(Arm, Syr),
    sea(Bal, Ber), sea(Bal, Bot), sea(Bal, Den), sea(Bal, Kie), sea(Bal, Lvn), sea(Bal, Pru),
    sea(Bal, Swe),
    sea(Bar, Nrg), sea(Bar, Nwy), split(Stp, NC, Bar),
    land(Bel, Bur), sea(Bel, Eng), shore(Bel, Hol), sea(Bel, Nth), shore(Bel, Pic), land(Bel, Ruh),
    shore(Ber, Kie), land(Ber, Mun), shore(Ber, Pru), land(Ber, Sil),
    split(Bul, EC, Bla), sea(Bla, Con), sea(Bla, Rum), sea(Bla, Sev),
    land(Boh, Gal), land(Boh, Mun), land(Boh, Sil), land(Boh, Tyr), land(Boh, Vie),
    sea(Bot, Fin), sea(Bot, Lvn), split(Stp, SC, Bot), sea(Bot, Swe),
    sea(Bre, Eng), shore(Bre, Gas), sea(Bre, Mao), land(Bre, Par), shore(Bre, Pic),
    land(Bud, Gal), land(Bud, Rum), land(Bud, Ser), land(Bud, Tri), land(Bud, Vie),
    land(Bul, Con), split(Bul, EC, Con), split(Bul, SC, Con), land(Bul, Gre), split(Bul, SC, Gre),
    land(Bul, Rum), split(Bul, EC, Rum), land(Bul, Ser),
    land(Bur, Gas), land(Bur, Mar), land(Bur, Mun), land(Bur, Par), land(Bur, Pic), land(Bur, Ruh),
    shore(Cly, Edi), shore(Cly, Lvp), sea(Cly, Nao), sea(Cly, Nrg),
    shore(Con, Smy),
    sea(Den, Hel), shore(Den, Kie), sea(Den, Nth), sea(Den, Ska), shore(Den, Swe),
    sea(Eas, Ion), sea(Eas, Smy), sea(Eas, Syr),
    land(Edi, Lvp), sea(Edi, Nrg), sea(Edi, Nth), shore(Edi, Yor),
    sea(Eng, Iri), sea(Eng, Lon), sea(Eng, Mao), sea(Eng, Nth), sea(Eng, Pic), sea(Eng, Wal),
    land(Fin, Nwy), land(Fin, Stp), split(Stp, SC, Fin), shore(Fin, Swe),
    land(Gal, Rum), land(Gal, Sil), land(Gal, Ukr), land(Gal, Vie), land(Gal, War),
    sea(Gas, Mao), land(Gas, Mar), land(Gas, Par), land(Gas, Spa), split(Spa, NC, Gas),
    sea(Gol, Mar), sea(Gol, Pie), split(Spa, SC, Gol), sea(Gol, Tus), sea(Gol, Tys), sea(Gol, Wes),
    sea(Gre, Ion), land(Gre, Ser),
    sea(Hel, Hol), sea(Hel, Kie), sea(Hel, Nth),
    sea(Hol, Nth), land(Hol, Ruh),
    sea(Ion, Nap), sea(Ion, Tun), sea(Ion, Tys),
    sea(Iri, Lvp), sea(Iri, Mao), sea(Iri, Nao), sea(Iri, Wal),
    land(Kie, Mun), land(Kie, Ruh),
    sea(Lon, Nth), shore(Lon, Wal), shore(Lon, Yor),
    land(Lvn, Mos), shore(Lvn, Pru), land(Lvn, Stp), split(Stp, SC, Lvn), land(Lvn, War),
    sea(Lvp, Nao), shore(Lvp, Wal), land(Lvp, Yor),
    sea(Mao, Naf), sea(Mao, Nao), sea(Mao, Por), split(Spa, NC, Mao), split(Spa, SC, Mao), sea(Mao, Wes),
    shore(Mar, Pie), land(Mar, Spa), split(Spa, SC, Mar),
    land(Mos, Sev), land(Mos, Stp), land(Mos, Ukr), land(Mos, War),
    land(Mun, Ruh), land(Mun, Sil), land(Mun, Tyr),
    shore(Naf, Tun), sea(Naf, Wes),
    sea(Nao, Nrg),
    shore(Nap, Rom), sea(Nap, Tys),
    sea(Nrg, Nth), sea(Nrg, Nwy),
    sea(Nth, Nwy), sea(Nth, Ska), sea(Nth, Yor),
    sea(Nwy, Ska), land(Nwy, Stp), split(Stp, NC, Nwy), shore(Nwy, Swe),
    land(Par, Pic),
    shore(Pie, Tus), land(Pie, Tyr), land(Pie, Ven),
    land(Por, Spa), split(Spa, NC, Por), split(Spa, SC, Por),
    land(Pru, Sil), land(Pru, War),
    shore(Rom, Tus), sea(Rom, Tys), land(Rom, Ven),
    land(Rum, Ser), shore(Rum, Sev), land(Rum, Ukr),
    land(Ser, Tri),
    land(Sev, Ukr),
    land(Sil, War),
    sea(Ska, Swe),
    shore(Smy, Syr),
    split(Spa, SC, Wes),
    land(Tri, Tyr), shore(Tri, Ven), land(Tri, Vie),
    sea(Tun, Tys), sea(Tun, Wes),
    sea(Tus, Tys), land(Tus, Ven),
    land(Tyr, Ven), land(Tyr, Vie),
    sea(Tys, Wes),
    land(Ukr, War),
    land(Wal, Yor),
];

/// One directed step out of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Coast the step leaves from, set only for fleet steps out of a split-coast province.
    pub from_coast: Option<Coast>,
    pub to: Location,
    pub army: bool,
    pub fleet: bool,
}

impl Step {
    fn allows(&self, unit_type: UnitType) -> bool {
        match unit_type {
            UnitType::Army => self.army,
            UnitType::Fleet => self.fleet,
        }
    }

    /// Whether a unit standing at `coast` may take this step.
    fn leaves_from(&self, coast: Option<Coast>) -> bool {
        match (coast, self.from_coast) {
            (Some(have), Some(need)) => have == need,
            _ => true,
        }
    }
}

/// The expanded, read-only map graph.
pub struct MapGraph {
    steps: Vec<Vec<Step>>,
}

static MAP: LazyLock<MapGraph> = LazyLock::new(MapGraph::build);

/// Returns the process-wide map graph.
#[inline]
pub fn map() -> &'static MapGraph {
    &MAP
}

impl MapGraph {
    fn build() -> MapGraph {
        let mut steps: Vec<Vec<Step>> = vec![Vec::new(); PROVINCE_COUNT];
        for border in BORDERS.iter() {
            steps[border.a as usize].push(Step {
                from_coast: border.a_coast,
                to: Location::new(border.b),
                army: border.army,
                fleet: border.fleet,
            });
            steps[border.b as usize].push(Step {
                from_coast: None,
                to: Location { province: border.a, coast: border.a_coast },
                army: border.army,
                fleet: border.fleet,
            });
        }
        MapGraph { steps }
    }

    /// All steps leaving a province, for either unit type.
    #[inline]
    pub fn steps(&self, from: Province) -> &[Step] {
        &self.steps[from as usize]
    }

    /// Every location a unit of the given type can reach in one move.
    pub fn reachable(&self, unit_type: UnitType, from: Location) -> Vec<Location> {
        let mut out: Vec<Location> = Vec::new();
        for step in self.steps(from.province) {
            if !step.allows(unit_type) || !step.leaves_from(from.coast) {
                continue;
            }
            let to = match unit_type {
                UnitType::Army => Location::new(step.to.province),
                UnitType::Fleet => step.to,
            };
            if !out.contains(&to) {
                out.push(to);
            }
        }
        out
    }

    /// Whether a unit can move from `from` to `to` in one step.
    ///
    /// Armies ignore coasts. A fleet must name the exact coast it arrives on
    /// when the destination is a split-coast province.
    pub fn can_move(&self, unit_type: UnitType, from: Location, to: Location) -> bool {
        self.steps(from.province).iter().any(|step| {
            step.allows(unit_type)
                && step.to.province == to.province
                && match unit_type {
                    UnitType::Army => true,
                    UnitType::Fleet => step.leaves_from(from.coast) && step.to.coast == to.coast,
                }
        })
    }

    /// Whether a unit could move into any part of `to`. Used for support reach.
    pub fn can_reach_province(&self, unit_type: UnitType, from: Location, to: Province) -> bool {
        self.steps(from.province).iter().any(|step| {
            step.allows(unit_type) && step.to.province == to && (unit_type == UnitType::Army || step.leaves_from(from.coast))
        })
    }

    /// Coasts of `to` a fleet at `from` can arrive on.
    pub fn fleet_coasts_toward(&self, from: Location, to: Province) -> Vec<Coast> {
        let mut coasts = Vec::new();
        for step in self.steps(from.province) {
            if step.fleet && step.to.province == to && step.leaves_from(from.coast) {
                if let Some(coast) = step.to.coast {
                    if !coasts.contains(&coast) {
                        coasts.push(coast);
                    }
                }
            }
        }
        coasts
    }

    /// Distinct provinces bordering `from`, regardless of unit type or coast.
    pub fn neighbors(&self, from: Province) -> Vec<Province> {
        let mut out = Vec::new();
        for step in self.steps(from) {
            if !out.contains(&step.to.province) {
                out.push(step.to.province);
            }
        }
        out
    }

    /// Whether a chain of convoying sea provinces connects two coastal provinces.
    ///
    /// `convoying` decides which seas take part; the chain must use at least one.
    pub fn convoy_route_exists(
        &self,
        from: Province,
        to: Province,
        mut convoying: impl FnMut(Province) -> bool,
    ) -> bool {
        if from == to || from.is_sea() || to.is_sea() {
            return false;
        }
        let mut seen = [false; PROVINCE_COUNT];
        let mut queue = VecDeque::new();
        for step in self.steps(from) {
            let sea = step.to.province;
            if step.fleet && sea.is_sea() && !seen[sea as usize] && convoying(sea) {
                seen[sea as usize] = true;
                queue.push_back(sea);
            }
        }
        while let Some(sea) = queue.pop_front() {
            for step in self.steps(sea) {
                if !step.fleet {
                    continue;
                }
                let next = step.to.province;
                if next == to {
                    return true;
                }
                if next.is_sea() && !seen[next as usize] && convoying(next) {
                    seen[next as usize] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Number of steps from `from` to the nearest province matching `target`,
    /// moving freely across land and sea.
    pub fn distance_to(&self, from: Province, target: impl Fn(Province) -> bool) -> Option<u32> {
        let mut dist = [u32::MAX; PROVINCE_COUNT];
        let mut queue = VecDeque::new();
        dist[from as usize] = 0;
        queue.push_back(from);
        while let Some(p) = queue.pop_front() {
            if target(p) {
                return Some(dist[p as usize]);
            }
            for next in self.neighbors(p) {
                if dist[next as usize] == u32::MAX {
                    dist[next as usize] = dist[p as usize] + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::{ProvinceType, ALL_PROVINCES};
    use std::collections::HashSet;

    fn loc(p: Province) -> Location {
        Location::new(p)
    }

    fn coast(p: Province, c: Coast) -> Location {
        Location::with_coast(p, c)
    }

    fn provinces(locs: Vec<Location>) -> HashSet<Province> {
        locs.into_iter().map(|l| l.province).collect()
    }

    #[test]
    fn no_self_or_duplicate_borders() {
        let mut seen = HashSet::new();
        for b in BORDERS.iter() {
            assert_ne!(b.a, b.b, "self border at {:?}", b.a);
            assert!(b.army || b.fleet);
            assert!(seen.insert((b.a, b.a_coast, b.b, b.army, b.fleet)), "duplicate {:?}", b);
        }
    }

    #[test]
    fn borders_respect_terrain() {
        for b in BORDERS.iter() {
            if b.army {
                assert!(!b.a.is_sea() && !b.b.is_sea(), "army border touches sea: {:?}", b);
            }
            if b.fleet {
                assert!(!b.a.is_land() && !b.b.is_land(), "fleet border touches inland: {:?}", b);
            }
            if b.a_coast.is_some() {
                assert!(b.a.has_coasts());
            }
        }
    }

    #[test]
    fn graph_is_symmetric() {
        let m = map();
        for p in ALL_PROVINCES {
            for step in m.steps(p) {
                assert!(
                    m.steps(step.to.province).iter().any(|back| back.to.province == p
                        && back.army == step.army
                        && back.fleet == step.fleet),
                    "missing reverse of {:?} -> {:?}",
                    p,
                    step.to
                );
            }
        }
    }

    #[test]
    fn every_province_is_connected() {
        let m = map();
        for p in ALL_PROVINCES {
            assert!(!m.neighbors(p).is_empty(), "{:?} is isolated", p);
            if p.province_type() == ProvinceType::Sea {
                assert!(m.reachable(UnitType::Army, loc(p)).is_empty());
            }
        }
    }

    #[test]
    fn vienna_army_neighbors() {
        let got = provinces(map().reachable(UnitType::Army, loc(Province::Vie)));
        let expected: HashSet<Province> =
            [Province::Boh, Province::Bud, Province::Gal, Province::Tyr, Province::Tri].into_iter().collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn smyrna_ankara_army_only() {
        let m = map();
        assert!(m.can_move(UnitType::Army, loc(Province::Smy), loc(Province::Ank)));
        assert!(!m.can_move(UnitType::Fleet, loc(Province::Smy), loc(Province::Ank)));
    }

    #[test]
    fn london_fleet_neighbors() {
        let got = provinces(map().reachable(UnitType::Fleet, loc(Province::Lon)));
        let expected: HashSet<Province> =
            [Province::Nth, Province::Eng, Province::Wal, Province::Yor].into_iter().collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn split_coast_moves() {
        let m = map();
        assert!(m.can_move(UnitType::Fleet, loc(Province::Bar), coast(Province::Stp, Coast::North)));
        assert!(!m.can_move(UnitType::Fleet, loc(Province::Bar), coast(Province::Stp, Coast::South)));
        assert!(!m.can_move(UnitType::Fleet, loc(Province::Bar), loc(Province::Stp)));
        assert!(m.can_move(UnitType::Fleet, coast(Province::Stp, Coast::South), loc(Province::Bot)));
        assert!(!m.can_move(UnitType::Fleet, coast(Province::Stp, Coast::North), loc(Province::Bot)));
        assert!(m.can_move(UnitType::Army, loc(Province::Fin), loc(Province::Stp)));
        assert_eq!(m.fleet_coasts_toward(loc(Province::Con), Province::Bul), vec![Coast::East, Coast::South]);
        assert_eq!(m.fleet_coasts_toward(loc(Province::Gas), Province::Spa), vec![Coast::North]);
    }

    #[test]
    fn support_reach_ignores_coast() {
        let m = map();
        // F mao can support into spa even though it would have to name a coast to move.
        assert!(m.can_reach_province(UnitType::Fleet, loc(Province::Mao), Province::Spa));
        // F spa(nc) cannot reach the gulf of lyon.
        assert!(!m.can_reach_province(UnitType::Fleet, coast(Province::Spa, Coast::North), Province::Gol));
        assert!(m.can_reach_province(UnitType::Fleet, coast(Province::Spa, Coast::South), Province::Mar));
    }

    #[test]
    fn convoy_routes() {
        let m = map();
        assert!(m.convoy_route_exists(Province::Lon, Province::Nwy, |p| p == Province::Nth));
        assert!(!m.convoy_route_exists(Province::Lon, Province::Nwy, |p| p == Province::Eng));
        // Two-fleet chain: lon -> eng -> mao -> por.
        assert!(m.convoy_route_exists(Province::Lon, Province::Por, |p| matches!(p, Province::Eng | Province::Mao)));
        assert!(!m.convoy_route_exists(Province::Lon, Province::Por, |p| p == Province::Mao));
        // No route through coastal provinces.
        assert!(!m.convoy_route_exists(Province::Lon, Province::Bel, |p| p == Province::Hol));
        assert!(!m.convoy_route_exists(Province::Lon, Province::Lon, |_| true));
    }

    #[test]
    fn distances() {
        let m = map();
        assert_eq!(m.distance_to(Province::Mos, |p| p == Province::Mos), Some(0));
        assert_eq!(m.distance_to(Province::Mos, |p| p == Province::War), Some(1));
        assert_eq!(m.distance_to(Province::Lon, |p| p == Province::Bel), Some(2));
    }
}
