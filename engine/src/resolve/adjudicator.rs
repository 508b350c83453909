//! Movement-phase adjudication.
//!
//! All orders of a turn are resolved at once by iterating over four families
//! of tri-state decisions: does a move succeed, is a support given, does a
//! convoyed army have a path, is a unit dislodged. Each pass re-evaluates the
//! undetermined decisions using min/max bounds on the strengths they depend
//! on, and a decision is fixed only once every consistent outcome agrees on
//! it. When a pass changes nothing two knots can remain. A ring of moves
//! waiting on each other is circular movement and the whole ring moves. A
//! knot involving undetermined convoy paths is a convoy paradox and those
//! convoys fail (the Szykman rule).

use tracing::{debug, trace};

use crate::board::adjacency::map;
use crate::board::order::{IssuedOrder, Location, Order, OrderUnit};
use crate::board::province::{Power, Province, PROVINCE_COUNT};
use crate::board::state::GameState;
use crate::board::unit::{Unit, UnitType};
use crate::error::EngineInvariantError;

use super::outcome::Verdict;

/// State of a single decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Undetermined,
    Yes,
    No,
}

/// Bounds on a strength while decisions are still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Range {
    lo: u32,
    hi: u32,
}

impl Range {
    const ZERO: Range = Range { lo: 0, hi: 0 };

    const fn exact(n: u32) -> Range {
        Range { lo: n, hi: n }
    }

    fn count(&mut self, d: Decision) {
        match d {
            Decision::Yes => {
                self.lo += 1;
                self.hi += 1;
            }
            Decision::Undetermined => self.hi += 1,
            Decision::No => {}
        }
    }

    fn join(self, other: Range) -> Range {
        Range { lo: self.lo.min(other.lo), hi: self.hi.max(other.hi) }
    }
}

/// How an order takes part in the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Hold,
    Move { dest: Location, convoyed: bool, head_to_head: Option<usize> },
    SupportHold { target: usize },
    SupportMove { target: usize, dest: Province },
    Convoy { army: usize },
    /// A support or convoy that matches no order. The unit stands still.
    Void,
}

struct Entry {
    order: IssuedOrder,
    unit: Unit,
    role: Role,
}

impl Entry {
    #[inline]
    fn province(&self) -> Province {
        self.unit.location.province
    }

    #[inline]
    fn power(&self) -> Power {
        self.unit.power
    }
}

/// A unit forced out of its province by a successful attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub unit: Unit,
    pub attacker_from: Province,
    /// The attacker arrived by convoy, so the unit may retreat to its origin.
    pub by_convoy: bool,
}

/// The result of adjudicating one movement phase.
#[derive(Debug, Clone)]
pub struct Adjudication {
    /// Every adjudicated order, one per unit, with its verdict.
    pub verdicts: Vec<(IssuedOrder, Verdict)>,
    /// Successful moves as (origin, destination).
    pub moves: Vec<(Province, Location)>,
    pub dislodged: Vec<Displacement>,
    /// Provinces where a move bounced. Retreats may not end there.
    pub contested: [bool; PROVINCE_COUNT],
    pub passes: usize,
}

impl Adjudication {
    /// The verdict of the order given to the unit at `province`.
    pub fn verdict_at(&self, province: Province) -> Option<Verdict> {
        self.verdicts
            .iter()
            .find(|(o, _)| o.order.unit().is_some_and(|u| u.province() == province))
            .map(|(_, v)| *v)
    }

    pub fn is_dislodged(&self, province: Province) -> bool {
        self.dislodged.iter().any(|d| d.unit.location.province == province)
    }
}

/// Movement adjudicator with a bounded number of passes.
#[derive(Debug, Clone, Copy)]
pub struct Adjudicator {
    max_passes: usize,
}

impl Adjudicator {
    pub fn new(max_passes: usize) -> Self {
        Adjudicator { max_passes: max_passes.max(1) }
    }

    /// Resolves one movement phase.
    ///
    /// `orders` should carry one order per unit; units without an order hold.
    /// Orders that have no unit on the board are an invariant violation, since
    /// the validator drops them.
    pub fn adjudicate(&self, state: &GameState, orders: &[IssuedOrder]) -> Result<Adjudication, EngineInvariantError> {
        let mut solver = Solver::build(state, orders)?;
        let passes = solver.solve(self.max_passes)?;
        debug!(orders = solver.entries.len(), passes, "movement adjudicated");
        Ok(solver.finish(passes))
    }
}

impl Default for Adjudicator {
    fn default() -> Self {
        Adjudicator::new(256)
    }
}

struct Solver {
    entries: Vec<Entry>,
    at: [Option<usize>; PROVINCE_COUNT],
    /// Supports backing each entry: move supports for movers, hold supports otherwise.
    backers: Vec<Vec<usize>>,
    /// Fleets convoying each convoyed move.
    convoyers: Vec<Vec<usize>>,
    /// Moves into each province.
    attackers: Vec<Vec<usize>>,
    moves: Vec<Decision>,
    supports: Vec<Decision>,
    paths: Vec<Decision>,
    dislodged: Vec<Decision>,
}

impl Solver {
    fn build(state: &GameState, orders: &[IssuedOrder]) -> Result<Solver, EngineInvariantError> {
        let mut entries: Vec<Entry> = Vec::with_capacity(orders.len());
        let mut at = [None; PROVINCE_COUNT];

        for issued in orders {
            let Some(ou) = issued.order.unit() else { continue };
            let province = ou.province();
            let unit = *state.unit_at(province).ok_or(EngineInvariantError::MissingUnit(province))?;
            if at[province as usize].is_some() {
                return Err(EngineInvariantError::DoubleOccupancy(province));
            }
            at[province as usize] = Some(entries.len());
            entries.push(Entry { order: *issued, unit, role: Role::Hold });
        }
        for unit in state.all_units() {
            let province = unit.location.province;
            if at[province as usize].is_none() {
                at[province as usize] = Some(entries.len());
                let order = Order::Hold { unit: OrderUnit::new(unit.unit_type, unit.location) };
                entries.push(Entry { order: IssuedOrder::new(unit.power, order), unit: *unit, role: Role::Hold });
            }
        }

        let n = entries.len();
        let mut solver = Solver {
            entries,
            at,
            backers: vec![Vec::new(); n],
            convoyers: vec![Vec::new(); n],
            attackers: vec![Vec::new(); PROVINCE_COUNT],
            moves: vec![Decision::No; n],
            supports: vec![Decision::No; n],
            paths: vec![Decision::Yes; n],
            dislodged: vec![Decision::Undetermined; n],
        };
        solver.assign_roles();
        Ok(solver)
    }

    fn entry_at(&self, province: Province) -> Option<usize> {
        self.at[province as usize]
    }

    /// Whether a fleet of the army's own power offers to convoy exactly this move.
    fn own_convoy_offered(&self, army: &Entry, dest: Province) -> bool {
        self.entries.iter().any(|e| match e.order.order {
            Order::Convoy { convoyed_from, convoyed_to, .. } => {
                e.power() == army.power()
                    && convoyed_from.province == army.province()
                    && convoyed_to.province == dest
            }
            _ => false,
        })
    }

    fn assign_roles(&mut self) {
        let graph = map();

        // Moves first: supports and convoys are matched against them.
        for i in 0..self.entries.len() {
            if let Order::Move { dest, .. } = self.entries[i].order.order {
                let e = &self.entries[i];
                let convoyed = e.unit.unit_type == UnitType::Army
                    && (!graph.can_move(UnitType::Army, e.unit.location, dest)
                        || self.own_convoy_offered(e, dest.province));
                self.entries[i].role = Role::Move { dest, convoyed, head_to_head: None };
                self.moves[i] = Decision::Undetermined;
                if convoyed {
                    self.paths[i] = Decision::Undetermined;
                }
                self.attackers[dest.province as usize].push(i);
            }
        }

        for i in 0..self.entries.len() {
            if let Role::Move { dest, convoyed: false, .. } = self.entries[i].role {
                let origin = self.entries[i].province();
                if let Some(k) = self.entry_at(dest.province) {
                    if let Role::Move { dest: back, convoyed: false, .. } = self.entries[k].role {
                        if back.province == origin {
                            self.entries[i].role =
                                Role::Move { dest, convoyed: false, head_to_head: Some(k) };
                        }
                    }
                }
            }
        }

        for i in 0..self.entries.len() {
            let role = match self.entries[i].order.order {
                Order::SupportHold { supported, .. } => match self.entry_at(supported.province()) {
                    Some(t) if !matches!(self.entries[t].role, Role::Move { .. }) => Role::SupportHold { target: t },
                    _ => Role::Void,
                },
                Order::SupportMove { supported, dest, .. } => match self.entry_at(supported.province()) {
                    Some(t) => match self.entries[t].role {
                        Role::Move { dest: moving_to, .. } if moving_to.province == dest.province => {
                            Role::SupportMove { target: t, dest: dest.province }
                        }
                        _ => Role::Void,
                    },
                    None => Role::Void,
                },
                Order::Convoy { convoyed_from, convoyed_to, .. } => {
                    let fleet_at_sea =
                        self.entries[i].unit.unit_type == UnitType::Fleet && self.entries[i].province().is_sea();
                    match self.entry_at(convoyed_from.province) {
                        Some(a) if fleet_at_sea => match self.entries[a].role {
                            Role::Move { dest, convoyed: true, .. } if dest.province == convoyed_to.province => {
                                Role::Convoy { army: a }
                            }
                            _ => Role::Void,
                        },
                        _ => Role::Void,
                    }
                }
                Order::Hold { .. } | Order::Move { .. } => continue,
                Order::Retreat { .. } | Order::Disband { .. } | Order::Build { .. } | Order::Waive => Role::Void,
            };
            match role {
                Role::SupportHold { target } | Role::SupportMove { target, .. } => {
                    self.backers[target].push(i);
                    self.supports[i] = Decision::Undetermined;
                }
                Role::Convoy { army } => self.convoyers[army].push(i),
                _ => {}
            }
            self.entries[i].role = role;
        }

        for i in 0..self.entries.len() {
            if self.attackers[self.entries[i].province() as usize].is_empty() {
                self.dislodged[i] = Decision::No;
            }
        }
    }

    // === Strengths ===

    fn support_range(&self, i: usize, excluding: Option<Power>) -> Range {
        let mut r = Range::ZERO;
        for &j in &self.backers[i] {
            if Some(self.entries[j].power()) != excluding {
                r.count(self.supports[j]);
            }
        }
        r
    }

    fn plus_one(mut r: Range) -> Range {
        r.lo += 1;
        r.hi += 1;
        r
    }

    fn hold_strength(&self, province: Province) -> Range {
        let Some(k) = self.entry_at(province) else { return Range::ZERO };
        match self.entries[k].role {
            Role::Move { .. } => match self.moves[k] {
                Decision::Yes => Range::ZERO,
                Decision::No => Range::exact(1),
                Decision::Undetermined => Range { lo: 0, hi: 1 },
            },
            _ => Self::plus_one(self.support_range(k, None)),
        }
    }

    fn attack_strength(&self, i: usize) -> Range {
        let Role::Move { dest, head_to_head, .. } = self.entries[i].role else { return Range::ZERO };
        if self.paths[i] == Decision::No {
            return Range::ZERO;
        }
        let full = Self::plus_one(self.support_range(i, None));
        let mut r = match self.entry_at(dest.province) {
            None => full,
            Some(k) => {
                let occupant = self.entries[k].power();
                let stay = if occupant == self.entries[i].power() {
                    Range::ZERO
                } else {
                    Self::plus_one(self.support_range(i, Some(occupant)))
                };
                let leaving = match self.entries[k].role {
                    Role::Move { .. } if head_to_head != Some(k) => self.moves[k],
                    _ => Decision::No,
                };
                match leaving {
                    Decision::Yes => full,
                    Decision::No => stay,
                    Decision::Undetermined => full.join(stay),
                }
            }
        };
        if self.paths[i] == Decision::Undetermined {
            r.lo = 0;
        }
        r
    }

    fn defend_strength(&self, i: usize) -> Range {
        Self::plus_one(self.support_range(i, None))
    }

    fn prevent_strength(&self, i: usize) -> Range {
        let Role::Move { head_to_head, .. } = self.entries[i].role else { return Range::ZERO };
        if self.paths[i] == Decision::No {
            return Range::ZERO;
        }
        let mut r = Self::plus_one(self.support_range(i, None));
        if let Some(k) = head_to_head {
            match self.moves[k] {
                Decision::Yes => return Range::ZERO,
                Decision::Undetermined => r.lo = 0,
                Decision::No => {}
            }
        }
        if self.paths[i] == Decision::Undetermined {
            r.lo = 0;
        }
        r
    }

    // === Decisions ===

    fn decide_move(&self, i: usize) -> Decision {
        let Role::Move { dest, head_to_head, .. } = self.entries[i].role else { return Decision::No };
        let attack = self.attack_strength(i);
        let opposition = match head_to_head {
            Some(k) => self.defend_strength(k),
            None => self.hold_strength(dest.province),
        };
        let mut wins = attack.lo > opposition.hi;
        let mut loses = attack.hi <= opposition.lo;
        for &j in &self.attackers[dest.province as usize] {
            if j == i {
                continue;
            }
            let prevent = self.prevent_strength(j);
            wins &= attack.lo > prevent.hi;
            loses |= attack.hi <= prevent.lo;
        }
        if loses {
            Decision::No
        } else if wins {
            Decision::Yes
        } else {
            Decision::Undetermined
        }
    }

    /// Any attack from another power with an existing route cuts, even one
    /// that fails, unless it comes from the province the support is aimed at.
    fn decide_support(&self, j: usize) -> Decision {
        let target = match self.entries[j].role {
            Role::SupportHold { target } => self.entries[target].province(),
            Role::SupportMove { dest, .. } => dest,
            _ => return Decision::No,
        };
        if self.dislodged[j] == Decision::Yes {
            return Decision::No;
        }
        let mut open = self.dislodged[j] == Decision::Undetermined;
        for &k in &self.attackers[self.entries[j].province() as usize] {
            let attacker = &self.entries[k];
            if attacker.power() == self.entries[j].power() || attacker.province() == target {
                continue;
            }
            match self.paths[k] {
                Decision::Yes => return Decision::No,
                Decision::Undetermined => open = true,
                Decision::No => {}
            }
        }
        if open {
            Decision::Undetermined
        } else {
            Decision::Yes
        }
    }

    fn decide_path(&self, i: usize) -> Decision {
        let Role::Move { dest, .. } = self.entries[i].role else { return Decision::Yes };
        let origin = self.entries[i].province();
        let fleets = &self.convoyers[i];
        let route_with = |allowed: &dyn Fn(Decision) -> bool| {
            map().convoy_route_exists(origin, dest.province, |sea| {
                fleets.iter().any(|&c| self.entries[c].province() == sea && allowed(self.dislodged[c]))
            })
        };
        if route_with(&|d| d == Decision::No) {
            Decision::Yes
        } else if !route_with(&|d| d != Decision::Yes) {
            Decision::No
        } else {
            Decision::Undetermined
        }
    }

    fn decide_dislodged(&self, u: usize) -> Decision {
        let leaving = match self.entries[u].role {
            Role::Move { .. } => self.moves[u],
            _ => Decision::No,
        };
        if leaving == Decision::Yes {
            return Decision::No;
        }
        let mut open = false;
        for &k in &self.attackers[self.entries[u].province() as usize] {
            match self.moves[k] {
                Decision::Yes if leaving == Decision::No => return Decision::Yes,
                Decision::Yes | Decision::Undetermined => open = true,
                Decision::No => {}
            }
        }
        if open {
            Decision::Undetermined
        } else {
            Decision::No
        }
    }

    /// Re-evaluates every open decision once. Returns whether anything changed.
    fn pass(&mut self) -> bool {
        let mut changed = false;
        for i in 0..self.entries.len() {
            if self.paths[i] == Decision::Undetermined {
                let d = self.decide_path(i);
                if d != Decision::Undetermined {
                    self.paths[i] = d;
                    changed = true;
                }
            }
            if self.supports[i] == Decision::Undetermined {
                let d = self.decide_support(i);
                if d != Decision::Undetermined {
                    self.supports[i] = d;
                    changed = true;
                }
            }
            if self.moves[i] == Decision::Undetermined {
                let d = self.decide_move(i);
                if d != Decision::Undetermined {
                    self.moves[i] = d;
                    changed = true;
                }
            }
            if self.dislodged[i] == Decision::Undetermined {
                let d = self.decide_dislodged(i);
                if d != Decision::Undetermined {
                    self.dislodged[i] = d;
                    changed = true;
                }
            }
        }
        changed
    }

    fn settled(&self) -> bool {
        [&self.moves, &self.supports, &self.paths, &self.dislodged]
            .iter()
            .all(|ds| ds.iter().all(|&d| d != Decision::Undetermined))
    }

    fn solve(&mut self, max_passes: usize) -> Result<usize, EngineInvariantError> {
        let mut passes = 0;
        while !self.settled() {
            if passes == max_passes {
                return Err(EngineInvariantError::NonConvergence { passes });
            }
            passes += 1;
            if self.pass() {
                continue;
            }
            if self.break_circular_movement() {
                debug!(passes, "circular movement resolved");
            } else if self.break_convoy_paradox() {
                debug!(passes, "convoy paradox resolved");
            } else {
                return Err(EngineInvariantError::NonConvergence { passes });
            }
        }
        Ok(passes)
    }

    /// Finds a ring of undetermined moves, each into the province the next one
    /// leaves, and lets every move in it succeed.
    fn break_circular_movement(&mut self) -> bool {
        let open = |s: &Solver, i: usize| {
            matches!(s.entries[i].role, Role::Move { .. })
                && s.moves[i] == Decision::Undetermined
                && s.paths[i] != Decision::Undetermined
        };
        for start in 0..self.entries.len() {
            if !open(self, start) {
                continue;
            }
            let mut ring = vec![start];
            let mut cur = start;
            loop {
                let Role::Move { dest, .. } = self.entries[cur].role else { break };
                let Some(next) = self.entry_at(dest.province) else { break };
                if !open(self, next) {
                    break;
                }
                if next == start {
                    trace!(len = ring.len(), "ring of moves found");
                    for &i in &ring {
                        self.moves[i] = Decision::Yes;
                    }
                    return true;
                }
                if ring.contains(&next) {
                    break;
                }
                ring.push(next);
                cur = next;
            }
        }
        false
    }

    /// Fails every convoy path still undetermined.
    fn break_convoy_paradox(&mut self) -> bool {
        let mut changed = false;
        for d in self.paths.iter_mut() {
            if *d == Decision::Undetermined {
                *d = Decision::No;
                changed = true;
            }
        }
        changed
    }

    fn finish(self, passes: usize) -> Adjudication {
        let mut verdicts = Vec::with_capacity(self.entries.len());
        let mut moves = Vec::new();
        let mut dislodged = Vec::new();
        let mut contested = [false; PROVINCE_COUNT];

        for (i, e) in self.entries.iter().enumerate() {
            let verdict = match e.role {
                Role::Hold => {
                    if self.dislodged[i] == Decision::Yes {
                        Verdict::Failed
                    } else {
                        Verdict::Succeeded
                    }
                }
                Role::Move { dest, head_to_head, .. } => {
                    if self.moves[i] == Decision::Yes {
                        moves.push((e.province(), dest));
                        Verdict::Succeeded
                    } else {
                        let beaten_head_on = head_to_head.is_some_and(|k| self.moves[k] == Decision::Yes);
                        if self.paths[i] != Decision::No && !beaten_head_on {
                            contested[dest.province as usize] = true;
                        }
                        Verdict::Failed
                    }
                }
                Role::SupportHold { .. } | Role::SupportMove { .. } => {
                    if self.supports[i] == Decision::Yes {
                        Verdict::Succeeded
                    } else {
                        Verdict::Failed
                    }
                }
                Role::Convoy { army } => {
                    if self.paths[army] == Decision::Yes && self.dislodged[i] == Decision::No {
                        Verdict::Succeeded
                    } else {
                        Verdict::Failed
                    }
                }
                Role::Void => Verdict::Failed,
            };
            verdicts.push((e.order, verdict));

            if self.dislodged[i] == Decision::Yes {
                let winner = self.attackers[e.province() as usize]
                    .iter()
                    .copied()
                    .find(|&k| self.moves[k] == Decision::Yes);
                if let Some(k) = winner {
                    let by_convoy = matches!(self.entries[k].role, Role::Move { convoyed: true, .. });
                    dislodged.push(Displacement { unit: e.unit, attacker_from: self.entries[k].province(), by_convoy });
                }
            }
        }

        // Provinces someone moved into are occupied, not contested.
        for &(_, dest) in &moves {
            contested[dest.province as usize] = false;
        }

        Adjudication { verdicts, moves, dislodged, contested, passes }
    }
}

/// Applies an adjudication to the board: dislodged units leave the map and
/// every successful move is carried out at once.
pub fn apply_adjudication(state: &mut GameState, adj: &Adjudication) -> Result<(), EngineInvariantError> {
    for d in &adj.dislodged {
        state.remove_unit(d.unit.location.province);
    }
    let mut movers = Vec::with_capacity(adj.moves.len());
    for &(from, to) in &adj.moves {
        let unit = state.remove_unit(from).ok_or(EngineInvariantError::MissingUnit(from))?;
        movers.push((unit, to));
    }
    for (mut unit, to) in movers {
        unit.location = match unit.unit_type {
            UnitType::Army => Location::new(to.province),
            UnitType::Fleet => to,
        };
        if !state.place_unit(unit) {
            return Err(EngineInvariantError::DoubleOccupancy(to.province));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::province::Coast;
    use crate::board::state::Phase;

    fn state(units: &[(Power, UnitType, Province)]) -> GameState {
        let mut s = GameState::empty(1901, Phase::SpringMovement);
        for &(power, unit_type, province) in units {
            assert!(s.place_unit(Unit::new(power, unit_type, Location::new(province))));
        }
        s
    }

    fn ou(unit_type: UnitType, p: Province) -> OrderUnit {
        OrderUnit::new(unit_type, Location::new(p))
    }

    fn mv(power: Power, unit_type: UnitType, from: Province, to: Province) -> IssuedOrder {
        IssuedOrder::new(power, Order::Move { unit: ou(unit_type, from), dest: Location::new(to) })
    }

    fn hold(power: Power, unit_type: UnitType, at: Province) -> IssuedOrder {
        IssuedOrder::new(power, Order::Hold { unit: ou(unit_type, at) })
    }

    fn support_move(power: Power, unit_type: UnitType, at: Province, from: Province, to: Province) -> IssuedOrder {
        IssuedOrder::new(
            power,
            Order::SupportMove { unit: ou(unit_type, at), supported: ou(UnitType::Army, from), dest: Location::new(to) },
        )
    }

    fn run(s: &GameState, orders: &[IssuedOrder]) -> Adjudication {
        Adjudicator::default().adjudicate(s, orders).unwrap()
    }

    use Power::*;
    use Province::*;
    use UnitType::{Army as A, Fleet as F};

    #[test]
    fn unopposed_move_succeeds() {
        let s = state(&[(Germany, A, Ber)]);
        let r = run(&s, &[mv(Germany, A, Ber, Sil)]);
        assert_eq!(r.verdict_at(Ber), Some(Verdict::Succeeded));
        assert_eq!(r.moves, vec![(Ber, Location::new(Sil))]);
        assert!(!r.contested[Sil as usize]);
    }

    #[test]
    fn unordered_units_hold() {
        let s = state(&[(Germany, A, Ber), (Russia, A, Pru)]);
        let r = run(&s, &[mv(Russia, A, Pru, Ber)]);
        assert_eq!(r.verdicts.len(), 2);
        assert_eq!(r.verdict_at(Pru), Some(Verdict::Failed));
        assert_eq!(r.verdict_at(Ber), Some(Verdict::Succeeded));
    }

    #[test]
    fn standoff_marks_province_contested() {
        let s = state(&[(Germany, A, Ber), (Russia, A, War)]);
        let r = run(&s, &[mv(Germany, A, Ber, Sil), mv(Russia, A, War, Sil)]);
        assert_eq!(r.verdict_at(Ber), Some(Verdict::Failed));
        assert_eq!(r.verdict_at(War), Some(Verdict::Failed));
        assert!(r.contested[Sil as usize]);
        assert!(r.moves.is_empty());
    }

    #[test]
    fn supported_attack_dislodges() {
        let s = state(&[(Germany, A, Mun), (Germany, A, Ruh), (France, A, Bur)]);
        let r = run(&s, &[mv(Germany, A, Mun, Bur), support_move(Germany, A, Ruh, Mun, Bur), hold(France, A, Bur)]);
        assert_eq!(r.verdict_at(Mun), Some(Verdict::Succeeded));
        assert_eq!(r.dislodged.len(), 1);
        assert_eq!(r.dislodged[0].unit.power, France);
        assert_eq!(r.dislodged[0].attacker_from, Mun);
        assert!(!r.dislodged[0].by_convoy);
    }

    #[test]
    fn no_self_dislodgement() {
        let s = state(&[(Germany, A, Mun), (Germany, A, Ruh), (Germany, A, Bur)]);
        let r = run(&s, &[mv(Germany, A, Mun, Bur), support_move(Germany, A, Ruh, Mun, Bur), hold(Germany, A, Bur)]);
        assert_eq!(r.verdict_at(Mun), Some(Verdict::Failed));
        assert!(r.dislodged.is_empty());
    }

    #[test]
    fn three_unit_ring_moves() {
        let s = state(&[(Turkey, F, Ank), (Turkey, A, Con), (Turkey, A, Smy)]);
        let r = run(&s, &[mv(Turkey, F, Ank, Con), mv(Turkey, A, Con, Smy), mv(Turkey, A, Smy, Ank)]);
        assert_eq!(r.moves.len(), 3);
        let mut after = s.clone();
        apply_adjudication(&mut after, &r).unwrap();
        assert_eq!(after.unit_at(Con).map(|u| u.unit_type), Some(F));
        assert_eq!(after.unit_at(Smy).map(|u| u.unit_type), Some(A));
        assert_eq!(after.unit_at(Ank).map(|u| u.unit_type), Some(A));
    }

    #[test]
    fn swap_without_convoy_bounces() {
        let s = state(&[(Turkey, A, Con), (Russia, A, Bul)]);
        let r = run(&s, &[mv(Turkey, A, Con, Bul), mv(Russia, A, Bul, Con)]);
        assert!(r.moves.is_empty());
        assert!(r.dislodged.is_empty());
    }

    #[test]
    fn missing_unit_is_an_invariant_error() {
        let s = state(&[]);
        let err = Adjudicator::default().adjudicate(&s, &[hold(France, A, Par)]).unwrap_err();
        assert_eq!(err, EngineInvariantError::MissingUnit(Par));
    }

    #[test]
    fn fleet_keeps_coast_on_arrival() {
        let s = state(&[(France, F, Mao)]);
        let order = IssuedOrder::new(
            France,
            Order::Move { unit: ou(F, Mao), dest: Location::with_coast(Spa, Coast::North) },
        );
        let r = run(&s, &[order]);
        let mut after = s.clone();
        apply_adjudication(&mut after, &r).unwrap();
        assert_eq!(after.unit_at(Spa).map(|u| u.location.coast), Some(Some(Coast::North)));
    }
}
