//! A single game: order intake and the phase state machine.
//!
//! Each power with something to order submits a list of order strings. A
//! later submission from the same power replaces the earlier one. Once every
//! required power has submitted, the phase is resolved and the game moves on;
//! phases in which nobody has anything to order resolve at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::order::IssuedOrder;
use crate::board::province::{Power, ALL_POWERS};
use crate::board::state::{BoardSnapshot, GameState, Phase};
use crate::config::EngineConfig;
use crate::error::GameError;
use crate::notation::format_issued;
use crate::resolve::adjustment::{adjustment_for, Adjustment};
use crate::resolve::outcome::{OrderOutcome, PhaseReport, Rejection, Verdict};
use crate::resolve::phase::{resolve_phase, solo_winner};
use crate::validate::Validator;

/// Orders recorded for one power in the current phase.
#[derive(Debug, Clone, Default)]
struct PowerOrders {
    accepted: Vec<IssuedOrder>,
    /// Well-formed orders that broke a rule.
    invalid: Vec<IssuedOrder>,
    rejected: Vec<Rejection>,
}

/// What became of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Accepted orders in canonical notation.
    pub accepted: Vec<String>,
    pub rejected: Vec<Rejection>,
    /// Phases resolved as a result of this submission, oldest first.
    pub reports: Vec<PhaseReport>,
    /// Powers still to submit in the phase the game is now in.
    pub pending: Vec<Power>,
}

/// The queryable state of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub year: u16,
    pub phase: Phase,
    pub pending: Vec<Power>,
    pub submitted: Vec<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Power>,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: EngineConfig,
    state: GameState,
    orders: BTreeMap<Power, PowerOrders>,
    history: Vec<PhaseReport>,
}

impl Game {
    /// Starts a game from the standard opening position.
    pub fn new_game(config: EngineConfig) -> Self {
        let state = GameState::standard(config.starting_year);
        Game::from_state(config, state)
    }

    /// Starts a game from an arbitrary position.
    pub fn from_state(config: EngineConfig, state: GameState) -> Self {
        Game { config, state, orders: BTreeMap::new(), history: Vec::new() }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &[PhaseReport] {
        &self.history
    }

    pub fn last_report(&self) -> Option<&PhaseReport> {
        self.history.last()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::Completed
    }

    pub fn winner(&self) -> Option<Power> {
        if self.is_over() {
            solo_winner(&self.state, self.config.victory_centers)
        } else {
            None
        }
    }

    /// Powers that have something to order this phase.
    pub fn required_powers(&self) -> Vec<Power> {
        let state = &self.state;
        ALL_POWERS
            .into_iter()
            .filter(|&power| match state.phase {
                Phase::SpringMovement | Phase::FallMovement => state.unit_count(power) > 0,
                Phase::SpringRetreat | Phase::FallRetreat => {
                    state.dislodged.iter().any(|d| d.unit.power == power && !d.retreats.is_empty())
                }
                Phase::WinterAdjustment => adjustment_for(state, power) != Adjustment::Settled,
                Phase::Completed => false,
            })
            .collect()
    }

    /// Required powers that have not submitted yet.
    pub fn pending_powers(&self) -> Vec<Power> {
        self.required_powers().into_iter().filter(|p| !self.orders.contains_key(p)).collect()
    }

    pub fn is_ready(&self) -> bool {
        !self.is_over() && self.pending_powers().is_empty()
    }

    /// Records a power's orders for the current phase, replacing any earlier
    /// submission, and resolves the phase if nobody else is pending.
    ///
    /// Orders that fail to parse or break a rule are reported and leave the
    /// unit to its default. An order for the wrong kind of phase rejects the
    /// whole submission.
    pub fn submit(&mut self, power: Power, lines: &[String]) -> Result<SubmitOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.required_powers().contains(&power) {
            return Err(GameError::NothingToOrder(power));
        }

        let submission = Validator::new(&self.state, power).submission(lines);
        if let Some(bad) = submission.phase_mismatch() {
            return Err(GameError::PhaseMismatch { phase: self.state.phase, order: bad.text.clone() });
        }

        let mut recorded = PowerOrders::default();
        for r in &submission.rejected {
            debug!(power = %power, order = %r.text, reason = %r.error, "order rejected");
            if let Some(parsed) = r.parsed {
                recorded.invalid.push(parsed);
            }
            recorded.rejected.push(Rejection { power, order: r.text.clone(), reason: r.error.to_string() });
        }
        recorded.accepted = submission.accepted.iter().map(|v| v.order).collect();

        info!(
            power = %power,
            phase = %self.state.phase,
            accepted = recorded.accepted.len(),
            rejected = recorded.rejected.len(),
            "orders submitted"
        );

        let accepted = recorded.accepted.iter().map(format_issued).collect();
        let rejected = recorded.rejected.clone();
        self.orders.insert(power, recorded);

        let reports = if self.pending_powers().is_empty() { self.advance()? } else { Vec::new() };
        Ok(SubmitOutcome { accepted, rejected, reports, pending: self.pending_powers() })
    }

    /// Resolves the current phase with the orders received so far. Powers that
    /// have not submitted get their defaults.
    pub fn force_advance(&mut self) -> Result<Vec<PhaseReport>, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let missing = self.pending_powers();
        if !missing.is_empty() {
            info!(phase = %self.state.phase, missing = missing.len(), "forcing phase with missing orders");
        }
        self.advance()
    }

    /// Resolves the current phase, then every following phase nobody has to
    /// order in.
    fn advance(&mut self) -> Result<Vec<PhaseReport>, GameError> {
        let mut reports = vec![self.resolve_current()?];
        while !self.is_over() && self.required_powers().is_empty() {
            reports.push(self.resolve_current()?);
        }
        Ok(reports)
    }

    fn resolve_current(&mut self) -> Result<PhaseReport, GameError> {
        let recorded = std::mem::take(&mut self.orders);
        let orders: Vec<IssuedOrder> = recorded.values().flat_map(|o| o.accepted.iter().copied()).collect();

        let mut report = resolve_phase(&mut self.state, &orders, &self.config)?;
        for o in recorded.values() {
            report.results.extend(o.invalid.iter().map(|&order| OrderOutcome::new(order, Verdict::Invalid)));
            report.rejected.extend(o.rejected.iter().cloned());
        }

        self.history.push(report.clone());
        Ok(report)
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            year: self.state.year,
            phase: self.state.phase,
            pending: self.pending_powers(),
            submitted: self.orders.keys().copied().collect(),
            winner: self.winner(),
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::order::Location;
    use crate::board::province::Province;
    use crate::board::unit::{Unit, UnitType};
    use crate::resolve::outcome::UnitStatus;

    fn lines(orders: &[&str]) -> Vec<String> {
        orders.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_game_waits_for_everyone() {
        let game = Game::new_game(EngineConfig::default());
        assert_eq!(game.phase(), Phase::SpringMovement);
        assert_eq!(game.pending_powers().len(), 7);
        assert!(!game.is_ready());
    }

    #[test]
    fn phase_resolves_when_the_last_power_submits() {
        let mut game = Game::new_game(EngineConfig::default());
        for power in ALL_POWERS.into_iter().filter(|&p| p != Power::England) {
            let out = game.submit(power, &[]).unwrap();
            assert!(out.reports.is_empty());
        }
        let out = game
            .submit(Power::England, &lines(&["ENG: F edi -> nth", "ENG: F lon -> eng", "ENG: A lvp -> edi"]))
            .unwrap();
        assert_eq!(out.accepted.len(), 3);
        assert_eq!(out.reports.len(), 1);
        assert_eq!(game.phase(), Phase::FallMovement);
        assert_eq!(out.pending.len(), 7);
        assert!(matches!(out.reports[0].fate_at(Province::Lvp), Some(UnitStatus::Moved { .. })));
    }

    #[test]
    fn resubmission_replaces_earlier_orders() {
        let mut game = Game::new_game(EngineConfig::default());
        game.submit(Power::France, &lines(&["FRA: A par -> bur"])).unwrap();
        game.submit(Power::France, &lines(&["FRA: A par -> pic"])).unwrap();
        let reports = game.force_advance().unwrap();
        assert_eq!(reports.len(), 1);
        assert!(game.state().unit_at(Province::Pic).is_some());
        assert!(game.state().unit_at(Province::Bur).is_none());
    }

    #[test]
    fn rejected_orders_are_reported_and_units_hold() {
        let mut game = Game::new_game(EngineConfig::default());
        let out = game.submit(Power::Austria, &lines(&["AUS: A vie -> ven", "AUS: garbage"])).unwrap();
        assert_eq!(out.accepted.len(), 0);
        assert_eq!(out.rejected.len(), 2);

        let report = game.force_advance().unwrap().remove(0);
        assert_eq!(report.rejected.len(), 2);
        assert!(report.results.iter().any(|o| o.verdict == Verdict::Invalid));
        assert_eq!(report.fate_at(Province::Vie), Some(&UnitStatus::Stayed));
    }

    #[test]
    fn wrong_phase_rejects_submission() {
        let mut game = Game::new_game(EngineConfig::default());
        let err = game.submit(Power::England, &lines(&["ENG: F edi -> nth", "ENG: F lon build"])).unwrap_err();
        assert!(matches!(err, GameError::PhaseMismatch { .. }));
        assert_eq!(game.status().submitted, Vec::<Power>::new());
    }

    #[test]
    fn powers_without_units_have_nothing_to_order() {
        let mut state = GameState::empty(1901, Phase::SpringMovement);
        state.place_unit(Unit::new(Power::Italy, UnitType::Army, Location::new(Province::Rom)));
        let mut game = Game::from_state(EngineConfig::default(), state);
        assert_eq!(game.required_powers(), vec![Power::Italy]);
        assert_eq!(game.submit(Power::France, &[]), Err(GameError::NothingToOrder(Power::France)));
    }

    #[test]
    fn quiet_phases_resolve_at_once() {
        let mut game = Game::new_game(EngineConfig::default());
        game.force_advance().unwrap();
        // Nobody moved, so Fall passes straight into next Spring.
        let reports = game.force_advance().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(game.phase(), Phase::SpringMovement);
        assert_eq!(game.state().year, 1902);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn completed_game_refuses_orders() {
        let config = EngineConfig { victory_centers: 4, ..EngineConfig::default() };
        let mut game = Game::new_game(config);
        game.force_advance().unwrap();
        game.force_advance().unwrap();
        assert!(game.is_over());
        assert_eq!(game.winner(), Some(Power::Russia));
        assert_eq!(game.submit(Power::Russia, &[]), Err(GameError::GameOver));
        assert_eq!(game.force_advance(), Err(GameError::GameOver));
    }
}
