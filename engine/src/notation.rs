//! Order notation.
//!
//! Orders travel as power-qualified strings such as `"ENG: F edi -> nth"` or
//! `"RUS: F stp(sc) -> bot"`. Input is case-insensitive and tolerant about
//! whitespace around `->`; coasts may be written `stp(sc)` or `stp/sc`.
//! Formatting always produces the canonical form, which parses back to the
//! same order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::board::order::{IssuedOrder, Location, Order, OrderUnit};
use crate::board::province::{Coast, Power, Province};
use crate::board::unit::UnitType;

/// Errors that can occur when parsing order strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty order")]
    EmptyInput,

    #[error("missing power prefix (expected 'POW: ...') in '{0}'")]
    MissingPower(String),

    #[error("unknown power '{0}'")]
    UnknownPower(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("unknown coast '{0}'")]
    UnknownCoast(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unexpected end of order, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unexpected '{found}', expected {expected}")]
    UnexpectedToken { expected: &'static str, found: String },

    #[error("order list must be a JSON array of strings: {0}")]
    InvalidList(String),
}

const ARROW: &str = "->";

/// Parses a single power-qualified order.
pub fn parse_order(s: &str) -> Result<IssuedOrder, NotationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(NotationError::EmptyInput);
    }
    let (power_str, body) = s
        .split_once(':')
        .ok_or_else(|| NotationError::MissingPower(s.to_string()))?;
    let power = Power::from_name(power_str)
        .ok_or_else(|| NotationError::UnknownPower(power_str.trim().to_string()))?;
    let order = parse_body(body)?;
    Ok(IssuedOrder::new(power, order))
}

/// Parses an order without its power prefix, e.g. `F edi -> nth`.
pub fn parse_body(body: &str) -> Result<Order, NotationError> {
    let spaced = body.replace(ARROW, " -> ");
    let tokens = merge_coast_tokens(spaced.split_whitespace().collect());
    let mut cur = Cursor { tokens: &tokens, pos: 0 };

    let first = cur.peek().ok_or(NotationError::EmptyInput)?;
    if first.eq_ignore_ascii_case("waive") || first.eq_ignore_ascii_case("w") {
        cur.pos += 1;
        cur.finish()?;
        return Ok(Order::Waive);
    }

    let unit = cur.unit()?;
    let action = cur.next().ok_or(NotationError::UnexpectedEnd("an action"))?;
    let order = match action.to_ascii_lowercase().as_str() {
        "->" | "-" => Order::Move { unit, dest: cur.location()? },
        "holds" | "hold" | "h" => Order::Hold { unit },
        "supports" | "support" | "s" => {
            let supported = cur.unit()?;
            match cur.peek().map(str::to_ascii_lowercase).as_deref() {
                None => Order::SupportHold { unit, supported },
                Some("holds" | "hold" | "h") => {
                    cur.pos += 1;
                    Order::SupportHold { unit, supported }
                }
                Some("->" | "-") => {
                    cur.pos += 1;
                    Order::SupportMove { unit, supported, dest: cur.location()? }
                }
                Some(_) => {
                    return Err(NotationError::UnexpectedToken {
                        expected: "'->' or 'holds'",
                        found: cur.tokens[cur.pos].to_string(),
                    })
                }
            }
        }
        "convoys" | "convoy" | "c" => {
            let convoyed = cur.unit()?;
            if convoyed.unit_type != UnitType::Army {
                return Err(NotationError::UnexpectedToken {
                    expected: "a convoyed army",
                    found: convoyed.to_string(),
                });
            }
            cur.expect_arrow()?;
            Order::Convoy { unit, convoyed_from: convoyed.location, convoyed_to: cur.location()? }
        }
        "retreats" | "retreat" | "r" => {
            if matches!(cur.peek(), Some("->" | "-")) {
                cur.pos += 1;
            }
            Order::Retreat { unit, dest: cur.location()? }
        }
        "disband" | "disbands" | "d" => Order::Disband { unit },
        "build" | "builds" | "b" => Order::Build { unit },
        _ => return Err(NotationError::UnknownAction(action.to_string())),
    };
    cur.finish()?;
    Ok(order)
}

/// Parses a JSON array of order strings, as sent with `order -o`.
pub fn parse_order_list(json: &str) -> Result<Vec<String>, NotationError> {
    serde_json::from_str::<Vec<String>>(json.trim()).map_err(|e| NotationError::InvalidList(e.to_string()))
}

/// Formats an order without its power prefix.
pub fn format_order(order: &Order) -> String {
    match order {
        Order::Hold { unit } => format!("{} holds", unit),
        Order::Move { unit, dest } => format!("{} -> {}", unit, dest),
        Order::SupportHold { unit, supported } => format!("{} supports {}", unit, supported),
        Order::SupportMove { unit, supported, dest } => {
            format!("{} supports {} -> {}", unit, supported, dest)
        }
        Order::Convoy { unit, convoyed_from, convoyed_to } => {
            format!("{} convoys A {} -> {}", unit, convoyed_from, convoyed_to)
        }
        Order::Retreat { unit, dest } => format!("{} retreats {}", unit, dest),
        Order::Disband { unit } => format!("{} disband", unit),
        Order::Build { unit } => format!("{} build", unit),
        Order::Waive => "waive".to_string(),
    }
}

/// Formats a power-qualified order in canonical form.
pub fn format_issued(order: &IssuedOrder) -> String {
    format!("{}: {}", order.power, format_order(&order.order))
}

/// Joins `stp (sc)` into `stp(sc)` so locations are always one token.
fn merge_coast_tokens(raw: Vec<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for tok in raw {
        match out.last_mut() {
            Some(prev) if tok.starts_with('(') => prev.push_str(tok),
            _ => out.push(tok.to_string()),
        }
    }
    out
}

struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Option<&'a str> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unit(&mut self) -> Result<OrderUnit, NotationError> {
        let tok = self.next().ok_or(NotationError::UnexpectedEnd("unit type (A or F)"))?;
        let mut chars = tok.chars();
        let unit_type = match (chars.next(), chars.next()) {
            (Some(c), None) => UnitType::from_code(c),
            _ => None,
        }
        .ok_or_else(|| NotationError::UnknownUnitType(tok.to_string()))?;
        Ok(OrderUnit::new(unit_type, self.location()?))
    }

    fn location(&mut self) -> Result<Location, NotationError> {
        let tok = self.next().ok_or(NotationError::UnexpectedEnd("a province"))?;
        parse_location(tok)
    }

    fn expect_arrow(&mut self) -> Result<(), NotationError> {
        match self.next() {
            Some("->" | "-") => Ok(()),
            Some(other) => Err(NotationError::UnexpectedToken { expected: "'->'", found: other.to_string() }),
            None => Err(NotationError::UnexpectedEnd("'->'")),
        }
    }

    fn finish(&self) -> Result<(), NotationError> {
        match self.peek() {
            None => Ok(()),
            Some(extra) => Err(NotationError::UnexpectedToken { expected: "end of order", found: extra.to_string() }),
        }
    }
}

/// Parses `prov`, `prov(coast)` or `prov/coast`.
pub fn parse_location(token: &str) -> Result<Location, NotationError> {
    let (prov_str, coast_str) = if let Some((prov, rest)) = token.split_once('(') {
        let coast = rest
            .strip_suffix(')')
            .ok_or_else(|| NotationError::UnknownCoast(rest.to_string()))?;
        (prov, Some(coast))
    } else if let Some((prov, coast)) = token.split_once('/') {
        (prov, Some(coast))
    } else {
        (token, None)
    };

    let province =
        Province::from_abbr(prov_str.trim()).ok_or_else(|| NotationError::UnknownProvince(prov_str.to_string()))?;
    match coast_str {
        Some(c) => {
            let coast = Coast::from_abbr(c.trim()).ok_or_else(|| NotationError::UnknownCoast(c.to_string()))?;
            Ok(Location::with_coast(province, coast))
        }
        None => Ok(Location::new(province)),
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_order(self))
    }
}

impl fmt::Display for IssuedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_issued(self))
    }
}

impl FromStr for IssuedOrder {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_order(s)
    }
}

impl Serialize for IssuedOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_issued(self))
    }
}

impl<'de> Deserialize<'de> for IssuedOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_order(&s).map_err(serde::de::Error::custom)
    }
}
