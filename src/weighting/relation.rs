//! Selection relations over feature weights.

use crate::error::SelectorError;
use std::fmt;
use std::str::FromStr;

/// Which features a [`WeightSelector`](super::WeightSelector) keeps.
///
/// Threshold relations compare every weight with a literal. Rank relations
/// order the known weights and keep a prefix; percentages are fractions in
/// `[0, 1]` of the number of known weights.
///
/// Relations parse from `"<name> <value>"` or `"<symbol> <value>"`:
///
/// ```
/// use u_featsel::weighting::Relation;
///
/// assert_eq!("top_k 3".parse::<Relation>().unwrap(), Relation::TopK(3));
/// assert_eq!(">= 0.5".parse::<Relation>().unwrap(), Relation::GreaterEqual(0.5));
/// assert_eq!("<0.1".parse::<Relation>().unwrap(), Relation::Less(0.1));
/// assert_eq!("top_p 0.25".parse::<Relation>().unwrap(), Relation::TopPercent(0.25));
/// assert!("top_p 1.5".parse::<Relation>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relation {
    Greater(f64),
    GreaterEqual(f64),
    /// Equal within an absolute tolerance of [`Relation::EQUAL_TOLERANCE`].
    Equal(f64),
    LessEqual(f64),
    Less(f64),
    TopK(usize),
    BottomK(usize),
    AllButTopK(usize),
    AllButBottomK(usize),
    TopPercent(f64),
    BottomPercent(f64),
}

impl Relation {
    /// Absolute tolerance of [`Relation::Equal`].
    pub const EQUAL_TOLERANCE: f64 = 1e-10;

    /// Whether the relation ranks weights instead of thresholding them.
    pub fn is_rank(&self) -> bool {
        !matches!(
            self,
            Relation::Greater(_)
                | Relation::GreaterEqual(_)
                | Relation::Equal(_)
                | Relation::LessEqual(_)
                | Relation::Less(_)
        )
    }

    /// Rejects NaN literals and percentages outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), SelectorError> {
        match *self {
            Relation::Greater(v)
            | Relation::GreaterEqual(v)
            | Relation::Equal(v)
            | Relation::LessEqual(v)
            | Relation::Less(v) => {
                if v.is_nan() {
                    return Err(SelectorError::InvalidRelation(format!(
                        "{} needs a number, got NaN",
                        self.keyword()
                    )));
                }
            }
            Relation::TopPercent(p) | Relation::BottomPercent(p) => {
                if !(0.0..=1.0).contains(&p) {
                    return Err(SelectorError::InvalidRelation(format!(
                        "{} needs a fraction in [0, 1], got {p}",
                        self.keyword()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Threshold test of `weight`; rank relations never match here.
    pub(crate) fn accepts(&self, weight: f64) -> bool {
        match *self {
            Relation::Greater(v) => weight > v,
            Relation::GreaterEqual(v) => weight >= v,
            Relation::Equal(v) => (weight - v).abs() <= Self::EQUAL_TOLERANCE,
            Relation::LessEqual(v) => weight <= v,
            Relation::Less(v) => weight < v,
            _ => false,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Relation::Greater(_) => "greater",
            Relation::GreaterEqual(_) => "greater_equals",
            Relation::Equal(_) => "equals",
            Relation::LessEqual(_) => "less_equals",
            Relation::Less(_) => "less",
            Relation::TopK(_) => "top_k",
            Relation::BottomK(_) => "bottom_k",
            Relation::AllButTopK(_) => "all_but_top_k",
            Relation::AllButBottomK(_) => "all_but_bottom_k",
            Relation::TopPercent(_) => "top_p",
            Relation::BottomPercent(_) => "bottom_p",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Relation::Greater(v)
            | Relation::GreaterEqual(v)
            | Relation::Equal(v)
            | Relation::LessEqual(v)
            | Relation::Less(v)
            | Relation::TopPercent(v)
            | Relation::BottomPercent(v) => write!(f, "{} {}", self.keyword(), v),
            Relation::TopK(k)
            | Relation::BottomK(k)
            | Relation::AllButTopK(k)
            | Relation::AllButBottomK(k) => write!(f, "{} {}", self.keyword(), k),
        }
    }
}

const SYMBOLS: [&str; 5] = [">=", "<=", ">", "<", "="];

impl FromStr for Relation {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SelectorError::InvalidRelation(format!("cannot parse relation '{s}'"));

        let (name, arg) = match SYMBOLS.iter().find(|sym| s.starts_with(*sym)) {
            Some(sym) => (*sym, s[sym.len()..].trim()),
            None => {
                let mut parts = s.split_whitespace();
                let name = parts.next().ok_or_else(invalid)?;
                let arg = parts.next().ok_or_else(invalid)?;
                if parts.next().is_some() {
                    return Err(invalid());
                }
                (name, arg)
            }
        };

        let number = || arg.parse::<f64>().map_err(|_| invalid());
        let count = || arg.parse::<usize>().map_err(|_| invalid());
        let relation = match name.to_ascii_lowercase().as_str() {
            ">" | "greater" => Relation::Greater(number()?),
            ">=" | "greater_equals" => Relation::GreaterEqual(number()?),
            "=" | "equals" => Relation::Equal(number()?),
            "<=" | "less_equals" => Relation::LessEqual(number()?),
            "<" | "less" => Relation::Less(number()?),
            "top_k" => Relation::TopK(count()?),
            "bottom_k" => Relation::BottomK(count()?),
            "all_but_top_k" => Relation::AllButTopK(count()?),
            "all_but_bottom_k" => Relation::AllButBottomK(count()?),
            "top_p" => Relation::TopPercent(number()?),
            "bottom_p" => Relation::BottomPercent(number()?),
            _ => return Err(invalid()),
        };
        relation.validate()?;
        Ok(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_symbols() {
        assert_eq!("greater 0.3".parse::<Relation>(), Ok(Relation::Greater(0.3)));
        assert_eq!("= 1".parse::<Relation>(), Ok(Relation::Equal(1.0)));
        assert_eq!("<= -2".parse::<Relation>(), Ok(Relation::LessEqual(-2.0)));
        assert_eq!("ALL_BUT_TOP_K 2".parse::<Relation>(), Ok(Relation::AllButTopK(2)));
        assert_eq!("bottom_p 0.5".parse::<Relation>(), Ok(Relation::BottomPercent(0.5)));
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "top_k", "top_k -1", "top_k 1 2", "median 3", ">= x", "bottom_p -0.1"] {
            assert!(bad.parse::<Relation>().is_err(), "'{bad}' should not parse");
        }
    }

    #[test]
    fn test_display_round_trips() {
        let r = Relation::AllButBottomK(4);
        assert_eq!(r.to_string(), "all_but_bottom_k 4");
        assert_eq!(r.to_string().parse::<Relation>(), Ok(r));
    }

    #[test]
    fn test_equal_tolerance() {
        let r = Relation::Equal(0.5);
        assert!(r.accepts(0.5 + 5e-11));
        assert!(!r.accepts(0.5 + 1e-9));
    }

    #[test]
    fn test_validate() {
        assert!(Relation::Greater(f64::NAN).validate().is_err());
        assert!(Relation::TopPercent(1.0).validate().is_ok());
        assert!(Relation::TopK(0).validate().is_ok());
        assert!(Relation::TopK(0).is_rank());
        assert!(!Relation::Less(0.0).is_rank());
    }
}
