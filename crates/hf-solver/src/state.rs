//! Solution state at one time point.

use serde::{Deserialize, Serialize};

/// Time, unknowns and their time derivatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub t: f64,
    pub y: Vec<f64>,
    pub ydot: Vec<f64>,
}

impl State {
    pub fn zeros(n: usize) -> Self {
        Self {
            t: 0.0,
            y: vec![0.0; n],
            ydot: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.t.is_finite()
            && self.y.iter().all(|v| v.is_finite())
            && self.ydot.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let state = State {
            t: 0.5,
            y: vec![1.0, 2.0],
            ydot: vec![0.0, -1.0],
        };
        let text = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&text).unwrap();
        assert_eq!(state, back);
    }
}
